//! Plain data row types written by output backends.

/// One meal: who ate, which meal it was, and how long the forks took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealRow {
    pub agent:     u32,
    pub name:      String,
    /// 1-based.
    pub meal:      u32,
    pub waited_us: u64,
}

/// One philosopher leaving the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishRow {
    /// 0-based finishing position.
    pub position: usize,
    pub agent:    u32,
    pub name:     String,
}

/// Per-seat totals from a run that passed its audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRow {
    pub agent:           u32,
    pub name:            String,
    pub meals:           u32,
    pub total_wait_us:   u64,
    pub longest_wait_us: u64,
}
