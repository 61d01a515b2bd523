//! Ring construction.

use dp_core::{AgentId, DpError};

use crate::{Seat, TableResult};

/// The classic five, used to name the first seats of any ring.
pub const PHILOSOPHERS: [&str; 5] = ["Kant", "Hume", "Descartes", "Nietzsche", "Wittgenstein"];

/// Seat `n` philosophers in a ring: seat `i` gets forks `i` and `(i+1) mod n`.
///
/// The first five seats take their names from [`PHILOSOPHERS`]; any further
/// seats are called `philosopher-<i>`.
pub fn make_ring(n: usize) -> TableResult<Vec<Seat>> {
    let names: Vec<String> = (0..n)
        .map(|i| match PHILOSOPHERS.get(i) {
            Some(name) => (*name).to_owned(),
            None       => format!("philosopher-{i}"),
        })
        .collect();
    make_named_ring(&names)
}

/// Seat the given philosophers in order around a ring.
///
/// Fails with a configuration error if fewer than two names are given (no
/// fork pair exists) or if a name repeats (finish order would be ambiguous).
pub fn make_named_ring<S: AsRef<str>>(names: &[S]) -> TableResult<Vec<Seat>> {
    let n = names.len();
    if n < 2 {
        return Err(DpError::Config(format!(
            "at least 2 philosophers are needed to share a fork, got {n}"
        ))
        .into());
    }
    for (i, name) in names.iter().enumerate() {
        if names[..i].iter().any(|other| other.as_ref() == name.as_ref()) {
            return Err(DpError::Config(format!("philosopher `{}` is seated twice", name.as_ref())).into());
        }
    }

    names
        .iter()
        .enumerate()
        .map(|(i, name)| -> TableResult<Seat> {
            let id = AgentId::try_from(i)
                .map_err(|_| DpError::Config(format!("too many philosophers: {n}")))?;
            Ok(Seat::new(id, name.as_ref(), id.left_fork(), id.right_fork(n)))
        })
        .collect()
}
