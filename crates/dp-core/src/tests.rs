//! Unit tests for dp-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, ForkId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(4);
        assert_eq!(id.index(), 4);
        assert_eq!(AgentId::try_from(4usize).unwrap(), id);
    }

    #[test]
    fn ring_forks_wrap_around() {
        assert_eq!(AgentId(0).left_fork(), ForkId(0));
        assert_eq!(AgentId(0).right_fork(5), ForkId(1));
        assert_eq!(AgentId(4).left_fork(), ForkId(4));
        assert_eq!(AgentId(4).right_fork(5), ForkId(0));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "seat 7");
        assert_eq!(ForkId(2).to_string(), "fork 2");
    }
}

#[cfg(test)]
mod config {
    use std::time::Duration;

    use crate::{ArbiterPriority, DinnerConfig, DpError, RawDinnerConfig, StrategyKind};

    #[test]
    fn strategy_names_parse() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!("Pair_Lock".parse::<StrategyKind>().unwrap(), StrategyKind::PairLock);
    }

    #[test]
    fn unknown_strategy_rejected() {
        let err = "waiter".parse::<StrategyKind>().unwrap_err();
        assert_eq!(err, DpError::UnknownStrategy("waiter".into()));
    }

    #[test]
    fn priority_names_parse() {
        assert_eq!("greedy".parse::<ArbiterPriority>().unwrap(), ArbiterPriority::Greedy);
        assert_eq!(
            "longest-waiting".parse::<ArbiterPriority>().unwrap(),
            ArbiterPriority::LongestWaiting
        );
        assert!("random".parse::<ArbiterPriority>().is_err());
    }

    #[test]
    fn default_is_valid() {
        let cfg = DinnerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.effective_admission_limit(), 4);
    }

    #[test]
    fn fewer_than_two_agents_rejected() {
        for n in [0, 1] {
            let cfg = DinnerConfig::new(n, StrategyKind::Hierarchy);
            assert!(matches!(cfg.validate(), Err(DpError::Config(_))), "n = {n}");
        }
        assert!(DinnerConfig::new(2, StrategyKind::Hierarchy).validate().is_ok());
    }

    #[test]
    fn admission_limit_bounds() {
        let mut cfg = DinnerConfig::new(5, StrategyKind::AdmissionLimit);
        cfg.admission_limit = Some(5);
        assert!(cfg.validate().is_err(), "limit N would readmit the deadlock");
        cfg.admission_limit = Some(0);
        assert!(cfg.validate().is_err());
        cfg.admission_limit = Some(2);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.effective_admission_limit(), 2);
    }

    #[test]
    fn raw_converts() {
        let raw = RawDinnerConfig {
            agents:           10,
            hunger:           0,
            think_ms:         3,
            eat_ms:           7,
            jitter_ms:        1,
            strategy:         "message-passing".into(),
            seed:             9,
            admission_limit:  None,
            arbiter_priority: Some("greedy".into()),
        };
        let cfg = DinnerConfig::try_from(&raw).unwrap();
        assert_eq!(cfg.agents, 10);
        assert_eq!(cfg.hunger, 0);
        assert_eq!(cfg.think, Duration::from_millis(3));
        assert_eq!(cfg.eat, Duration::from_millis(7));
        assert_eq!(cfg.jitter, Duration::from_millis(1));
        assert_eq!(cfg.strategy, StrategyKind::MessagePassing);
        assert_eq!(cfg.arbiter_priority, ArbiterPriority::Greedy);
    }

    #[test]
    fn raw_negative_values_rejected() {
        let base = RawDinnerConfig::default();
        let cases = [
            RawDinnerConfig { agents: -5, ..base.clone() },
            RawDinnerConfig { hunger: -1, ..base.clone() },
            RawDinnerConfig { think_ms: -1, ..base.clone() },
            RawDinnerConfig { eat_ms: -10, ..base.clone() },
            RawDinnerConfig { jitter_ms: -2, ..base.clone() },
            RawDinnerConfig { admission_limit: Some(-1), ..base.clone() },
        ];
        for raw in cases {
            assert!(
                matches!(DinnerConfig::try_from(&raw), Err(DpError::Config(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn raw_single_agent_rejected() {
        let raw = RawDinnerConfig { agents: 1, ..RawDinnerConfig::default() };
        assert!(DinnerConfig::try_from(&raw).is_err());
    }

    #[test]
    fn raw_unknown_strategy_rejected() {
        let raw = RawDinnerConfig { strategy: "bakery".into(), ..RawDinnerConfig::default() };
        assert_eq!(
            DinnerConfig::try_from(&raw),
            Err(DpError::UnknownStrategy("bakery".into()))
        );
    }
}

#[cfg(test)]
mod rng {
    use std::time::Duration;

    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_same_seed() {
        let max = Duration::from_millis(5);
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            assert_eq!(r1.jitter(max), r2.jitter(max));
        }
    }

    #[test]
    fn different_agents_differ() {
        let max = Duration::from_secs(1);
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: Vec<Duration> = (0..8).map(|_| r0.jitter(max)).collect();
        let b: Vec<Duration> = (0..8).map(|_| r1.jitter(max)).collect();
        assert_ne!(a, b, "seeds for adjacent seats should diverge");
    }

    #[test]
    fn jitter_within_bounds() {
        let mut rng = AgentRng::new(0, AgentId(3));
        let max = Duration::from_micros(250);
        for _ in 0..1000 {
            assert!(rng.jitter(max) <= max);
        }
        assert_eq!(rng.jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn jittered_adds_to_base() {
        let mut rng = AgentRng::new(0, AgentId(0));
        let base = Duration::from_millis(2);
        let d = rng.jittered(base, Duration::from_millis(1));
        assert!(d >= base && d <= Duration::from_millis(3));
    }
}
