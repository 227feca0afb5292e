//! Parse strategies
//!
//! A strategy decides how many times a parse is attempted and under which
//! limits. The attempt itself is a callback that resets the run's state and
//! observer before matching, so a retried attempt never sees anything the
//! previous one recorded.

use super::error::EngineFault;
use super::matcher::{MatchLimits, MatchOutcome};
use serde::{Deserialize, Serialize};

/// One parse attempt under the given limits
pub type Attempt<'a> = dyn FnMut(MatchLimits) -> Result<MatchOutcome, EngineFault> + 'a;

/// How a parse is attempted
pub trait ParseStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run `attempt` one or more times
    fn execute(
        &self,
        limits: MatchLimits,
        attempt: &mut Attempt<'_>,
    ) -> Result<MatchOutcome, EngineFault>;
}

/// A single attempt with the configured limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl ParseStrategy for Direct {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn execute(
        &self,
        limits: MatchLimits,
        attempt: &mut Attempt<'_>,
    ) -> Result<MatchOutcome, EngineFault> {
        attempt(limits)
    }
}

/// A fast attempt with a step budget, then an exhaustive one if the budget
/// ran out
///
/// A syntax error found within the budget is final; only cancellation
/// triggers the retry.
#[derive(Debug, Clone, Copy)]
pub struct TwoPhase {
    /// Step budget of the first attempt
    pub optimistic_steps: u64,
}

impl ParseStrategy for TwoPhase {
    fn name(&self) -> &'static str {
        "two-phase"
    }

    fn execute(
        &self,
        limits: MatchLimits,
        attempt: &mut Attempt<'_>,
    ) -> Result<MatchOutcome, EngineFault> {
        match attempt(limits.with_max_steps(self.optimistic_steps)) {
            Err(EngineFault::Cancelled { steps }) => {
                log::debug!(
                    "optimistic attempt cancelled after {} steps, retrying exhaustively",
                    steps
                );
                attempt(limits.with_max_steps(0))
            }
            other => other,
        }
    }
}

/// Serializable strategy choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StrategyConfig {
    /// See [`Direct`]
    #[default]
    Direct,
    /// See [`TwoPhase`]
    TwoPhase {
        /// Step budget of the first attempt
        optimistic_steps: u64,
    },
}

impl StrategyConfig {
    /// Build the strategy object
    pub fn build(&self) -> Box<dyn ParseStrategy> {
        match *self {
            StrategyConfig::Direct => Box::new(Direct),
            StrategyConfig::TwoPhase { optimistic_steps } => {
                Box::new(TwoPhase { optimistic_steps })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cursor::Position;

    fn outcome() -> MatchOutcome {
        MatchOutcome {
            matched: true,
            consumed_all: true,
            end: Position::start(),
            farthest: None,
            steps: 1,
        }
    }

    #[test]
    fn test_direct_runs_once() {
        let mut calls = Vec::new();
        let result = Direct.execute(MatchLimits::default(), &mut |limits| {
            calls.push(limits.max_steps);
            Ok(outcome())
        });
        assert!(result.is_ok());
        assert_eq!(calls, vec![0]);
    }

    #[test]
    fn test_two_phase_retries_after_cancellation() {
        let mut calls = Vec::new();
        let strategy = TwoPhase {
            optimistic_steps: 10,
        };
        let result = strategy.execute(MatchLimits::default(), &mut |limits| {
            calls.push(limits.max_steps);
            if limits.max_steps > 0 {
                Err(EngineFault::Cancelled { steps: 11 })
            } else {
                Ok(outcome())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, vec![10, 0]);
    }

    #[test]
    fn test_two_phase_keeps_other_faults() {
        let mut calls = 0;
        let strategy = TwoPhase {
            optimistic_steps: 10,
        };
        let result = strategy.execute(MatchLimits::default(), &mut |_| {
            calls += 1;
            Err(EngineFault::UnbalancedCheckpoints { open: 1 })
        });
        assert!(matches!(result, Err(EngineFault::UnbalancedCheckpoints { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{"kind":"two-phase","optimistic_steps":500}"#).unwrap();
        assert_eq!(
            config,
            StrategyConfig::TwoPhase {
                optimistic_steps: 500
            }
        );
        assert_eq!(config.build().name(), "two-phase");
    }
}
