//! Time-window `state` tokens.
//!
//! A token is the server's elapsed time in nanoseconds at minting, rendered
//! as a decimal string. Nothing is stored server side, so a token is accepted
//! any number of times while it is inside [`STATE_TTL`].

use std::{fmt, sync::Arc, time::Duration};

use {repolink_config::StatePolicy, tracing::debug};

use crate::clock::{Clock, saturating_nanos};

/// Maximum age of a `state` token.
pub const STATE_TTL: Duration = Duration::from_secs(120);

/// A freshly minted `state` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    pub fn at(elapsed: Duration) -> Self {
        Self(saturating_nanos(elapsed).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Elapsed time encoded in a raw token.
    pub fn decode(raw: &str) -> Option<Duration> {
        raw.trim().parse::<u64>().ok().map(Duration::from_nanos)
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of inspecting a raw `state` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    Fresh,
    /// Older than the allowed window.
    Expired { age: Duration },
    /// Claims a time after now.
    Future { ahead: Duration },
    /// Not a decimal nanosecond count.
    Malformed,
}

impl StateCheck {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Expired { .. } | Self::Future { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("state token is stale")]
    Stale,
    #[error("state token is malformed")]
    Malformed,
}

/// Mints and checks `state` tokens against a shared clock.
#[derive(Clone)]
pub struct StateValidator {
    clock: Arc<dyn Clock>,
    policy: StatePolicy,
    ttl: Duration,
}

impl StateValidator {
    pub fn new(clock: Arc<dyn Clock>, policy: StatePolicy) -> Self {
        Self {
            clock,
            policy,
            ttl: STATE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn mint(&self) -> StateToken {
        StateToken::at(self.clock.elapsed())
    }

    pub fn check(&self, raw: &str) -> StateCheck {
        let Some(minted) = StateToken::decode(raw) else {
            return StateCheck::Malformed;
        };
        let now = self.clock.elapsed();
        match now.checked_sub(minted) {
            None => StateCheck::Future {
                ahead: minted - now,
            },
            Some(age) if age > self.ttl => StateCheck::Expired { age },
            Some(_) => StateCheck::Fresh,
        }
    }

    /// True when the token is expired or from the future. Malformed tokens
    /// are never reported stale here; see [`StateValidator::validate`].
    pub fn is_stale(&self, raw: &str) -> bool {
        self.check(raw).is_stale()
    }

    /// Apply the configured policy to a raw token.
    pub fn validate(&self, raw: &str) -> Result<(), StateError> {
        match self.check(raw) {
            StateCheck::Fresh => Ok(()),
            StateCheck::Expired { age } => {
                debug!(age_ms = age.as_millis() as u64, "state token expired");
                Err(StateError::Stale)
            },
            StateCheck::Future { ahead } => {
                debug!(ahead_ms = ahead.as_millis() as u64, "state token from the future");
                Err(StateError::Stale)
            },
            StateCheck::Malformed => match self.policy {
                StatePolicy::Strict => Err(StateError::Malformed),
                StatePolicy::Permissive => {
                    debug!("accepting malformed state token under permissive policy");
                    Ok(())
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::clock::ManualClock};

    fn validator(policy: StatePolicy) -> (Arc<ManualClock>, StateValidator) {
        let clock = Arc::new(ManualClock::default());
        let validator = StateValidator::new(clock.clone(), policy);
        (clock, validator)
    }

    #[test]
    fn test_token_round_trips_elapsed() {
        let token = StateToken::at(Duration::from_millis(1234));
        assert_eq!(token.as_str(), "1234000000");
        assert_eq!(
            StateToken::decode(token.as_str()),
            Some(Duration::from_millis(1234))
        );
    }

    #[test]
    fn test_fresh_within_window() {
        let (clock, validator) = validator(StatePolicy::Strict);
        clock.set(Duration::from_secs(10));
        let token = validator.mint();

        for delta in [0, 1, 60, 119, 120] {
            clock.set(Duration::from_secs(10 + delta));
            assert_eq!(validator.check(token.as_str()), StateCheck::Fresh, "Δ={delta}s");
            assert!(!validator.is_stale(token.as_str()));
        }
    }

    #[test]
    fn test_stale_after_window() {
        let (clock, validator) = validator(StatePolicy::Strict);
        let token = validator.mint();

        clock.set(STATE_TTL + Duration::from_nanos(1));
        assert!(validator.is_stale(token.as_str()));

        clock.set(Duration::from_secs(130));
        assert_eq!(
            validator.check(token.as_str()),
            StateCheck::Expired {
                age: Duration::from_secs(130)
            }
        );
        assert_eq!(validator.validate(token.as_str()), Err(StateError::Stale));
    }

    #[test]
    fn test_future_token_is_stale() {
        let (clock, validator) = validator(StatePolicy::Strict);
        clock.set(Duration::from_secs(50));
        let token = validator.mint();
        clock.set(Duration::from_secs(20));

        assert_eq!(
            validator.check(token.as_str()),
            StateCheck::Future {
                ahead: Duration::from_secs(30)
            }
        );
        assert_eq!(validator.validate(token.as_str()), Err(StateError::Stale));
    }

    #[test]
    fn test_malformed_strict_rejects() {
        let (_clock, validator) = validator(StatePolicy::Strict);
        for raw in ["", "abc", "-5", "1.5s", "12 34"] {
            assert_eq!(validator.check(raw), StateCheck::Malformed);
            assert!(!validator.is_stale(raw));
            assert_eq!(validator.validate(raw), Err(StateError::Malformed));
        }
    }

    #[test]
    fn test_malformed_permissive_accepts() {
        let (_clock, validator) = validator(StatePolicy::Permissive);
        assert_eq!(validator.validate("not-a-number"), Ok(()));
    }

    #[test]
    fn test_custom_ttl() {
        let (clock, validator) = validator(StatePolicy::Strict);
        let validator = validator.with_ttl(Duration::from_secs(5));
        let token = validator.mint();
        clock.set(Duration::from_secs(6));
        assert!(validator.is_stale(token.as_str()));
    }
}
