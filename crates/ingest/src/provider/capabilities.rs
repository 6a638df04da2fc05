//! Rate limiting configuration for vendor adapters.

use std::time::Duration;

/// Throttle applied by the batch orchestrator: after every `every` completed
/// entities, sleep for `pause` before starting the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Number of entities per throttle group. `0` disables throttling.
    pub every: usize,

    /// Pause inserted between groups.
    pub pause: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            every: 5,
            pause: Duration::from_secs(15),
        }
    }
}

impl RateLimit {
    pub const fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }

    /// No throttling at all.
    pub const fn unlimited() -> Self {
        Self {
            every: 0,
            pause: Duration::ZERO,
        }
    }

    /// Replace the pause when an override is configured.
    pub fn with_pause_override(self, pause: Option<Duration>) -> Self {
        match pause {
            Some(pause) => Self { pause, ..self },
            None => self,
        }
    }

    /// Whether to pause once `completed` entities are done.
    ///
    /// Every full group triggers a pause, the final one included, so a batch
    /// of N entities pauses `N / every` times.
    pub fn should_pause_after(&self, completed: usize) -> bool {
        self.every > 0 && completed > 0 && completed % self.every == 0
    }
}
