//! Consecutive-failure circuit breaker guarding the upstream LLM.
//!
//! Closed → (N exhausted calls in a row) → Open for `cooldown` → half-open:
//! exactly one call goes through as a trial while every other caller keeps
//! getting `CircuitOpen`. A failed trial reopens immediately, a success closes
//! the breaker. A trial that never reports back (its request was cancelled)
//! expires after another `cooldown`, and the next caller becomes the trial.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use super::LlmError;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
    trial_started: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Returns `CircuitOpen` while the cool-down is running or while a
    /// half-open trial call is still in flight.
    pub fn check(&self) -> Result<(), LlmError> {
        let mut state = self.lock();
        let now = Instant::now();

        if let Some(started) = state.trial_started {
            let expires = started + self.cooldown;
            if now < expires {
                return Err(circuit_open(expires - now));
            }
            warn!("LLM circuit trial call never reported back; admitting a new trial");
            state.trial_started = Some(now);
            return Ok(());
        }

        if let Some(until) = state.open_until {
            if now < until {
                return Err(circuit_open(until - now));
            }
            // Half-open: this caller is the single trial.
            state.open_until = None;
            state.trial_started = Some(now);
        }
        Ok(())
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        state.consecutive_failures = 0;
        state.open_until = None;
        state.trial_started = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.trial_started = None;
        if state.consecutive_failures >= self.failure_threshold {
            warn!(
                "LLM circuit opened after {} consecutive failures (cool-down {}s)",
                state.consecutive_failures,
                self.cooldown.as_secs()
            );
            state.open_until = Some(Instant::now() + self.cooldown);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // Plain fields; a panic mid-update cannot leave them inconsistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn circuit_open(remaining: Duration) -> LlmError {
    LlmError::CircuitOpen {
        retry_after_secs: remaining.as_secs_f64().ceil() as u64,
    }
}
