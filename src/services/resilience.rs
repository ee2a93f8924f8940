//! Timeout, retry and circuit breaking for directory calls.
//!
//! Circuit breaker state transitions:
//! - Closed → Open: when error rate exceeds threshold or consecutive failures reach limit
//! - Open → HalfOpen: after the open duration elapses
//! - HalfOpen admits at most `half_open_max_calls` trial calls at a time
//! - HalfOpen → Closed: when success count reaches threshold
//! - HalfOpen → Open: on any failure

use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use crate::models::CircuitHealth;
use crate::services::directory::DirectoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Circuit is open, requests fail fast
    Open,
    /// Testing if the upstream recovered
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failure count to trigger circuit open
    pub failure_threshold: u32,
    /// Success count in HalfOpen to close circuit
    pub success_threshold: u32,
    /// Duration to wait before transitioning from Open to HalfOpen
    pub open_duration: Duration,
    /// Error rate threshold (0.0 - 1.0) to trigger circuit open
    pub error_rate_threshold: f64,
    /// Sliding window size for error rate calculation
    pub window_size: usize,
    /// Calls the window must hold before the error rate is considered
    pub minimum_calls: usize,
    /// Concurrent trial calls admitted while HalfOpen
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_duration: Duration::from_secs(30),
            error_rate_threshold: 0.5,
            window_size: 20,
            minimum_calls: 10,
            half_open_max_calls: 1,
        }
    }
}

#[derive(Clone)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: Arc<Mutex<BreakerState>>,
}

struct BreakerState {
    current: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
    /// When the latest trial call was admitted
    trial_started: Option<Instant>,
    /// Sliding window: true = success, false = failure
    window: VecDeque<bool>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(BreakerState {
                current: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
                half_open_in_flight: 0,
                trial_started: None,
                window: VecDeque::with_capacity(config.window_size),
            })),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a call may proceed; moves Open → HalfOpen once the open period is over
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();

        match state.current {
            CircuitState::Closed => true,
            CircuitState::Open => match state.opened_at {
                Some(opened_at) if opened_at.elapsed() >= self.config.open_duration => {
                    info!("Circuit breaker {}: Open → HalfOpen", self.name);
                    state.current = CircuitState::HalfOpen;
                    state.consecutive_successes = 0;
                    state.consecutive_failures = 0;
                    state.half_open_in_flight = 0;
                    self.admit_trial(&mut state)
                }
                _ => false,
            },
            CircuitState::HalfOpen => {
                // A trial call whose caller went away never reports back
                let stale = state
                    .trial_started
                    .is_some_and(|started| started.elapsed() >= self.config.open_duration);
                if stale {
                    state.half_open_in_flight = 0;
                }
                self.admit_trial(&mut state)
            }
        }
    }

    fn admit_trial(&self, state: &mut BreakerState) -> bool {
        if state.half_open_in_flight >= self.config.half_open_max_calls.max(1) {
            return false;
        }
        state.half_open_in_flight += 1;
        state.trial_started = Some(Instant::now());
        true
    }

    fn release_trial(state: &mut BreakerState) {
        state.half_open_in_flight = state.half_open_in_flight.saturating_sub(1);
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();

        state.consecutive_successes += 1;
        state.consecutive_failures = 0;
        self.push_outcome(&mut state, true);

        if state.current != CircuitState::HalfOpen {
            return;
        }
        Self::release_trial(&mut state);

        if state.consecutive_successes >= self.config.success_threshold {
            info!("Circuit breaker {}: HalfOpen → Closed", self.name);
            state.current = CircuitState::Closed;
            state.opened_at = None;
            state.half_open_in_flight = 0;
            state.trial_started = None;
            state.window.clear();
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();

        state.consecutive_failures += 1;
        state.consecutive_successes = 0;
        self.push_outcome(&mut state, false);

        match state.current {
            CircuitState::Closed => {
                let error_rate = Self::error_rate_of(&state);
                let rate_tripped = state.window.len() >= self.config.minimum_calls
                    && error_rate >= self.config.error_rate_threshold;

                if state.consecutive_failures >= self.config.failure_threshold || rate_tripped {
                    warn!(
                        "Circuit breaker {}: Closed → Open (failures: {}, error_rate: {:.2}%)",
                        self.name,
                        state.consecutive_failures,
                        error_rate * 100.0
                    );
                    state.current = CircuitState::Open;
                    state.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker {}: HalfOpen → Open (trial call failed)", self.name);
                state.current = CircuitState::Open;
                state.opened_at = Some(Instant::now());
                state.half_open_in_flight = 0;
                state.trial_started = None;
            }
            CircuitState::Open => {}
        }
    }

    fn push_outcome(&self, state: &mut BreakerState, success: bool) {
        if state.window.len() >= self.config.window_size {
            state.window.pop_front();
        }
        state.window.push_back(success);
    }

    fn error_rate_of(state: &BreakerState) -> f64 {
        if state.window.is_empty() {
            return 0.0;
        }
        let failures = state.window.iter().filter(|&&ok| !ok).count();
        failures as f64 / state.window.len() as f64
    }

    /// Current circuit state (for monitoring)
    pub fn state(&self) -> CircuitState {
        self.state.lock().current
    }

    /// Current error rate over the sliding window
    pub fn error_rate(&self) -> f64 {
        Self::error_rate_of(&self.state.lock())
    }

    pub fn health(&self) -> CircuitHealth {
        let state = self.state.lock();
        CircuitHealth {
            name: self.name.clone(),
            state: state.current.as_str().to_string(),
            error_rate: Self::error_rate_of(&state),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff (±30%)
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Run `f` until it succeeds, fails with a non-retryable error, or retries run out.
///
/// Returns the last error on failure.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    is_retryable: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut backoff = config.initial_backoff;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries || !is_retryable(&e) {
                    return Err(e);
                }

                let delay = jittered(backoff, config.jitter);
                warn!(
                    "Retry attempt {}/{} after error: {}, waiting {:?}",
                    attempt, config.max_retries, e, delay
                );
                tokio::time::sleep(delay).await;

                backoff = Duration::from_millis(
                    ((backoff.as_millis() as f64 * config.backoff_multiplier)
                        .min(config.max_backoff.as_millis() as f64)) as u64,
                );
            }
        }
    }
}

fn jittered(base: Duration, jitter: bool) -> Duration {
    if !jitter {
        return base;
    }
    let factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
    Duration::from_millis((base.as_millis() as f64 * factor) as u64)
}

/// Settings for one [`ResilienceGuard`]
#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

/// Timeout per attempt, retry on transient errors, all behind a circuit breaker
#[derive(Clone)]
pub struct ResilienceGuard {
    timeout: Duration,
    retry: RetryConfig,
    breaker: CircuitBreaker,
}

impl ResilienceGuard {
    pub fn new(name: impl Into<String>, config: ResilienceConfig) -> Self {
        let timeout = if config.timeout.is_zero() {
            Duration::from_secs(2)
        } else {
            config.timeout
        };

        Self {
            timeout,
            retry: config.retry,
            breaker: CircuitBreaker::new(name, config.circuit_breaker),
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Execute a directory call under the guard
    pub async fn call<F, Fut, T>(&self, mut f: F) -> Result<T, DirectoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        if !self.breaker.try_acquire() {
            return Err(DirectoryError::CircuitOpen(self.breaker.name.clone()));
        }

        let timeout = self.timeout;
        let result = with_retry(&self.retry, DirectoryError::is_transient, || {
            let call = f();
            async move {
                tokio::time::timeout(timeout, call)
                    .await
                    .unwrap_or(Err(DirectoryError::Timeout(timeout)))
            }
        })
        .await;

        // A definite answer such as not-found still means the source is up
        match &result {
            Err(e) if e.is_transient() => self.breaker.record_failure(),
            _ => self.breaker.record_success(),
        }

        result
    }
}
