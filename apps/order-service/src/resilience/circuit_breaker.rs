//! Circuit breaker for the market oracle and other remote collaborators.
//!
//! # State Machine
//!
//! ```text
//! CLOSED → OPEN (failure rate >= threshold over the sliding window)
//! OPEN → HALF_OPEN (wait duration elapsed)
//! HALF_OPEN → CLOSED (all trial calls succeed)
//! HALF_OPEN → OPEN (any trial call fails)
//! ```
//!
//! # Configuration
//!
//! - `failure_rate_threshold`: Open at this failure rate (default: 50%)
//! - `sliding_window_size`: Number of calls to track (default: 20)
//! - `minimum_calls`: Minimum calls before evaluating (default: 5)
//! - `wait_duration_in_open`: Time to stay open (default: 10s)
//! - `permitted_calls_in_half_open`: Trial calls allowed (default: 3)
//!
//! # Example
//!
//! ```rust,ignore
//! use order_service::resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let breaker = CircuitBreaker::new("market-oracle", CircuitBreakerConfig::default());
//!
//! if let Some(permit) = breaker.try_acquire() {
//!     match oracle_call().await {
//!         Ok(_) => permit.success(),
//!         Err(_) => permit.failure(),
//!     }
//! } else {
//!     // fail fast
//! }
//! ```
//!
//! A permit dropped without an outcome (the caller's future was dropped or
//! the call was cancelled) hands its `HALF_OPEN` trial slot back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::observability::{self, circuit_breaker_state};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitBreakerState {
    /// Circuit is closed, calls flow normally.
    Closed,
    /// Circuit is open, calls are rejected.
    Open,
    /// Circuit is testing with limited calls.
    HalfOpen,
}

impl CircuitBreakerState {
    const fn gauge_value(self) -> f64 {
        match self {
            Self::Closed => circuit_breaker_state::CLOSED,
            Self::Open => circuit_breaker_state::OPEN,
            Self::HalfOpen => circuit_breaker_state::HALF_OPEN,
        }
    }
}

impl std::fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure rate threshold to open circuit (0.0-1.0).
    pub failure_rate_threshold: f64,
    /// Number of calls in the sliding window.
    pub sliding_window_size: u32,
    /// Minimum calls before evaluating failure rate.
    pub minimum_calls: u32,
    /// Duration to stay in `OPEN` state.
    pub wait_duration_in_open: Duration,
    /// Permitted trial calls in `HALF_OPEN` state.
    pub permitted_calls_in_half_open: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            sliding_window_size: 20,
            minimum_calls: 5,
            wait_duration_in_open: Duration::from_secs(10),
            permitted_calls_in_half_open: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallOutcome {
    Success,
    Failure,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitBreakerState,
    window: VecDeque<CallOutcome>,
    opened_at: Option<Instant>,
    /// Trial calls handed out since entering `HALF_OPEN`.
    half_open_permits: u32,
    half_open_successes: u32,
    /// Bumped on every transition so permits from an earlier state are ignored.
    generation: u64,
}

impl BreakerInner {
    fn failure_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let failures = self
            .window
            .iter()
            .filter(|o| **o == CallOutcome::Failure)
            .count();
        // Window is small; precision loss is irrelevant.
        #[allow(clippy::cast_precision_loss)]
        let rate = failures as f64 / self.window.len() as f64;
        rate
    }
}

/// Circuit breaker for remote calls.
///
/// All state changes happen under one mutex, so a transition and the
/// counters it resets are always observed together.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
    total_rejected: AtomicU64,
    state_transitions: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitBreakerState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                half_open_permits: 0,
                half_open_successes: 0,
                generation: 0,
            }),
            total_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
            state_transitions: AtomicU64::new(0),
        }
    }

    /// Get the breaker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> CircuitBreakerState {
        let mut inner = self.lock();
        self.check_open_elapsed(&mut inner);
        inner.state
    }

    /// Ask to make a call. Returns `None` when the call must be rejected.
    ///
    /// In `HALF_OPEN` each permit consumes one trial slot, so at most
    /// `permitted_calls_in_half_open` calls are in flight while testing.
    /// The slot is returned when the permit is dropped without an outcome.
    #[must_use]
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.lock();
        self.check_open_elapsed(&mut inner);
        let generation = inner.generation;

        let permitted = match inner.state {
            CircuitBreakerState::Closed => true,
            CircuitBreakerState::Open => false,
            CircuitBreakerState::HalfOpen => {
                if inner.half_open_permits < self.config.permitted_calls_in_half_open {
                    inner.half_open_permits += 1;
                    true
                } else {
                    false
                }
            }
        };
        drop(inner);

        if !permitted {
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
            observability::record_circuit_breaker_rejected(&self.name);
            return None;
        }
        Some(CallPermit {
            breaker: self,
            generation,
            settled: false,
        })
    }

    /// Hand back a trial slot taken in `generation` without recording an outcome.
    fn release(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.state == CircuitBreakerState::HalfOpen
            && inner.generation == generation
            && inner.half_open_permits > 0
        {
            inner.half_open_permits -= 1;
            tracing::debug!(
                name = %self.name,
                in_flight = inner.half_open_permits,
                "Trial permit released without outcome"
            );
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.record_outcome(CallOutcome::Success);
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.record_outcome(CallOutcome::Failure);
    }

    fn record_outcome(&self, outcome: CallOutcome) {
        let mut inner = self.lock();

        match inner.state {
            CircuitBreakerState::Closed => {
                inner.window.push_back(outcome);
                while inner.window.len() > self.config.sliding_window_size as usize {
                    inner.window.pop_front();
                }

                if inner.window.len() >= self.config.minimum_calls as usize
                    && inner.failure_rate() >= self.config.failure_rate_threshold
                {
                    self.transition(&mut inner, CircuitBreakerState::Open);
                }
            }
            CircuitBreakerState::HalfOpen => {
                if outcome == CallOutcome::Failure {
                    self.transition(&mut inner, CircuitBreakerState::Open);
                } else {
                    inner.half_open_successes += 1;
                    if inner.half_open_successes >= self.config.permitted_calls_in_half_open {
                        self.transition(&mut inner, CircuitBreakerState::Closed);
                    }
                }
            }
            CircuitBreakerState::Open => {
                // A call admitted before the circuit opened finished late.
                tracing::debug!(
                    name = %self.name,
                    ?outcome,
                    "Call outcome recorded while circuit is OPEN"
                );
            }
        }
    }

    fn check_open_elapsed(&self, inner: &mut BreakerInner) {
        if inner.state == CircuitBreakerState::Open
            && inner
                .opened_at
                .is_some_and(|opened| opened.elapsed() >= self.config.wait_duration_in_open)
        {
            self.transition(inner, CircuitBreakerState::HalfOpen);
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitBreakerState) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;
        inner.generation = inner.generation.wrapping_add(1);

        match to {
            CircuitBreakerState::Open => {
                inner.opened_at = Some(Instant::now());
                tracing::warn!(
                    name = %self.name,
                    from = %from,
                    to = %to,
                    failure_rate = inner.failure_rate(),
                    "Circuit breaker opened"
                );
            }
            CircuitBreakerState::HalfOpen => {
                inner.half_open_permits = 0;
                inner.half_open_successes = 0;
                tracing::info!(
                    name = %self.name,
                    from = %from,
                    to = %to,
                    "Circuit breaker testing"
                );
            }
            CircuitBreakerState::Closed => {
                inner.window.clear();
                inner.opened_at = None;
                tracing::info!(
                    name = %self.name,
                    from = %from,
                    to = %to,
                    "Circuit breaker closed"
                );
            }
        }

        self.state_transitions.fetch_add(1, Ordering::Relaxed);
        observability::record_circuit_breaker_state(&self.name, to.gauge_value());
    }

    /// Get metrics for this circuit breaker.
    #[must_use]
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let mut inner = self.lock();
        self.check_open_elapsed(&mut inner);
        let state = inner.state;
        let failure_rate = inner.failure_rate();
        drop(inner);

        CircuitBreakerMetrics {
            name: self.name.clone(),
            state,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            state_transitions: self.state_transitions.load(Ordering::Relaxed),
            failure_rate,
        }
    }

    /// Force the circuit breaker open.
    pub fn force_open(&self) {
        let mut inner = self.lock();
        self.transition(&mut inner, CircuitBreakerState::Open);
    }

    /// Force the circuit breaker closed.
    pub fn force_close(&self) {
        let mut inner = self.lock();
        self.transition(&mut inner, CircuitBreakerState::Closed);
    }
}

/// Admission to make one call through a [`CircuitBreaker`].
///
/// Settle it with [`success`](Self::success) or [`failure`](Self::failure).
/// Dropping it unsettled releases the trial slot it holds, if any.
#[derive(Debug)]
#[must_use = "an unsettled permit records no outcome"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl CallPermit<'_> {
    /// Record the call as successful.
    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    /// Record the call as failed.
    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release(self.generation);
        }
    }
}

/// Snapshot of a circuit breaker's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Breaker name.
    pub name: String,
    /// Current state.
    pub state: CircuitBreakerState,
    /// Total recorded calls.
    pub total_calls: u64,
    /// Total recorded failures.
    pub total_failures: u64,
    /// Calls rejected without being attempted.
    pub total_rejected: u64,
    /// Number of state transitions.
    pub state_transitions: u64,
    /// Current failure rate over the window (0.0-1.0).
    pub failure_rate: f64,
}
