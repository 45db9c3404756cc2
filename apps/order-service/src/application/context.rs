//! Request Context
//!
//! Per-request execution context: correlation id, the identity the transport
//! authenticated (if any), an optional deadline and a cancellation token.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::domain::shared::{TraceId, UserId};

/// Execution context handed to every orchestrator operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: TraceId,
    authenticated_user: Option<UserId>,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Create a context with the given trace id and no identity, deadline or
    /// parent cancellation.
    #[must_use]
    pub fn new(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            authenticated_user: None,
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Context with a freshly generated trace id.
    #[must_use]
    pub fn background() -> Self {
        Self::new(TraceId::generate())
    }

    /// Attach the identity established by the transport.
    #[must_use]
    pub fn with_authenticated_user(mut self, user_id: UserId) -> Self {
        self.authenticated_user = Some(user_id);
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Use a caller-owned cancellation token (e.g. a child of the server's
    /// shutdown token).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Correlation id.
    #[must_use]
    pub const fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Identity authenticated by the transport, if any.
    #[must_use]
    pub const fn authenticated_user(&self) -> Option<&UserId> {
        self.authenticated_user.as_ref()
    }

    /// Absolute deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// True once the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// True once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline. `None` when there is no deadline;
    /// `Some(Duration::ZERO)` once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns true if the authenticated identity is present and differs
    /// from `user_id`.
    #[must_use]
    pub fn identity_mismatch(&self, user_id: &UserId) -> bool {
        self.authenticated_user
            .as_ref()
            .is_some_and(|auth| auth != user_id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
