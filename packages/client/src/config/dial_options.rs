//! Per-dial time budget and socket options

use std::time::{Duration, Instant};

use crate::error::{self, Result};

/// Bound applied to connect, request write and response read when the caller
/// supplies no deadline of its own.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Options consulted by every blocking step of a dial.
#[derive(Debug, Clone, Copy)]
pub struct DialOptions {
    /// Bound on a whole dial when no deadline is set
    pub timeout: Duration,
    /// Absolute caller deadline. Takes precedence over `timeout`.
    pub deadline: Option<Instant>,
    /// Set `TCP_NODELAY` on dialed sockets
    pub nodelay: bool,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DIAL_TIMEOUT,
            deadline: None,
            nodelay: true,
        }
    }
}

impl DialOptions {
    /// Set the dial timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound the whole dial by an absolute deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Enable or disable `TCP_NODELAY`
    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Pin the timeout to an absolute deadline counted from now.
    ///
    /// Called once at the start of a dial so that every later step draws
    /// from the same budget. A caller deadline is left untouched.
    #[must_use]
    pub fn started(&self) -> Self {
        match self.deadline {
            Some(_) => *self,
            None => self.with_deadline(Instant::now() + self.timeout),
        }
    }

    /// Time available for the next blocking step.
    ///
    /// Returns a timeout error once the deadline has passed; a zero budget
    /// would make the socket calls block forever.
    pub fn budget(&self) -> Result<Duration> {
        let budget = match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.timeout,
        };
        if budget.is_zero() {
            return Err(error::timeout());
        }
        Ok(budget)
    }
}
