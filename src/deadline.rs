// src/deadline.rs

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::service::ServiceError;

/// Time budget for one backend dispatch.
///
/// Opened right before the call, so decoding time does not eat into it. The
/// value is `Copy`: backends receive it too and may bound their own I/O with
/// [`Deadline::remaining`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    budget: Duration,
    expires_at: Instant,
}

/// Stand-in expiry for budgets too large to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

impl Deadline {
    /// Never fails: a budget past what the clock can represent is capped
    /// to a far-future expiry.
    pub fn after(budget: Duration) -> Self {
        let opened_at = Instant::now();
        let expires_at = opened_at
            .checked_add(budget)
            .or_else(|| opened_at.checked_add(FAR_FUTURE))
            .unwrap_or(opened_at);
        Self { budget, expires_at }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Drives `call` until it finishes or the deadline passes.
    ///
    /// On expiry the call future is dropped, which cancels it; the timer is
    /// dropped with the returned future on every exit path, including when
    /// the caller itself is dropped mid-flight.
    pub async fn run<T, F>(self, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        match timeout_at(self.expires_at, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ServiceError::DeadlineExceeded(self.budget())),
        }
    }
}
