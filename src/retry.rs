use crate::error::ApiError;
use crate::limits;

// Every failure is eligible; no backoff; the last attempt's error is
// surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_times: usize,
}

impl RetryPolicy {
    pub const fn standard() -> Self {
        Self {
            retry_times: limits::RETRY_TIMES,
        }
    }

    pub const fn disabled() -> Self {
        Self { retry_times: 0 }
    }

    pub const fn retry_times(mut self, retry_times: usize) -> Self {
        self.retry_times = retry_times;
        self
    }

    // Total attempts: the initial request plus every retry.
    pub const fn max_attempts(&self) -> usize {
        self.retry_times.saturating_add(1)
    }

    pub(crate) fn should_retry(&self, attempt: usize, _error: &ApiError) -> bool {
        attempt < self.max_attempts()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
