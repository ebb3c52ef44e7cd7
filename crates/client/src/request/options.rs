// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call options for the request client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::backoff::BackoffPolicy;
use super::error::RequestError;

/// Decides whether a failed attempt should be retried.
pub type RetryPredicate = Arc<dyn Fn(&RequestError) -> bool + Send + Sync>;

/// Invoked before each retry wait with the 1-based retry number.
pub type RetryCallback = Arc<dyn Fn(u32, &RequestError) + Send + Sync>;

/// Default retry budget.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// TTL used by [`RequestOptions::cached`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Options recognized by [`execute_with`](super::ResilientRequestClient::execute_with).
#[derive(Clone)]
pub struct RequestOptions {
    /// Maximum number of retries after the first attempt.
    pub retry_count: u32,
    /// Delay schedule between retries.
    pub backoff: BackoffPolicy,
    /// Overrides the default transient-error check.
    pub should_retry: Option<RetryPredicate>,
    pub on_retry: Option<RetryCallback>,
    /// Serve successful GET results from the response cache for this long.
    pub cache_ttl: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            retry_count: DEFAULT_RETRY_COUNT,
            backoff: BackoffPolicy::default(),
            should_retry: None,
            on_retry: None,
            cache_ttl: None,
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("retry_count", &self.retry_count)
            .field("backoff", &self.backoff)
            .field("should_retry", &self.should_retry.as_ref().map(|_| "<fn>"))
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<fn>"))
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl RequestOptions {
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Sets the base backoff delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.backoff.base = delay;
        self
    }

    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn should_retry<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RequestError) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Arc::new(predicate));
        self
    }

    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(u32, &RequestError) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Enables caching with [`DEFAULT_CACHE_TTL`].
    pub fn cached(self) -> Self {
        self.cache_ttl(DEFAULT_CACHE_TTL)
    }

    /// Applies the custom predicate, or [`RequestError::is_transient`].
    pub fn permits_retry(&self, error: &RequestError) -> bool {
        match &self.should_retry {
            Some(predicate) => predicate(error),
            None => error.is_transient(),
        }
    }
}
