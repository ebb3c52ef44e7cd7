// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient request client.
//!
//! Every call is keyed by its [`DedupKey`]. The first caller for a key
//! starts a retry chain in the background; identical calls made while that
//! chain is running join it and receive a clone of its outcome, so a key
//! never has more than one [`RetryState`].
//!
//! While the client is offline, calls are parked in the [`OfflineQueue`]
//! and replayed in FIFO order when connectivity is restored. Replay pops
//! one entry at a time from the shared queue, so entries never leave it
//! until they are dispatched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tether_core::{ApiResponse, DedupKey, RequestDescriptor};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::backoff::{JitterSource, ThreadRngJitter};
use super::cache::ResponseCache;
use super::error::{RequestError, RequestResult};
use super::options::RequestOptions;
use super::queue::OfflineQueue;
use super::token::TokenStore;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::config::HttpConfig;
use crate::schedule::{Scheduler, TokioScheduler};

/// Retry progress of one in-flight call chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    /// Retries performed so far.
    pub attempts: u32,
    pub last_error: Option<RequestError>,
    pub descriptor: RequestDescriptor,
    pub first_failure_at: DateTime<Utc>,
}

impl RetryState {
    fn new(descriptor: RequestDescriptor) -> Self {
        RetryState {
            attempts: 0,
            last_error: None,
            descriptor,
            first_failure_at: Utc::now(),
        }
    }
}

type Waiter = oneshot::Sender<RequestResult<Value>>;

struct InFlight {
    retry: Option<RetryState>,
    waiters: Vec<Waiter>,
}

struct SharedState {
    online: bool,
    replaying: bool,
    in_flight: HashMap<DedupKey, InFlight>,
    offline: OfflineQueue,
    cache: ResponseCache,
}

/// Marks the replay finished if `connectivity_restored` is dropped
/// mid-replay. Unreplayed entries are still in the shared queue.
struct ReplayGuard<'a, T: HttpTransport> {
    inner: &'a Inner<T>,
    finished: bool,
}

impl<T: HttpTransport> Drop for ReplayGuard<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.lock().replaying = false;
        }
    }
}

struct Inner<T> {
    base_url: String,
    transport: T,
    scheduler: Arc<dyn Scheduler>,
    jitter: Arc<dyn JitterSource>,
    tokens: TokenStore,
    defaults: RequestOptions,
    state: Mutex<SharedState>,
}

/// Request client with retry, de-duplication, offline queueing and caching.
///
/// Cloning is cheap; clones share all state.
pub struct ResilientRequestClient<T: HttpTransport = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: HttpTransport> Clone for ResilientRequestClient<T> {
    fn clone(&self) -> Self {
        ResilientRequestClient {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`ResilientRequestClient`].
pub struct RequestClientBuilder<T> {
    base_url: String,
    transport: T,
    scheduler: Arc<dyn Scheduler>,
    jitter: Arc<dyn JitterSource>,
    tokens: TokenStore,
    defaults: RequestOptions,
}

impl<T: HttpTransport> RequestClientBuilder<T> {
    pub fn scheduler(mut self, scheduler: impl Scheduler) -> Self {
        self.scheduler = Arc::new(scheduler);
        self
    }

    pub fn jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Arc::new(jitter);
        self
    }

    /// Share a token slot with the host.
    pub fn tokens(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    /// Options used by [`ResilientRequestClient::execute`].
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.defaults = options;
        self
    }

    pub fn build(self) -> ResilientRequestClient<T> {
        ResilientRequestClient {
            inner: Arc::new(Inner {
                base_url: self.base_url,
                transport: self.transport,
                scheduler: self.scheduler,
                jitter: self.jitter,
                tokens: self.tokens,
                defaults: self.defaults,
                state: Mutex::new(SharedState {
                    online: true,
                    replaying: false,
                    in_flight: HashMap::new(),
                    offline: OfflineQueue::new(),
                    cache: ResponseCache::new(),
                }),
            }),
        }
    }
}

impl ResilientRequestClient<ReqwestTransport> {
    /// Create a client backed by reqwest from configuration.
    pub fn new(config: &HttpConfig) -> RequestResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::builder(&config.base_url, transport)
            .default_options(config.request_options())
            .build())
    }
}

impl<T: HttpTransport> ResilientRequestClient<T> {
    /// Start building a client for `base_url` over `transport`.
    pub fn builder(base_url: impl Into<String>, transport: T) -> RequestClientBuilder<T> {
        RequestClientBuilder {
            base_url: base_url.into(),
            transport,
            scheduler: Arc::new(TokioScheduler),
            jitter: Arc::new(ThreadRngJitter),
            tokens: TokenStore::new(),
            defaults: RequestOptions::default(),
        }
    }

    /// Create a client with default options over a custom transport.
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        Self::builder(base_url, transport).build()
    }

    /// Execute a call with the client's default options.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> RequestResult<Value> {
        let options = self.inner.defaults.clone();
        self.execute_with(descriptor, options).await
    }

    /// Execute a call with explicit options.
    ///
    /// If an identical call is already in flight, this joins it and
    /// `options` is ignored. While offline, the call waits in the offline
    /// queue and resolves only after it has been replayed.
    pub async fn execute_with(
        &self,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) -> RequestResult<Value> {
        self.inner.ensure_credentials(&descriptor)?;

        let pending = {
            let mut state = self.inner.lock();
            if state.online {
                let (waiter, pending) = oneshot::channel();
                self.inner
                    .dispatch(&mut state, descriptor, options, vec![waiter]);
                pending
            } else {
                debug!(
                    "offline, queueing {} {}",
                    descriptor.method, descriptor.target
                );
                state.offline.enqueue(descriptor, options)
            }
        };

        pending.await.unwrap_or(Err(RequestError::Abandoned))
    }

    /// Execute a call and decode the result into `R`.
    pub async fn execute_as<R: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) -> RequestResult<R> {
        let value = self.execute_with(descriptor, options).await?;
        serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))
    }

    /// Signal that connectivity was lost. Later calls go to the offline queue.
    pub fn connectivity_lost(&self) {
        let mut state = self.inner.lock();
        if state.online {
            info!("connectivity lost, queueing requests");
        }
        state.online = false;
    }

    /// Signal that connectivity returned and replay the offline queue.
    ///
    /// Entries are taken from the queue one at a time, oldest first, each
    /// through the normal retry path. Only one replay runs at a time: a
    /// restore signalled while a replay is running returns 0 and leaves the
    /// newly queued entries to that replay. If connectivity is lost again,
    /// the replay stops and the rest stays queued. Returns the number of
    /// entries this call replayed.
    pub async fn connectivity_restored(&self) -> usize {
        {
            let mut state = self.inner.lock();
            state.online = true;
            if state.replaying {
                debug!("replay already running");
                return 0;
            }
            if state.offline.is_empty() {
                return 0;
            }
            info!(
                "connectivity restored, replaying {} queued requests",
                state.offline.len()
            );
            state.replaying = true;
        }
        let mut guard = ReplayGuard {
            inner: &self.inner,
            finished: false,
        };

        let mut replayed = 0;
        loop {
            let done = {
                let mut state = self.inner.lock();
                let next = if state.online {
                    state.offline.pop_front()
                } else {
                    None
                };
                let Some(entry) = next else {
                    if !state.online && !state.offline.is_empty() {
                        info!(
                            "connectivity lost during replay, {} requests still queued",
                            state.offline.len()
                        );
                    }
                    state.replaying = false;
                    guard.finished = true;
                    break;
                };

                if let Err(e) = self.inner.ensure_credentials(&entry.descriptor) {
                    drop(state);
                    entry.resolve(Err(e));
                    replayed += 1;
                    continue;
                }

                let (descriptor, options, resolver) = entry.into_parts();
                let (waiter, done) = oneshot::channel();
                self.inner
                    .dispatch(&mut state, descriptor, options, vec![resolver, waiter]);
                done
            };

            let _ = done.await;
            replayed += 1;
        }
        replayed
    }

    pub fn is_online(&self) -> bool {
        self.inner.lock().online
    }

    /// Number of calls waiting in the offline queue.
    pub fn pending_offline(&self) -> usize {
        self.inner.lock().offline.len()
    }

    /// Descriptors waiting in the offline queue, oldest first.
    pub fn offline_descriptors(&self) -> Vec<RequestDescriptor> {
        self.inner.lock().offline.descriptors()
    }

    /// Number of distinct call chains currently running.
    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    /// Retry progress for the chain matching `descriptor`, if it has failed
    /// at least once and is still running.
    pub fn retry_state(&self, descriptor: &RequestDescriptor) -> Option<RetryState> {
        let key = descriptor.dedup_key();
        self.inner
            .lock()
            .in_flight
            .get(&key)
            .and_then(|entry| entry.retry.clone())
    }

    /// Forget the retry progress for `descriptor`. A running chain starts
    /// counting again from zero.
    pub fn reset_retry_state(&self, descriptor: &RequestDescriptor) -> bool {
        let key = descriptor.dedup_key();
        self.inner
            .lock()
            .in_flight
            .get_mut(&key)
            .and_then(|entry| entry.retry.take())
            .is_some()
    }

    pub fn clear_retry_states(&self) {
        for entry in self.inner.lock().in_flight.values_mut() {
            entry.retry = None;
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.tokens.set(token);
    }

    pub fn clear_token(&self) -> bool {
        self.inner.tokens.clear()
    }

    pub fn default_options(&self) -> &RequestOptions {
        &self.inner.defaults
    }

    /// Drop the cached response for `descriptor`.
    pub fn invalidate(&self, descriptor: &RequestDescriptor) -> bool {
        self.inner.lock().cache.remove(&descriptor.dedup_key())
    }

    pub fn clear_cache(&self) {
        self.inner.lock().cache.clear();
    }

    /// Drop expired cache entries, returning how many were removed.
    pub fn purge_cache(&self) -> usize {
        self.inner.lock().cache.purge_expired()
    }

    pub fn cached_responses(&self) -> usize {
        self.inner.lock().cache.len()
    }
}

impl<T: HttpTransport> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_credentials(&self, descriptor: &RequestDescriptor) -> RequestResult<()> {
        if descriptor.with_credentials && !self.tokens.is_set() {
            return Err(RequestError::NotAuthenticated);
        }
        Ok(())
    }

    /// Serve `waiters` from cache, add them to an in-flight chain, or start
    /// a new chain for them.
    fn dispatch(
        self: &Arc<Self>,
        state: &mut SharedState,
        descriptor: RequestDescriptor,
        options: RequestOptions,
        waiters: Vec<Waiter>,
    ) {
        let key = descriptor.dedup_key();

        if options.cache_ttl.is_some() && descriptor.is_cacheable() {
            if let Some(value) = state.cache.get(&key) {
                debug!("cache hit for {}", key);
                for waiter in waiters {
                    let _ = waiter.send(Ok(value.clone()));
                }
                return;
            }
        }

        if let Some(entry) = state.in_flight.get_mut(&key) {
            debug!("joining in-flight request {}", key);
            entry.waiters.extend(waiters);
            return;
        }

        state.in_flight.insert(
            key.clone(),
            InFlight {
                retry: None,
                waiters,
            },
        );
        let chain = Arc::clone(self).run_chain(key, descriptor, options);
        self.scheduler.spawn(Box::pin(chain));
    }

    /// Attempt, retry and finally notify everyone waiting on `key`.
    async fn run_chain(
        self: Arc<Self>,
        key: DedupKey,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) {
        let result = loop {
            let error = match self.attempt(&descriptor).await {
                Ok(value) => break Ok(value),
                Err(e) => e,
            };

            let next = self.record_failure(&key, &descriptor, &error, &options);
            let Some(attempt) = next else {
                break Err(error);
            };

            if let Some(on_retry) = &options.on_retry {
                on_retry(attempt, &error);
            }
            let delay = options
                .backoff
                .delay_for_attempt(attempt, self.jitter.as_ref());
            debug!(
                "retry {}/{} for {} in {:?}: {}",
                attempt, options.retry_count, key, delay, error
            );
            self.scheduler.sleep(delay).await;
        };

        let waiters = {
            let mut state = self.lock();
            if let (Ok(value), Some(ttl)) = (&result, options.cache_ttl) {
                if descriptor.is_cacheable() {
                    state.cache.insert(key.clone(), value.clone(), ttl);
                }
            }
            state
                .in_flight
                .remove(&key)
                .map(|entry| entry.waiters)
                .unwrap_or_default()
        };

        if let Err(e) = &result {
            warn!("{} {} failed: {}", descriptor.method, descriptor.target, e);
        }
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }

    /// Update the chain's retry state and return the next retry number, or
    /// `None` if the chain should stop with `error`.
    fn record_failure(
        &self,
        key: &DedupKey,
        descriptor: &RequestDescriptor,
        error: &RequestError,
        options: &RequestOptions,
    ) -> Option<u32> {
        let mut state = self.lock();
        let entry = state.in_flight.get_mut(key)?;
        let retry = entry
            .retry
            .get_or_insert_with(|| RetryState::new(descriptor.clone()));
        retry.last_error = Some(error.clone());

        if retry.attempts >= options.retry_count || !options.permits_retry(error) {
            return None;
        }
        retry.attempts += 1;
        Some(retry.attempts)
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> RequestResult<Value> {
        let request = self.build_request(descriptor)?;
        let response = self.transport.send(request).await?;
        let result = interpret_response(response);
        if matches!(result, Err(RequestError::AuthenticationExpired)) && self.tokens.clear() {
            warn!("authentication expired, token cleared");
        }
        result
    }

    fn build_request(&self, descriptor: &RequestDescriptor) -> RequestResult<HttpRequest> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if descriptor.with_credentials {
            let bearer = self.tokens.bearer().ok_or(RequestError::NotAuthenticated)?;
            headers.push(("Authorization".to_string(), bearer));
        }

        Ok(HttpRequest {
            method: descriptor.method,
            url: join_url(&self.base_url, &descriptor.target),
            query: descriptor.query_pairs(),
            headers,
            body: descriptor.body.clone(),
        })
    }
}

/// Resolve a target against the base URL. Absolute targets are kept.
pub(crate) fn join_url(base_url: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if target.starts_with('/') {
        format!("{base}{target}")
    } else {
        format!("{base}/{target}")
    }
}

/// Map a raw response to the call's outcome.
///
/// - 401 is [`RequestError::AuthenticationExpired`]
/// - other non-2xx is [`RequestError::Status`]
/// - an empty body is `null`
/// - a body with a `code` key is a business envelope: it yields its `data`
///   when `code` is zero and [`RequestError::Business`] otherwise
/// - any other JSON body is returned whole
pub(crate) fn interpret_response(response: HttpResponse) -> RequestResult<Value> {
    if response.status == 401 {
        return Err(RequestError::AuthenticationExpired);
    }
    if !response.is_success() {
        return Err(RequestError::Status {
            status: response.status,
            body: response.body,
        });
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value =
        serde_json::from_str(&response.body).map_err(|e| RequestError::Decode(e.to_string()))?;
    match ApiResponse::from_value(&value) {
        Some(api) if api.is_ok() => Ok(api.data),
        Some(api) => Err(RequestError::Business {
            code: api.code,
            message: api.message_or_default().to_string(),
        }),
        None => Ok(value),
    }
}
