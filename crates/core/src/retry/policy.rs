//! Per-request retry policy
//!
//! The route policy is merged with the client override headers once, when
//! the request starts. After that only the remaining-retries counter changes.

use std::sync::Arc;

use retrygate_domain::constants::{
    HEADER_MAX_RETRIES, HEADER_OVERLOADED, HEADER_RATE_LIMITED, HEADER_RETRIABLE_STATUS_CODES,
    HEADER_RETRY_GRPC_ON, HEADER_RETRY_ON, STRIPPED_RETRY_HEADERS,
};
use retrygate_domain::{
    split_list, GrpcStatus, RetryHostPredicate, RetryOn, RetryPolicy, RetryPriority,
    StreamResetReason,
};
use tracing::{debug, trace};

use super::ports::{RequestHeaders, ResponseHeaders};

/// Route policy merged with client overrides
#[derive(Debug, Clone)]
pub struct MergedRetryPolicy {
    retry_on: RetryOn,
    retries_remaining: u32,
    retriable_status_codes: Vec<u32>,
    host_selection_max_attempts: u32,
    retry_host_predicates: Vec<Arc<dyn RetryHostPredicate>>,
    retry_priority: Option<Arc<dyn RetryPriority>>,
}

impl MergedRetryPolicy {
    /// Merge `route` with the retry headers on `request_headers`.
    ///
    /// Returns `None` when neither the route nor the request asks for any
    /// retry trigger. The retry-control headers are stripped from the request
    /// in every case so they never reach the upstream.
    pub fn build<H>(route: &RetryPolicy, request_headers: &mut H) -> Option<Self>
    where
        H: RequestHeaders + ?Sized,
    {
        let wants_retry = request_headers.header_value(HEADER_RETRY_ON).is_some()
            || request_headers.header_value(HEADER_RETRY_GRPC_ON).is_some()
            || !route.retry_on.is_empty();

        let merged = wants_retry.then(|| Self::merge(route, &*request_headers));

        for name in STRIPPED_RETRY_HEADERS {
            request_headers.remove_header(name);
        }

        merged
    }

    fn merge<H>(route: &RetryPolicy, request_headers: &H) -> Self
    where
        H: RequestHeaders + ?Sized,
    {
        let mut retry_on = route.retry_on;
        if let Some(value) = request_headers.header_value(HEADER_RETRY_ON) {
            retry_on |= parse_tokens(&value, HEADER_RETRY_ON, RetryOn::parse_retry_on);
        }
        if let Some(value) = request_headers.header_value(HEADER_RETRY_GRPC_ON) {
            retry_on |= parse_tokens(&value, HEADER_RETRY_GRPC_ON, RetryOn::parse_retry_grpc_on);
        }

        let mut retries_remaining = route.num_retries;
        if !retry_on.is_empty() {
            if let Some(value) = request_headers.header_value(HEADER_MAX_RETRIES) {
                match value.trim().parse::<u32>() {
                    Ok(max_retries) => retries_remaining = max_retries,
                    Err(_) => trace!(value = %value, "ignoring unparsable max-retries override"),
                }
            }
        }

        let mut retriable_status_codes = route.retriable_status_codes.clone();
        if let Some(value) = request_headers.header_value(HEADER_RETRIABLE_STATUS_CODES) {
            retriable_status_codes.extend(split_list(&value).filter_map(|token| {
                let code = token.parse::<u32>().ok();
                if code.is_none() {
                    trace!(token, "ignoring unparsable retriable status code");
                }
                code
            }));
        }

        debug!(
            retry_on = %retry_on,
            retries_remaining,
            retriable_status_codes = ?retriable_status_codes,
            "retry policy merged"
        );

        Self {
            retry_on,
            retries_remaining,
            retriable_status_codes,
            host_selection_max_attempts: route.host_selection_max_attempts,
            retry_host_predicates: route.retry_host_predicates.clone(),
            retry_priority: route.retry_priority.clone(),
        }
    }

    /// Route triggers merged with the client's.
    pub fn retry_on(&self) -> RetryOn {
        self.retry_on
    }

    /// Retries left before the limit is reached.
    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    /// Route status codes followed by any the client added.
    pub fn retriable_status_codes(&self) -> &[u32] {
        &self.retriable_status_codes
    }

    /// Host selection attempts allowed per retry.
    pub fn host_selection_max_attempts(&self) -> u32 {
        self.host_selection_max_attempts
    }

    /// Host predicates carried over from the route.
    pub fn retry_host_predicates(&self) -> &[Arc<dyn RetryHostPredicate>] {
        &self.retry_host_predicates
    }

    /// Priority selection strategy carried over from the route.
    pub fn retry_priority(&self) -> Option<&Arc<dyn RetryPriority>> {
        self.retry_priority.as_ref()
    }

    /// Spend one retry. Returns `false` once the allowance is exhausted.
    pub(crate) fn consume_retry(&mut self) -> bool {
        if self.retries_remaining == 0 {
            return false;
        }
        self.retries_remaining -= 1;
        true
    }

    /// Whether an upstream response qualifies for a retry.
    ///
    /// Overloaded and rate-limited responses never do.
    pub fn would_retry_from_headers<R>(&self, response: &R) -> bool
    where
        R: ResponseHeaders + ?Sized,
    {
        if response.has_header(HEADER_OVERLOADED) || response.has_header(HEADER_RATE_LIMITED) {
            return false;
        }

        let retry_on = self.retry_on;
        if let Some(status) = response.status() {
            if retry_on.contains(RetryOn::FIVE_XX) && (500..600).contains(&status) {
                return true;
            }
            if retry_on.contains(RetryOn::GATEWAY_ERROR) && matches!(status, 502..=504) {
                return true;
            }
            if retry_on.contains(RetryOn::RETRIABLE_4XX) && status == 409 {
                return true;
            }
            if retry_on.contains(RetryOn::RETRIABLE_STATUS_CODES)
                && self.retriable_status_codes.contains(&u32::from(status))
            {
                return true;
            }
        }

        if retry_on.intersects(RetryOn::GRPC_ANY) {
            if let Some(bit) = response.grpc_status().and_then(GrpcStatus::retry_on_bit) {
                return retry_on.contains(bit);
            }
        }

        false
    }

    /// Whether a stream reset qualifies for a retry.
    ///
    /// Local overflow never does. Any reset counts as a 5xx.
    pub fn would_retry_from_reset(&self, reason: StreamResetReason) -> bool {
        if reason == StreamResetReason::Overflow {
            return false;
        }

        let retry_on = self.retry_on;
        if retry_on.intersects(RetryOn::FIVE_XX | RetryOn::GATEWAY_ERROR) {
            return true;
        }
        if retry_on.contains(RetryOn::REFUSED_STREAM)
            && reason == StreamResetReason::RemoteRefusedStreamReset
        {
            return true;
        }
        retry_on.contains(RetryOn::CONNECT_FAILURE) && reason == StreamResetReason::ConnectionFailure
    }

    /// True if any host predicate rejects `host`.
    pub fn should_select_another_host(&self, host: &str) -> bool {
        self.retry_host_predicates.iter().any(|predicate| predicate.should_select_another_host(host))
    }

    /// Forward an attempted host to the predicates and priority strategy.
    pub fn on_host_attempted(&self, host: &str) {
        for predicate in &self.retry_host_predicates {
            predicate.on_host_attempted(host);
        }
        if let Some(priority) = &self.retry_priority {
            priority.on_host_attempted(host);
        }
    }
}

fn parse_tokens(value: &str, header: &str, parse: fn(&str) -> RetryOn) -> RetryOn {
    split_list(value).fold(RetryOn::NONE, |acc, token| {
        let bit = parse(token);
        if bit.is_empty() {
            trace!(header, token, "ignoring unknown retry trigger");
        }
        acc | bit
    })
}
