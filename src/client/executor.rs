//! Request execution.
//!
//! # Responsibilities
//! - Build the wire request: JSON body, auth/content headers, request ID
//! - Drive the retry loop: transport → classifier → backoff
//! - Run the loop under the category deadline
//! - Decode the successful response into the caller's type
//!
//! # Design Decisions
//! - Attempts are strictly sequential; the next one starts only after the
//!   previous outcome is classified
//! - Retryable causes never escape individually; exhaustion surfaces as
//!   `RetriesExhausted` wrapping the last cause
//! - Decode failures are terminal: the server has already answered
//! - No attempt starts after the elapsed ceiling, no wait is begun that would
//!   end past it, and an attempt still in flight when it passes is abandoned

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tokio::time::{self, Instant};
use tracing::Instrument;
use url::Url;

use crate::config::{validate_base_url, RetryConfig, TimeoutConfig};
use crate::error::{ClientError, Exhaustion};
use crate::observability::metrics;
use crate::observability::DiagnosticLogger;
use crate::resilience::backoff::{self, WaitInterrupted};
use crate::resilience::{
    classify, exceeds_elapsed_ceiling, next_interval, run_with_timeout, should_retry, BackoffState,
    CallContext, ClassifiedOutcome, RetryCause, RetryDecision,
};
use crate::transport::{Transport, TransportRequest, TransportResponse};

use super::Operation;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-call overrides of the client's default configuration.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub retry: Option<RetryConfig>,
    pub timeouts: Option<TimeoutConfig>,
}

/// Executes operations against one API endpoint.
///
/// Cheap to clone; clones share the transport and configuration.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    inner: Arc<ExecutorInner>,
}

#[derive(Debug)]
struct ExecutorInner {
    base_url: String,
    authorization: HeaderValue,
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
    timeouts: TimeoutConfig,
    logger: DiagnosticLogger,
}

impl RequestExecutor {
    /// Create an executor. The base URL is validated and its trailing `/`
    /// trimmed.
    pub fn new(
        base_url: &str,
        token: &str,
        transport: Arc<dyn Transport>,
        retry: RetryConfig,
        timeouts: TimeoutConfig,
        logger: DiagnosticLogger,
    ) -> Result<Self, ClientError> {
        validate_base_url(base_url)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::InvalidRequest("token contains invalid header characters".into()))?;
        authorization.set_sensitive(true);

        Ok(Self {
            inner: Arc::new(ExecutorInner {
                base_url: base_url.trim().trim_end_matches('/').to_string(),
                authorization,
                transport,
                retry,
                timeouts,
                logger,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    pub fn timeout_config(&self) -> &TimeoutConfig {
        &self.inner.timeouts
    }

    /// Execute `operation` and decode the JSON response into `T`.
    pub async fn execute<T>(
        &self,
        ctx: &CallContext,
        operation: Operation,
        options: &CallOptions,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.run(ctx, operation, options, |response| {
            serde_json::from_slice(&response.body).map_err(ClientError::Decoding)
        })
        .await
    }

    /// Execute `operation`, ignoring any response body.
    pub async fn execute_no_content(
        &self,
        ctx: &CallContext,
        operation: Operation,
        options: &CallOptions,
    ) -> Result<(), ClientError> {
        self.run(ctx, operation, options, |_| Ok(())).await
    }

    async fn run<T, D>(
        &self,
        ctx: &CallContext,
        operation: Operation,
        options: &CallOptions,
        decode: D,
    ) -> Result<T, ClientError>
    where
        T: Send + 'static,
        D: FnOnce(TransportResponse) -> Result<T, ClientError> + Send + 'static,
    {
        let category = operation.category();
        let retry = options
            .retry
            .clone()
            .unwrap_or_else(|| self.inner.retry.clone());
        let timeouts = options.timeouts.as_ref().unwrap_or(&self.inner.timeouts);
        let span = tracing::info_span!(
            "iam_request",
            request_id = %operation.request_id(),
            category = %category,
            path = %operation.path(),
        );

        let started = Instant::now();
        let executor = self.clone();
        let result = run_with_timeout(ctx, category, timeouts, move |scoped| async move {
            let response = executor.send_with_retry(&scoped, &operation, &retry).await?;
            decode(response)
        })
        .instrument(span.clone())
        .await;

        span.in_scope(|| {
            metrics::record_outcome(
                category,
                result.as_ref().err().map(ClientError::kind),
                started.elapsed(),
            );
            if let Err(e) = &result {
                self.inner.logger.log_failure(e);
            }
        });
        result
    }

    /// The retry loop. Returns the first successful response.
    async fn send_with_retry(
        &self,
        ctx: &CallContext,
        operation: &Operation,
        retry: &RetryConfig,
    ) -> Result<TransportResponse, ClientError> {
        let request = self.build_request(operation)?;
        let category = operation.category();
        let logger = &self.inner.logger;

        let mut state = BackoffState::start(retry);
        let ceiling = state.elapsed_ceiling(retry);
        let mut attempt: u32 = 0;

        loop {
            if ctx.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            if ctx.is_expired() {
                return Err(ClientError::DeadlineExceeded { category });
            }

            logger.log_request(&request, attempt);
            metrics::record_attempt(category);

            let sent = match time::timeout_at(ceiling, self.inner.transport.send(ctx, &request)).await {
                Ok(sent) => sent,
                Err(_) => {
                    let cause = RetryCause::Network(format!(
                        "attempt {} still pending after {:?}",
                        attempt,
                        retry.max_elapsed_time()
                    ));
                    return Err(exhausted(attempt, Exhaustion::MaxElapsedTime, cause));
                }
            };
            if let Ok(response) = &sent {
                logger.log_response(response);
            }

            let cause = match classify(operation, sent) {
                ClassifiedOutcome::Success(response) => return Ok(response),
                ClassifiedOutcome::TerminalError(error) => return Err(error),
                ClassifiedOutcome::Retryable(cause) => cause,
            };

            if let RetryDecision::Stop(reason) = should_retry(attempt, state.elapsed(), retry) {
                return Err(exhausted(attempt, reason, cause));
            }

            let interval = next_interval(&mut state, retry);
            if exceeds_elapsed_ceiling(state.elapsed() + interval, retry) {
                return Err(exhausted(attempt, Exhaustion::MaxElapsedTime, cause));
            }
            logger.log_retry(attempt + 1, &cause, interval);
            metrics::record_retry(category, cause.kind());

            match backoff::wait(ctx, interval).await {
                Ok(()) => {}
                Err(WaitInterrupted::Cancelled) => return Err(ClientError::Cancelled),
                Err(WaitInterrupted::DeadlineExceeded) => {
                    return Err(ClientError::DeadlineExceeded { category })
                }
            }

            if exceeds_elapsed_ceiling(state.elapsed(), retry) {
                return Err(exhausted(attempt, Exhaustion::MaxElapsedTime, cause));
            }
            attempt += 1;
        }
    }

    fn build_request(&self, operation: &Operation) -> Result<TransportRequest, ClientError> {
        let raw_url = format!("{}{}", self.inner.base_url, operation.path());
        let mut url = Url::parse(&raw_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid URL '{}': {}", raw_url, e)))?;
        if !operation.path_segments().is_empty() {
            if let Some(bad) = operation
                .path_segments()
                .iter()
                .find(|s| matches!(s.as_str(), "" | "." | ".."))
            {
                return Err(ClientError::InvalidRequest(format!(
                    "'{}' is not a valid path segment",
                    bad
                )));
            }
            // Percent-encodes `/`, `%`, `?` and `#` so each id stays one segment.
            url.path_segments_mut()
                .map_err(|_| ClientError::InvalidRequest(format!("'{}' cannot carry a path", raw_url)))?
                .extend(operation.path_segments());
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.inner.authorization.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let request_id = HeaderValue::from_str(&operation.request_id().to_string())
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        headers.insert(REQUEST_ID_HEADER, request_id);

        let body = operation
            .body()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::Encoding)?;

        Ok(TransportRequest {
            method: operation.method().clone(),
            url,
            headers,
            body,
        })
    }
}

fn exhausted(last_attempt: u32, reason: Exhaustion, cause: RetryCause) -> ClientError {
    ClientError::RetriesExhausted {
        attempts: last_attempt + 1,
        reason,
        source: Box::new(cause.into_error()),
    }
}
