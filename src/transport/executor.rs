use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::Instrument;
use url::Url;

use crate::domain::ApiToken;
use crate::transport::error::ApiError;
use crate::transport::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::transport::request::ApiRequest;
use crate::transport::retry::RetryPolicy;

/// Value of the library identifier (`User-Agent`) header unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("smsgate-rust/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
/// Executes [`ApiRequest`]s: URL and header construction, per-attempt deadline, retries with
/// backoff, and normalization of every outcome into a decoded body or an [`ApiError`].
///
/// Configuration is fixed at construction; concurrent calls share nothing mutable and each
/// owns its attempt counter and deadline.
pub struct Transport {
    http: Arc<dyn HttpTransport>,
    base_url: Url,
    api_token: ApiToken,
    timeout: Duration,
    retry_policy: RetryPolicy,
    user_agent: String,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub(crate) fn new(
        http: Arc<dyn HttpTransport>,
        base_url: Url,
        api_token: ApiToken,
        timeout: Duration,
        retry_policy: RetryPolicy,
        user_agent: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_token,
            timeout,
            retry_policy,
            user_agent,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Run `request`, retrying retryable failures according to the retry policy.
    ///
    /// Attempts are strictly sequential. Errors that are not retryable, or that remain after the
    /// retry budget is spent, are returned unchanged.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let span = tracing::debug_span!(
            "smsgate_request",
            method = %request.method,
            path = %request.path
        );

        async move {
            let mut attempt = 0;
            loop {
                match self.execute_once(request).await {
                    Ok(value) => return Ok(value),
                    Err(err) if self.retry_policy.should_retry(&err, attempt) => {
                        let delay = self.retry_policy.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt,
                            status = err.status_code,
                            delay_ms = delay.as_millis() as u64,
                            "Scheduling retry"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute_once<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let http_request = self.build_http_request(request);

        let response = match tokio::time::timeout(self.timeout, self.http.send(http_request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(cause)) => return Err(ApiError::network(&cause)),
            Err(_elapsed) => return Err(ApiError::timeout()),
        };

        tracing::debug!(status = response.status, "Received response");
        decode_response(&response)
    }

    pub(crate) fn build_http_request(&self, request: &ApiRequest) -> HttpRequest {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        url.set_path(&path);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }

        let defaults = vec![
            ("Authorization".to_owned(), self.api_token.as_str().to_owned()),
            ("Content-Type".to_owned(), "application/json".to_owned()),
            ("User-Agent".to_owned(), self.user_agent.clone()),
        ];

        HttpRequest {
            method: request.method.clone(),
            url,
            headers: merge_headers(defaults, &request.headers),
            body: request.body.as_ref().map(ToString::to_string),
        }
    }
}

/// Caller headers win over defaults with the same (case-insensitive) name.
fn merge_headers(
    mut headers: Vec<(String, String)>,
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    for (name, value) in overrides {
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.clone(),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

fn decode_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_error_response(response));
    }

    if !response.is_json() {
        return Err(ApiError::invalid_response(
            response.status,
            format!(
                "Expected JSON response, got {}",
                response.content_type().unwrap_or("no content type")
            ),
        ));
    }

    response.json::<T>().map_err(|err| {
        ApiError::invalid_response(response.status, format!("Invalid response body: {err}"))
    })
}
