//! Client layer: validates payloads and hands them to the transport.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderValue;

use tokio::task::JoinHandle;
use tracing::Instrument;
use url::Url;

use crate::domain::{ApiToken, DeliveryResult, OutboundMessage, SmsPayload, ValidationError};
use crate::transport::{
    ApiError, DEFAULT_USER_AGENT, DeliveryResultJson, HttpTransport, ReqwestTransport,
    RetryPolicy, Transport, encode_send_sms_request,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.smsgate.dev/v1";

/// Per-attempt deadline used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsGateClient`].
///
/// - [`SmsGateError::Validation`]: the payload was rejected locally; nothing was sent.
/// - [`SmsGateError::Api`]: the network or the API failed (after any retries).
/// - [`SmsGateError::Configuration`]: the client could not be built.
pub enum SmsGateError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl SmsGateError {
    /// HTTP status for API errors (`0` for network failures); `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status_code),
            Self::Validation(_) | Self::Configuration(_) => None,
        }
    }
}

#[derive(Clone)]
/// Builder for [`SmsGateClient`].
///
/// Use this when you need to customize the base URL, timeout, retry policy, user-agent, or
/// the HTTP transport itself.
pub struct SmsGateClientBuilder {
    api_token: String,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    user_agent: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl SmsGateClientBuilder {
    /// Create a builder with the default base URL, timeout and retry policy.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            user_agent: None,
            transport: None,
        }
    }

    /// Override the API root every request path is appended to.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Deadline for a single attempt. Retries each get a fresh deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Override the library identifier sent as `User-Agent`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the default reqwest-based transport.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build a [`SmsGateClient`].
    ///
    /// Fails with [`SmsGateError::Validation`] for an empty API token and with
    /// [`SmsGateError::Configuration`] for a token or user agent that cannot be sent as a header
    /// value, or an unusable base URL, timeout or retry policy.
    pub fn build(self) -> Result<SmsGateClient, SmsGateError> {
        let api_token = ApiToken::new(self.api_token)?;
        if HeaderValue::from_str(api_token.as_str()).is_err() {
            return Err(SmsGateError::Configuration(
                "API token contains characters not allowed in an HTTP header".to_owned(),
            ));
        }

        let base_url = Url::parse(&self.base_url).map_err(|err| {
            SmsGateError::Configuration(format!("invalid base URL {:?}: {err}", self.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(SmsGateError::Configuration(format!(
                "base URL must be an absolute http(s) URL, got {:?}",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(SmsGateError::Configuration(
                "timeout must be positive".to_owned(),
            ));
        }
        self.retry_policy
            .check()
            .map_err(SmsGateError::Configuration)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        if HeaderValue::from_str(&user_agent).is_err() {
            return Err(SmsGateError::Configuration(format!(
                "user agent {user_agent:?} is not a valid HTTP header value"
            )));
        }

        let http = match self.transport {
            Some(transport) => transport,
            None => {
                let client = reqwest::Client::builder().build().map_err(|err| {
                    SmsGateError::Configuration(format!("failed to build HTTP client: {err}"))
                })?;
                Arc::new(ReqwestTransport::new(client))
            }
        };

        Ok(SmsGateClient {
            transport: Transport::new(
                http,
                base_url,
                api_token,
                self.timeout,
                self.retry_policy,
                user_agent,
            ),
        })
    }
}

#[derive(Debug, Clone)]
/// High-level SMSGate client.
///
/// Every send is validated locally first; invalid payloads never reach the network. Valid
/// payloads go out as `POST {base_url}/messages/sms` with the transport's timeout and retry
/// policy applied. The client is cheap to clone and safe to share between tasks.
pub struct SmsGateClient {
    transport: Transport,
}

impl SmsGateClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`SmsGateClient::builder`].
    pub fn new(api_token: impl Into<String>) -> Result<Self, SmsGateError> {
        SmsGateClientBuilder::new(api_token).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(api_token: impl Into<String>) -> SmsGateClientBuilder {
        SmsGateClientBuilder::new(api_token)
    }

    /// The transport this client sends through, for issuing other [`ApiRequest`]s.
    ///
    /// [`ApiRequest`]: crate::transport::ApiRequest
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Send a single SMS.
    ///
    /// Errors:
    /// - [`SmsGateError::Validation`] if the payload is invalid (no request is made),
    /// - [`SmsGateError::Api`] for network, timeout, and API failures once retries are spent.
    pub async fn send_sms(&self, payload: SmsPayload) -> Result<DeliveryResult, SmsGateError> {
        let message = crate::domain::validate(&payload)?;
        Ok(self.send_validated(&message).await?)
    }

    /// Send several SMS concurrently.
    ///
    /// All payloads are validated before anything is sent; the first invalid one fails the
    /// whole batch with no requests made. Otherwise every message is dispatched at once as its
    /// own task and results come back in input order. The first send failure (in completion
    /// order) is returned as soon as it happens; the remaining sends keep running, with their
    /// retries, to completion in the background. Sends accepted by the API are not undone.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn send_sms_batch(
        &self,
        payloads: Vec<SmsPayload>,
    ) -> Result<Vec<DeliveryResult>, SmsGateError> {
        let messages = payloads
            .iter()
            .map(crate::domain::validate)
            .collect::<Result<Vec<OutboundMessage>, ValidationError>>()?;

        tracing::debug!(size = messages.len(), "Dispatching SMS batch");

        // Dropping a `JoinHandle` detaches its task, so an early failure leaves siblings running.
        let handles = messages
            .into_iter()
            .map(|message| {
                let client = self.clone();
                tokio::spawn(
                    async move { client.send_validated(&message).await }.in_current_span(),
                )
            })
            .collect::<Vec<_>>();
        let results = futures::future::try_join_all(handles.into_iter().map(join_send)).await?;
        Ok(results)
    }

    async fn send_validated(&self, message: &OutboundMessage) -> Result<DeliveryResult, ApiError> {
        let request = encode_send_sms_request(message);
        self.transport
            .execute::<DeliveryResultJson>(&request)
            .await
            .map(DeliveryResult::from)
    }
}

/// Await one batch item; a panicking send re-panics here, a task cancelled by runtime shutdown
/// reports as a network failure.
async fn join_send(
    handle: JoinHandle<Result<DeliveryResult, ApiError>>,
) -> Result<DeliveryResult, ApiError> {
    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(ApiError::new(0, format!("Network error: {err}"))
            .with_code(ApiError::NETWORK_ERROR)),
    }
}
