//! Transport layer: HTTP execution, deadlines, retries and wire-format details.

mod error;
mod executor;
#[cfg(test)]
pub(crate) mod fake;
mod http;
mod request;
mod retry;
mod send_sms;

pub use error::ApiError;
pub use executor::{DEFAULT_USER_AGENT, Transport};
pub use http::{BoxError, BoxFuture, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use request::ApiRequest;
pub use retry::RetryPolicy;
pub(crate) use send_sms::{DeliveryResultJson, encode_send_sms_request};
