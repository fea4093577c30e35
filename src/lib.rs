//! Typed Rust client for the SMSGate HTTP API.
//!
//! The crate is layered: a domain layer of validated types, a transport layer that owns
//! HTTP execution (deadlines, retries with exponential backoff, error normalization), and a
//! small client layer tying them together.
//!
//! ```rust,no_run
//! use smsgate::{SmsGateClient, SmsPayload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsgate::SmsGateError> {
//!     let client = SmsGateClient::new("...")?;
//!     let result = client
//!         .send_sms(SmsPayload::new("+15550001111", "hello"))
//!         .await?;
//!     println!("queued {} ({:?})", result.id, result.status);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod transport;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SmsGateClient, SmsGateClientBuilder, SmsGateError,
};
pub use domain::{
    ApiToken, DeliveryResult, MessageStatus, MessageText, OutboundMessage, Recipient, SmsPayload,
    ValidationError, ValidationIssue, validate,
};
pub use transport::{ApiError, ApiRequest, HttpTransport, RetryPolicy};
