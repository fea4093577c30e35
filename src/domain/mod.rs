//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{OutboundMessage, SmsPayload};
pub use response::{DeliveryResult, MessageStatus};
pub use validation::{ValidationError, ValidationIssue, validate};
pub use value::{ApiToken, MessageText, Recipient};
