use crate::domain::validation::{ValidationError, validate};
use crate::domain::value::{MessageText, Recipient};

/// Caller-supplied message before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmsPayload {
    pub to: String,
    pub message: String,
}

impl SmsPayload {
    pub fn new(to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            message: message.into(),
        }
    }
}

/// A payload that passed validation.
///
/// Only obtainable through [`validate`](crate::domain::validate) (or `TryFrom<&SmsPayload>`),
/// so holding one proves the recipient and body satisfy their invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    recipient: Recipient,
    body: MessageText,
}

impl OutboundMessage {
    pub(crate) fn new(recipient: Recipient, body: MessageText) -> Self {
        Self { recipient, body }
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn body(&self) -> &MessageText {
        &self.body
    }
}

impl TryFrom<&SmsPayload> for OutboundMessage {
    type Error = ValidationError;

    fn try_from(payload: &SmsPayload) -> Result<Self, Self::Error> {
        validate(payload)
    }
}
