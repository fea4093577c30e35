use crate::domain::validation::{ValidationError, ValidationIssue};

#[derive(Clone, PartialEq, Eq, Hash)]
/// API token sent verbatim in the `Authorization` header.
///
/// Invariant: non-empty after trimming.
pub struct ApiToken(String);

impl ApiToken {
    /// Field name reported in validation issues.
    pub const FIELD: &'static str = "api_token";

    /// Create a validated [`ApiToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::from_issue(ValidationIssue::new(
                [Self::FIELD],
                "API token is required",
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Message recipient as sent on the wire (`to`).
///
/// Invariant: non-empty. The value is not normalized; the API decides what a valid number is.
pub struct Recipient(String);

impl Recipient {
    /// Wire field name (`to`).
    pub const FIELD: &'static str = "to";

    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub(crate) fn check(value: &str) -> Option<ValidationIssue> {
        if value.is_empty() {
            return Some(ValidationIssue::new(
                [Self::FIELD],
                "Phone number is required",
            ));
        }
        None
    }

    /// Borrow the recipient as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message body (`message`).
///
/// Invariant: `1..=MessageText::MAX_CHARS` characters, counted as Unicode scalar values.
pub struct MessageText(String);

impl MessageText {
    /// Wire field name (`message`).
    pub const FIELD: &'static str = "message";

    /// Longest accepted body.
    pub const MAX_CHARS: usize = 1600;

    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub(crate) fn check(value: &str) -> Option<ValidationIssue> {
        if value.is_empty() {
            return Some(ValidationIssue::new([Self::FIELD], "Message is required"));
        }
        if value.chars().count() > Self::MAX_CHARS {
            return Some(ValidationIssue::new([Self::FIELD], "Message too long"));
        }
        None
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
