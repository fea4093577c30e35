use std::fmt;

use crate::domain::request::{OutboundMessage, SmsPayload};
use crate::domain::value::{MessageText, Recipient};

/// A single rule violation, addressed by the field path it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new<P, S>(path: P, message: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// Payload-shape failure, always raised before any network attempt.
///
/// `issues` lists every violated rule in field order; `message` is the first issue's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub(crate) fn from_issue(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message.clone(),
            issues: vec![issue],
        }
    }

    fn from_issues(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() {
            return None;
        }
        let message = issues[0].message.clone();
        Some(Self { message, issues })
    }

    /// Issues reported for the given top-level field.
    pub fn issues_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.path.first().map(String::as_str) == Some(field))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths = self
            .issues
            .iter()
            .map(|issue| issue.path.join("."))
            .collect::<Vec<_>>();
        write!(f, "{} (at: {})", self.message, paths.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Check a payload against every structural rule and collect all violations.
pub fn validate(payload: &SmsPayload) -> Result<OutboundMessage, ValidationError> {
    let issues = [
        Recipient::check(&payload.to),
        MessageText::check(&payload.message),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    if let Some(err) = ValidationError::from_issues(issues) {
        return Err(err);
    }

    Ok(OutboundMessage::new(
        Recipient::new_unchecked(payload.to.clone()),
        MessageText::new_unchecked(payload.message.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(to: &str, message: &str) -> SmsPayload {
        SmsPayload::new(to, message)
    }

    #[test]
    fn accepts_well_formed_payload() {
        let msg = validate(&payload("+15550001111", "hello")).unwrap();
        assert_eq!(msg.recipient().as_str(), "+15550001111");
        assert_eq!(msg.body().as_str(), "hello");
    }

    #[test]
    fn accepts_body_at_the_length_ceiling() {
        let body = "a".repeat(MessageText::MAX_CHARS);
        assert!(validate(&payload("+15550001111", &body)).is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let body = "я".repeat(MessageText::MAX_CHARS);
        assert!(validate(&payload("+15550001111", &body)).is_ok());
    }

    #[test]
    fn rejects_empty_recipient() {
        let err = validate(&payload("", "hello")).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::new(["to"], "Phone number is required")]
        );
        assert_eq!(err.message, "Phone number is required");
    }

    #[test]
    fn rejects_too_long_body() {
        let body = "a".repeat(MessageText::MAX_CHARS + 1);
        let err = validate(&payload("+15550001111", &body)).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::new(["message"], "Message too long")]
        );
    }

    #[test]
    fn collects_every_issue_in_field_order() {
        let err = validate(&payload("", "")).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.issues[0].path, vec!["to".to_owned()]);
        assert_eq!(err.issues[1].path, vec!["message".to_owned()]);
        assert_eq!(err.message, "Phone number is required");
        assert_eq!(err.issues_for("message").count(), 1);
    }

    #[test]
    fn display_shows_first_message_then_paths() {
        let err = validate(&payload("", "")).unwrap_err();
        assert_eq!(err.to_string(), "Phone number is required (at: to, message)");

        let err = validate(&payload("+15550001111", "")).unwrap_err();
        assert_eq!(err.to_string(), "Message is required (at: message)");
    }
}
