//! Error types for thread normalization.

use serde_json::{Value, json};

use crate::normalizer::types::VALID_OPTION_KEYS;

/// Typed error for the normalization pipeline.
///
/// Every variant carries a human-readable message (`Display`), a stable
/// machine code ([`code`](Self::code)) and, where useful, a structured
/// details payload ([`details`](Self::details)).
///
/// Validation-level variants are fail-fast: the pipeline converts them
/// into a `Validation error: …` entry and returns an empty thread.
/// Per-message variants are recovered: the batch continues and the
/// failure is surfaced as an accumulated error string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Thread data is required")]
    MissingThreadData,

    #[error("Thread data must be an object")]
    InvalidThreadDataType,

    #[error("Thread ID is required and must be a string")]
    InvalidThreadId,

    #[error("Thread emails must be an array")]
    InvalidEmailsArray,

    #[error("Gmail messages must be an array")]
    InvalidMessagesArray,

    #[error("Each message must be an object")]
    InvalidMessageObject,

    #[error("Message ID is required and must be a string")]
    InvalidMessageId,

    #[error("Message threadId is required and must be a string")]
    InvalidMessageThreadId,

    /// `internalDate` missing or not a string, caught at validation time.
    #[error("Message internalDate is required and must be a string")]
    MissingInternalDate,

    /// `internalDate` present but not a representable epoch-millisecond
    /// value, caught per-message.
    #[error("Invalid internalDate format: {value}")]
    MalformedInternalDate { value: String },

    #[error("Options must be an object")]
    InvalidOptionsType,

    #[error("Invalid option key: {key}")]
    InvalidOptionKey { key: String },

    #[error("Option {key} must be a boolean")]
    InvalidOptionValue { key: String, value: Value },

    /// Wraps any failure while assembling a message from an assembled
    /// thread object.
    #[error("Failed to normalize message: {reason}")]
    MessageNormalization {
        message_id: Option<String>,
        reason: String,
    },

    /// Wraps any failure while assembling a message from a raw Gmail
    /// message.
    #[error("Failed to normalize Gmail message: {reason}")]
    GmailMessageNormalization {
        message_id: Option<String>,
        reason: String,
    },
}

impl NormalizeError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingThreadData => "MissingThreadData",
            Self::InvalidThreadDataType => "InvalidThreadDataType",
            Self::InvalidThreadId => "InvalidThreadId",
            Self::InvalidEmailsArray => "InvalidEmailsArray",
            Self::InvalidMessagesArray => "InvalidMessagesArray",
            Self::InvalidMessageObject => "InvalidMessageObject",
            Self::InvalidMessageId => "InvalidMessageId",
            Self::InvalidMessageThreadId => "InvalidMessageThreadId",
            Self::MissingInternalDate | Self::MalformedInternalDate { .. } => "InvalidInternalDate",
            Self::InvalidOptionsType => "InvalidOptionsType",
            Self::InvalidOptionKey { .. } => "InvalidOptionKey",
            Self::InvalidOptionValue { .. } => "InvalidOptionValue",
            Self::MessageNormalization { .. } => "MessageNormalizationError",
            Self::GmailMessageNormalization { .. } => "GmailMessageNormalizationError",
        }
    }

    /// Structured details payload, when the variant carries one.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::MalformedInternalDate { value } => Some(json!({ "internalDate": value })),
            Self::InvalidOptionKey { key } => {
                Some(json!({ "key": key, "validKeys": VALID_OPTION_KEYS }))
            }
            Self::InvalidOptionValue { key, value } => {
                Some(json!({ "key": key, "value": value }))
            }
            Self::MessageNormalization { message_id, .. }
            | Self::GmailMessageNormalization { message_id, .. } => {
                Some(json!({ "messageId": message_id }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(NormalizeError::MissingThreadData.code(), "MissingThreadData");
        assert_eq!(NormalizeError::InvalidThreadId.code(), "InvalidThreadId");
        assert_eq!(NormalizeError::MissingInternalDate.code(), "InvalidInternalDate");
        assert_eq!(
            NormalizeError::MalformedInternalDate { value: "abc".into() }.code(),
            "InvalidInternalDate"
        );
        assert_eq!(
            NormalizeError::GmailMessageNormalization {
                message_id: None,
                reason: "x".into()
            }
            .code(),
            "GmailMessageNormalizationError"
        );
    }

    #[test]
    fn option_key_details_list_valid_keys() {
        let err = NormalizeError::InvalidOptionKey { key: "bogus".into() };
        let details = err.details().unwrap();
        assert_eq!(details["key"], "bogus");
        let valid = details["validKeys"].as_array().unwrap();
        assert_eq!(valid.len(), 3);
        assert!(valid.iter().any(|k| k == "convertHtmlToText"));
    }

    #[test]
    fn option_value_details_carry_offending_value() {
        let err = NormalizeError::InvalidOptionValue {
            key: "sortMessages".into(),
            value: json!("yes"),
        };
        assert_eq!(err.to_string(), "Option sortMessages must be a boolean");
        let details = err.details().unwrap();
        assert_eq!(details["value"], "yes");
    }

    #[test]
    fn validation_variants_have_no_details() {
        assert!(NormalizeError::MissingThreadData.details().is_none());
        assert!(NormalizeError::InvalidEmailsArray.details().is_none());
    }

    #[test]
    fn wrapper_messages_include_reason() {
        let err = NormalizeError::GmailMessageNormalization {
            message_id: Some("m1".into()),
            reason: "Invalid internalDate format: nope".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("Failed to normalize Gmail message:"));
        assert!(rendered.contains("Invalid internalDate format"));
    }
}
