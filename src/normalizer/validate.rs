//! Structural validation of normalizer inputs.
//!
//! Validation is fail-fast: the first violation aborts the whole call
//! with a typed [`NormalizeError`]. This is the opposite of per-message
//! pipeline processing, which is best-effort.

use serde_json::Value;

use super::types::{NormalizeOptions, VALID_OPTION_KEYS};
use crate::error::NormalizeError;

/// Validate an assembled thread object: `{ id, emails: [...] }`.
pub fn validate_thread_data(thread_data: &Value) -> Result<(), NormalizeError> {
    if thread_data.is_null() {
        return Err(NormalizeError::MissingThreadData);
    }
    let Some(obj) = thread_data.as_object() else {
        return Err(NormalizeError::InvalidThreadDataType);
    };
    match obj.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {}
        _ => return Err(NormalizeError::InvalidThreadId),
    }
    if !obj.get("emails").is_some_and(Value::is_array) {
        return Err(NormalizeError::InvalidEmailsArray);
    }
    Ok(())
}

/// Validate a raw Gmail message array.
///
/// All-or-nothing: the first invalid element rejects the whole array.
pub fn validate_gmail_messages(messages: &Value) -> Result<(), NormalizeError> {
    let Some(list) = messages.as_array() else {
        return Err(NormalizeError::InvalidMessagesArray);
    };

    for message in list {
        let Some(obj) = message.as_object() else {
            return Err(NormalizeError::InvalidMessageObject);
        };
        match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {}
            _ => return Err(NormalizeError::InvalidMessageId),
        }
        match obj.get("threadId").and_then(Value::as_str) {
            Some(tid) if !tid.is_empty() => {}
            _ => return Err(NormalizeError::InvalidMessageThreadId),
        }
        match obj.get("internalDate").and_then(Value::as_str) {
            Some(date) if !date.is_empty() => {}
            _ => return Err(NormalizeError::MissingInternalDate),
        }
    }

    Ok(())
}

/// Parse a JSON options value, merging recognized flags over defaults.
///
/// Absent or null options are valid and mean "use defaults". Unknown
/// keys and non-boolean values are rejected.
pub fn parse_options(options: Option<&Value>) -> Result<NormalizeOptions, NormalizeError> {
    let mut opts = NormalizeOptions::default();

    let Some(value) = options else {
        return Ok(opts);
    };
    if value.is_null() {
        return Ok(opts);
    }
    let Some(obj) = value.as_object() else {
        return Err(NormalizeError::InvalidOptionsType);
    };

    for (key, val) in obj {
        if !VALID_OPTION_KEYS.contains(&key.as_str()) {
            return Err(NormalizeError::InvalidOptionKey { key: key.clone() });
        }
        let Some(flag) = val.as_bool() else {
            return Err(NormalizeError::InvalidOptionValue {
                key: key.clone(),
                value: val.clone(),
            });
        };
        match key.as_str() {
            "convertHtmlToText" => opts.convert_html_to_text = flag,
            "sortMessages" => opts.sort_messages = flag,
            "excludeEmptyMessages" => opts.exclude_empty_messages = flag,
            _ => {}
        }
    }

    Ok(opts)
}
