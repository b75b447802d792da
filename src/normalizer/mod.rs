//! Thread normalization: pipeline driver and public API.
//!
//! Two entry points share one per-message pipeline:
//! 1. Batch-level validation (fail-fast, the only hard-stop path)
//! 2. Per-message assembly (best-effort: one bad message never
//!    discards the rest of the thread)
//! 3. Empty-message filtering, stable date sort, error aggregation
//!
//! Both functions are total: every failure surfaces in the returned
//! [`NormalizeResult`], never as a panic or an error to the caller.
//! Each call is a fresh computation over its inputs with no shared state,
//! safe to invoke concurrently.

pub mod decode;
pub mod extract;
pub mod types;
pub mod validate;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NormalizeError;
use types::{NormalizeOptions, NormalizeResult, NormalizedMessage, NormalizedThread};

/// Normalize an assembled thread object (`{ id, emails: [...] }`).
pub fn normalize_thread(thread_data: &Value, options: Option<&Value>) -> NormalizeResult {
    let mut errors = Vec::new();

    let opts = match validate_thread_inputs(thread_data, options) {
        Ok(opts) => opts,
        Err(err) => {
            errors.push(validation_error(&err));
            let thread_id = thread_data
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .unwrap_or("unknown");
            return failed_result(thread_id, errors);
        }
    };

    // Both fields are guaranteed by validation above.
    let thread_id = thread_data["id"].as_str().unwrap_or_default();
    let emails = thread_data["emails"].as_array().map(Vec::as_slice).unwrap_or_default();

    let (mut messages, processed) =
        process_batch(emails, &opts, extract::normalize_email, &mut errors);
    if opts.sort_messages {
        sort_by_date(&mut messages, &mut errors);
    }

    build_result(thread_id.to_string(), messages, processed, errors)
}

/// Normalize a raw Gmail message array under an explicit thread id.
pub fn normalize_gmail_messages(
    messages: &Value,
    thread_id: &str,
    options: Option<&Value>,
) -> NormalizeResult {
    let mut errors = Vec::new();

    let opts = match validate_gmail_inputs(messages, thread_id, options) {
        Ok(opts) => opts,
        Err(err) => {
            errors.push(validation_error(&err));
            return failed_result(thread_id, errors);
        }
    };

    let items = messages.as_array().map(Vec::as_slice).unwrap_or_default();

    let (mut normalized, processed) =
        process_batch(items, &opts, extract::normalize_gmail_message, &mut errors);
    if opts.sort_messages {
        sort_by_date(&mut normalized, &mut errors);
    }

    build_result(thread_id.to_string(), normalized, processed, errors)
}

// ── Shared pipeline stages ──────────────────────────────────────────

fn validate_thread_inputs(
    thread_data: &Value,
    options: Option<&Value>,
) -> Result<NormalizeOptions, NormalizeError> {
    validate::validate_thread_data(thread_data)?;
    validate::parse_options(options)
}

fn validate_gmail_inputs(
    messages: &Value,
    thread_id: &str,
    options: Option<&Value>,
) -> Result<NormalizeOptions, NormalizeError> {
    if thread_id.is_empty() {
        return Err(NormalizeError::InvalidThreadId);
    }
    validate::validate_gmail_messages(messages)?;
    validate::parse_options(options)
}

/// Run the per-message stage over a batch.
///
/// Each item is processed independently: a failure is recorded and the
/// loop continues. A message that assembles successfully counts as
/// processed even when the empty-message filter later drops it.
fn process_batch<F>(
    items: &[Value],
    opts: &NormalizeOptions,
    normalize: F,
    errors: &mut Vec<String>,
) -> (Vec<NormalizedMessage>, usize)
where
    F: Fn(&Value, &NormalizeOptions) -> Result<NormalizedMessage, NormalizeError>,
{
    let mut messages = Vec::with_capacity(items.len());
    let mut processed = 0;

    for item in items {
        match normalize(item, opts) {
            Ok(message) => {
                processed += 1;
                if opts.exclude_empty_messages && message.body.trim().is_empty() {
                    debug!(message_id = %message.message_id, "Dropping empty message");
                    continue;
                }
                messages.push(message);
            }
            Err(err) => {
                let id = item
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .unwrap_or("unknown");
                warn!(message_id = id, error = %err, "Skipping message that failed to normalize");
                errors.push(format!("Failed to process message {id}: {err}"));
            }
        }
    }

    (messages, processed)
}

/// Stable ascending sort by message date.
///
/// An unparseable date is reported and compares as equal, leaving that
/// pair's relative order unchanged.
fn sort_by_date(messages: &mut Vec<NormalizedMessage>, errors: &mut Vec<String>) {
    let mut keyed: Vec<(Option<DateTime<Utc>>, NormalizedMessage)> = messages
        .drain(..)
        .map(|message| {
            let key = DateTime::parse_from_rfc3339(&message.date)
                .map(|d| d.with_timezone(&Utc))
                .ok();
            if key.is_none() {
                errors.push(format!("Failed to sort messages: invalid date {}", message.date));
            }
            (key, message)
        })
        .collect();

    keyed.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    });

    messages.extend(keyed.into_iter().map(|(_, message)| message));
}

fn validation_error(err: &NormalizeError) -> String {
    format!("Validation error: {err} ({})", err.code())
}

fn failed_result(thread_id: &str, errors: Vec<String>) -> NormalizeResult {
    build_result(thread_id.to_string(), Vec::new(), 0, errors)
}

fn build_result(
    thread_id: String,
    messages: Vec<NormalizedMessage>,
    processed: usize,
    errors: Vec<String>,
) -> NormalizeResult {
    debug!(
        thread_id = %thread_id,
        messages = messages.len(),
        processed,
        errors = errors.len(),
        "Thread normalization complete"
    );
    NormalizeResult {
        normalized_thread: NormalizedThread { thread_id, messages },
        processed_message_count: processed,
        errors: if errors.is_empty() { None } else { Some(errors) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_failure_returns_empty_thread() {
        let thread = json!({ "id": null, "emails": [] });
        let result = normalize_thread(&thread, None);
        assert_eq!(result.processed_message_count, 0);
        assert!(result.normalized_thread.messages.is_empty());
        assert_eq!(result.normalized_thread.thread_id, "unknown");
        let errors = result.errors.unwrap();
        assert!(errors[0].contains("Validation error"));
        assert!(errors[0].contains("InvalidThreadId"));
    }

    #[test]
    fn validation_failure_keeps_known_thread_id() {
        let thread = json!({ "id": "t1", "emails": "nope" });
        let result = normalize_thread(&thread, None);
        assert_eq!(result.normalized_thread.thread_id, "t1");
        assert!(result.errors.unwrap()[0].contains("InvalidEmailsArray"));
    }

    #[test]
    fn bad_options_reported_as_validation_error() {
        let thread = json!({ "id": "t1", "emails": [] });
        let result = normalize_thread(&thread, Some(&json!({ "bogus": true })));
        assert!(result.errors.unwrap()[0].contains("InvalidOptionKey"));
    }

    #[test]
    fn empty_thread_id_rejected_for_gmail_path() {
        let result = normalize_gmail_messages(&json!([]), "", None);
        let errors = result.errors.unwrap();
        assert!(errors[0].contains("Thread ID is required"));
        assert_eq!(result.processed_message_count, 0);
    }

    #[test]
    fn errors_absent_on_clean_run() {
        let thread = json!({ "id": "t1", "emails": [] });
        let result = normalize_thread(&thread, None);
        assert!(result.errors.is_none());
        assert_eq!(result.normalized_thread.thread_id, "t1");
    }

    #[test]
    fn per_message_failure_does_not_abort_batch() {
        let thread = json!({
            "id": "t1",
            "emails": [
                { "id": "good", "body": "hello", "date": "2024-01-15T10:00:00Z" },
                { "id": null, "body": "bad", "date": "2024-01-15T11:00:00Z" }
            ]
        });
        let result = normalize_thread(&thread, None);
        assert_eq!(result.processed_message_count, 1);
        assert_eq!(result.normalized_thread.messages.len(), 1);
        let errors = result.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to process message unknown:"));
    }

    #[test]
    fn sort_is_stable_for_equal_dates() {
        let mut messages = vec![
            message("a", "2024-01-15T10:00:00.000Z"),
            message("b", "2024-01-15T10:00:00.000Z"),
            message("c", "2024-01-15T09:00:00.000Z"),
        ];
        let mut errors = Vec::new();
        sort_by_date(&mut messages, &mut errors);
        let ids: Vec<&str> = messages.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn sort_reports_unparseable_date_and_keeps_order() {
        let mut messages = vec![
            message("a", "not-a-date"),
            message("b", "2024-01-15T09:00:00.000Z"),
        ];
        let mut errors = Vec::new();
        sort_by_date(&mut messages, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Failed to sort messages"));
        assert_eq!(messages[0].message_id, "a");
    }

    fn message(id: &str, date: &str) -> NormalizedMessage {
        NormalizedMessage {
            message_id: id.into(),
            date: date.into(),
            from: String::new(),
            to: Vec::new(),
            subject: String::new(),
            body: "x".into(),
        }
    }
}
