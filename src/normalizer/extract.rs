//! Field extraction: the two input-shape adapters.
//!
//! Both adapters converge on [`NormalizedMessage`]: one reads an email
//! object from an assembled thread, the other a raw Gmail message with
//! a header list and a nested MIME part tree. Any failure is wrapped in
//! the matching per-message error so the pipeline driver can recover
//! without aborting the batch.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::decode::{
    canonical_date, decode_base64url, decode_header, html_to_text, split_addresses, to_canonical,
};
use super::types::{GmailMessage, MessagePart, MessagePayload, NormalizeOptions, NormalizedMessage};
use crate::error::NormalizeError;

// ── Assembled thread shape ──────────────────────────────────────────

/// Normalize one email from an assembled thread object.
///
/// `from`/`subject` default to empty strings, the date canonicalizer
/// never fails; the only hard requirement is a string `id`.
pub fn normalize_email(
    email: &Value,
    options: &NormalizeOptions,
) -> Result<NormalizedMessage, NormalizeError> {
    let wrap = |reason: &str| NormalizeError::MessageNormalization {
        message_id: email
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string),
        reason: reason.to_string(),
    };

    let Some(obj) = email.as_object() else {
        return Err(wrap("email must be an object"));
    };
    let Some(message_id) = obj.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
    else {
        return Err(wrap("Message ID is required and must be a string"));
    };

    let date = canonical_date(obj.get("date"));
    let from = field_str(obj.get("from"));
    let to = split_addresses(&field_str(obj.get("to")));
    let subject = field_str(obj.get("subject"));

    let mut body = field_str(obj.get("body"));
    if options.convert_html_to_text && !body.is_empty() {
        body = html_to_text(&body);
    }

    Ok(NormalizedMessage {
        message_id: message_id.to_string(),
        date,
        from,
        to,
        subject,
        body: body.trim().to_string(),
    })
}

fn field_str(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ── Raw Gmail shape ─────────────────────────────────────────────────

/// Normalize one raw Gmail message.
///
/// Headers are scanned case-insensitively and passed through the
/// encoded-word decoder before use; the body is pulled from the inline
/// payload or the MIME part tree, with the snippet as last resort.
pub fn normalize_gmail_message(
    message: &Value,
    options: &NormalizeOptions,
) -> Result<NormalizedMessage, NormalizeError> {
    let message_id = message.get("id").and_then(Value::as_str).map(str::to_string);
    let wrap = |reason: String| NormalizeError::GmailMessageNormalization {
        message_id: message_id.clone(),
        reason,
    };

    let parsed: GmailMessage =
        serde_json::from_value(message.clone()).map_err(|err| wrap(err.to_string()))?;

    let timestamp = parse_internal_date(&parsed.internal_date).map_err(|err| wrap(err.to_string()))?;

    let from = header_value(parsed.payload.as_ref(), "From");
    let to = split_addresses(&header_value(parsed.payload.as_ref(), "To"));
    let subject = header_value(parsed.payload.as_ref(), "Subject");

    let mut body = extract_body(parsed.payload.as_ref(), &parsed.snippet);
    if options.convert_html_to_text && !body.is_empty() {
        body = html_to_text(&body);
    }

    Ok(NormalizedMessage {
        message_id: parsed.id,
        date: to_canonical(timestamp),
        from,
        to,
        subject,
        body: body.trim().to_string(),
    })
}

/// Parse an epoch-millisecond string. A non-numeric or unrepresentable
/// value is a per-message error, never a silent zero.
fn parse_internal_date(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let err = || NormalizeError::MalformedInternalDate {
        value: raw.to_string(),
    };
    let ms: i64 = raw.trim().parse().map_err(|_| err())?;
    DateTime::from_timestamp_millis(ms).ok_or_else(err)
}

/// Case-insensitive header lookup, decoded from RFC 2047 encoded words.
fn header_value(payload: Option<&MessagePayload>, name: &str) -> String {
    payload
        .map(|p| p.headers.as_slice())
        .unwrap_or_default()
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| decode_header(&h.value))
        .unwrap_or_default()
}

/// Pull the best available body text out of a Gmail payload.
///
/// Preference order: inline body data, then a `text/plain` part, then a
/// `text/html` part (always stripped, since it is the only source), then any
/// other `text/*` part. The snippet stands in only when no body source
/// exists at all; a body that decodes to empty text stays empty.
fn extract_body(payload: Option<&MessagePayload>, snippet: &str) -> String {
    match payload.and_then(payload_body) {
        Some(body) => body,
        None => snippet.trim().to_string(),
    }
}

fn payload_body(payload: &MessagePayload) -> Option<String> {
    if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
        return Some(decode_base64url(data));
    }
    if let Some(data) = find_part_data(&payload.parts, |mime| mime == "text/plain") {
        return Some(decode_base64url(data));
    }
    if let Some(data) = find_part_data(&payload.parts, |mime| mime == "text/html") {
        return Some(html_to_text(&decode_base64url(data)));
    }
    if let Some(data) = find_part_data(&payload.parts, |mime| mime.starts_with("text/")) {
        return Some(decode_base64url(data));
    }
    None
}

/// Depth-first search of the part tree for the first part matching
/// `matches` that carries body data.
fn find_part_data<'a>(
    parts: &'a [MessagePart],
    matches: impl Fn(&str) -> bool + Copy,
) -> Option<&'a str> {
    for part in parts {
        if matches(&part.mime_type)
            && let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref())
        {
            return Some(data);
        }
        if let Some(data) = find_part_data(&part.parts, matches) {
            return Some(data);
        }
    }
    None
}
