//! Transport decoding helpers: base64url bodies, HTML stripping,
//! RFC 2047 headers, address lists, timestamps.
//!
//! Everything here sits in the most lenient error tier of the pipeline:
//! failures are logged as warnings and degrade to a safe value instead
//! of raising.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::warn;

/// Decode a URL-safe base64 body payload to UTF-8 text.
///
/// Tolerates the standard alphabet (`+`/`/`) and any padding. Never
/// fails: undecodable input logs a warning and yields an empty string.
pub fn decode_base64url(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }

    let cleaned: String = data
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    match URL_SAFE_NO_PAD.decode(cleaned.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            warn!(error = %err, "Failed to decode base64 body data");
            String::new()
        }
    }
}

/// Strip HTML tags and collapse whitespace runs to single spaces.
///
/// Idempotent on plain text, and total: no failure path exists that
/// could lose message content.
pub fn html_to_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode RFC 2047 encoded words (`=?UTF-8?B?...?=`, `?Q?`) in a header
/// value. Plain values pass through unchanged.
///
/// Lenient: a decode failure logs a warning and keeps the raw value,
/// a mangled header is never a reason to drop a message.
pub fn decode_header(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match rfc2047_decoder::decode(value.as_bytes()) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(error = %err, "Failed to decode encoded-word header");
            value.to_string()
        }
    }
}

/// Split a delimited address header into individual addresses.
///
/// Splits on commas and semicolons, trims, drops empties. No
/// deduplication; order is preserved as received.
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical ISO-8601 UTC rendering with millisecond precision.
pub fn to_canonical(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Canonicalize a loosely-typed date value: an RFC 3339 string, an
/// epoch-millisecond string, or an epoch-millisecond number.
///
/// Never fails: unusable input logs a warning and falls back to the
/// current time, so the output is always a valid timestamp.
pub fn canonical_date(value: Option<&Value>) -> String {
    if let Some(date) = value.and_then(parse_date_value) {
        return to_canonical(date);
    }
    warn!(?value, "Invalid date value, falling back to current time");
    to_canonical(Utc::now())
}

fn parse_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                s.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
