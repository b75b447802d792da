//! Shared types for the thread normalization pipeline.
//!
//! The raw provider shapes (`GmailMessage` and friends) mirror the
//! Gmail-style JSON the mail-provider client hands over; they are
//! deserialized leniently since the provider omits fields freely. The
//! `Normalized*` types are the core-owned output contract consumed by
//! the text-generation collaborator, hence the camelCase wire names.

use serde::{Deserialize, Serialize};

/// Recognized option keys on the JSON options object.
pub const VALID_OPTION_KEYS: [&str; 3] =
    ["convertHtmlToText", "sortMessages", "excludeEmptyMessages"];

// ── Raw provider shapes ─────────────────────────────────────────────

/// Raw Gmail-style message as returned by the provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    /// Short plain-text preview; used as a body of last resort.
    #[serde(default)]
    pub snippet: String,
    /// Epoch milliseconds, encoded as a decimal string.
    pub internal_date: String,
    #[serde(default)]
    pub payload: Option<MessagePayload>,
}

/// Message payload: flat header list plus either an inline body or a
/// tree of MIME parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

/// A single name/value header pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Body payload of a message or MIME part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    /// URL-safe base64 encoded content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Set when the content lives in a separate attachment resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
}

/// One node of a (possibly nested) MIME part tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    /// Non-empty for attachment parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

// ── Normalized output ───────────────────────────────────────────────

/// One canonical message: the unit consumed by prompt construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    pub message_id: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub date: String,
    /// Sender, empty string when the source carried none.
    pub from: String,
    /// Recipient addresses, order-preserving, never null.
    pub to: Vec<String>,
    /// May be empty.
    pub subject: String,
    /// Plain text, trimmed; never HTML-tagged when conversion is on.
    pub body: String,
}

/// A normalized thread: identifier plus ordered messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedThread {
    pub thread_id: String,
    pub messages: Vec<NormalizedMessage>,
}

/// Outcome of one normalization call.
///
/// Always structurally valid: a non-empty `errors` list signals partial
/// success, and callers may still use `normalized_thread`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResult {
    pub normalized_thread: NormalizedThread,
    /// Messages that assembled successfully, including any later dropped
    /// by the empty-message filter.
    pub processed_message_count: usize,
    /// `None` when no problem occurred, never present-but-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

// ── Options ─────────────────────────────────────────────────────────

/// Normalization behavior flags. All default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Convert HTML bodies to plain text.
    pub convert_html_to_text: bool,
    /// Stable-sort messages by ascending timestamp.
    pub sort_messages: bool,
    /// Drop messages whose body is empty after processing.
    pub exclude_empty_messages: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            convert_html_to_text: true,
            sort_messages: true,
            exclude_empty_messages: true,
        }
    }
}
