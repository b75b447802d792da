//! Inbox Assist: email thread normalization core.
//!
//! Converts heterogeneous email representations (raw Gmail-style
//! provider messages with nested MIME parts, or already-assembled
//! thread objects with mixed HTML/plain-text bodies) into a canonical,
//! validated, sorted structure ready for LLM consumption.
//!
//! The two entry points are [`normalize_thread`] and
//! [`normalize_gmail_messages`]. Both are synchronous, pure and total:
//! every failure is captured in the returned [`NormalizeResult`], never
//! surfaced as a panic or an error to the caller.

pub mod error;
pub mod normalizer;

pub use error::NormalizeError;
pub use normalizer::types::{
    NormalizeOptions, NormalizeResult, NormalizedMessage, NormalizedThread,
};
pub use normalizer::{normalize_gmail_messages, normalize_thread};
