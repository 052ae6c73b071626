use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use crate::store::Container;

/// Reserved blob field holding the whole-blob expiration stamp.
pub const EXPIRE_KEY: &str = "expire";

/// Errors from decoding a persisted blob.
///
/// A blob that fails here fails initialization; there is no silent
/// fallback to defaults for corrupt data.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("stored text is neither a JSON object nor transform-encoded")]
    Malformed,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transform decode error: {0}")]
    Transform(#[from] base64::DecodeError),
    #[error("decoded blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Structural classification of stored text, decided before any
/// transform reversal is attempted.
///
/// A JSON object always opens with `{`, which is outside the base64
/// alphabet, so the two shapes never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredText<'a> {
    /// Plain JSON object text.
    Plain(&'a str),
    /// Base64-wrapped JSON object text.
    Encoded(&'a str),
    /// Neither; decoding will fail with [`BlobError::Malformed`].
    Malformed,
}

impl<'a> StoredText<'a> {
    /// Classify raw stored text by shape.
    pub fn classify(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            StoredText::Plain(trimmed)
        } else if !trimmed.is_empty() && trimmed.bytes().all(is_base64_byte) {
            StoredText::Encoded(trimmed)
        } else {
            StoredText::Malformed
        }
    }
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

/// A decoded persisted blob.
///
/// Entries carry the container contents verbatim, including the
/// reserved `expire` field when present; expiration is checked against
/// it but it is not stripped, so a live blob re-persists its own stamp.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Blob {
    #[serde(flatten)]
    pub entries: Container,
}

impl Blob {
    /// The blob's expiration stamp in Unix-epoch milliseconds, if any.
    pub fn expire_ms(&self) -> Option<f64> {
        self.entries.get(EXPIRE_KEY).and_then(Value::as_f64)
    }

    /// Whether the blob should still be applied at `now_ms`.
    ///
    /// Strictly before the stamp only; a blob expiring exactly now is
    /// already dead. Blobs without a stamp never expire. The stamp is
    /// a number by contract: a non-numeric `expire` is ignored (the
    /// blob never expires), and an `expire` of 0 is a past stamp and
    /// expires immediately.
    pub fn is_live(&self, now_ms: f64) -> bool {
        match self.expire_ms() {
            Some(expire) => now_ms < expire,
            None => true,
        }
    }

    /// Merge this blob on top of `defaults`.
    ///
    /// Blob entries win; defaults only survive for keys the blob does
    /// not carry.
    pub fn merge_over(self, defaults: &Container) -> Container {
        let mut merged = defaults.clone();
        for (key, value) in self.entries {
            merged.insert(key, value);
        }
        merged
    }
}

/// Decode stored text into a blob.
pub fn decode(raw: &str) -> Result<Blob, BlobError> {
    match StoredText::classify(raw) {
        StoredText::Plain(text) => Ok(serde_json::from_str(text)?),
        StoredText::Encoded(text) => {
            let bytes = general_purpose::STANDARD.decode(text)?;
            let text = String::from_utf8(bytes)?;
            Ok(serde_json::from_str(&text)?)
        }
        StoredText::Malformed => Err(BlobError::Malformed),
    }
}

/// Serialize a container to stored text, applying the reversible
/// transform when `transform` is set.
pub fn encode(container: &Container, transform: bool) -> Result<String, BlobError> {
    let text = serde_json::to_string(container)?;
    if transform {
        Ok(general_purpose::STANDARD.encode(text))
    } else {
        Ok(text)
    }
}
