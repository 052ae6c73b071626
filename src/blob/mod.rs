//! Blob wire format.
//!
//! The persisted blob is a UTF-8 JSON object, optionally wrapped in a
//! reversible base64 transform. A reserved `expire` field (Unix-epoch
//! milliseconds) expires the whole blob, not individual keys.

mod codec;

pub use codec::{decode, encode, Blob, BlobError, StoredText, EXPIRE_KEY};
