//! Resource key derivation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;

/// Longest readable prefix kept in a key before the digest.
const MAX_READABLE_LEN: usize = 80;

/// Hex digits of the SHA-256 digest appended to every key.
const DIGEST_HEX_LEN: usize = 16;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex is valid"));

/// Filesystem-safe identifier of a locked resource.
///
/// The readable part maps path separators and reserved characters to `_`.
/// Distinct paths that normalize to the same readable text (`a/b` and
/// `a_b`) stay distinct through the digest of the raw path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Derive the key for a resource path. Pure: the same input always
    /// yields the same key.
    pub fn from_path(path: &str) -> Self {
        let readable = UNSAFE_CHARS.replace_all(path, "_");
        let readable = readable.trim_matches(|c| c == '_' || c == '.');
        let readable: String = readable.chars().take(MAX_READABLE_LEN).collect();

        let digest = Sha256::digest(path.as_bytes());
        let digest = hex::encode(digest);
        let digest = &digest[..DIGEST_HEX_LEN];

        if readable.is_empty() {
            Self(digest.to_string())
        } else {
            Self(format!("{}-{}", readable, digest))
        }
    }

    /// Wrap an already-derived key, e.g. one read back from a file name.
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
