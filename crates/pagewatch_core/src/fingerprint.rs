use std::collections::BTreeSet;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ExtractionResult;

/// Text digested when a result is empty.
pub const EMPTY_MARKER: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FingerprintMode {
    /// Digest of a bounded, ordered text prefix.
    #[default]
    Scalar,
    /// The deduplicated item set itself; order-insensitive.
    SetBased,
}

/// Comparable summary of one observation.
///
/// Fingerprints of different kinds never compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    Digest(String),
    MembershipSet(BTreeSet<String>),
}

impl Fingerprint {
    /// Zero value used before anything has been recorded.
    pub fn empty(mode: FingerprintMode) -> Self {
        match mode {
            FingerprintMode::Scalar => Self::Digest(String::new()),
            FingerprintMode::SetBased => Self::MembershipSet(BTreeSet::new()),
        }
    }

    pub fn mode(&self) -> FingerprintMode {
        match self {
            Self::Digest(_) => FingerprintMode::Scalar,
            Self::MembershipSet(_) => FingerprintMode::SetBased,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Digest(digest) => digest.is_empty(),
            Self::MembershipSet(set) => set.is_empty(),
        }
    }
}

/// Reduces `result` to a fingerprint.
///
/// In scalar mode only the first `sample_byte_limit` bytes of the joined
/// lines are digested, so trailing volatile content past that point is ignored.
pub fn fingerprint(
    result: &ExtractionResult,
    mode: FingerprintMode,
    sample_byte_limit: usize,
) -> Fingerprint {
    match mode {
        FingerprintMode::Scalar => {
            let joined = if result.is_empty() {
                EMPTY_MARKER.to_string()
            } else {
                result.items().join("\n")
            };
            let sample = truncate_to_boundary(&joined, sample_byte_limit);
            Fingerprint::Digest(sha256_hex(sample))
        }
        FingerprintMode::SetBased => {
            Fingerprint::MembershipSet(result.items().iter().cloned().collect())
        }
    }
}

/// Longest prefix of `text` that fits in `limit` bytes without splitting a char.
pub fn truncate_to_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
