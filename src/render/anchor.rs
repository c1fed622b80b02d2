use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::value::Handle;

/// Length of a rendered anchor id, in hex characters.
pub const ANCHOR_LEN: usize = 12;

/// Derives the anchor id recursion markers point back at.
///
/// Digest-based rather than the raw index so anchors are opaque and
/// fixed-width; deterministic so the same container renders the same anchor
/// in every run.
pub fn anchor_for(handle: Handle) -> String {
    let digest = Sha256::digest(handle.index().to_le_bytes());
    let mut out = String::with_capacity(ANCHOR_LEN);
    for byte in digest.iter().take(ANCHOR_LEN / 2) {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
