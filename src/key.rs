//! Key ordering contract
//!
//! Keys are opaque byte strings ordered byte-wise lexicographically. A key
//! that is a strict prefix of another sorts first. Both engines and all seek
//! logic go through this module so the order can never drift between them.

use std::cmp::Ordering;

/// Compare two keys byte-wise.
#[inline]
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// An empty seek key means "start from the smallest key".
#[inline]
pub fn normalize_seek(seek: Option<&[u8]>) -> Option<&[u8]> {
    seek.filter(|s| !s.is_empty())
}

/// Smallest key strictly greater than `key`.
///
/// Seeking to `next_key(k)` skips `k` itself and nothing else.
pub fn next_key(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);
    next
}

/// Smallest key greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix, or a prefix made
/// only of `0xFF` bytes).
pub fn prefix_next(prefix: &[u8]) -> Option<Vec<u8>> {
    let pos = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut next = prefix[..=pos].to_vec();
    next[pos] += 1;
    Some(next)
}
