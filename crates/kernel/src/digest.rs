use sha2::{Digest, Sha256};
use std::ops::Range;

/// Length of a [`SeedDigest`] in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 256-bit SHA-256 digest of a seed and its inputs, sliced into
/// non-overlapping byte ranges that each drive exactly one output field.
///
/// Every generator derives all of its output from one of these and nothing
/// else, which is what makes generation referentially transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedDigest([u8; DIGEST_LEN]);

impl SeedDigest {
    /// Hash the concatenation of `parts`. Each part is length-prefixed so
    /// that `("ab", "c")` and `("a", "bc")` never collide.
    pub fn of(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        let result = hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Big-endian integer value of the bytes in `range` (at most 8 bytes).
    pub fn value(&self, range: Range<usize>) -> u64 {
        debug_assert!(range.len() <= 8, "byte range wider than u64");
        self.0[range]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }

    /// Select one of `cardinality` discrete values.
    pub fn pick(&self, range: Range<usize>, cardinality: u64) -> u64 {
        debug_assert!(cardinality > 0);
        self.value(range) % cardinality
    }

    /// Map onto the closed interval `lo..=hi` (modulo then affine shift).
    pub fn span(&self, range: Range<usize>, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo <= hi);
        lo + self.value(range) % (hi - lo + 1)
    }
}

/// True when no two ranges share a byte and all fit inside the digest.
pub fn ranges_are_disjoint(ranges: &[Range<usize>]) -> bool {
    let mut used = [false; DIGEST_LEN];
    for range in ranges {
        if range.end > DIGEST_LEN {
            return false;
        }
        for i in range.clone() {
            if used[i] {
                return false;
            }
            used[i] = true;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_parts_same_digest() {
        let a = SeedDigest::of(&[b"abc", &3i32.to_le_bytes()]);
        let b = SeedDigest::of(&[b"abc", &3i32.to_le_bytes()]);
        assert_eq!(a, b);
    }

    #[test]
    fn length_prefix_prevents_concatenation_collisions() {
        let a = SeedDigest::of(&[b"ab", b"c"]);
        let b = SeedDigest::of(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn value_is_big_endian() {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[4] = 0x01;
        bytes[5] = 0x02;
        let d = SeedDigest::from_bytes(bytes);
        assert_eq!(d.value(4..6), 0x0102);
        assert_eq!(d.pick(4..6, 10), 0x0102 % 10);
        assert_eq!(d.span(4..6, 5, 9), 5 + 0x0102 % 5);
    }

    #[test]
    fn disjointness_check() {
        assert!(ranges_are_disjoint(&[0..2, 2..4, 30..32]));
        assert!(!ranges_are_disjoint(&[0..3, 2..4]));
        assert!(!ranges_are_disjoint(&[30..33]));
    }
}
