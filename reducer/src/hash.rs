//! Order-sensitive index hashing for cheap change detection.
//!
//! A recomputed index is compared to its predecessor by a folded hash first and by an
//! element-wise scan only when the hashes collide, so the common "nothing changed" case
//! costs one pass over the keys.

use core::hash::{Hash, Hasher};

const FNV_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Golden-ratio mixing constant, shared with the classic `hash_combine` fold.
const FOLD_CONST: u64 = 0x9E37_79B9;

/// Deterministic FNV-1a hasher.
///
/// The std `DefaultHasher` is randomly seeded per process; index hashes must be
/// reproducible so tests (and persisted snapshots of derived state) can assert on them.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StableHasher(u64);

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self(FNV_OFFSET)
    }
}

impl Hasher for StableHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Hashes a single index element deterministically.
pub(crate) fn hash_element<K: Hash>(key: &K) -> u64 {
    let mut h = StableHasher::new();
    key.hash(&mut h);
    h.finish()
}

/// Folds element hashes into one order-sensitive index hash.
///
/// `h ^= e + FOLD_CONST + (h << 6) + (h >> 2)`. Reordering two elements changes the
/// result, which is what distinguishes `[1, 2, 3]` from `[3, 2, 1]` here.
pub(crate) fn index_hash<K: Hash>(keys: &[K]) -> u64 {
    let mut h = FNV_OFFSET;
    for key in keys {
        h ^= hash_element(key)
            .wrapping_add(FOLD_CONST)
            .wrapping_add(h << 6)
            .wrapping_add(h >> 2);
    }
    h
}

/// Decides whether a freshly computed index differs from the stored one.
///
/// Hash inequality is decisive; equal hashes fall back to an element-wise comparison so
/// a fold collision can never suppress a notification.
pub(crate) fn index_changed<K: Eq>(
    old_index: Option<&[K]>,
    old_hash: Option<u64>,
    new_index: Option<&[K]>,
    new_hash: Option<u64>,
) -> bool {
    if old_hash != new_hash {
        return true;
    }
    match (old_index, new_index) {
        (Some(old), Some(new)) => old != new,
        (None, None) => false,
        _ => true,
    }
}
