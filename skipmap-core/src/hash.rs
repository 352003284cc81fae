//! Key hashing for the map façade
//!
//! The skip list engine orders entries by a 64-bit hash, so every user key
//! must reduce to a `u64`. Integers are used as their own hash, which keeps
//! them observable in numeric order; byte-like keys go through a fixed-seed
//! 64-bit hash. Collisions collapse to a single map entry, so callers that
//! need collision resistance must pick keys (or a hash) with enough domain
//! separation.

use ahash::RandomState;

// Fixed seeds keep the hash stable across processes and runs.
const SEEDS: (u64, u64, u64, u64) = (
    0x6c62_272e_07bb_0142,
    0x62b8_2175_6295_c58d,
    0x2000_0000_0000_0000,
    0x5851_f42d_4c95_7f2d,
);

/// Hashes a byte string to a deterministic 64-bit value.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3).hash_one(bytes)
}

/// Keys usable with the map: anything that reduces to a stable 64-bit hash.
///
/// Two keys with the same hash name the same entry.
pub trait HashKey {
    /// Returns the 64-bit hash of this key.
    fn hash64(&self) -> u64;
}

macro_rules! impl_hash_key_for_int {
    ($($t:ty),*) => {
        $(
            impl HashKey for $t {
                fn hash64(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

impl_hash_key_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl HashKey for f32 {
    fn hash64(&self) -> u64 {
        hash_bytes(&self.to_bits().to_le_bytes())
    }
}

impl HashKey for f64 {
    fn hash64(&self) -> u64 {
        hash_bytes(&self.to_bits().to_le_bytes())
    }
}

impl HashKey for str {
    fn hash64(&self) -> u64 {
        hash_bytes(self.as_bytes())
    }
}

impl HashKey for String {
    fn hash64(&self) -> u64 {
        self.as_str().hash64()
    }
}

impl HashKey for [u8] {
    fn hash64(&self) -> u64 {
        hash_bytes(self)
    }
}

impl HashKey for Vec<u8> {
    fn hash64(&self) -> u64 {
        hash_bytes(self)
    }
}

impl<T: HashKey + ?Sized> HashKey for &T {
    fn hash64(&self) -> u64 {
        (**self).hash64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_hash_to_themselves() {
        assert_eq!(0u64.hash64(), 0);
        assert_eq!(345u32.hash64(), 345);
        assert_eq!(7i8.hash64(), 7);
        assert_eq!(usize::MAX.hash64(), u64::MAX);
    }

    #[test]
    fn negative_integers_use_twos_complement() {
        assert_eq!((-1i64).hash64(), u64::MAX);
        assert_eq!((-1i32).hash64(), u32::MAX as u64);
    }

    #[test]
    fn byte_keys_are_deterministic() {
        assert_eq!("key-1".hash64(), "key-1".hash64());
        assert_eq!(String::from("key-1").hash64(), "key-1".hash64());
        assert_eq!(b"key-1".to_vec().hash64(), b"key-1"[..].hash64());
        assert_ne!("key-1".hash64(), "key-2".hash64());
    }

    #[test]
    fn references_delegate() {
        let s = "abc";
        assert_eq!((&s).hash64(), s.hash64());
        assert_eq!((&5u64).hash64(), 5);
    }
}
