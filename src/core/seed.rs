//! Stateless seeded hashing
//!
//! Geometry jitter, crisis region assignment and marker offsets must be
//! reproducible from `(ids, counters)` alone, so they hash a string seed
//! instead of drawing from an RNG.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the seed bytes, finished with an avalanche mix
pub fn hash(seed: &str) -> u32 {
    let mut h = FNV_OFFSET;
    for b in seed.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^ (h >> 16)
}

/// Deterministic value in `[-1.0, 1.0]` for `seed` and `salt`
pub fn unit(seed: &str, salt: &str) -> f64 {
    let h = hash(&format!("{}#{}", seed, salt));
    (h % 2001) as f64 / 1000.0 - 1.0
}

/// Deterministic index into a collection of `len` items
pub fn pick(seed: &str, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    hash(seed) as usize % len
}
