//! Deterministic seed derivation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream reserved for farm layout (gates and initial placement).
pub const LAYOUT_STREAM: u64 = u64::MAX;

/// Derives a per-stream seed from a master seed.
///
/// `master_seed * golden_ratio + stream * prime`, so that changing the number
/// of agents never shifts the stream of any other agent.
pub fn derive_seed(master_seed: u64, stream: u64) -> u64 {
    master_seed
        .wrapping_mul(0x9e3779b97f4a7c15)
        .wrapping_add(stream.wrapping_mul(0x517cc1b727220a95))
}

/// Builds the RNG for a stream.
pub fn stream_rng(master_seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(master_seed, stream))
}
