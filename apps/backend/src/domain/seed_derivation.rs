//! RNG seed derivation for deterministic matches.
//!
//! A registry configured with a base seed derives one seed per created
//! match, so a whole session replays identically from a single number.

/// Derive the RNG seed for the `match_no`-th match created from `base_seed`.
///
/// Distinct `match_no` values give distinct seeds for a fixed base.
pub fn derive_match_seed(base_seed: u64, match_no: u64) -> u64 {
    // splitmix64 finalizer over the combined input
    let mut z = base_seed.wrapping_add(match_no.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
