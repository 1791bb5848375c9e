//! Portable pseudo-randomness for resumable trial ordering.
//!
//! The constants are fixed so any client reproduces the same sequence for the
//! same run id. Do not swap in a platform PRNG here.

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
const LCG_MODULUS: f64 = 4_294_967_296.0; // 2^32

/// 32-bit linear congruential generator.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / LCG_MODULUS
    }

    /// Uniform index in `[0, bound)`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let index = (self.next_f64() * bound as f64).floor() as usize;
        index.min(bound - 1)
    }
}

/// Seed derived from a run id: the sum of its UTF-16 code units.
pub fn seed_from_run_id(run_id: &str) -> u32 {
    run_id
        .encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)))
}

/// In-place Fisher–Yates shuffle.
///
/// `pick(n)` must return an index in `[0, n)`; callers pass either an [`Lcg`]
/// stream or a `rand` generator.
pub fn fisher_yates<T>(items: &mut [T], mut pick: impl FnMut(usize) -> usize) {
    for i in (1..items.len()).rev() {
        let j = pick(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_known_sequence() {
        let mut lcg = Lcg::new(0);
        assert_eq!(lcg.next_u32(), 1_013_904_223);
        assert_eq!(lcg.next_u32(), 1_196_435_762);
    }

    #[test]
    fn seed_sums_code_units() {
        assert_eq!(seed_from_run_id(""), 0);
        assert_eq!(seed_from_run_id("AB"), 65 + 66);
        assert_eq!(seed_from_run_id("é"), 0xe9);
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut lcg = Lcg::new(7);
        for bound in 1..50 {
            for _ in 0..50 {
                assert!(lcg.next_index(bound) < bound);
            }
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..100).collect();
        let mut lcg = Lcg::new(42);
        fisher_yates(&mut items, |n| lcg.next_index(n));
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
        assert_ne!(items, sorted);
    }
}
