use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Picks an item with probability proportional to its weight.
///
/// Weights need not be normalized. Returns `None` if no weight is positive.
pub fn weighted_choice<T: Copy, R: Rng + ?Sized>(items: &[(T, f64)], rng: &mut R) -> Option<T> {
    let dist = WeightedIndex::new(items.iter().map(|(_, w)| *w)).ok()?;
    Some(items[dist.sample(rng)].0)
}

/// Derives a reproducible RNG from a text seed, or an entropy-seeded one.
pub fn seeded_rng(seed: Option<&str>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(hash_seed(seed)),
        None => StdRng::from_entropy(),
    }
}

pub fn hash_seed(seed: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(seed.as_bytes());
    hasher.finish()
}
