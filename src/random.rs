//! Cryptographic random source.

use rand::rngs::OsRng;
use rand::{Rng, RngCore, TryRngCore};

/// The operating system's CSPRNG.
///
/// A failing OS random source means a broken environment, so errors panic
/// rather than surfacing as pattern errors.
pub fn secure_rng() -> impl RngCore {
    OsRng.unwrap_err()
}

/// Draw an index uniformly from `[0, n)`.
///
/// `n` must be non-zero.
pub fn uniform(rng: &mut dyn RngCore, n: usize) -> usize {
    rng.random_range(0..n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..50 {
            assert!(uniform(&mut rng, n) < n);
        }
    }

    #[test]
    fn uniform_of_one_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 1), 0);
    }

    #[test]
    fn secure_rng_produces_values() {
        let mut rng = secure_rng();
        let seen: std::collections::HashSet<usize> =
            (0..64).map(|_| uniform(&mut rng, 1 << 20)).collect();
        assert!(seen.len() > 1);
    }
}
