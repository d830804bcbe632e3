//! A uniform sample of `k` primes below `n`, reproducible from `seed` (default 0).

use itertools::Itertools;
use rand::{SeedableRng, rngs::SmallRng};

use crate::math::primes;

crate::problem! {
    (k: usize, n: u64, seed: Option<u64>) {
        let mut rng = SmallRng::seed_from_u64(seed.unwrap_or(0));
        let mut picked = primes().take_while(move |&p| p < n).sample(k, None, &mut rng)?;
        picked.sort_unstable();
        Ok(picked.iter().join(","))
    }
}
