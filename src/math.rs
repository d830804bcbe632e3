//! Number-theoretic sequences built on the set engine.

use std::{iter, ops::Add};

use num_traits::One;

use crate::seq::Sequence;

mod primes;

pub use primes::{PrimeTable, Primes, primes};

/// `from, from + 1, from + 2, ...` without end.
pub fn naturals<T>(from: T) -> Sequence<T>
where
    T: Clone + One + Add<Output = T> + 'static,
{
    Sequence::replayable(move || iter::successors(Some(from.clone()), |n| Some(n.clone() + T::one())))
}

/// The Fibonacci numbers `1, 1, 2, 3, 5, ...`, ending where the next one would overflow a `u64`.
pub fn fibonacci() -> Sequence<u64> {
    Sequence::replayable(|| {
        iter::successors(Some((1u64, Some(1u64))), |&(a, b)| b.map(|b| (b, b.checked_add(a))))
            .map(|(a, _)| a)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::State;

    #[test]
    fn test_naturals() {
        assert_eq!(naturals(5u8).take(3).to_vec(), Ok(vec![5, 6, 7]));
        let n = naturals(0i64);
        assert_eq!(n.get(1_000), Ok(1_000));
        // never drained
        assert_eq!(n.state(), State::Active);
    }

    #[test]
    fn test_fibonacci() {
        let head = fibonacci().take(10).to_vec();
        assert_eq!(head, Ok(vec![1, 1, 2, 3, 5, 8, 13, 21, 34, 55]));
        // F(93) is the last one that fits
        assert_eq!(fibonacci().last(), Ok(Some(12_200_160_415_121_876_738)));
        let f = fibonacci();
        assert_eq!(f.count(), Ok(93));
        assert_eq!(f.state(), State::Exhausted);
    }
}
