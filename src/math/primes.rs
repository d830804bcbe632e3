use fixedbitset::FixedBitSet;

use crate::{
    error::Result,
    seq::{Options, Sequence, Source},
};

const SMALL_PRIMES: &[u64] = &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
// the first segment starts at 7^2 and is sieved by these
const SEED_PRIMES: &[u64] = &[3, 5, 7];

/// The half-index (relative to `lo`) of the first odd multiple of `p` at or above `lo`.
fn first_offset(p: u64, lo: u64) -> usize {
    let mut m = lo.div_ceil(p) * p;
    if m % 2 == 0 {
        m += p;
    }
    ((m - lo) / 2) as usize
}

/// One odd-only sieve segment `[lo, hi)`, where `lo` and `hi` are consecutive prime squares.
///
/// Only odd numbers are stored, so bit `k` stands for `lo + 2k`. Each sieving prime keeps
/// the offset of its next multiple, carried over from segment to segment so the division
/// happens once per prime.
struct Segment {
    sievers: Vec<(u64, usize)>,
    // supplies the sieving prime whose square closes the current segment
    feed: Box<Primes>,
    upcoming: u64,
    lo: u64,
    hi: u64,
    composite: FixedBitSet,
    ix: usize,
}

impl Segment {
    fn new() -> Self {
        let mut feed = Box::new(Primes::new());
        // 2, then the seed primes
        feed.nth(SEED_PRIMES.len());
        let last = SEED_PRIMES[SEED_PRIMES.len() - 1];
        let lo = last * last;
        let mut seg = Segment {
            sievers: SEED_PRIMES.iter().map(|&p| (p, first_offset(p, lo))).collect(),
            upcoming: 0,
            feed,
            lo,
            hi: lo,
            composite: FixedBitSet::new(),
            ix: 0,
        };
        seg.sieve_next();
        seg
    }

    /// Moves to `[hi, next_prime^2)` and crosses off composites.
    fn sieve_next(&mut self) {
        if self.upcoming != 0 {
            self.sievers.push((self.upcoming, 0));
        }
        // the feed is unbounded; u64 squares run out long before it does
        self.upcoming = self.feed.next().unwrap_or(u64::MAX);
        self.lo = self.hi;
        self.hi = self.upcoming.saturating_mul(self.upcoming);

        let len = ((self.hi - self.lo) / 2) as usize;
        self.composite = FixedBitSet::with_capacity(len);
        for (p, next) in &mut self.sievers {
            let step = *p as usize;
            let mut k = *next;
            while k < len {
                self.composite.insert(k);
                k += step;
            }
            *next = k - len;
        }
        self.ix = 0;
    }

    fn next(&mut self) -> u64 {
        loop {
            while self.ix < self.composite.len() {
                let k = self.ix;
                self.ix += 1;
                if !self.composite.contains(k) {
                    return self.lo + 2 * k as u64;
                }
            }
            self.sieve_next();
        }
    }
}

enum Stage {
    Small(usize),
    Sieving(Segment),
}

/// Every prime, in order, by an incremental segmented sieve.
///
/// The small primes are listed outright; after that each segment between consecutive
/// prime squares is sieved by the primes below it, which a nested `Primes` supplies.
pub struct Primes {
    stage: Stage,
}

impl Primes {
    pub fn new() -> Self {
        Primes {
            stage: Stage::Small(0),
        }
    }
}

impl Default for Primes {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        match &mut self.stage {
            Stage::Small(ix) => match SMALL_PRIMES.get(*ix) {
                Some(&p) => {
                    *ix += 1;
                    Some(p)
                }
                None => {
                    let mut seg = Segment::new();
                    let p = seg.next();
                    self.stage = Stage::Sieving(seg);
                    Some(p)
                }
            },
            Stage::Sieving(seg) => Some(seg.next()),
        }
    }
}

/// The primes as a replayable sequence. Each consumer that needs to go back gets a fresh sieve.
pub fn primes() -> Sequence<u64> {
    Sequence::replayable(Primes::new)
}

/// A memoized prime list shared by everything that asks for primes.
///
/// Lookups by position are served from the memo once the sieve has passed them.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    seq: Sequence<u64>,
}

impl PrimeTable {
    pub fn new() -> Self {
        let seq = Sequence::new(
            Source::replayable(Primes::new),
            Options::new().memo(true).prefetch(64),
        );
        PrimeTable { seq }
    }

    /// The `n`-th prime, counting from zero.
    pub fn nth(&self, n: usize) -> Result<u64> {
        self.seq.get(n)
    }

    /// All primes strictly below `n`.
    pub fn below(&self, n: u64) -> Result<Vec<u64>> {
        self.seq.take_while(move |&p| p < n).to_vec()
    }

    /// Trial division by the tabled primes up to `sqrt(n)`.
    pub fn is_prime(&self, n: u64) -> Result<bool> {
        if n < 2 {
            return Ok(false);
        }
        for p in self.seq.try_iter() {
            let p = p?;
            if p.saturating_mul(p) > n {
                break;
            }
            if n % p == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn sequence(&self) -> Sequence<u64> {
        self.seq.clone()
    }
}

impl Default for PrimeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn trial(n: u64) -> bool {
        n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn test_first_primes() {
        let got = Primes::new().take(100).collect_vec();
        let want = (0..542).filter(|&n| trial(n)).collect_vec();
        assert_eq!(got, want);
    }

    #[test]
    fn test_across_segments() {
        // well past the nested sieve's first segment
        let got = Primes::new().take_while(|&p| p < 40_000).collect_vec();
        let want = (0..40_000).filter(|&n| trial(n)).collect_vec();
        assert_eq!(got.len(), 4_203);
        assert_eq!(got, want);
    }

    #[test]
    fn test_first_offset() {
        // odd multiples only: 51 = 3 * 17 sits at half-index 1 above 49
        assert_eq!(first_offset(3, 49), 1);
        assert_eq!(first_offset(7, 49), 0);
        assert_eq!(first_offset(5, 49), 3);
    }

    #[test]
    fn test_sequence_and_table() {
        assert_eq!(primes().get(10), Ok(31));
        let table = PrimeTable::new();
        assert_eq!(table.nth(0), Ok(2));
        assert_eq!(table.nth(999), Ok(7_919));
        assert_eq!(table.below(30), Ok(vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]));
        assert_eq!(table.is_prime(7_919), Ok(true));
        assert_eq!(table.is_prime(7_917), Ok(false));
        assert_eq!(table.is_prime(1), Ok(false));
        // the table reuses its memo
        let seq = table.sequence();
        assert!(seq.cursor() >= 1_000);
        assert_eq!(seq[999], 7_919);
    }
}
