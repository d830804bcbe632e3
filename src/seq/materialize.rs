//! Terminal operations.
//!
//! Everything here except [`Sequence::sample`] with a prefix limit drains the whole
//! sequence and therefore needs a finite source. A source that keeps producing past the
//! sequence's `max_pulls` is reported as [`SeqError::UnboundedMaterialization`] rather
//! than left to hang.

use std::cmp::Ordering;

use rand::Rng;
use tracing::warn;

use super::Sequence;
use crate::error::{Result, SeqError};

impl<T: Clone + 'static> Sequence<T> {
    /// Folds every element into `acc`, in order, and reports how many there were.
    fn fold_all<A>(&self, init: A, mut f: impl FnMut(A, T) -> A) -> Result<(A, usize)> {
        let limit = self.limits().max_pulls;
        let mut acc = init;
        let mut pulled = 0;
        for item in self.try_iter().take(limit) {
            acc = f(acc, item?);
            pulled += 1;
        }
        if pulled == limit && self.contains(limit)? {
            warn!(limit, "materialization safety cap reached");
            return Err(SeqError::UnboundedMaterialization { limit });
        }
        Ok((acc, pulled))
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        let (out, _) = self.fold_all(Vec::new(), |mut out, v| {
            out.push(v);
            out
        })?;
        Ok(out)
    }

    pub fn reduce<A, F>(&self, init: A, f: F) -> Result<A>
    where
        F: FnMut(A, T) -> A,
    {
        self.fold_all(init, f).map(|(acc, _)| acc)
    }

    pub fn count(&self) -> Result<usize> {
        self.fold_all((), |(), _| ()).map(|(_, n)| n)
    }

    pub fn sort(&self) -> Result<Vec<T>>
    where
        T: Ord,
    {
        let mut out = self.to_vec()?;
        out.sort();
        Ok(out)
    }

    pub fn sort_by<F>(&self, cmp: F) -> Result<Vec<T>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut out = self.to_vec()?;
        out.sort_by(cmp);
        Ok(out)
    }

    pub fn first(&self) -> Result<Option<T>> {
        match self.get(0) {
            Ok(v) => Ok(Some(v)),
            Err(SeqError::IndexOutOfRange { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn last(&self) -> Result<Option<T>> {
        self.fold_all(None, |_, v| Some(v)).map(|(last, _)| last)
    }

    /// A uniform sample of `n` elements by reservoir sampling (Algorithm R).
    ///
    /// For the i-th element pulled (1-indexed): while `i <= n` it fills the reservoir;
    /// after that `j` is drawn uniformly from `[0, i)` and the element replaces slot `j`
    /// when `j < n`, so it is kept with probability `n / i`.
    ///
    /// With `limit` set only the first `limit` elements are considered, which makes this
    /// safe on unbounded sources. Without it the whole sequence is drained, under the
    /// usual safety cap. Fewer than `n` elements yields all of them, in order.
    pub fn sample<R: Rng>(
        &self,
        n: usize,
        limit: Option<usize>,
        rng: &mut R,
    ) -> Result<Vec<T>> {
        let mut reservoir = Vec::with_capacity(n);
        let mut consider = |i: usize, v: T| {
            if i <= n {
                reservoir.push(v);
            } else {
                let j = rng.random_range(0..i);
                if j < n {
                    reservoir[j] = v;
                }
            }
        };
        match limit {
            Some(limit) => {
                for (k, item) in self.try_iter().take(limit).enumerate() {
                    consider(k + 1, item?);
                }
            }
            None => {
                self.fold_all(1, |i, v| {
                    consider(i, v);
                    i + 1
                })?;
            }
        }
        Ok(reservoir)
    }
}
