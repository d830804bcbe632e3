//! Indexed access.
//!
//! Every read goes through [`Sequence::get`], which tries the memo store, then the sliding
//! window, then advances the live producer. Bracket indexing and iteration are thin
//! layers over the same call.

use std::ops::Index;

use super::{Retention, Sequence};
use crate::error::{Result, SeqError};

impl<T: Clone + 'static> Sequence<T> {
    /// The element at absolute index `i`.
    ///
    /// Indices below the cursor are served from the store. A sliding window over a
    /// replayable source re-derives evicted indices; anything else no longer retained is
    /// reported as [`SeqError::Evicted`].
    pub fn get(&self, i: usize) -> Result<T> {
        let mut core = self.core_mut()?;
        if let Some(v) = core.lookup(i) {
            return Ok(v.clone());
        }
        if i < core.cursor() {
            return core.replay_at(i);
        }
        core.advance_to(i)
    }

    /// True iff `i` is retained or can be reached by advancing.
    ///
    /// Answering may advance the producer up to `i`.
    pub fn contains(&self, i: usize) -> Result<bool> {
        match self.get(i) {
            Ok(_) => Ok(true),
            Err(SeqError::IndexOutOfRange { .. } | SeqError::Evicted { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Snapshot of what the store currently holds, as `(index, value)` pairs.
    pub fn retained(&self) -> Vec<(usize, T)> {
        let core = self.core_ref();
        core.store()
            .retained(core.cursor())
            .into_iter()
            .map(|(i, v)| (i, v.clone()))
            .collect()
    }

    /// Iterates from index 0 through the facade, ending when the sequence does.
    ///
    /// # Panics
    /// The iterator panics on contract violations (an evicted index, re-entrant access);
    /// use [`try_iter`](Self::try_iter) to observe those instead.
    pub fn iter(&self) -> Iter<T> {
        Iter(self.try_iter())
    }

    pub fn try_iter(&self) -> TryIter<T> {
        TryIter::starting_at(self.clone(), 0)
    }
}

/// Walks a sequence by absolute index, yielding errors instead of ending on them.
///
/// A failed read does not move the position, so the next call asks for the same index.
pub struct TryIter<T> {
    seq: Sequence<T>,
    ix: usize,
}

impl<T: Clone + 'static> TryIter<T> {
    pub(crate) fn starting_at(seq: Sequence<T>, ix: usize) -> Self {
        Self { seq, ix }
    }

    /// The next index this iterator will read.
    pub fn position(&self) -> usize {
        self.ix
    }
}

impl<T: Clone + 'static> Iterator for TryIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.seq.get(self.ix) {
            Ok(v) => {
                self.ix += 1;
                Some(Ok(v))
            }
            Err(SeqError::IndexOutOfRange { .. }) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

pub struct Iter<T>(TryIter<T>);

impl<T: Clone + 'static> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.0.next()? {
            Ok(v) => Some(v),
            Err(e) => panic!("sequence iteration failed at index {}: {e}", self.0.position()),
        }
    }
}

impl<T: Clone + 'static> IntoIterator for &Sequence<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

/// `seq[i]` for memoized sequences.
///
/// # Panics
/// Like slice indexing, on an index the sequence cannot produce. Also panics when the
/// sequence is not memoizing or `i` lies past a memo capacity, since only the memo store
/// keeps elements at a stable address.
impl<T: Clone + 'static> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        if let Err(e) = self.get(i) {
            panic!("{e}");
        }
        let core = self.core_ref();
        let Some(v) = core.store().memo().and_then(|m| m.get(i)) else {
            panic!(
                "bracket indexing needs a memoized sequence (retention is {:?})",
                core.retention()
            );
        };
        let v: *const T = v;
        // SAFETY: memo entries are boxed and never removed or replaced once recorded (the
        // retention cannot change after the first pull), so the pointee lives as long as
        // the core, and the core outlives the `&self` handle keeping it alive.
        unsafe { &*v }
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// True when bracket indexing is available.
    pub fn is_indexable(&self) -> bool {
        matches!(self.retention(), Retention::Memoize(_))
    }
}
