//! Lazy operators.
//!
//! Each operator returns a child sequence holding a recipe over its parent handles. No
//! operator pulls anything when called; the child's producer is opened by the child's
//! own first access and reads the parent's logical values through a reader of its own:
//! a fresh replay of a replayable parent, or the parent's facade otherwise. The child
//! never writes into the parent's store.

use std::{
    collections::HashSet,
    hash::Hash,
    iter,
    ops::AddAssign,
    rc::Rc,
};

use itertools::Either;
use num_traits::Zero;

use super::{Sequence, source::Producer};
use crate::{
    error::{Result, SeqError},
    value::Shrink,
};

impl<T: Clone + 'static> Sequence<T> {
    pub fn map<U, F>(&self, f: F) -> Sequence<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        let parent = self.clone();
        let f = Rc::new(f);
        self.derive(move || {
            let f = Rc::clone(&f);
            Box::new(parent.reader_from(0).map(move |r| r.map(|v| f(v))))
        })
    }

    pub fn filter<P>(&self, pred: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + 'static,
    {
        let parent = self.clone();
        let pred = Rc::new(pred);
        self.derive(move || {
            let pred = Rc::clone(&pred);
            Box::new(
                parent
                    .reader_from(0)
                    .filter(move |r| r.as_ref().map_or(true, |v| pred(v))),
            )
        })
    }

    /// Starts at the parent's index `n`.
    pub fn skip(&self, n: usize) -> Sequence<T> {
        let parent = self.clone();
        self.derive(move || parent.reader_from(n))
    }

    /// At most `n` elements; never pulls the `n + 1`-th.
    pub fn take(&self, n: usize) -> Sequence<T> {
        let parent = self.clone();
        self.derive(move || Box::new(parent.reader_from(0).take(n)))
    }

    /// The `a`-th through `b`-th elements, inclusive, counting positions from 1 (so
    /// `take_range(1, 3)` is the first three). A zero `a` counts as 1; empty when `b < a`.
    pub fn take_range(&self, a: usize, b: usize) -> Sequence<T> {
        let a = a.max(1);
        let len = if b < a { 0 } else { b - a + 1 };
        self.skip(a - 1).take(len)
    }

    /// Stops before the first element `pred` rejects.
    pub fn take_while<P>(&self, pred: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + 'static,
    {
        let parent = self.clone();
        let pred = Rc::new(pred);
        self.derive(move || {
            let pred = Rc::clone(&pred);
            Box::new(
                parent
                    .reader_from(0)
                    .take_while(move |r| r.as_ref().map_or(true, |v| pred(v))),
            )
        })
    }

    /// Pairs elements positionally and stops at the shorter side.
    pub fn zip<U, V, F>(&self, other: &Sequence<U>, combine: F) -> Sequence<V>
    where
        U: Clone + 'static,
        V: Clone + 'static,
        F: Fn(T, U) -> V + 'static,
    {
        let (left, right) = (self.clone(), other.clone());
        let combine = Rc::new(combine);
        self.derive(move || {
            let combine = Rc::clone(&combine);
            Box::new(
                left.reader_from(0)
                    .zip(right.reader_from(0))
                    .map(move |(a, b)| -> Result<V> { Ok(combine(a?, b?)) }),
            )
        })
    }

    /// Drops repeats. The seen-set grows with every distinct element, so this is only
    /// safe on sources with boundedly many distinct values; that is on the caller.
    pub fn unique(&self) -> Sequence<T>
    where
        T: Eq + Hash,
    {
        let parent = self.clone();
        self.derive(move || {
            let mut seen = HashSet::new();
            Box::new(parent.reader_from(0).filter(move |r| match r {
                Ok(v) => seen.insert(v.clone()),
                Err(_) => true,
            }))
        })
    }

    /// Round-robin over `self` and `others`; members that run out are skipped.
    pub fn mix(&self, others: &[Sequence<T>]) -> Sequence<T> {
        let members = self.with_others(others);
        self.derive(move || {
            let taps = members.iter().map(|m| m.reader_from(0)).collect();
            Box::new(RoundRobin::new(taps))
        })
    }

    /// `self` followed by each of `others` in turn.
    pub fn concat(&self, others: &[Sequence<T>]) -> Sequence<T> {
        let members = self.with_others(others);
        self.derive(move || {
            let taps: Vec<Producer<T>> = members.iter().map(|m| m.reader_from(0)).collect();
            Box::new(taps.into_iter().flatten())
        })
    }

    fn with_others(&self, others: &[Sequence<T>]) -> Vec<Sequence<T>> {
        iter::once(self.clone()).chain(others.iter().cloned()).collect()
    }

    /// Fixed-size batches; the last one may be short.
    ///
    /// # Panics
    /// If `size` is zero.
    pub fn chunk(&self, size: usize) -> Sequence<Vec<T>> {
        assert!(size > 0, "chunk size must be non-zero");
        let parent = self.clone();
        self.derive(move || {
            let mut inner = parent.reader_from(0);
            Box::new(iter::from_fn(move || {
                let mut batch = Vec::with_capacity(size);
                while batch.len() < size {
                    match inner.next() {
                        Some(Ok(v)) => batch.push(v),
                        Some(Err(e)) => return Some(Err(e)),
                        None => break,
                    }
                }
                (!batch.is_empty()).then_some(Ok(batch))
            }))
        })
    }

    /// Repeats the parent forever. The parent is drained once, on the first pull, and
    /// must be finite: an unbounded parent trips the materialization safety cap.
    pub fn cycle(&self) -> Sequence<T> {
        let parent = self.clone();
        self.derive(move || {
            let parent = parent.clone();
            let mut body: Option<Rc<[T]>> = None;
            let mut ix = 0;
            Box::new(iter::from_fn(move || {
                if body.is_none() {
                    match drain_body(&parent) {
                        Ok(v) => body = Some(v.into()),
                        Err(e) => return Some(Err(e)),
                    }
                }
                let body = body.as_ref()?;
                let v = body.get(ix)?.clone();
                ix = (ix + 1) % body.len();
                Some(Ok(v))
            }))
        })
    }

    /// Pairs each element with its index.
    pub fn enumerate(&self) -> Sequence<(usize, T)> {
        let parent = self.clone();
        self.derive(move || {
            Box::new(
                parent
                    .reader_from(0)
                    .enumerate()
                    .map(|(i, r)| r.map(|v| (i, v))),
            )
        })
    }

    /// Running sums, index-inclusive: the first output is the first input.
    pub fn summatory(&self) -> Sequence<T>
    where
        T: Zero,
        for<'a> T: AddAssign<&'a T>,
    {
        let parent = self.clone();
        self.derive(move || {
            let mut sum = T::zero();
            Box::new(parent.reader_from(0).map(move |r| -> Result<T> {
                let x = r?;
                sum += &x;
                Ok(sum.clone())
            }))
        })
    }

    /// Normalizes every element's representation; see [`Shrink`].
    pub fn shrink(&self) -> Sequence<T>
    where
        T: Shrink,
    {
        self.map(Shrink::shrink)
    }
}

/// Element types `flatten` can open up one level of.
pub trait Nested {
    type Item: Clone + 'static;

    fn into_sequence(self) -> Sequence<Self::Item>;
}

impl<U: Clone + 'static> Nested for Sequence<U> {
    type Item = U;

    fn into_sequence(self) -> Sequence<U> {
        self
    }
}

impl<U: Clone + 'static> Nested for Vec<U> {
    type Item = U;

    fn into_sequence(self) -> Sequence<U> {
        Sequence::from_vec(self)
    }
}

impl<T: Nested + Clone + 'static> Sequence<T> {
    /// Flattens one level of nesting, lazily in both levels.
    pub fn flatten(&self) -> Sequence<T::Item> {
        let parent = self.clone();
        self.derive(move || {
            let outer: Producer<T::Item> = Box::new(parent.reader_from(0).flat_map(|r| match r {
                Ok(inner) => Either::Left(inner.into_sequence().reader_from(0)),
                Err(e) => Either::Right(iter::once(Err::<T::Item, SeqError>(e))),
            }));
            outer
        })
    }
}

/// Reads a whole cycle body, under the parent's pull cap.
fn drain_body<T: Clone + 'static>(parent: &Sequence<T>) -> Result<Vec<T>> {
    let limit = parent.limits().max_pulls;
    let mut body = Vec::new();
    for item in parent.reader_from(0) {
        if body.len() == limit {
            return Err(SeqError::UnboundedMaterialization { limit });
        }
        body.push(item?);
    }
    Ok(body)
}

struct RoundRobin<T> {
    members: Vec<Producer<T>>,
    next: usize,
}

impl<T> RoundRobin<T> {
    fn new(members: Vec<Producer<T>>) -> Self {
        Self { members, next: 0 }
    }
}

impl<T> Iterator for RoundRobin<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        while !self.members.is_empty() {
            let ix = self.next % self.members.len();
            match self.members[ix].next() {
                Some(item) => {
                    self.next = ix + 1;
                    return Some(item);
                }
                None => {
                    self.members.remove(ix);
                    self.next = ix;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use itertools::Itertools;

    use super::*;
    use crate::{
        math::naturals,
        seq::{Options, Source},
        value::Num,
    };

    fn v<T: Clone + 'static>(s: &Sequence<T>) -> Vec<T> {
        s.to_vec().unwrap()
    }

    #[test]
    fn test_map_filter_skip_take() {
        let s = Sequence::from_vec((1..=10).collect_vec());
        assert_eq!(v(&s.map(|x| x * 3)), (1..=10).map(|x| x * 3).collect_vec());
        assert_eq!(v(&s.filter(|x| x % 3 == 0)), vec![3, 6, 9]);
        assert_eq!(v(&s.skip(7)), vec![8, 9, 10]);
        assert_eq!(v(&s.skip(20)), Vec::<i32>::new());
        assert_eq!(v(&s.take(0)), Vec::<i32>::new());
        assert_eq!(v(&s), (1..=10).collect_vec());
    }

    #[test]
    fn test_take_does_not_overpull() {
        let pulls = Rc::new(Cell::new(0));
        let p = Rc::clone(&pulls);
        let s = Sequence::from_fn(move || {
            p.set(p.get() + 1);
            Some(p.get())
        });
        assert_eq!(v(&s.take(5)), vec![1, 2, 3, 4, 5]);
        assert_eq!(pulls.get(), 5);
    }

    #[test]
    fn test_take_range() {
        let n = naturals(1u32);
        assert_eq!(v(&n.take_range(10, 20)), (10..=20).collect_vec());
        assert_eq!(v(&n.take_range(3, 5)), vec![3, 4, 5]);
        assert_eq!(v(&n.take_range(5, 5)), vec![5]);
        assert_eq!(v(&n.take_range(5, 4)), Vec::<u32>::new());
        assert_eq!(v(&n.take_range(0, 2)), vec![1, 2]);
        let letters = Sequence::from_vec(vec!['a', 'b', 'c', 'd']);
        assert_eq!(v(&letters.take_range(2, 3)), vec!['b', 'c']);
    }

    #[test]
    fn test_zip_stops_at_shorter() {
        let a = naturals(1u64);
        let b = Sequence::from_vec(vec!["a", "b", "c"]);
        let z = a.zip(&b, |n, s| format!("{s}{n}"));
        assert_eq!(v(&z), vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn test_unique() {
        let s = Sequence::from_vec(vec![3, 1, 3, 2, 1, 4]);
        assert_eq!(v(&s.unique()), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_flatten() {
        let nested = Sequence::from_vec(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(v(&nested.flatten()), vec![1, 2, 3]);

        // infinite outer, infinite inner: only what is asked for is produced
        let rows = naturals(1u64).map(|r| naturals(r * 100));
        let firsts = rows.flatten().take(3);
        assert_eq!(v(&firsts), vec![100, 101, 102]);
    }

    #[test]
    fn test_chunk_roundtrip() {
        let s = Sequence::from_vec((0..7).collect_vec());
        let chunks = s.chunk(3);
        assert_eq!(v(&chunks), vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(v(&s.chunk(3).flatten()), (0..7).collect_vec());
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_chunk_zero() {
        let _ = Sequence::from_vec(vec![1]).chunk(0);
    }

    #[test]
    fn test_mix_round_robin() {
        let a = Sequence::from_vec(vec![1, 2, 3, 4]);
        let b = Sequence::from_vec(vec![10]);
        let c = Sequence::from_vec(vec![100, 200]);
        assert_eq!(v(&a.mix(&[b, c])), vec![1, 10, 100, 2, 200, 3, 4]);

        // fair across infinite members
        let evens = naturals(0u32).map(|n| 2 * n);
        let odds = naturals(0u32).map(|n| 2 * n + 1);
        assert_eq!(v(&evens.mix(&[odds]).take(6)), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_concat() {
        let a = Sequence::from_vec(vec![1, 2]);
        let b = Sequence::once(3);
        let c = naturals(4);
        assert_eq!(v(&a.concat(&[b, c]).take(6)), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_cycle() {
        let s = Sequence::from_vec(vec!['x', 'y']);
        assert_eq!(v(&s.cycle().take(5)), vec!['x', 'y', 'x', 'y', 'x']);
        let empty = Sequence::<u8>::from_vec(vec![]);
        assert_eq!(v(&empty.cycle()), Vec::<u8>::new());
    }

    #[test]
    fn test_cycle_unbounded_body() {
        let body = Sequence::new(Source::foreign(0u32..), Options::new().max_pulls(100));
        let err = body.cycle().take(3).to_vec().unwrap_err();
        assert_eq!(err, SeqError::UnboundedMaterialization { limit: 100 });
    }

    #[test]
    fn test_take_while_summatory_enumerate() {
        let s = naturals(1u64).take_while(|&n| n <= 5);
        assert_eq!(v(&s.summatory()), vec![1, 3, 6, 10, 15]);
        let e = Sequence::from_vec(vec!['a', 'b']).enumerate();
        assert_eq!(v(&e), vec![(0, 'a'), (1, 'b')]);
    }

    #[test]
    fn test_shrink() {
        let big = rug::Integer::from(u64::MAX) * 4u32;
        let s = Sequence::from_vec(vec![Num::Big(rug::Integer::from(12)), Num::Big(big.clone())]);
        let shrunk = v(&s.shrink());
        assert!(matches!(shrunk[..], [Num::Small(12), Num::Big(_)]));
        assert_eq!(shrunk[1], Num::Big(big));
    }

    #[test]
    fn test_parent_stays_independent() {
        let parent = Sequence::new(vec![1, 2, 3, 4], Options::new().memo(true));
        let child = parent.map(|x| x * 10);
        assert_eq!(child.get(1), Ok(20));
        assert_eq!(child.cursor(), 2);
        assert_eq!(parent.cursor(), 2);
        // the parent can still be read from the start, and the child's store is its own
        assert_eq!(parent.to_vec(), Ok(vec![1, 2, 3, 4]));
        assert_eq!(child.retained(), vec![]);
    }
}
