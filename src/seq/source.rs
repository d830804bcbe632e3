//! Source adapters.
//!
//! Every input a sequence can be built from is normalized into a [`Producer`]: a boxed
//! iterator whose `next()` is the uniform pull, `Some(Ok(v))` for a value and `None` for
//! done. Nothing is pulled while adapting; the lifecycle manager opens the producer on
//! first demand.

use std::{fmt, iter, rc::Rc};

use crate::error::Result;

/// The live, stateful object that yields successive values.
pub(crate) type Producer<T> = Box<dyn Iterator<Item = Result<T>>>;

/// Something that can open a fresh producer, possibly many times.
pub(crate) type Recipe<T> = Rc<dyn Fn() -> Producer<T>>;

/// An operator chain over one or more parent sequences. Built by the operators in
/// [`ops`](super::ops), never by hand.
pub struct Chain<T>(pub(crate) Recipe<T>);

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// The inputs a sequence accepts.
pub enum Source<T> {
    /// One value, then done.
    Singleton(T),
    /// A finite ordered collection pulled by index.
    Finite(Rc<[T]>),
    /// A caller-supplied producer; `None` signals done, and it may never do so.
    OnDemand(Box<dyn FnMut() -> Option<T>>),
    /// A deterministic producer factory. Behaves like `OnDemand` for the live producer,
    /// but evicted indices can be re-derived by running the factory again.
    Replayable(Rc<dyn Fn() -> Box<dyn Iterator<Item = T>>>),
    /// Any external iterable.
    Foreign(Box<dyn Iterator<Item = T>>),
    /// The output of a lazy operator.
    Derived(Chain<T>),
}

impl<T: Clone + 'static> Source<T> {
    pub fn singleton(value: T) -> Self {
        Source::Singleton(value)
    }

    pub fn finite(items: impl Into<Rc<[T]>>) -> Self {
        Source::Finite(items.into())
    }

    pub fn on_demand<F>(f: F) -> Self
    where
        F: FnMut() -> Option<T> + 'static,
    {
        Source::OnDemand(Box::new(f))
    }

    pub fn replayable<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = T> + 'static,
    {
        Source::Replayable(Rc::new(move || Box::new(factory())))
    }

    pub fn foreign<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Source::Foreign(Box::new(iterable.into_iter()))
    }

    pub(crate) fn derived<F>(recipe: F) -> Self
    where
        F: Fn() -> Producer<T> + 'static,
    {
        Source::Derived(Chain(Rc::new(recipe)))
    }

    /// A second, independent way to open this source, when one exists.
    ///
    /// One-shot sources (`OnDemand`, `Foreign`) cannot be replayed.
    pub(crate) fn replay(&self) -> Option<Recipe<T>> {
        match self {
            Source::Singleton(v) => {
                let v = v.clone();
                Some(Rc::new(move || Box::new(iter::once(Ok(v.clone())))))
            }
            Source::Finite(items) => {
                let items = Rc::clone(items);
                Some(Rc::new(move || Box::new(ByIndex::new(Rc::clone(&items)))))
            }
            Source::Replayable(factory) => {
                let factory = Rc::clone(factory);
                Some(Rc::new(move || Box::new(factory().map(Ok))))
            }
            Source::Derived(chain) => Some(Rc::clone(&chain.0)),
            Source::OnDemand(_) | Source::Foreign(_) => None,
        }
    }

    /// Turns the source into its live producer. Pulls nothing.
    pub(crate) fn open(self) -> Producer<T> {
        match self {
            Source::Singleton(v) => Box::new(iter::once(Ok(v))),
            Source::Finite(items) => Box::new(ByIndex::new(items)),
            Source::OnDemand(f) => Box::new(iter::from_fn(f).map(Ok)),
            Source::Replayable(factory) => Box::new(factory().map(Ok)),
            Source::Foreign(it) => Box::new(it.map(Ok)),
            Source::Derived(chain) => (chain.0)(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Source::Singleton(_) => "singleton",
            Source::Finite(_) => "finite",
            Source::OnDemand(_) => "on-demand",
            Source::Replayable(_) => "replayable",
            Source::Foreign(_) => "foreign",
            Source::Derived(_) => "derived",
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Singleton(_) => f.write_str("Singleton(..)"),
            Source::Finite(items) => write!(f, "Finite(len={})", items.len()),
            Source::OnDemand(_) => f.write_str("OnDemand(..)"),
            Source::Replayable(_) => f.write_str("Replayable(..)"),
            Source::Foreign(_) => f.write_str("Foreign(..)"),
            Source::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(items: Vec<T>) -> Self {
        Source::Finite(items.into())
    }
}

impl<T: Clone> From<&[T]> for Source<T> {
    fn from(items: &[T]) -> Self {
        Source::Finite(items.into())
    }
}

impl<T, const N: usize> From<[T; N]> for Source<T> {
    fn from(items: [T; N]) -> Self {
        Source::Finite(Rc::from(Vec::from(items)))
    }
}

/// Pulls a shared slice one index at a time.
struct ByIndex<T> {
    items: Rc<[T]>,
    ix: usize,
}

impl<T> ByIndex<T> {
    fn new(items: Rc<[T]>) -> Self {
        Self { items, ix: 0 }
    }
}

impl<T: Clone> Iterator for ByIndex<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.items.get(self.ix).cloned()?;
        self.ix += 1;
        Some(Ok(out))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.items.len() - self.ix;
        (left, Some(left))
    }
}
