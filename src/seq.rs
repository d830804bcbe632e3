//! The set engine: lazy, composable sequences.
//!
//! A [`Sequence`] wraps one source (a value, a finite collection, an on-demand producer or
//! a foreign iterable) and exposes operators that build new sequences without pulling
//! anything. Values are pulled by whichever access happens first, through the one live
//! producer the sequence owns, and optionally retained in a memo store or a sliding
//! window so later accesses can skip the producer entirely.
//!
//! Sequences are cheap handles: cloning one shares the producer, cursor and store.
//! They are single-threaded by construction (`!Send`).
//!
//! A child built by an operator never moves its parent's producer when it can avoid it:
//! over a replayable parent it opens a producer of its own from the parent's recipe, and
//! only a one-shot parent, or one that memoizes everything, is read through its facade.

use std::{cell::RefCell, fmt, rc::Rc};

pub mod access;
pub mod lifecycle;
pub mod materialize;
pub mod ops;
pub mod options;
pub mod source;
mod store;

pub use access::{Iter, TryIter};
pub use lifecycle::State;
pub use ops::Nested;
pub use options::{Memo, Options, Retention};
pub use source::Source;

use crate::error::{Result, SeqError};
use lifecycle::Core;
use options::Limits;
use source::Producer;

/// A lazy sequence. See the [module docs](self).
pub struct Sequence<T> {
    core: Rc<RefCell<Core<T>>>,
    // fixed at construction, so readable while the core is borrowed
    limits: Limits,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            limits: self.limits,
        }
    }
}

/// Builds a sequence from anything convertible into a [`Source`].
pub fn sequence_of<T: Clone + 'static>(source: impl Into<Source<T>>, options: Options) -> Sequence<T> {
    Sequence::new(source, options)
}

impl<T: Clone + 'static> Sequence<T> {
    pub fn new(source: impl Into<Source<T>>, options: Options) -> Self {
        Self::from_parts(source.into(), options.retention(), options.limits())
    }

    pub(crate) fn from_parts(source: Source<T>, retention: Retention, limits: Limits) -> Self {
        Self {
            core: Rc::new(RefCell::new(Core::new(source, retention, limits))),
            limits,
        }
    }

    pub fn once(value: T) -> Self {
        Self::new(Source::singleton(value), Options::default())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::new(items, Options::default())
    }

    /// An on-demand producer: `f` is called once per pull, `None` means done.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Option<T> + 'static,
    {
        Self::new(Source::on_demand(f), Options::default())
    }

    /// A deterministic producer given as a factory; see [`Source::Replayable`].
    pub fn replayable<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = T> + 'static,
    {
        Self::new(Source::replayable(factory), Options::default())
    }

    pub fn foreign<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::new(Source::foreign(iterable), Options::default())
    }

    /// Swaps the retention policy. Only allowed before the first pull.
    pub fn set_retention(&self, retention: Retention) -> Result<()> {
        self.core_mut()?.set_retention(retention)
    }

    pub fn with_retention(self, retention: Retention) -> Result<Self> {
        self.set_retention(retention)?;
        Ok(self)
    }

    /// Shorthand for unbounded memoization, typically on a freshly derived sequence.
    ///
    /// # Panics
    /// If the sequence has already started producing.
    pub fn memoized(self) -> Self {
        match self.with_retention(Retention::Memoize(None)) {
            Ok(s) => s,
            Err(e) => panic!("{e}"),
        }
    }

    /// # Panics
    /// The accessors below panic when called from inside this sequence's own producer.
    pub fn retention(&self) -> Retention {
        self.core.borrow().retention()
    }

    pub fn state(&self) -> State {
        self.core.borrow().state()
    }

    /// How many elements the live producer has yielded so far.
    pub fn cursor(&self) -> usize {
        self.core.borrow().cursor()
    }

    pub(crate) fn limits(&self) -> Limits {
        self.limits
    }

    /// The state is borrowed for the duration of a pull; a second borrow means the
    /// sequence is being advanced from inside its own producer.
    pub(crate) fn core_mut(&self) -> Result<std::cell::RefMut<'_, Core<T>>> {
        self.core
            .try_borrow_mut()
            .map_err(|_| SeqError::ReentrantAccess)
    }

    pub(crate) fn core_ref(&self) -> std::cell::Ref<'_, Core<T>> {
        self.core.borrow()
    }

    /// A child sequence whose producer is built by `recipe`. Inherits the limits, not the
    /// retention.
    pub(crate) fn derive<U, F>(&self, recipe: F) -> Sequence<U>
    where
        U: Clone + 'static,
        F: Fn() -> Producer<U> + 'static,
    {
        Sequence::from_parts(Source::derived(recipe), Retention::None, self.limits)
    }

    /// How a child reads this sequence, starting at index `start`.
    ///
    /// A replayable sequence that does not memoize everything is opened afresh from its
    /// recipe, leaving this sequence's own producer, cursor and store untouched. Otherwise
    /// the child goes through [`get`](Self::get), which shares the producer and reports
    /// what the retention policy no longer holds.
    pub(crate) fn reader_from(&self, start: usize) -> Producer<T> {
        let fresh = match self.core.try_borrow() {
            Ok(core) if core.retention() != Retention::Memoize(None) => core.replay(),
            // mid-pull: the facade reports the re-entrant access
            _ => None,
        };
        match fresh {
            Some(recipe) => Box::new(
                recipe()
                    .enumerate()
                    .filter(move |(i, r)| *i >= start || r.is_err())
                    .map(|(_, r)| r),
            ),
            None => Box::new(TryIter::starting_at(self.clone(), start)),
        }
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + 'static> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Sequence");
        match self.core.try_borrow() {
            Ok(core) => d
                .field("state", &core.state())
                .field("cursor", &core.cursor())
                .field("retention", &core.retention()),
            Err(_) => d.field("state", &"<advancing>"),
        };
        d.finish()
    }
}
