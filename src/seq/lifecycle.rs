//! The iterator lifecycle manager.
//!
//! Each sequence owns exactly one [`Core`]: the producer state machine, the cursor and the
//! retention store. The producer is opened on the first pull and never re-created; every
//! access path, whether iteration, indexing or a full drain, goes through the same live
//! producer.

use tracing::{debug, trace};

use super::{
    options::{Limits, Retention},
    source::{Producer, Recipe, Source},
    store::Store,
};
use crate::error::{Result, SeqError};

/// Observable producer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing pulled yet; the source is still unopened.
    Unstarted,
    /// The producer is live.
    Active,
    /// The producer signalled done and has been released.
    Exhausted,
    /// The producer reported an error; the same error is returned from now on.
    Failed,
}

enum Lifecycle<T> {
    Unstarted(Source<T>),
    Active(Producer<T>),
    Exhausted,
    Failed(SeqError),
}

impl<T: Clone + 'static> Lifecycle<T> {
    fn state(&self) -> State {
        match self {
            Lifecycle::Unstarted(_) => State::Unstarted,
            Lifecycle::Active(_) => State::Active,
            Lifecycle::Exhausted => State::Exhausted,
            Lifecycle::Failed(_) => State::Failed,
        }
    }

    /// One pull. `Ok(None)` is done, and stays done.
    fn pull(&mut self) -> Result<Option<T>> {
        if let Lifecycle::Unstarted(_) = self {
            let Lifecycle::Unstarted(source) = std::mem::replace(self, Lifecycle::Exhausted)
            else {
                unreachable!()
            };
            debug!(source = source.kind(), "opening producer");
            *self = Lifecycle::Active(source.open());
        }
        match self {
            Lifecycle::Active(producer) => match producer.next() {
                Some(Ok(v)) => Ok(Some(v)),
                Some(Err(e)) => {
                    debug!(error = %e, "producer failed");
                    *self = Lifecycle::Failed(e.clone());
                    Err(e)
                }
                None => {
                    // dropping the producer here releases whatever backs it
                    *self = Lifecycle::Exhausted;
                    Ok(None)
                }
            },
            Lifecycle::Exhausted => Ok(None),
            Lifecycle::Failed(e) => Err(e.clone()),
            Lifecycle::Unstarted(_) => unreachable!(),
        }
    }
}

pub(crate) struct Core<T> {
    lifecycle: Lifecycle<T>,
    replay: Option<Recipe<T>>,
    retention: Retention,
    store: Store<T>,
    cursor: usize,
    limits: Limits,
}

impl<T: Clone + 'static> Core<T> {
    pub fn new(source: Source<T>, retention: Retention, limits: Limits) -> Self {
        Self {
            replay: source.replay(),
            lifecycle: Lifecycle::Unstarted(source),
            retention,
            store: Store::for_retention(retention),
            cursor: 0,
            limits,
        }
    }

    pub fn state(&self) -> State {
        self.lifecycle.state()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// An independent way to open this core's source again, when there is one.
    pub fn replay(&self) -> Option<Recipe<T>> {
        self.replay.clone()
    }

    pub fn store(&self) -> &Store<T> {
        &self.store
    }

    pub fn set_retention(&mut self, retention: Retention) -> Result<()> {
        if self.state() != State::Unstarted {
            return Err(SeqError::InvalidRetentionTransition);
        }
        self.retention = retention;
        self.store = Store::for_retention(retention);
        Ok(())
    }

    pub fn lookup(&self, i: usize) -> Option<&T> {
        self.store.lookup(i, self.cursor)
    }

    /// Advances the live producer through index `i` (which must be at or past the cursor)
    /// and returns the value there.
    pub fn advance_to(&mut self, i: usize) -> Result<T> {
        debug_assert!(i >= self.cursor);
        let target = self
            .store
            .advance_target(i, self.cursor, self.limits.prefetch);
        let mut hit = None;
        while self.cursor < target {
            let v = match self.lifecycle.pull() {
                Ok(Some(v)) => v,
                Ok(None) => break,
                // a failure past `i` only cuts the prefetch short; the next pull reports it
                Err(_) if hit.is_some() => break,
                Err(e) => return Err(e),
            };
            let ix = self.cursor;
            self.cursor += 1;
            if ix == i {
                hit = Some(v.clone());
            }
            self.store.record(ix, v);
        }
        hit.ok_or(SeqError::IndexOutOfRange {
            index: i,
            len: self.cursor,
        })
    }

    /// Re-derives an index that fell out of a sliding window by running the source again
    /// from the start. The live producer, the cursor and the store are left alone.
    pub fn replay_at(&self, i: usize) -> Result<T> {
        let evicted = SeqError::Evicted {
            index: i,
            cursor: self.cursor,
        };
        let (Some(replay), Store::Window(_)) = (&self.replay, &self.store) else {
            return Err(evicted);
        };
        trace!(index = i, "replaying evicted index");
        match replay().nth(i) {
            Some(r) => r,
            None => Err(evicted),
        }
    }
}

impl<T> Drop for Core<T> {
    fn drop(&mut self) {
        if let Lifecycle::Active(_) = self.lifecycle {
            debug!(cursor = self.cursor, "sequence abandoned, releasing producer");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    fn counted(pulls: &Rc<Cell<usize>>) -> Source<usize> {
        let pulls = Rc::clone(pulls);
        Source::on_demand(move || {
            let n = pulls.get();
            pulls.set(n + 1);
            Some(n)
        })
    }

    #[test]
    fn test_opened_once_and_exhausts() {
        let mut core = Core::new(Source::from(vec![1, 2]), Retention::None, Limits::default());
        assert_eq!(core.state(), State::Unstarted);
        assert_eq!(core.advance_to(0), Ok(1));
        assert_eq!(core.state(), State::Active);
        assert_eq!(core.advance_to(1), Ok(2));
        assert_eq!(
            core.advance_to(2),
            Err(SeqError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(core.state(), State::Exhausted);
        assert_eq!(core.cursor(), 2);
    }

    #[test]
    fn test_memo_prefetch_batch() {
        let pulls = Rc::new(Cell::new(0));
        let limits = Limits {
            prefetch: 4,
            ..Limits::default()
        };
        let mut core = Core::new(counted(&pulls), Retention::Memoize(None), limits);
        assert_eq!(core.advance_to(0), Ok(0));
        assert_eq!(pulls.get(), 4);
        assert_eq!(core.lookup(3), Some(&3));
        assert_eq!(core.advance_to(5), Ok(5));
        assert_eq!(pulls.get(), 6);
    }

    #[test]
    fn test_retention_locked_after_start() {
        let mut core = Core::new(Source::singleton(1), Retention::None, Limits::default());
        assert!(core.set_retention(Retention::Memoize(None)).is_ok());
        core.advance_to(0).unwrap();
        assert_eq!(
            core.set_retention(Retention::None),
            Err(SeqError::InvalidRetentionTransition)
        );
    }

    #[test]
    fn test_replay_only_for_windows() {
        let mut core = Core::new(
            Source::replayable(|| 0u32..),
            Retention::SlidingWindow(2),
            Limits::default(),
        );
        core.advance_to(9).unwrap();
        assert_eq!(core.lookup(0), None);
        assert_eq!(core.replay_at(0), Ok(0));
        assert_eq!(core.cursor(), 10);

        let mut cold = Core::new(Source::replayable(|| 0u32..), Retention::None, Limits::default());
        cold.advance_to(3).unwrap();
        assert_eq!(cold.replay_at(0), Err(SeqError::Evicted { index: 0, cursor: 4 }));
    }
}
