/// How many elements a sequence keeps after pulling them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Nothing is kept; indices below the cursor are gone.
    #[default]
    None,
    /// Keep every pulled element, up to an optional capacity.
    Memoize(Option<usize>),
    /// Keep the `capacity` most recently pulled elements.
    SlidingWindow(usize),
}

/// The `memo` switch: off, unbounded, or capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Memo {
    #[default]
    Off,
    Unbounded,
    Capacity(usize),
}

impl From<bool> for Memo {
    fn from(on: bool) -> Self {
        if on { Memo::Unbounded } else { Memo::Off }
    }
}

impl From<usize> for Memo {
    fn from(cap: usize) -> Self {
        Memo::Capacity(cap)
    }
}

/// Elements pulled in one go on the first access into an empty memo store.
///
/// Batching is opt-in through [`Options::prefetch`]: with the default of 1 a memoized
/// sequence pulls exactly up to the highest index asked for, so `seq[0]`, `seq[5]`,
/// `seq[2]` costs six pulls and no more.
pub const DEFAULT_PREFETCH: usize = 1;

/// Pulls a full drain may perform before it is declared unbounded.
pub const DEFAULT_MAX_PULLS: usize = 1 << 24;

/// Construction options for a [`Sequence`](super::Sequence).
///
/// `memo` and `cache` are mutually exclusive; when both are set `memo` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub memo: Memo,
    pub cache: Option<usize>,
    pub prefetch: usize,
    pub max_pulls: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            memo: Memo::Off,
            cache: None,
            prefetch: DEFAULT_PREFETCH,
            max_pulls: DEFAULT_MAX_PULLS,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` retains everything, `false` turns memoization off, an integer caps it.
    pub fn memo(mut self, memo: impl Into<Memo>) -> Self {
        self.memo = memo.into();
        self
    }

    /// A sliding window of `capacity` elements. Zero disables the window.
    pub fn cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then_some(capacity);
        self
    }

    pub fn prefetch(mut self, floor: usize) -> Self {
        self.prefetch = floor;
        self
    }

    pub fn max_pulls(mut self, limit: usize) -> Self {
        self.max_pulls = limit;
        self
    }

    /// Resolves the `memo`/`cache` pair into a single policy.
    pub fn retention(&self) -> Retention {
        match (self.memo, self.cache) {
            (Memo::Unbounded, _) => Retention::Memoize(None),
            (Memo::Capacity(cap), _) => Retention::Memoize(Some(cap)),
            (Memo::Off, Some(w)) => Retention::SlidingWindow(w),
            (Memo::Off, None) => Retention::None,
        }
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            prefetch: self.prefetch,
            max_pulls: self.max_pulls,
        }
    }
}

/// The non-retention half of [`Options`]; inherited by derived sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Limits {
    pub prefetch: usize,
    pub max_pulls: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Options::default().limits()
    }
}
