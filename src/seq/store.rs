//! Retention stores: what a sequence remembers about elements it already pulled.
//!
//! The memo store grows append-only, the way a lazily extended vector does; the window
//! is a fixed ring keyed by absolute index. Neither ever pulls anything itself, the
//! lifecycle manager feeds them.

use super::options::Retention;

/// Append-only store. Entries are boxed so their addresses stay put while the vector
/// grows; `Index` on a memoized sequence hands out references into them.
#[derive(Debug)]
pub(crate) struct Memo<T> {
    items: Vec<Box<T>>,
    cap: Option<usize>,
}

impl<T> Memo<T> {
    fn new(cap: Option<usize>) -> Self {
        Self {
            items: Vec::with_capacity(cap.unwrap_or(0).min(1024)),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.items.len() >= cap)
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i).map(|b| &**b)
    }

    /// Elements past the capacity are dropped; the cursor keeps counting.
    fn record(&mut self, i: usize, value: T) {
        if !self.is_full() && i == self.items.len() {
            self.items.push(Box::new(value));
        }
    }
}

/// Fixed-capacity ring. Slot `i % capacity` holds absolute index `i` while `i` is one of
/// the `capacity` most recently produced indices.
#[derive(Debug)]
pub(crate) struct Window<T> {
    slots: Vec<Option<T>>,
}

impl<T> Window<T> {
    fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Absolute indices currently held, given how many elements were produced.
    pub fn span(&self, cursor: usize) -> std::ops::Range<usize> {
        cursor.saturating_sub(self.capacity())..cursor
    }

    fn get(&self, i: usize, cursor: usize) -> Option<&T> {
        if self.span(cursor).contains(&i) {
            self.slots[i % self.capacity()].as_ref()
        } else {
            None
        }
    }

    fn record(&mut self, i: usize, value: T) {
        let cap = self.capacity();
        self.slots[i % cap] = Some(value);
    }
}

#[derive(Debug)]
pub(crate) enum Store<T> {
    Nothing,
    Memo(Memo<T>),
    Window(Window<T>),
}

impl<T> Store<T> {
    pub fn for_retention(retention: Retention) -> Self {
        match retention {
            Retention::None => Store::Nothing,
            Retention::Memoize(cap) => Store::Memo(Memo::new(cap)),
            Retention::SlidingWindow(0) => Store::Nothing,
            Retention::SlidingWindow(w) => Store::Window(Window::new(w)),
        }
    }

    /// The fast path: memo first, then the window.
    pub fn lookup(&self, i: usize, cursor: usize) -> Option<&T> {
        match self {
            Store::Nothing => None,
            Store::Memo(m) => m.get(i),
            Store::Window(w) => w.get(i, cursor),
        }
    }

    pub fn record(&mut self, i: usize, value: T) {
        match self {
            Store::Nothing => {}
            Store::Memo(m) => m.record(i, value),
            Store::Window(w) => w.record(i, value),
        }
    }

    /// How far an access to `i` should advance. The first access into an empty memo
    /// store pulls a whole batch; everything else pulls only what it needs.
    pub fn advance_target(&self, i: usize, cursor: usize, floor: usize) -> usize {
        match self {
            Store::Memo(m) if cursor == 0 && m.len() == 0 => {
                let batch = match m.cap {
                    Some(cap) => floor.min(cap),
                    None => floor,
                };
                batch.max(i + 1)
            }
            _ => i + 1,
        }
    }

    pub fn memo(&self) -> Option<&Memo<T>> {
        match self {
            Store::Memo(m) => Some(m),
            _ => None,
        }
    }

    /// Absolute index and value of everything currently held, oldest first.
    pub fn retained(&self, cursor: usize) -> Vec<(usize, &T)> {
        match self {
            Store::Nothing => Vec::new(),
            Store::Memo(m) => m.items.iter().map(|b| &**b).enumerate().collect(),
            Store::Window(w) => w
                .span(cursor)
                .filter_map(|i| w.get(i, cursor).map(|v| (i, v)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<T>(store: &mut Store<T>, values: impl IntoIterator<Item = T>) -> usize {
        let mut cursor = 0;
        for v in values {
            store.record(cursor, v);
            cursor += 1;
        }
        cursor
    }

    #[test]
    fn test_memo_grows_and_caps() {
        let mut store = Store::for_retention(Retention::Memoize(Some(3)));
        let cursor = fill(&mut store, 10..15);
        assert_eq!(cursor, 5);
        assert_eq!(store.lookup(0, cursor), Some(&10));
        assert_eq!(store.lookup(2, cursor), Some(&12));
        // past the capacity nothing is kept
        assert_eq!(store.lookup(3, cursor), None);
        assert_eq!(store.memo().unwrap().len(), 3);
    }

    #[test]
    fn test_window_evicts_by_position() {
        let mut store = Store::for_retention(Retention::SlidingWindow(3));
        let cursor = fill(&mut store, 0..7);
        assert_eq!(store.lookup(3, cursor), None);
        assert_eq!(store.lookup(4, cursor), Some(&4));
        assert_eq!(store.lookup(6, cursor), Some(&6));
        assert_eq!(store.lookup(7, cursor), None);
        let held: Vec<_> = store.retained(cursor).into_iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(held, vec![(4, 4), (5, 5), (6, 6)]);
    }

    #[test]
    fn test_advance_target_prefetches_once() {
        let mut store = Store::for_retention(Retention::Memoize(None));
        assert_eq!(store.advance_target(0, 0, 8), 8);
        assert_eq!(store.advance_target(20, 0, 8), 21);
        store.record(0, 'a');
        assert_eq!(store.advance_target(5, 1, 8), 6);

        let capped: Store<u8> = Store::for_retention(Retention::Memoize(Some(2)));
        assert_eq!(capped.advance_target(0, 0, 8), 2);

        let window: Store<u8> = Store::for_retention(Retention::SlidingWindow(4));
        assert_eq!(window.advance_target(0, 0, 8), 1);
    }
}
