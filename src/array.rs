//! Array-indexed path caching.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use vitrine_reactive::{is_tracking, untrack, with_scope, Memo, Scope};

use crate::{
    cell::{counted_memo, PathCell},
    identity,
    value::Value,
    view::View,
};

/// A read-only, incrementally cached view over an array snapshot.
///
/// Element reads are cached per index; the length and the "elements as a
/// whole" signal are tracked separately, because shape changes and
/// element-value changes are independent concerns.
#[derive(Clone)]
pub struct ArrayView {
    inner: Rc<ArrayInner>,
}

struct ArrayInner {
    source: Rc<dyn Fn() -> Value>,
    owner: Scope,
    cache: Rc<RefCell<Vec<Option<Rc<PathCell>>>>>,
    track_length: Memo<usize>,
    track_items: Cell<Option<Memo<u64>>>,
}

impl ArrayView {
    pub(crate) fn new(source: Rc<dyn Fn() -> Value>, owner: Scope) -> Self {
        let cache: Rc<RefCell<Vec<Option<Rc<PathCell>>>>> = Rc::new(RefCell::new(Vec::new()));

        // The length memo exists from the start: recomputing it is what
        // tears down slots that fall out of range when the array shrinks.
        let track_length = {
            let source = source.clone();
            let cache = cache.clone();
            with_scope(owner, move || {
                counted_memo(move |prev: Option<&usize>| {
                    let length = source().as_array().map(|items| items.len()).unwrap_or(0);
                    let prev = prev.copied().unwrap_or(0);
                    if length < prev {
                        // Collect first: disposal runs cleanups, which must
                        // not observe the cache mid-borrow.
                        let dropped: Vec<_> = {
                            let mut cache = cache.borrow_mut();
                            if cache.len() > length {
                                cache.drain(length..).collect()
                            } else {
                                Vec::new()
                            }
                        };
                        for cell in dropped.into_iter().flatten() {
                            cell.dispose_slot();
                        }
                    }
                    length
                })
            })
        };

        ArrayView {
            inner: Rc::new(ArrayInner {
                source,
                owner,
                cache,
                track_length,
                track_items: Cell::new(None),
            }),
        }
    }

    /// The current length, as a tracked, memoized read.
    pub fn len(&self) -> usize {
        self.inner.track_length.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the element at `index`, wrapped and cached. Beyond the current
    /// bounds there is nothing stable to cache, so the live snapshot is
    /// read directly. Entries are allocated lazily per index; growing the
    /// array creates nothing until the new indices are read.
    pub fn get(&self, index: usize) -> View {
        if index >= self.inner.track_length.get() {
            return View::Primitive((self.inner.source)().index(index));
        }

        let cell = {
            let mut cache = self.inner.cache.borrow_mut();
            if cache.len() <= index {
                cache.resize_with(index + 1, || None);
            }
            match cache[index].clone() {
                Some(cell) => cell,
                None => {
                    let child = {
                        let source = self.inner.source.clone();
                        Rc::new(move || source().index(index)) as Rc<dyn Fn() -> Value>
                    };
                    let cell = PathCell::new(self.inner.owner, child);
                    cache[index] = Some(cell.clone());
                    cell
                }
            }
        };
        cell.read_slot()
    }

    /// Registers a coarse, by-value dependency on the whole array. The
    /// backing memo only advances when the sequence comparison fails, so a
    /// subscriber reruns when elements are added, removed, reordered or
    /// replaced by other records, and not when a record merely changed a
    /// field. Outside a tracked context this is a no-op.
    pub fn track(&self) {
        if !is_tracking() {
            return;
        }
        if self.inner.track_items.get().is_none() {
            let source = self.inner.source.clone();
            let memo = with_scope(self.inner.owner, move || {
                let prev_items: RefCell<Rc<Vec<Value>>> = RefCell::new(Rc::new(Vec::new()));
                counted_memo(move |generation: Option<&u64>| {
                    let items = source().as_array().cloned().unwrap_or_default();
                    let prev = prev_items.replace(items.clone());
                    match generation {
                        Some(generation) if identity::sequence_equals(&items, &prev) => *generation,
                        Some(generation) => generation + 1,
                        None => 0,
                    }
                })
            });
            self.inner.track_items.set(Some(memo));
        }
        if let Some(memo) = self.inner.track_items.get() {
            memo.get();
        }
    }

    /// Iterates the current raw elements. Registers the same coarse
    /// dependency as [`track`](Self::track), then snapshots the array once;
    /// iteration is not element-wise lazy. Index through
    /// [`get`](Self::get) instead for identity-stable wrapped elements.
    pub fn iter(&self) -> ArrayIter {
        self.track();
        let items = untrack(|| (self.inner.source)())
            .as_array()
            .cloned()
            .unwrap_or_default();
        ArrayIter { items, index: 0 }
    }

    /// The current raw snapshot behind this view, unwrapped and without
    /// dependency registration: the escape hatch for interop.
    pub fn raw(&self) -> Value {
        untrack(|| (self.inner.source)())
    }

    /// Writes through the view are silently ignored; the view is read-only
    /// by contract and never signals failure.
    pub fn set(&self, _index: usize, _value: Value) {}

    /// Truncations and removals through the view are silently ignored.
    pub fn remove(&self, _index: usize) {}

    /// Whether two handles wrap the same cache, i.e. are the same view
    /// instance.
    pub fn ptr_eq(a: &ArrayView, b: &ArrayView) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for ArrayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView").finish_non_exhaustive()
    }
}

impl IntoIterator for &ArrayView {
    type Item = Value;
    type IntoIter = ArrayIter;

    fn into_iter(self) -> ArrayIter {
        self.iter()
    }
}

/// An iterator over a one-shot snapshot of an array view's raw elements.
pub struct ArrayIter {
    items: Rc<Vec<Value>>,
    index: usize,
}

impl Iterator for ArrayIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let item = self.items.get(self.index).cloned()?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArrayIter {}
