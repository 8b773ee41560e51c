//! Object-keyed path caching.

use std::{
    cell::{Cell, RefCell},
    fmt,
    ops::Deref,
    rc::Rc,
};

use rustc_hash::FxHashMap;
use vitrine_reactive::{is_tracking, untrack, with_scope, Memo, Scope};

use crate::{
    cell::{counted_memo, PathCell},
    identity,
    value::Value,
    view::View,
};

/// A read-only, incrementally cached view over an object snapshot.
///
/// Handles are cheap clones of the same underlying cache; two handles
/// compare identical through [`ptr_eq`](ObjectView::ptr_eq) exactly when
/// they came from the same wrap.
#[derive(Clone)]
pub struct ObjectView {
    inner: Rc<ObjectInner>,
}

struct ObjectInner {
    source: Rc<dyn Fn() -> Value>,
    owner: Scope,
    cache: RefCell<FxHashMap<Rc<str>, Rc<PathCell>>>,
    track_keys: Cell<Option<Memo<Keys>>>,
}

impl ObjectView {
    pub(crate) fn new(source: Rc<dyn Fn() -> Value>, owner: Scope) -> Self {
        ObjectView {
            inner: Rc::new(ObjectInner {
                source,
                owner,
                cache: RefCell::new(FxHashMap::default()),
                track_keys: Cell::new(None),
            }),
        }
    }

    /// Reads the value under `key`, wrapped and cached. The first read of a
    /// never-seen key allocates its cache entry; reads under tracking
    /// register a dependency so the caller recomputes when (and only when)
    /// this path's value changes.
    pub fn get(&self, key: &str) -> View {
        // The record's own id is identity metadata; it is served straight
        // from the source without allocating a cell.
        if key == "id" {
            return View::Primitive(untrack(|| (self.inner.source)()).id());
        }

        let cell = {
            let mut cache = self.inner.cache.borrow_mut();
            let existing = cache.get(key).cloned();
            match existing {
                Some(cell) => cell,
                None => {
                    let key: Rc<str> = Rc::from(key);
                    let child = {
                        let source = self.inner.source.clone();
                        let key = key.clone();
                        Rc::new(move || source().get(&key)) as Rc<dyn Fn() -> Value>
                    };
                    let cell = PathCell::new(self.inner.owner, child);
                    cache.insert(key, cell.clone());
                    cell
                }
            }
        };
        cell.read()
    }

    /// The object's own key sequence. Under tracking the sequence is
    /// memoized and keeps its allocation across snapshots until the key set
    /// actually changes; enumerating keys untracked reads the live snapshot
    /// without retaining anything.
    pub fn keys(&self) -> Keys {
        if self.inner.track_keys.get().is_none() && is_tracking() {
            let source = self.inner.source.clone();
            let memo = with_scope(self.inner.owner, move || {
                counted_memo(move |prev: Option<&Keys>| {
                    let keys = current_keys(&source());
                    match prev {
                        Some(prev) if identity::key_sequence_equals(&keys, prev) => prev.clone(),
                        _ => Keys(Rc::from(keys)),
                    }
                })
            });
            self.inner.track_keys.set(Some(memo));
        }
        match self.inner.track_keys.get() {
            Some(memo) => memo.get(),
            None => Keys(Rc::from(current_keys(&(self.inner.source)()))),
        }
    }

    /// Live membership check on the current snapshot. Deliberately not
    /// memoized; membership checks are rare and cheap compared to value
    /// reads.
    pub fn contains_key(&self, key: &str) -> bool {
        match (self.inner.source)().as_object() {
            Some(object) => object.contains_key(key),
            None => false,
        }
    }

    /// The record's `id`, read untracked from the current snapshot.
    pub fn id(&self) -> Value {
        self.raw().id()
    }

    /// The current raw snapshot behind this view, unwrapped and without
    /// dependency registration: the escape hatch for interop.
    pub fn raw(&self) -> Value {
        untrack(|| (self.inner.source)())
    }

    /// Writes through the view are silently ignored; the view is read-only
    /// by contract and never signals failure.
    pub fn set(&self, _key: &str, _value: Value) {}

    /// Deletions through the view are silently ignored.
    pub fn remove(&self, _key: &str) {}

    /// Whether two handles wrap the same cache, i.e. are the same view
    /// instance.
    pub fn ptr_eq(a: &ObjectView, b: &ObjectView) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for ObjectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectView").finish_non_exhaustive()
    }
}

fn current_keys(value: &Value) -> Vec<Rc<str>> {
    match value.as_object() {
        Some(object) => object.keys().cloned().collect(),
        None => Vec::new(),
    }
}

/// An object's key sequence. Clones share the allocation, and the sequence
/// a tracked view hands out stays the *same* allocation across snapshots
/// for as long as the key set is unchanged.
#[derive(Clone, Debug)]
pub struct Keys(Rc<[Rc<str>]>);

impl Keys {
    /// Whether two sequences are the same allocation. This is also what
    /// `==` means for key sequences.
    pub fn ptr_eq(a: &Keys, b: &Keys) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Keys {
    fn eq(&self, other: &Self) -> bool {
        Keys::ptr_eq(self, other)
    }
}

impl Deref for Keys {
    type Target = [Rc<str>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
