//! Per-path cache cells: the heart of the incremental engine.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use vitrine_reactive::{create_memo, is_tracking, on_cleanup, untrack, with_scope, Memo, Scope};

use crate::{
    identity, metrics,
    value::Value,
    view::{wrap, View},
};

/// One cache entry for a single path segment.
///
/// Holds the raw child accessor, the previous pull's bookkeeping (last raw
/// value, last produced result, last seen `id`) and the at-most-one memo
/// the entry is promoted to when first read under tracking. The memo is
/// never recreated; re-wrapping happens by producing a new [`View`] from the
/// same accessor, not by replacing the entry.
pub(crate) struct PathCell {
    child: Rc<dyn Fn() -> Value>,
    owner: Scope,
    prev_value: RefCell<Value>,
    prev_result: RefCell<Option<View>>,
    prev_id: RefCell<Value>,
    memo: Cell<Option<Memo<View>>>,
    slot_scope: Cell<Option<Scope>>,
}

impl PathCell {
    pub(crate) fn new(owner: Scope, child: Rc<dyn Fn() -> Value>) -> Rc<Self> {
        Rc::new(Self {
            child,
            owner,
            prev_value: RefCell::new(Value::Undefined),
            prev_result: RefCell::new(None),
            prev_id: RefCell::new(Value::Undefined),
            memo: Cell::new(None),
            slot_scope: Cell::new(None),
        })
    }

    /// Pulls the current child value and decides whether the previously
    /// produced result can be served unchanged: identical raw value first,
    /// then the `id` convention for composites.
    fn recompute(&self) -> View {
        let v = (self.child)();

        if *self.prev_value.borrow() == v {
            // An Undefined child never records a result (see below), so a
            // never-seen path falls out here without pinning state.
            return self
                .prev_result
                .borrow()
                .clone()
                .unwrap_or(View::Primitive(Value::Undefined));
        }
        *self.prev_value.borrow_mut() = v.clone();

        // Wrapping must not leak subscriptions into whoever triggered the
        // recompute; only the raw pull above is tracked.
        untrack(|| {
            if v.is_composite() {
                let has_prev = self.prev_result.borrow().is_some();
                if identity::same_entity(&self.prev_id.borrow(), &v, has_prev) {
                    return self
                        .prev_result
                        .borrow()
                        .clone()
                        .expect("has_prev was checked");
                }
                *self.prev_id.borrow_mut() = v.id();
                let result = wrap(&v, self.child.clone(), self.owner);
                *self.prev_result.borrow_mut() = Some(result.clone());
                result
            } else {
                *self.prev_id.borrow_mut() = Value::Undefined;
                let result = View::Primitive(v);
                // Undefined stays unrecorded so it can never be mistaken
                // for a reusable previous result.
                *self.prev_result.borrow_mut() = if result.is_undefined() {
                    None
                } else {
                    Some(result.clone())
                };
                result
            }
        })
    }

    /// Reads through the cell, promoting it to a memo the first time it is
    /// read under tracking. Promotion is one-directional and hosts the memo
    /// on the view's owner scope.
    pub(crate) fn read(self: Rc<Self>) -> View {
        if self.memo.get().is_none() && is_tracking() {
            let cell = self.clone();
            let memo = with_scope(self.owner, move || counted_memo(move |_| cell.recompute()));
            self.memo.set(Some(memo));
        }
        match self.memo.get() {
            Some(memo) => memo.get(),
            None => self.recompute(),
        }
    }

    /// Like [`read`](Self::read), but the promoted memo lives in its own
    /// child scope so the slot can be torn down individually when the
    /// owning array shrinks.
    pub(crate) fn read_slot(self: Rc<Self>) -> View {
        if self.memo.get().is_none() && is_tracking() {
            let scope = self.owner.create_child();
            let cell = self.clone();
            let memo = with_scope(scope, move || counted_memo(move |_| cell.recompute()));
            self.memo.set(Some(memo));
            self.slot_scope.set(Some(scope));
        }
        match self.memo.get() {
            Some(memo) => memo.get(),
            None => self.recompute(),
        }
    }

    /// Disposes the slot's scope, and with it the promoted memo, if any.
    pub(crate) fn dispose_slot(&self) {
        if let Some(scope) = self.slot_scope.take() {
            scope.dispose();
        }
    }
}

/// A memo that reports its lifecycle to [`metrics`]. The disposal report is
/// registered as a cleanup on the scope the memo is created under.
pub(crate) fn counted_memo<T>(f: impl Fn(Option<&T>) -> T + 'static) -> Memo<T>
where
    T: PartialEq + 'static,
{
    metrics::cell_created();
    on_cleanup(metrics::cell_disposed);
    create_memo(f)
}
