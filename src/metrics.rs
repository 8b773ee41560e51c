//! Diagnostic accounting of live memo cells.
//!
//! Every memoized cell the engine promotes is counted here, and released
//! when its owning scope is disposed. None of this participates in
//! correctness; it exists so that hosts (and tests) can observe how much
//! cached state a view tree is holding on to.

use std::cell::{Cell, RefCell};

/// A lifecycle event for one memoized cache cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellEvent {
    Created,
    Disposed,
}

thread_local! {
    static LIVE_CELLS: Cell<usize> = const { Cell::new(0) };
    static OBSERVER: RefCell<Option<Box<dyn Fn(CellEvent)>>> = const { RefCell::new(None) };
}

/// The number of memoized cells currently alive on this thread, across all
/// views.
pub fn live_cell_count() -> usize {
    LIVE_CELLS.with(|count| count.get())
}

/// Installs a hook observing cell lifecycle events on this thread,
/// replacing any previously installed one.
pub fn observe_cells(observer: impl Fn(CellEvent) + 'static) {
    OBSERVER.with(|slot| *slot.borrow_mut() = Some(Box::new(observer)));
}

pub(crate) fn cell_created() {
    let _ = LIVE_CELLS.try_with(|count| count.set(count.get() + 1));
    notify(CellEvent::Created);
}

// Reached through scope disposal, which can also run from Drop impls during
// thread teardown; the thread locals may already be gone by then.
pub(crate) fn cell_disposed() {
    let _ = LIVE_CELLS.try_with(|count| count.set(count.get().saturating_sub(1)));
    notify(CellEvent::Disposed);
}

fn notify(event: CellEvent) {
    let _ = OBSERVER.try_with(|slot| {
        if let Some(observer) = slot.borrow().as_ref() {
            observer(event);
        }
    });
}
