//! A single-threaded, fine-grained reactive runtime.
//!
//! This crate provides the reactive primitives the `vitrine` view layer is
//! built on: [Signals](RwSignal) hold values and track their readers,
//! [Effects](create_effect) rerun when the Signals they read change,
//! [Memos](Memo) cache a computation and only re-notify their readers when
//! the cached value actually changes, and [Scopes](Scope) give all of the
//! above an explicit, disposable lifetime with [cleanup](on_cleanup)
//! callbacks.
//!
//! All state lives in a thread-local runtime; everything here is
//! single-threaded and synchronous. Writes run their subscribers eagerly
//! (unless wrapped in [batch]), and memos prune propagation by `PartialEq`,
//! so a dependent only reruns when a value it read meaningfully changed.

mod effect;
mod id;
mod memo;
mod runtime;
mod scope;
mod signal;

pub use effect::{batch, create_effect, is_tracking, untrack};
pub use memo::{create_memo, Memo};
pub use scope::{on_cleanup, with_scope, Scope};
pub use signal::{create_rw_signal, create_signal, ReadSignal, RwSignal, WriteSignal};
