//! # Vitrine
//! Vitrine provides read-only, lazily materialized live views over streams
//! of immutable snapshots.
//!
//! A producer periodically publishes a brand-new, fully immutable snapshot
//! of a whole tree-shaped value ([`Value`]). Consumers read sub-parts of
//! that tree through a [`View`]: a stable, fine-grained, incrementally
//! updating interface. Reading a leaf only recomputes when that leaf's
//! value actually changed across snapshots, and a nested record keeps the
//! *same* wrapped instance across snapshots for as long as it is
//! semantically the same entity (tracked through its `id` field), no matter
//! how much its siblings churn.
//!
//! ## Example
//! ```rust
//! use vitrine::{create_view, Object, Value};
//! use vitrine::reactive::create_rw_signal;
//!
//! let snapshot: Value = Object::new()
//!     .with("id", 1)
//!     .with("name", "Ada")
//!     .into();
//!
//! // The producer side: a signal holding the current snapshot.
//! let root = create_rw_signal(snapshot);
//! let view = create_view(move || root.get());
//!
//! assert_eq!(view.get("name").as_str().as_deref(), Some("Ada"));
//!
//! // Publishing a new snapshot: same entity, one changed field.
//! root.set(Object::new().with("id", 1).with("name", "Grace").into());
//! assert_eq!(view.get("name").as_str().as_deref(), Some("Grace"));
//! ```
//!
//! ## How it works
//! Each path into the tree gets a lazily created cache cell. A read pulls
//! the current snapshot from the parent's accessor, extracts the value at
//! its path and reuses the previously produced result whenever the raw
//! value is identical or the value is a record whose `id` is unchanged.
//! Under a tracked read context (see [`reactive`]), cells promote
//! themselves to memos so that dependents are re-notified only for real
//! changes; untracked reads stay plain pulls and retain nothing extra.
//!
//! Views are read-only: writes and deletions through them are silently
//! ignored, by contract. Cyclic trees are unsupported, and a path is
//! expected to keep its shape (object vs array) across snapshots.

mod array;
mod cell;
mod identity;
pub mod metrics;
mod object;
mod value;
mod view;

pub use array::{ArrayIter, ArrayView};
pub use object::{Keys, ObjectView};
pub use value::{Object, Value};
pub use view::{create_view, View};

pub use vitrine_reactive as reactive;
