//! Wrapping snapshots into views.

use std::rc::Rc;

use vitrine_reactive::{with_scope, Scope};

use crate::{array::ArrayView, cell::counted_memo, object::ObjectView, value::Value};

/// A read-only wrapper mirroring the shape of its snapshot.
///
/// Reads through a view are cached per path and only recompute when the
/// underlying value actually changed across snapshots. A view over a
/// primitive is just the primitive; only objects and arrays get wrapped.
#[derive(Clone, Debug)]
pub enum View {
    Primitive(Value),
    Object(ObjectView),
    Array(ArrayView),
}

/// Views compare the way their snapshots do: primitives by value, wrappers
/// by instance identity. This equality is what promoted memos prune
/// propagation with, so "equal" means "no downstream recomputation".
impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (View::Primitive(a), View::Primitive(b)) => a == b,
            (View::Object(a), View::Object(b)) => ObjectView::ptr_eq(a, b),
            (View::Array(a), View::Array(b)) => ArrayView::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl View {
    pub fn as_object(&self) -> Option<&ObjectView> {
        match self {
            View::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            View::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The primitive behind this view, when it is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            View::Primitive(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, View::Primitive(Value::Undefined))
    }

    /// Keyed read, passing through to the object view; `Undefined` for
    /// anything that is not an object.
    pub fn get(&self, key: &str) -> View {
        match self {
            View::Object(object) => object.get(key),
            _ => View::Primitive(Value::Undefined),
        }
    }

    /// Indexed read, passing through to the array view; `Undefined` for
    /// anything that is not an array.
    pub fn index(&self, index: usize) -> View {
        match self {
            View::Array(array) => array.get(index),
            _ => View::Primitive(Value::Undefined),
        }
    }

    /// The current raw snapshot behind this view, unwrapped and without
    /// dependency registration: the escape hatch for structural comparison
    /// or serialization.
    pub fn raw(&self) -> Value {
        match self {
            View::Primitive(value) => value.clone(),
            View::Object(object) => object.raw(),
            View::Array(array) => array.raw(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_str(&self) -> Option<Rc<str>> {
        match self {
            View::Primitive(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Wraps a composite child behind its live accessor; primitives pass
/// through. All cells created beneath the result are hosted on `owner`.
pub(crate) fn wrap(value: &Value, source: Rc<dyn Fn() -> Value>, owner: Scope) -> View {
    match value {
        Value::Object(_) => View::Object(ObjectView::new(source, owner)),
        Value::Array(_) => View::Array(ArrayView::new(source, owner)),
        _ => View::Primitive(value.clone()),
    }
}

/// Creates a [`View`] over a stream of immutable snapshots.
///
/// `source` is a zero-argument accessor returning the *current* root
/// snapshot; it must be cheap to call repeatedly, and each snapshot it
/// returns must be immutable. The root is wrapped according to its shape at
/// call time — a path switching between object and array across snapshots
/// is outside the contract and behaves unspecified (the raw escape hatch
/// still reflects the live value).
///
/// All cache state lives under a child of the scope current at the call, so
/// disposing that scope tears the whole view down. Wrapping is lazy and
/// depth-agnostic: nothing beneath the root is walked or allocated until it
/// is read.
pub fn create_view(source: impl Fn() -> Value + 'static) -> View {
    let first = source();
    if !first.is_composite() {
        return View::Primitive(first);
    }
    let owner = Scope::current().create_child();
    let root = with_scope(owner, move || counted_memo(move |_| source()));
    wrap(&first, Rc::new(move || root.get()), owner)
}
