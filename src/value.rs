//! The immutable snapshot value model.

use std::rc::Rc;

use indexmap::IndexMap;

/// One immutable tree value supplied by a producer: a primitive, an ordered
/// sequence, or a string-keyed record.
///
/// Containers are `Rc`-shared, so cloning a [`Value`] is cheap and snapshots
/// may structurally share unchanged subtrees. Two container values compare
/// equal only when they are the *same* allocation (see the [`PartialEq`]
/// impl); that pointer identity is what every short-circuit in the view
/// layer is built on.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Object(Rc<Object>),
}

impl Value {
    /// Whether this value is an object or an array.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// The `id` field of an object, or `Undefined` for everything else
    /// (including arrays and objects without one).
    pub fn id(&self) -> Value {
        match self {
            Value::Object(object) => object.id(),
            _ => Value::Undefined,
        }
    }

    /// Keyed child access; `Undefined` when the key is absent or the value
    /// is not an object.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(object) => object.get(key).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    /// Indexed child access; `Undefined` out of bounds or for non-arrays.
    pub fn index(&self, index: usize) -> Value {
        match self {
            Value::Array(items) => items.get(index).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<Vec<Value>>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Strict identity: primitives compare by value (`NaN != NaN` included),
/// containers by pointer. A rebuilt object with identical contents is *not*
/// equal to its predecessor; the view layer falls back to the `id`
/// convention for that case.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An insertion-ordered, string-keyed record. The key order is observable
/// through the view layer's key sequences, so it is preserved.
#[derive(Clone, Debug, Default)]
pub struct Object {
    entries: IndexMap<Rc<str>, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Rc<str>>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert, for assembling snapshots inline.
    pub fn with(mut self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Rc<str>> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The record's `id`, or `Undefined` when it has none.
    pub fn id(&self) -> Value {
        self.get("id").cloned().unwrap_or(Value::Undefined)
    }
}

impl<K: Into<Rc<str>>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Rc::new(object))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use std::rc::Rc;

    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::{Object, Value};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                // Undefined has no JSON spelling; it degrades to null.
                Value::Undefined | Value::Null => serializer.serialize_unit(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Number(n) => serializer.serialize_f64(*n),
                Value::String(s) => serializer.serialize_str(s),
                Value::Array(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items.iter() {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Object(object) => object.serialize(serializer),
            }
        }
    }

    impl Serialize for Object {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in &self.entries {
                map.serialize_entry(&**key, value)?;
            }
            map.end()
        }
    }

    impl From<serde_json::Value> for Value {
        fn from(value: serde_json::Value) -> Self {
            match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
                serde_json::Value::String(s) => Value::String(Rc::from(s)),
                serde_json::Value::Array(items) => {
                    Value::Array(Rc::new(items.into_iter().map(Value::from).collect()))
                }
                serde_json::Value::Object(entries) => Value::Object(Rc::new(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect::<Object>(),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Object, Value};

    #[test]
    fn containers_compare_by_pointer() {
        let a: Value = Object::new().with("x", 1).into();
        let b: Value = Object::new().with("x", 1).into();
        assert_ne!(a, b, "equal contents, different allocations");
        assert_eq!(a, a.clone(), "clones share the allocation");

        let items: Value = vec![Value::from(1)].into();
        assert_eq!(items, items.clone());
        assert_ne!(items, Value::from(vec![Value::from(1)]));
    }

    #[test]
    fn primitives_compare_by_value() {
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_eq!(Value::from(2), Value::from(2.0));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::Null, Value::Undefined);
    }

    #[test]
    fn missing_children_read_as_undefined() {
        let value: Value = Object::new().with("a", 1).into();
        assert!(value.get("b").is_undefined());
        assert!(value.index(0).is_undefined());
        assert!(Value::from(5).get("a").is_undefined());
    }

    #[test]
    fn id_is_undefined_unless_present_on_an_object() {
        let with_id: Value = Object::new().with("id", 7).into();
        assert_eq!(with_id.id(), Value::from(7));

        let array: Value = vec![with_id.clone()].into();
        assert!(array.id().is_undefined());
        assert!(Value::from("x").id().is_undefined());
    }

    #[test]
    fn object_preserves_insertion_order() {
        let object = Object::new().with("z", 1).with("a", 2).with("m", 3);
        let keys: Vec<_> = object.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn from_iter_builds_an_object() {
        let object: Object = [("id", Value::from(1)), ("name", Value::from("n"))]
            .into_iter()
            .collect();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("name"));
        assert_eq!(object.id(), Value::from(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_like_json() {
        let value: Value = Object::new()
            .with("id", 1)
            .with("tags", vec![Value::from("a"), Value::Null])
            .into();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"id":1.0,"tags":["a",null]}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ingests_serde_json_values() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"id": 3, "items": [1, true, null]}"#).unwrap();
        let value = Value::from(json);
        assert_eq!(value.id(), Value::from(3));
        assert_eq!(value.get("items").index(1), Value::from(true));
        assert_eq!(value.get("items").index(2), Value::Null);
    }
}
