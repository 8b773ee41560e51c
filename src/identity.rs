//! The equality policy deciding when snapshot values are "the same".

use std::rc::Rc;

use crate::value::Value;

/// Compares two sequences for immutable changes: same length and, pairwise,
/// either identical values or composites carrying the same `id`.
///
/// This is deliberately shallow. No deep equality is attempted, and two
/// composites that both lack an `id` compare equal here; producers that want
/// stable identity across rebuilt snapshots are expected to stamp their
/// records with `id`.
pub(crate) fn sequence_equals(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(a, b)| a == b || (a.is_composite() && b.is_composite() && a.id() == b.id()))
}

/// Same-length, pairwise string equality for key sequences.
pub(crate) fn key_sequence_equals(a: &[Rc<str>], b: &[Rc<str>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a == b)
}

/// Whether a candidate replacement still refers to the entity the cache last
/// produced a result for. Only then may the previous result be served
/// unchanged.
pub(crate) fn same_entity(prev_id: &Value, candidate: &Value, has_prev: bool) -> bool {
    has_prev && candidate.id() == *prev_id
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{key_sequence_equals, same_entity, sequence_equals};
    use crate::value::{Object, Value};

    fn record(id: i32) -> Value {
        Object::new().with("id", id).into()
    }

    #[test]
    fn identical_elements_are_equal() {
        let a = record(1);
        let items = [a.clone(), Value::from(2)];
        assert!(sequence_equals(&items, &[a, Value::from(2)]));
    }

    #[test]
    fn rebuilt_records_match_by_id() {
        assert!(sequence_equals(&[record(1)], &[record(1)]));
        assert!(!sequence_equals(&[record(1)], &[record(2)]));
    }

    #[test]
    fn length_differences_never_match() {
        assert!(!sequence_equals(&[record(1)], &[record(1), record(2)]));
        assert!(sequence_equals(&[], &[]));
    }

    #[test]
    fn rebuilt_primitives_match_by_value_only() {
        assert!(sequence_equals(&[Value::from("x")], &[Value::from("x")]));
        assert!(!sequence_equals(&[Value::from("x")], &[Value::from("y")]));
        assert!(!sequence_equals(&[Value::from(1)], &[record(1)]));
    }

    #[test]
    fn idless_composites_compare_equal() {
        // The documented limit of the heuristic: no ids means no way to
        // tell two rebuilt records apart.
        let a: Value = Object::new().with("x", 1).into();
        let b: Value = Object::new().with("x", 2).into();
        assert!(sequence_equals(&[a], &[b]));
    }

    #[test]
    fn key_sequences_compare_by_content() {
        let a: Vec<Rc<str>> = vec![Rc::from("a"), Rc::from("b")];
        let b: Vec<Rc<str>> = vec![Rc::from("a"), Rc::from("b")];
        let c: Vec<Rc<str>> = vec![Rc::from("b"), Rc::from("a")];
        assert!(key_sequence_equals(&a, &b));
        assert!(!key_sequence_equals(&a, &c));
        assert!(!key_sequence_equals(&a, &a[..1]));
    }

    #[test]
    fn same_entity_requires_a_previous_result() {
        let candidate = record(1);
        assert!(!same_entity(&Value::from(1), &candidate, false));
        assert!(same_entity(&Value::from(1), &candidate, true));
        assert!(!same_entity(&Value::from(2), &candidate, true));
    }
}
