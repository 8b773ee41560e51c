use std::{cell::Cell, rc::Rc};

use vitrine_reactive::{create_effect, create_signal, with_scope, RwSignal, Scope};

#[test]
fn split_signal_connects_getter_and_setter() {
    let (count, set_count) = create_signal(1);

    assert_eq!(count.get(), 1);

    set_count.set(2);
    assert_eq!(count.get(), 2);

    set_count.update(|n| *n += 10);
    assert_eq!(count.with(|n| *n), 12);
}

#[test]
fn update_mutates_in_place_and_notifies() {
    let items = RwSignal::new(vec![1, 2]);
    let len = Rc::new(Cell::new(0));

    create_effect({
        let len = len.clone();
        move |_| {
            len.set(items.with(|items| items.len()));
        }
    });

    assert_eq!(len.get(), 2);

    items.update(|items| items.push(3));
    assert_eq!(len.get(), 3);

    let popped = items.try_update(|items| items.pop());
    assert_eq!(popped, Some(Some(3)));
    assert_eq!(len.get(), 2);
}

#[test]
fn scoped_constructors_tie_lifetimes_to_the_scope() {
    let scope = Scope::new();
    let source = scope.create_rw_signal(2);
    let doubled = scope.create_memo(move |_| source.get() * 2);
    let (label, set_label) = scope.create_signal("even");

    assert_eq!(doubled.get(), 4);
    assert_eq!(label.get(), "even");

    set_label.set("still even");
    source.set(4);
    assert_eq!(doubled.get(), 8);

    scope.dispose();
    // Writes to disposed signals are defined no-ops.
    source.set(8);
    set_label.set("gone");
}

#[test]
fn with_scope_nests_and_restores() {
    let outer = Scope::new();
    let inner = with_scope(outer, || {
        let inner = Scope::current().create_child();
        inner
    });

    let value = inner.create_rw_signal(5);
    assert_eq!(value.get_untracked(), 5);

    // Disposing the outer scope takes the inner scope's state with it.
    outer.dispose();
    value.set(6);
    assert_eq!(value.try_update(|n| *n), None, "signal is gone");
}
