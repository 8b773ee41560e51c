use std::{cell::Cell, rc::Rc};

use vitrine_reactive::{create_memo, create_rw_signal, on_cleanup, with_scope, Scope};

#[test]
fn dispose_stops_effects_under_the_scope() {
    let source = create_rw_signal(0);
    let runs = Rc::new(Cell::new(0));

    let scope = Scope::new();
    scope.create_effect({
        let runs = runs.clone();
        move |_| {
            source.track();
            runs.set(runs.get() + 1);
        }
    });

    assert_eq!(runs.get(), 1);
    source.set(1);
    assert_eq!(runs.get(), 2);

    scope.dispose();
    source.set(2);
    assert_eq!(runs.get(), 2, "a disposed effect never reruns");
}

#[test]
fn cleanup_runs_exactly_once_on_dispose() {
    let cleanups = Rc::new(Cell::new(0));

    let scope = Scope::new();
    with_scope(scope, {
        let cleanups = cleanups.clone();
        move || {
            on_cleanup(move || cleanups.set(cleanups.get() + 1));
        }
    });

    assert_eq!(cleanups.get(), 0);
    scope.dispose();
    assert_eq!(cleanups.get(), 1);
    scope.dispose();
    assert_eq!(cleanups.get(), 1, "cleanups do not run twice");
}

#[test]
fn disposing_a_child_scope_leaves_the_parent_alive() {
    let source = create_rw_signal(0);
    let parent_runs = Rc::new(Cell::new(0));
    let child_runs = Rc::new(Cell::new(0));

    let parent = Scope::new();
    parent.create_effect({
        let parent_runs = parent_runs.clone();
        move |_| {
            source.track();
            parent_runs.set(parent_runs.get() + 1);
        }
    });

    let child = parent.create_child();
    child.create_effect({
        let child_runs = child_runs.clone();
        move |_| {
            source.track();
            child_runs.set(child_runs.get() + 1);
        }
    });

    child.dispose();
    source.set(1);

    assert_eq!(child_runs.get(), 1, "child effect stopped");
    assert_eq!(parent_runs.get(), 2, "parent effect still live");
}

#[test]
fn disposing_the_parent_takes_children_with_it() {
    let source = create_rw_signal(0);
    let runs = Rc::new(Cell::new(0));
    let cleanups = Rc::new(Cell::new(0));

    let parent = Scope::new();
    let child = parent.create_child();
    child.create_effect({
        let runs = runs.clone();
        move |_| {
            source.track();
            runs.set(runs.get() + 1);
        }
    });
    with_scope(child, {
        let cleanups = cleanups.clone();
        move || on_cleanup(move || cleanups.set(cleanups.get() + 1))
    });

    parent.dispose();
    source.set(1);

    assert_eq!(runs.get(), 1);
    assert_eq!(cleanups.get(), 1);
}

#[test]
fn cleanup_inside_an_effect_runs_before_each_rerun() {
    let source = create_rw_signal(0);
    let cleanups = Rc::new(Cell::new(0));

    let scope = Scope::new();
    scope.create_effect({
        let cleanups = cleanups.clone();
        move |_| {
            source.track();
            let cleanups = cleanups.clone();
            on_cleanup(move || cleanups.set(cleanups.get() + 1));
        }
    });

    assert_eq!(cleanups.get(), 0);
    source.set(1);
    assert_eq!(cleanups.get(), 1, "previous run's cleanup fires on rerun");
    scope.dispose();
    assert_eq!(cleanups.get(), 2, "last run's cleanup fires on dispose");
}

#[test]
fn creating_a_memo_inside_an_effect_keeps_outer_tracking() {
    let a = create_rw_signal(0);
    let b = create_rw_signal(0);
    let runs = Rc::new(Cell::new(0));

    let scope = Scope::new();
    scope.create_effect({
        let runs = runs.clone();
        move |_| {
            a.track();
            // The memo's initial computation runs nested inside this
            // effect; reads after it must still subscribe this effect.
            let doubled = create_memo(move |_| b.get() * 2);
            let _ = doubled.get_untracked();
            b.track();
            runs.set(runs.get() + 1);
        }
    });

    assert_eq!(runs.get(), 1);
    b.set(1);
    assert_eq!(runs.get(), 2, "outer effect survived nested memo creation");
}
