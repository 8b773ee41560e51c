use std::{cell::Cell, rc::Rc};

use vitrine_reactive::{create_effect, create_memo, create_rw_signal};

#[test]
fn memo_caches_and_recomputes_on_source_change() {
    let source = create_rw_signal(1);
    let computations = Rc::new(Cell::new(0));

    let memo = create_memo({
        let computations = computations.clone();
        move |_| {
            computations.set(computations.get() + 1);
            source.get() * 2
        }
    });

    assert_eq!(memo.get(), 2);
    assert_eq!(memo.get(), 2);
    assert_eq!(computations.get(), 1, "reads hit the cache");

    source.set(3);
    assert_eq!(memo.get(), 6);
    assert_eq!(computations.get(), 2, "one recompute per source change");
}

#[test]
fn memo_only_notifies_when_the_value_changes() {
    let source = create_rw_signal(0);
    let parity = create_memo(move |_| source.get() % 2);
    let runs = Rc::new(Cell::new(0));

    create_effect({
        let runs = runs.clone();
        move |_| {
            parity.get();
            runs.set(runs.get() + 1);
        }
    });

    assert_eq!(runs.get(), 1);

    // 0 -> 2 recomputes the memo but the parity is unchanged.
    source.set(2);
    assert_eq!(runs.get(), 1, "dependents skipped for an equal value");

    source.set(3);
    assert_eq!(runs.get(), 2, "dependents rerun when the value differs");
}

#[test]
fn memo_can_return_its_previous_value_to_stay_stable() {
    let source = create_rw_signal(vec![1, 2, 3]);

    // Keeps the previously produced Rc alive as long as the contents are
    // equal, the same way the view layer keeps key sequences stable.
    let stable = create_memo(move |prev: Option<&Rc<Vec<i32>>>| {
        let current = source.get();
        match prev {
            Some(prev) if **prev == current => prev.clone(),
            _ => Rc::new(current),
        }
    });

    let first = stable.get();
    source.set(vec![1, 2, 3]);
    let second = stable.get();
    assert!(
        Rc::ptr_eq(&first, &second),
        "equal contents keep the same allocation"
    );

    source.set(vec![4]);
    let third = stable.get();
    assert!(!Rc::ptr_eq(&first, &third));
    assert_eq!(*third, vec![4]);
}

#[test]
fn memo_track_subscribes_without_cloning() {
    let source = create_rw_signal(String::from("a"));
    let upper = create_memo(move |_| source.with(|s| s.to_uppercase()));
    let runs = Rc::new(Cell::new(0));

    create_effect({
        let runs = runs.clone();
        move |_| {
            upper.track();
            runs.set(runs.get() + 1);
        }
    });

    assert_eq!(runs.get(), 1);
    source.set(String::from("b"));
    assert_eq!(runs.get(), 2);
    assert_eq!(upper.with(|s| s.clone()), "B");
}
