use std::marker::PhantomData;

use crate::{
    effect::create_effect,
    scope::{with_scope, Scope},
    signal::{create_signal, ReadSignal},
};

/// A Memo is a cached computation over Signals. It recomputes when one of
/// the Signals it read changes, and re-notifies its own subscribers only
/// when the recomputed value actually differs by `PartialEq`.
pub struct Memo<T> {
    getter: ReadSignal<Option<T>>,
    ty: PhantomData<T>,
}

impl<T> Copy for Memo<T> {}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Clone + 'static> Memo<T> {
    pub fn get(&self) -> T {
        self.getter.get().expect("memo is never empty")
    }

    pub fn get_untracked(&self) -> T {
        self.getter.get_untracked().expect("memo is never empty")
    }
}

impl<T: 'static> Memo<T> {
    pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.getter
            .with(|value| f(value.as_ref().expect("memo is never empty")))
    }

    /// Only subscribes the current running effect to this Memo
    pub fn track(&self) {
        self.getter.track();
    }
}

/// Create a Memo from the given computation. The computation runs once
/// immediately; it receives the previously computed value, which it may
/// return again to signal "unchanged".
pub fn create_memo<T>(f: impl Fn(Option<&T>) -> T + 'static) -> Memo<T>
where
    T: PartialEq + 'static,
{
    let (getter, setter) = create_signal(None::<T>);
    let id = getter.id;

    with_scope(Scope(id).create_child(), move || {
        create_effect(move |_| {
            // A rerun can still be delivered from a subscriber snapshot
            // taken before this memo's scope was disposed; skip it without
            // re-tracking anything.
            let Some(signal) = id.signal() else {
                return;
            };
            let (is_different, new_value) = signal.with_untracked(|value: &Option<T>| {
                let new_value = f(value.as_ref());
                (Some(&new_value) != value.as_ref(), new_value)
            });
            if is_different {
                setter.set(Some(new_value));
            }
        });
    });

    Memo {
        getter,
        ty: PhantomData,
    }
}
