use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    id::Id,
    runtime::RUNTIME,
    scope::{with_scope, Scope},
    signal::Signal,
};

pub(crate) trait EffectTrait {
    fn id(&self) -> Id;
    fn run(&self);
    fn add_observer(&self, signal: Signal);
    fn current_observers(&self) -> HashMap<Id, Signal>;
    fn clear_observers(&self);
}

struct Effect<T, F>
where
    T: 'static,
    F: Fn(Option<T>) -> T,
{
    id: Id,
    f: F,
    value: Rc<RefCell<Option<T>>>,
    observers: Rc<RefCell<HashMap<Id, Signal>>>,
}

impl<T, F> Drop for Effect<T, F>
where
    T: 'static,
    F: Fn(Option<T>) -> T,
{
    fn drop(&mut self) {
        self.id.dispose();
    }
}

/// Create an Effect that runs the given function whenever one of the Signals
/// it read in its last run changes.
///
/// The given function runs immediately once, tracking all the signals read
/// during that run. Whenever one of those Signals updates, the function
/// reruns. Tracking is re-established on every run, so an Effect is only
/// retriggered by the Signals its latest run actually read.
pub fn create_effect<T>(f: impl Fn(Option<T>) -> T + 'static)
where
    T: 'static,
{
    let id = Id::next();
    let effect = Rc::new(Effect {
        id,
        f,
        value: Rc::new(RefCell::new(None::<T>)),
        observers: Rc::new(RefCell::new(HashMap::new())),
    });
    id.set_scope();

    RUNTIME.with(|runtime| {
        runtime.effects.borrow_mut().insert(id, effect.clone());
    });

    run_effect(effect);
}

/// Signal reads wrapped in untrack will not subscribe the current running
/// effect
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let prev_effect = RUNTIME.with(|runtime| runtime.current_effect.borrow_mut().take());
    let result = f();
    RUNTIME.with(|runtime| {
        *runtime.current_effect.borrow_mut() = prev_effect;
    });
    result
}

/// Whether the caller is currently executing under a tracked read context,
/// i.e. inside a running Effect (or Memo recomputation). Reads performed now
/// will subscribe that Effect to the Signals they touch.
pub fn is_tracking() -> bool {
    RUNTIME.with(|runtime| runtime.current_effect.borrow().is_some())
}

/// Runs the given function while deferring all effect runs triggered by
/// signal writes inside it. Each affected effect runs once when the
/// outermost batch ends, no matter how many of its signals were written.
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    let already_batching = RUNTIME.with(|runtime| runtime.batching.replace(true));
    let result = f();
    if !already_batching {
        RUNTIME.with(|runtime| {
            runtime.batching.set(false);
            runtime.run_pending_effects();
        });
    }
    result
}

pub(crate) fn run_effect(effect: Rc<dyn EffectTrait>) {
    // A subscriber snapshot taken earlier in this propagation can still
    // deliver a rerun after the effect's scope was disposed; a disposed
    // effect must stay dormant rather than re-track itself.
    let alive = RUNTIME.with(|runtime| runtime.effects.borrow().contains_key(&effect.id()));
    if !alive {
        return;
    }

    // Reset everything the previous run created (child scopes, cleanups)
    // and drop the previous run's subscriptions before re-tracking.
    effect.id().dispose_children();
    observer_clean_up(&effect);

    // Save and restore the previously running effect rather than clearing
    // it: an effect run can create memos (promotion in the view layer),
    // whose initial computation runs nested inside this one.
    let prev_effect = RUNTIME.with(|runtime| {
        runtime
            .current_effect
            .borrow_mut()
            .replace(effect.clone())
    });

    with_scope(Scope(effect.id()), || {
        effect.run();
    });

    RUNTIME.with(|runtime| {
        *runtime.current_effect.borrow_mut() = prev_effect;
    });
}

/// Unhooks an effect from every Signal it subscribed to and clears its
/// observer list, so the next run (if any) can re-track from scratch.
pub(crate) fn observer_clean_up(effect: &Rc<dyn EffectTrait>) {
    for (_, observer) in effect.current_observers().iter() {
        observer.subscribers.borrow_mut().remove(&effect.id());
    }
    effect.clear_observers();
}

impl<T, F> EffectTrait for Effect<T, F>
where
    T: 'static,
    F: Fn(Option<T>) -> T,
{
    fn id(&self) -> Id {
        self.id
    }

    fn run(&self) {
        let curr_value = self.value.borrow_mut().take();
        let new_value = (self.f)(curr_value);
        *self.value.borrow_mut() = Some(new_value);
    }

    fn add_observer(&self, signal: Signal) {
        self.observers.borrow_mut().insert(signal.id, signal);
    }

    fn current_observers(&self) -> HashMap<Id, Signal> {
        self.observers.borrow().clone()
    }

    fn clear_observers(&self) {
        self.observers.borrow_mut().clear();
    }
}
