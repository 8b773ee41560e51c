use std::{
    any::Any,
    cell::{Ref, RefCell},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use crate::{
    effect::{run_effect, EffectTrait},
    id::Id,
    runtime::RUNTIME,
};

/// A read write Signal which can act as both a Getter and a Setter
pub struct RwSignal<T> {
    pub(crate) id: Id,
    pub(crate) ty: PhantomData<T>,
}

impl<T> Copy for RwSignal<T> {}

impl<T> Clone for RwSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for RwSignal<T> {}

impl<T> PartialEq for RwSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> fmt::Debug for RwSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RwSignal");
        s.field("id", &self.id);
        s.finish()
    }
}

impl<T: 'static> RwSignal<T> {
    pub fn new(value: T) -> Self {
        create_rw_signal(value)
    }

    /// Applies a closure to the current value, subscribing the current
    /// running effect to this Signal.
    pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.id.signal().expect("signal already disposed").with(f)
    }

    /// Applies a closure to the current value without subscribing.
    pub fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.id
            .signal()
            .expect("signal already disposed")
            .with_untracked(f)
    }

    /// Only subscribes the current running effect to this Signal.
    pub fn track(&self) {
        if let Some(signal) = self.id.signal() {
            signal.subscribe();
        }
    }

    /// Sets a new value and triggers the subscribed effects. A write to an
    /// already disposed Signal is a no-op.
    pub fn set(&self, new_value: T) {
        if let Some(signal) = self.id.signal() {
            signal.update_value(|v| *v = new_value);
        }
    }

    /// Updates the stored value in place and triggers the subscribed effects
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        if let Some(signal) = self.id.signal() {
            signal.update_value(f);
        }
    }

    /// Updates the stored value if the Signal is still alive, returning the
    /// closure's result
    pub fn try_update<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.signal().map(|signal| signal.update_value(f))
    }

    /// Create a Getter of this Signal
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            id: self.id,
            ty: PhantomData,
        }
    }

    /// Create a Setter of this Signal
    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal {
            id: self.id,
            ty: PhantomData,
        }
    }
}

impl<T: Clone + 'static> RwSignal<T> {
    /// Clones and returns the current value, subscribing the current running
    /// effect to this Signal.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Clones and returns the current value without subscribing
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

/// A getter only Signal
pub struct ReadSignal<T> {
    pub(crate) id: Id,
    pub(crate) ty: PhantomData<T>,
}

impl<T> Copy for ReadSignal<T> {}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> ReadSignal<T> {
    pub fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.id.signal().expect("signal already disposed").with(f)
    }

    pub fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.id
            .signal()
            .expect("signal already disposed")
            .with_untracked(f)
    }

    pub fn track(&self) {
        if let Some(signal) = self.id.signal() {
            signal.subscribe();
        }
    }
}

impl<T: Clone + 'static> ReadSignal<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

/// A setter only Signal
pub struct WriteSignal<T> {
    pub(crate) id: Id,
    pub(crate) ty: PhantomData<T>,
}

impl<T> Copy for WriteSignal<T> {}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> WriteSignal<T> {
    /// Sets a new value and triggers the subscribed effects. A write to an
    /// already disposed Signal is a no-op.
    pub fn set(&self, new_value: T) {
        if let Some(signal) = self.id.signal() {
            signal.update_value(|v| *v = new_value);
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        if let Some(signal) = self.id.signal() {
            signal.update_value(f);
        }
    }
}

/// Creates a new RwSignal which can act both as a setter and a getter.
/// Accessing the signal value in an Effect will make the Effect subscribe
/// to value changes of the Signal, and whenever the signal value changes,
/// the effect reruns.
pub fn create_rw_signal<T>(value: T) -> RwSignal<T>
where
    T: 'static,
{
    let id = Signal::create(value);
    id.set_scope();
    RwSignal {
        id,
        ty: PhantomData,
    }
}

/// Creates a new Signal split into a getter and a setter
pub fn create_signal<T>(value: T) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: 'static,
{
    let s = create_rw_signal(value);
    (s.read_only(), s.write_only())
}

/// The internal Signal where the value and the subscribers are stored
#[derive(Clone)]
pub(crate) struct Signal {
    pub(crate) id: Id,
    pub(crate) value: Rc<dyn Any>,
    pub(crate) subscribers: Rc<RefCell<HashMap<Id, Rc<dyn EffectTrait>>>>,
}

impl Signal {
    pub(crate) fn create<T>(value: T) -> Id
    where
        T: 'static,
    {
        let id = Id::next();
        let signal = Signal {
            id,
            subscribers: Rc::new(RefCell::new(HashMap::new())),
            value: Rc::new(RefCell::new(value)),
        };
        id.add_signal(signal);
        id
    }

    pub(crate) fn borrow<T: 'static>(&self) -> Ref<'_, T> {
        let value = self
            .value
            .downcast_ref::<RefCell<T>>()
            .expect("to downcast signal type");
        value.borrow()
    }

    pub(crate) fn with_untracked<O, T: 'static>(&self, f: impl FnOnce(&T) -> O) -> O {
        let value = self.borrow::<T>();
        f(&value)
    }

    pub(crate) fn with<O, T: 'static>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.subscribe();
        self.with_untracked(f)
    }

    pub(crate) fn update_value<U, T: 'static>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        let result = {
            let value = self
                .value
                .downcast_ref::<RefCell<T>>()
                .expect("to downcast signal type");
            f(&mut value.borrow_mut())
        };
        self.run_effects();
        result
    }

    pub(crate) fn subscribers(&self) -> HashMap<Id, Rc<dyn EffectTrait>> {
        self.subscribers.borrow().clone()
    }

    pub(crate) fn run_effects(&self) {
        // When batching, defer the subscribers until the batch ends
        if RUNTIME.with(|r| r.batching.get()) {
            RUNTIME.with(|r| {
                for (_, subscriber) in self.subscribers() {
                    r.add_pending_effect(subscriber);
                }
            });
            return;
        }

        for (_, subscriber) in self.subscribers() {
            run_effect(subscriber);
        }
    }

    pub(crate) fn subscribe(&self) {
        RUNTIME.with(|runtime| {
            if let Some(effect) = runtime.current_effect.borrow().as_ref() {
                self.subscribers
                    .borrow_mut()
                    .insert(effect.id(), effect.clone());
                effect.add_observer(self.clone());
            }
        });
    }
}
