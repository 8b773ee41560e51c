use std::fmt;

use crate::{
    effect::create_effect,
    id::Id,
    memo::{create_memo, Memo},
    runtime::RUNTIME,
    signal::{create_rw_signal, create_signal, ReadSignal, RwSignal, WriteSignal},
};

/// You can manually control the lifetime of reactive state by using a Scope.
/// Every Signal, Memo and Effect belongs to a Scope, created explicitly or
/// implicitly, and disposing the Scope cleans up everything that belongs to
/// it and to all of its child Scopes.
#[derive(Clone, Copy)]
pub struct Scope(pub(crate) Id);

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Scope");
        s.field("id", &self.0);
        s.finish()
    }
}

impl Scope {
    /// Create a new Scope that isn't a child or parent of any scope
    pub fn new() -> Self {
        Self(Id::next())
    }

    /// The current Scope in the Runtime. Anything created with an implicit
    /// scope will be under this Scope
    pub fn current() -> Scope {
        RUNTIME.with(|runtime| Scope(*runtime.current_scope.borrow()))
    }

    /// Create a child Scope of this Scope
    pub fn create_child(&self) -> Scope {
        let child = Id::next();
        RUNTIME.with(|runtime| {
            let mut children = runtime.children.borrow_mut();
            let children = children.entry(self.0).or_default();
            children.insert(child);
        });
        Scope(child)
    }

    /// Create a new Signal under this Scope
    pub fn create_signal<T>(self, value: T) -> (ReadSignal<T>, WriteSignal<T>)
    where
        T: 'static,
    {
        with_scope(self, || create_signal(value))
    }

    /// Create a RwSignal under this Scope
    pub fn create_rw_signal<T>(self, value: T) -> RwSignal<T>
    where
        T: 'static,
    {
        with_scope(self, || create_rw_signal(value))
    }

    /// Create a Memo under this Scope
    pub fn create_memo<T>(self, f: impl Fn(Option<&T>) -> T + 'static) -> Memo<T>
    where
        T: PartialEq + 'static,
    {
        with_scope(self, || create_memo(f))
    }

    /// Create an Effect under this Scope
    pub fn create_effect<T>(self, f: impl Fn(Option<T>) -> T + 'static)
    where
        T: 'static,
    {
        with_scope(self, || create_effect(f))
    }

    /// Dispose this Scope, cleaning up all the Signals, Effects, cleanups
    /// and child Scopes that belong to it.
    pub fn dispose(&self) {
        self.0.dispose();
    }
}

/// Runs the given code with the given Scope as the current one
pub fn with_scope<T>(scope: Scope, f: impl FnOnce() -> T) -> T
where
    T: 'static,
{
    let prev_scope = RUNTIME.with(|runtime| {
        let mut current_scope = runtime.current_scope.borrow_mut();
        let prev_scope = *current_scope;
        *current_scope = scope.0;
        prev_scope
    });

    let result = f();

    RUNTIME.with(|runtime| {
        *runtime.current_scope.borrow_mut() = prev_scope;
    });

    result
}

/// Registers a cleanup function on the current Scope. It runs exactly once,
/// when the Scope is disposed (or, for the implicit scope of an Effect,
/// right before the Effect reruns).
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    RUNTIME.with(|runtime| {
        let scope = *runtime.current_scope.borrow();
        let mut cleanups = runtime.cleanups.borrow_mut();
        cleanups.entry(scope).or_default().push(Box::new(f));
    });
}
