use std::sync::atomic::AtomicU64;

use crate::{effect::observer_clean_up, runtime::RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Hash)]
/// A stable identifier for a runtime element.
pub(crate) struct Id(u64);

impl Id {
    pub(crate) fn next() -> Id {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Id(COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }

    pub(crate) fn signal(&self) -> Option<crate::signal::Signal> {
        RUNTIME.with(|runtime| runtime.signals.borrow().get(self).cloned())
    }

    pub(crate) fn add_signal(&self, signal: crate::signal::Signal) {
        RUNTIME.with(|runtime| runtime.signals.borrow_mut().insert(*self, signal));
    }

    pub(crate) fn set_scope(&self) {
        RUNTIME.with(|runtime| {
            let scope = runtime.current_scope.borrow();
            let mut children = runtime.children.borrow_mut();
            let children = children.entry(*scope).or_default();
            children.insert(*self);
        });
    }

    /// Dispose everything created under this id and run its registered
    /// cleanups. This is also the per-rerun reset for effects: children and
    /// cleanups from the previous run go away before the next run re-tracks.
    ///
    /// Disposal can be reached from Drop impls while the thread local
    /// runtime itself is being destroyed, so it must tolerate a dead TLS.
    pub(crate) fn dispose_children(&self) {
        let Ok((children, cleanups)) = RUNTIME.try_with(|runtime| {
            (
                runtime.children.borrow_mut().remove(self),
                runtime.cleanups.borrow_mut().remove(self),
            )
        }) else {
            return;
        };

        if let Some(children) = children {
            for child in children {
                child.dispose();
            }
        }

        if let Some(cleanups) = cleanups {
            for cleanup in cleanups {
                cleanup();
            }
        }
    }

    pub(crate) fn dispose(&self) {
        self.dispose_children();

        let Ok((signal, effect)) = RUNTIME.try_with(|runtime| {
            (
                runtime.signals.borrow_mut().remove(self),
                runtime.effects.borrow_mut().remove(self),
            )
        }) else {
            return;
        };

        // Registrations held *on* a disposed signal die with its subscriber
        // map; live subscribers re-track their remaining sources on their
        // next run. A disposed effect must be unhooked from every signal it
        // still observes so that no later write can reach it.
        drop(signal);
        if let Some(effect) = effect {
            observer_clean_up(&effect);
        }
    }
}
