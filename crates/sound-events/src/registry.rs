//! Callback table: at most one entry per [`EventKind`]

use crate::callback::{Callback, CallbackError};
use crate::event::EventKind;

/// What happened when the registry was asked to dispatch a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Nothing registered for the kind; no-op
    NoCallback,
    /// Callback ran and returned `Ok`
    Delivered,
    /// Callback ran and returned an error
    Failed(CallbackError),
}

impl Outcome {
    pub(crate) fn of(result: Result<(), CallbackError>) -> Self {
        match result {
            Ok(()) => Outcome::Delivered,
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// One optional [`Callback`] per [`EventKind`].
///
/// Keys are unique by construction: each kind has its own slot, and
/// registering overwrites the slot in a single assignment.
pub struct CallbackRegistry<A> {
    play_completed: Option<Callback<A>>,
    record_completed: Option<Callback<A>>,
}

impl<A> CallbackRegistry<A> {
    /// Create a registry with every slot empty.
    pub const fn new() -> Self {
        Self {
            play_completed: None,
            record_completed: None,
        }
    }

    fn slot(&self, kind: EventKind) -> &Option<Callback<A>> {
        match kind {
            EventKind::PlayCompleted => &self.play_completed,
            EventKind::RecordCompleted => &self.record_completed,
        }
    }

    fn slot_mut(&mut self, kind: EventKind) -> &mut Option<Callback<A>> {
        match kind {
            EventKind::PlayCompleted => &mut self.play_completed,
            EventKind::RecordCompleted => &mut self.record_completed,
        }
    }

    /// Replace the entry for `kind`, returning the one it displaces.
    ///
    /// `None` disables notification for the kind.
    pub fn register(
        &mut self,
        kind: EventKind,
        callback: Option<Callback<A>>,
    ) -> Option<Callback<A>> {
        core::mem::replace(self.slot_mut(kind), callback)
    }

    /// Remove the entry for `kind`, returning it.
    pub fn clear(&mut self, kind: EventKind) -> Option<Callback<A>> {
        self.slot_mut(kind).take()
    }

    /// Returns `true` if a callback is registered for `kind`.
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.slot(kind).is_some()
    }

    /// The entry for `kind`, if any.
    pub fn entry(&self, kind: EventKind) -> Option<&Callback<A>> {
        self.slot(kind).as_ref()
    }

    /// Invoke the callback for `kind` with its bound arguments, if one is registered.
    pub fn invoke_if_present(&self, kind: EventKind) -> Outcome {
        match self.slot(kind) {
            Some(entry) => Outcome::of(entry.invoke()),
            None => Outcome::NoCallback,
        }
    }
}

impl<A> Default for CallbackRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
