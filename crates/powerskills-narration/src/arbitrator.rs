//! Narration arbitrator — app-wide single-flight narration ownership.
//!
//! Every component that can make a sound registers a listener. Before it
//! starts playback it calls [`NarrationArbitrator::activate`], which tells
//! every other registered owner to stop. Notices carry the id of the owner
//! that is about to play so a listener can recognise a notice that is not
//! meant for it.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Identifies one narration-capable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Generates a fresh owner identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stop request broadcast when an owner activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopNotice {
    /// The owner that is about to play and must keep playing.
    pub except: OwnerId,
}

type Listener = Arc<dyn Fn(StopNotice) + Send + Sync>;

struct Entry {
    token: u64,
    owner: OwnerId,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    active: Option<OwnerId>,
    next_token: u64,
}

/// Shared handle to the process-wide narration registry.
///
/// Cloning the handle shares the registry.
#[derive(Clone, Default)]
pub struct NarrationArbitrator {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for NarrationArbitrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        f.debug_struct("NarrationArbitrator")
            .field("registered", &registry.entries.len())
            .field("active", &registry.active)
            .finish()
    }
}

impl NarrationArbitrator {
    /// Creates an empty arbitrator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for stop notices aimed at `owner`.
    ///
    /// The returned [`Registration`] unsubscribes when dropped.
    pub fn register<F>(&self, owner: OwnerId, listener: F) -> Registration
    where
        F: Fn(StopNotice) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let token = registry.next_token;
        registry.next_token += 1;
        registry.entries.push(Entry {
            token,
            owner,
            listener: Arc::new(listener),
        });
        debug!(%owner, token, "narration owner registered");
        Registration {
            registry: Arc::downgrade(&self.registry),
            token,
            owner,
        }
    }

    /// Declares that `owner` is about to play and silences everyone else.
    ///
    /// Must be called before playback starts. Listeners run after the
    /// registry lock is released, so they may call back into the arbitrator.
    pub fn activate(&self, owner: OwnerId) {
        let targets: Vec<Listener> = {
            let mut registry = lock(&self.registry);
            registry.active = Some(owner);
            registry
                .entries
                .iter()
                .filter(|entry| entry.owner != owner)
                .map(|entry| Arc::clone(&entry.listener))
                .collect()
        };
        debug!(%owner, notified = targets.len(), "narration owner activated");
        let notice = StopNotice { except: owner };
        for listener in targets {
            listener(notice);
        }
    }

    /// Clears the active owner if it is `owner`.
    pub fn release(&self, owner: OwnerId) {
        let mut registry = lock(&self.registry);
        if registry.active == Some(owner) {
            registry.active = None;
        }
    }

    /// Returns the owner that most recently activated and has not released.
    #[must_use]
    pub fn active(&self) -> Option<OwnerId> {
        lock(&self.registry).active
    }

    /// Returns the number of live registrations.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        lock(&self.registry).entries.len()
    }
}

/// Live subscription to stop notices. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Registration {
    registry: Weak<Mutex<Registry>>,
    token: u64,
    owner: OwnerId,
}

impl Registration {
    /// The owner this registration belongs to.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Unsubscribes immediately.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        registry.entries.retain(|entry| entry.token != self.token);
        let owner_still_registered = registry.entries.iter().any(|e| e.owner == self.owner);
        if registry.active == Some(self.owner) && !owner_still_registered {
            registry.active = None;
        }
        debug!(owner = %self.owner, token = self.token, "narration owner unregistered");
    }
}

fn lock(registry: &Mutex<Registry>) -> std::sync::MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
