//! Change Notifier - process-wide change broadcast keyed by resource URI
//!
//! Observers register against a resource URI and are called for every
//! change on that URI or any URI below it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crossbeam::channel::{self, Receiver};
use serde::Serialize;

use crate::uri::ResourceUri;

/// What kind of mutation triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// A confirmed mutation on a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub resource: ResourceUri,
    pub kind: ChangeKind,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    resource: ResourceUri,
    observer: Observer,
}

/// Registry of observers
#[derive(Default)]
pub struct ChangeNotifier {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` for `resource` and everything below it
    pub fn subscribe<F>(&self, resource: ResourceUri, observer: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Registration {
            id,
            resource,
            observer: Arc::new(observer),
        };
        match self.registrations.write() {
            Ok(mut regs) => regs.push(registration),
            Err(poisoned) => poisoned.into_inner().push(registration),
        }
        id
    }

    /// Register a channel instead of a callback
    pub fn subscribe_channel(&self, resource: ResourceUri) -> (SubscriptionId, Receiver<ChangeEvent>) {
        let (tx, rx) = channel::unbounded();
        let id = self.subscribe(resource, move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a registration; false when it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut regs = match self.registrations.write() {
            Ok(regs) => regs,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = regs.len();
        regs.retain(|r| r.id != id);
        regs.len() != before
    }

    /// Call every observer whose registration covers `event.resource`.
    ///
    /// Observers run after the registry lock is released, so they may
    /// subscribe or unsubscribe themselves.
    pub fn notify(&self, event: &ChangeEvent) -> usize {
        let observers: Vec<Observer> = {
            let regs = match self.registrations.read() {
                Ok(regs) => regs,
                Err(poisoned) => poisoned.into_inner(),
            };
            regs.iter()
                .filter(|r| r.resource.covers(&event.resource))
                .map(|r| Arc::clone(&r.observer))
                .collect()
        };

        tracing::debug!("Notifying {} observer(s) of {:?} on {}", observers.len(), event.kind, event.resource);
        for observer in &observers {
            // A panicking observer must not take the writer down with it.
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| observer(event))) {
                tracing::error!(
                    "Observer panicked on {:?} of {}: {}",
                    event.kind,
                    event.resource,
                    panic_message(panic.as_ref())
                );
            }
        }
        observers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registrations.read().map(|r| r.len()).unwrap_or(0)
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
