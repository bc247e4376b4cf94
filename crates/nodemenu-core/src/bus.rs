//! Synchronous publish/subscribe: [`EventEmitter`] and the shared [`MenuBus`].
//!
//! An emitter is a handle; clones publish to and subscribe on the same
//! channel. Every publish notifies all current subscribers once, in
//! subscription order, before returning.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::ElementId;
use crate::events::{LifecycleEvent, MenuLifecycleAction};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Subscriber<T> {
    id: u64,
    callback: Callback<T>,
}

struct Subscribers<T> {
    next_id: u64,
    list: Vec<Subscriber<T>>,
}

impl<T> Subscribers<T> {
    fn is_subscribed(&self, id: u64) -> bool {
        self.list.iter().any(|s| s.id == id)
    }
}

// ---------------------------------------------------------------------------
// EventEmitter
// ---------------------------------------------------------------------------

/// A shared, single-threaded event channel.
pub struct EventEmitter<T> {
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                list: Vec::new(),
            })),
        }
    }
}

impl<T> fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().list.len()
    }
}

impl<T: 'static> EventEmitter<T> {
    /// Register `callback`; it stays subscribed until the returned
    /// [`Subscription`] is explicitly unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        inner.list.push(Subscriber { id, callback });

        let weak: Weak<RefCell<Subscribers<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().list.retain(|s| s.id != id);
                }
            })),
        }
    }

    /// Deliver `event` to every current subscriber. Returns how many
    /// subscribers were called.
    ///
    /// A subscriber removed by an earlier callback of the same publish is not
    /// called. A subscriber that is already running (the event was published
    /// from inside its own callback) is skipped.
    pub fn emit(&self, event: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .inner
            .borrow()
            .list
            .iter()
            .map(|s| (s.id, Rc::clone(&s.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.inner.borrow().is_subscribed(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut f) => {
                    f(event);
                    delivered += 1;
                }
                Err(_) => log::warn!("skipping re-entrant delivery to subscriber {id}"),
            }
        }
        delivered
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle returned by [`EventEmitter::subscribe`].
///
/// Dropping it does **not** unsubscribe; call [`unsubscribe`](Self::unsubscribe).
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    id: u64,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Stop receiving events. A no-op if the emitter is gone.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// MenuBus
// ---------------------------------------------------------------------------

/// The bus every open menu and its host share.
pub type MenuBus = EventEmitter<LifecycleEvent>;

impl EventEmitter<LifecycleEvent> {
    /// Publish `{sender, action}` to every listener of the bus.
    pub fn fire_menu_event(&self, sender: Option<ElementId>, action: MenuLifecycleAction) -> usize {
        let event = LifecycleEvent { sender, action };
        log::trace!("menu bus: {event}");
        self.emit(&event)
    }
}
