//! Document-level ("global") input listeners: [`Document`] and
//! [`ListenerHandle`].
//!
//! A `Document` is a shared handle to the listener registry of one screen.
//! Widgets register listeners on it and keep the returned handles; a handle
//! removes exactly the registration that created it and nothing else.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::MenuError;
use crate::messages::Msg;

type Listener = Rc<RefCell<dyn FnMut(&Msg)>>;

/// Which input a listener wants to hear about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Key releases.
    KeyUp,
    /// Pointer button presses, any button.
    PointerDown,
}

impl ListenerKind {
    /// Whether `msg` is delivered to listeners of this kind.
    pub fn matches(self, msg: &Msg) -> bool {
        match self {
            Self::KeyUp => matches!(msg, Msg::KeyUp { .. }),
            Self::PointerDown => msg.is_pointer_down(),
        }
    }
}

struct Registration {
    id: u64,
    kind: ListenerKind,
    listener: Listener,
}

struct Registry {
    attached: bool,
    refused: Vec<ListenerKind>,
    next_id: u64,
    list: Vec<Registration>,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.list.iter().any(|r| r.id == id)
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Shared registry of document-level listeners.
#[derive(Clone)]
pub struct Document {
    registry: Rc<RefCell<Registry>>,
}

impl Document {
    /// Create a new, attached document with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                attached: true,
                refused: Vec::new(),
                next_id: 0,
                list: Vec::new(),
            })),
        }
    }

    /// Register `listener` for inputs of `kind`.
    ///
    /// Fails with [`MenuError::DocumentUnavailable`] once the document has
    /// been detached.
    pub fn listen<F>(&self, kind: ListenerKind, listener: F) -> Result<ListenerHandle, MenuError>
    where
        F: FnMut(&Msg) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        if !registry.attached || registry.refused.contains(&kind) {
            return Err(MenuError::DocumentUnavailable);
        }
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        registry.list.push(Registration { id, kind, listener });
        log::trace!("document: registered {kind:?} listener {id}");

        Ok(ListenerHandle {
            id,
            kind,
            registry: Rc::downgrade(&self.registry),
            disposed: false,
        })
    }

    /// Deliver `msg` to every matching listener, in registration order.
    /// Returns the number of listeners invoked.
    ///
    /// A listener disposed by an earlier listener of the same dispatch is
    /// not invoked.
    pub fn dispatch(&self, msg: &Msg) -> usize {
        let snapshot: Vec<(u64, Listener)> = {
            let registry = self.registry.borrow();
            if !registry.attached {
                return 0;
            }
            registry
                .list
                .iter()
                .filter(|r| r.kind.matches(msg))
                .map(|r| (r.id, Rc::clone(&r.listener)))
                .collect()
        };

        let mut invoked = 0;
        for (id, listener) in snapshot {
            if !self.registry.borrow().is_registered(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut f) => {
                    f(msg);
                    invoked += 1;
                }
                Err(_) => log::warn!("document: listener {id} is already running; skipped"),
            }
        }
        invoked
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().list.len()
    }

    /// Number of registered listeners of `kind`.
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.registry
            .borrow()
            .list
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    /// Make later `listen` calls for `kind` fail as if detached.
    #[cfg(any(test, feature = "test-util"))]
    pub fn refuse(&self, kind: ListenerKind) {
        self.registry.borrow_mut().refused.push(kind);
    }

    pub fn is_attached(&self) -> bool {
        self.registry.borrow().attached
    }

    /// Tear the document down: drop every listener and refuse new ones.
    pub fn detach(&self) {
        let dropped = {
            let mut registry = self.registry.borrow_mut();
            registry.attached = false;
            std::mem::take(&mut registry.list)
        };
        log::debug!("document detached, {} listener(s) dropped", dropped.len());
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("attached", &self.is_attached())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ListenerHandle
// ---------------------------------------------------------------------------

/// Disposal handle for one registered listener.
///
/// Owned exclusively by whoever registered the listener. Disposing it (or
/// dropping it) removes that registration; doing so twice, or after the
/// document is gone, does nothing.
pub struct ListenerHandle {
    id: u64,
    kind: ListenerKind,
    registry: Weak<RefCell<Registry>>,
    disposed: bool,
}

impl ListenerHandle {
    /// Remove the listener from its document.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // Drop the listener after the borrow ends; it may own handles that
        // touch this registry when dropped.
        let removed: Vec<Registration> = {
            let mut registry = registry.borrow_mut();
            let (gone, kept): (Vec<Registration>, Vec<Registration>) =
                std::mem::take(&mut registry.list)
                    .into_iter()
                    .partition(|r| r.id == self.id);
            registry.list = kept;
            gone
        };
        if !removed.is_empty() {
            log::trace!("document: disposed {:?} listener {}", self.kind, self.id);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::messages::{Key, MouseAction};
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&Msg) + 'static) {
        let n = Rc::new(Cell::new(0));
        let c = Rc::clone(&n);
        (n, move |_: &Msg| c.set(c.get() + 1))
    }

    #[test]
    fn kinds_filter_messages() {
        let doc = Document::new();
        let (keys, on_key) = counter();
        let (clicks, on_click) = counter();
        let _k = doc.listen(ListenerKind::KeyUp, on_key).unwrap();
        let _c = doc.listen(ListenerKind::PointerDown, on_click).unwrap();

        doc.dispatch(&Msg::key_up(Key::Escape));
        doc.dispatch(&Msg::key(Key::Escape));
        doc.dispatch(&Msg::mouse(MouseAction::Secondary, Point::ZERO, None));
        doc.dispatch(&Msg::mouse(MouseAction::Move, Point::ZERO, None));

        assert_eq!(keys.get(), 1);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn dispose_removes_only_own_listener() {
        let doc = Document::new();
        let (a_hits, a) = counter();
        let (b_hits, b) = counter();
        let ha = doc.listen(ListenerKind::KeyUp, a).unwrap();
        let _hb = doc.listen(ListenerKind::KeyUp, b).unwrap();

        ha.dispose();
        assert_eq!(doc.listener_count(), 1);
        doc.dispatch(&Msg::key_up(Key::Enter));
        assert_eq!(a_hits.get(), 0);
        assert_eq!(b_hits.get(), 1);
    }

    #[test]
    fn dropping_handle_disposes() {
        let doc = Document::new();
        {
            let _h = doc.listen(ListenerKind::PointerDown, |_| {}).unwrap();
            assert_eq!(doc.listener_count_of(ListenerKind::PointerDown), 1);
        }
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn detached_document_refuses_listeners() {
        let doc = Document::new();
        let h = doc.listen(ListenerKind::KeyUp, |_| {}).unwrap();
        doc.detach();
        assert!(!doc.is_attached());
        assert_eq!(doc.listener_count(), 0);
        assert_eq!(
            doc.listen(ListenerKind::KeyUp, |_| {}).unwrap_err(),
            MenuError::DocumentUnavailable
        );
        assert_eq!(doc.dispatch(&Msg::key_up(Key::Escape)), 0);
        h.dispose();
    }

    #[test]
    fn refused_kind_fails_only_that_kind() {
        let doc = Document::new();
        doc.refuse(ListenerKind::PointerDown);
        assert_eq!(
            doc.listen(ListenerKind::PointerDown, |_| {}).unwrap_err(),
            MenuError::DocumentUnavailable
        );
        let _k = doc.listen(ListenerKind::KeyUp, |_| {}).unwrap();
        assert_eq!(doc.listener_count(), 1);
        assert!(doc.is_attached());
    }

    #[test]
    fn listener_disposed_mid_dispatch_is_not_called() {
        let doc = Document::new();
        let (late_hits, late) = counter();
        let slot: Rc<RefCell<Option<ListenerHandle>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        let _first = doc
            .listen(ListenerKind::KeyUp, move |_| {
                if let Some(h) = s.borrow_mut().take() {
                    h.dispose();
                }
            })
            .unwrap();
        *slot.borrow_mut() = Some(doc.listen(ListenerKind::KeyUp, late).unwrap());

        assert_eq!(doc.dispatch(&Msg::key_up(Key::Escape)), 1);
        assert_eq!(late_hits.get(), 0);
    }

    #[test]
    fn handle_outliving_document_is_harmless() {
        let doc = Document::new();
        let h = doc.listen(ListenerKind::KeyUp, |_| {}).unwrap();
        drop(doc);
        h.dispose();
    }
}
