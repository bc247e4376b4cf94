//! The [`ElementTree`] — the rendered element hierarchy used for hit testing.
//!
//! An `ElementTree` is a *handle* to shared storage. Cloning it yields another
//! handle to the **same** tree, so a host and the widgets it mounts can all
//! see one hierarchy. Everything is single-threaded (`Rc<RefCell<_>>`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::geom::{Point, Range};

// ---------------------------------------------------------------------------
// ElementId
// ---------------------------------------------------------------------------

/// Opaque identifier of an element. Ids are never reused within a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Internal storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Element {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    bounds: Range,
    class: String,
}

/// Live elements keyed by id. Ids come from a counter and are never
/// reused; removed elements are freed.
#[derive(Debug, Default)]
struct Arena {
    next_id: u32,
    elements: HashMap<ElementId, Element>,
    /// Parentless elements in insertion order; later ones are on top.
    roots: Vec<ElementId>,
}

impl Arena {
    fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Deepest element under `p` in the subtree rooted at `id`. Later
    /// siblings are drawn on top, so they are tried first.
    fn hit(&self, id: ElementId, p: Point) -> Option<ElementId> {
        let e = self.get(id)?;
        if !e.bounds.contains(p) {
            return None;
        }
        e.children
            .iter()
            .rev()
            .find_map(|&child| self.hit(child, p))
            .or(Some(id))
    }
}

// ---------------------------------------------------------------------------
// ElementTree
// ---------------------------------------------------------------------------

/// A tree of rectangular elements backed by shared storage.
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    arena: Rc<RefCell<Arena>>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new element. A `parent` that does not exist (anymore) makes
    /// the element a root.
    pub fn insert(&self, parent: Option<ElementId>, bounds: Range, class: &str) -> ElementId {
        let mut arena = self.arena.borrow_mut();
        let id = ElementId(arena.next_id);
        arena.next_id += 1;
        let parent = match parent {
            Some(pid) => match arena.get_mut(pid) {
                Some(p) => {
                    p.children.push(id);
                    Some(pid)
                }
                None => {
                    log::warn!("element parent {pid} is gone; inserting {id} as a root");
                    None
                }
            },
            None => None,
        };
        if parent.is_none() {
            arena.roots.push(id);
        }
        arena.elements.insert(
            id,
            Element {
                parent,
                children: Vec::new(),
                bounds,
                class: class.to_owned(),
            },
        );
        id
    }

    /// Remove an element together with all of its descendants.
    /// Returns `false` if the element did not exist.
    pub fn remove(&self, id: ElementId) -> bool {
        let mut arena = self.arena.borrow_mut();
        let Some(parent) = arena.get(id).map(|e| e.parent) else {
            return false;
        };
        match parent {
            Some(pid) => {
                if let Some(p) = arena.get_mut(pid) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => arena.roots.retain(|&r| r != id),
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(e) = arena.elements.remove(&cur) {
                stack.extend(e.children);
            }
        }
        true
    }

    pub fn exists(&self, id: ElementId) -> bool {
        self.arena.borrow().get(id).is_some()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.arena.borrow().get(id).and_then(|e| e.parent)
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.arena
            .borrow()
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn bounds(&self, id: ElementId) -> Option<Range> {
        self.arena.borrow().get(id).map(|e| e.bounds)
    }

    /// Move or resize an element. Returns `false` if it does not exist.
    pub fn set_bounds(&self, id: ElementId, bounds: Range) -> bool {
        match self.arena.borrow_mut().get_mut(id) {
            Some(e) => {
                e.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn class(&self, id: ElementId) -> Option<String> {
        self.arena.borrow().get(id).map(|e| e.class.clone())
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.arena.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `node` is `ancestor` itself or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let arena = self.arena.borrow();
        if arena.get(ancestor).is_none() {
            return false;
        }
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = arena.get(id).and_then(|e| e.parent);
        }
        false
    }

    /// The topmost, deepest element whose bounds contain `p`.
    pub fn hit_test(&self, p: Point) -> Option<ElementId> {
        let arena = self.arena.borrow();
        arena
            .roots
            .iter()
            .rev()
            .find_map(|&root| arena.hit(root, p))
    }
}

// ---------------------------------------------------------------------------
// RenderedRegion
// ---------------------------------------------------------------------------

/// The rendered root region of a widget, as seen by the widget itself.
pub trait RenderedRegion {
    /// The root element of the region.
    fn root(&self) -> ElementId;

    /// Whether `target` is the root element or one of its descendants.
    fn contains(&self, target: ElementId) -> bool;
}

/// A [`RenderedRegion`] rooted at an element of an [`ElementTree`].
#[derive(Debug, Clone)]
pub struct MountedRegion {
    tree: ElementTree,
    root: ElementId,
}

impl MountedRegion {
    pub fn new(tree: ElementTree, root: ElementId) -> Self {
        Self { tree, root }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }
}

impl RenderedRegion for MountedRegion {
    fn root(&self) -> ElementId {
        self.root
    }

    fn contains(&self, target: ElementId) -> bool {
        self.tree.contains(self.root, target)
    }
}
