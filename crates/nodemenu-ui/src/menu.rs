use nodemenu_core::messages::{Key, Msg};
use nodemenu_core::{
    Document, ElementId, ElementTree, EventEmitter, ListenerHandle, ListenerKind, MenuBus,
    MenuError, MenuLifecycleAction, MountedRegion, Point, Range, RenderedRegion, Scene,
    SelectionEvent, Subscription, Tone,
};

use crate::item::{MenuItem, MenuItems};

/// Cells of padding between the menu border and its entries.
const PADDING: i32 = 1;

/// Configuration for a [`NodeMenu`].
#[derive(Debug, Clone)]
pub struct NodeMenuConfig {
    /// The menu entries, in display order.
    pub items: Vec<MenuItem>,
    /// Top-left corner of the menu on screen.
    pub origin: Point,
}

impl Default for NodeMenuConfig {
    fn default() -> Self {
        Self {
            items: MenuItems::tag_menu().into_vec(),
            origin: Point::ZERO,
        }
    }
}

/// Lifecycle state of a [`NodeMenu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuState {
    /// No document listeners are registered.
    Inactive,
    /// Listening for outside clicks and Escape.
    Active,
}

// ---------------------------------------------------------------------------
// CloseRule
// ---------------------------------------------------------------------------

/// Decides whether a document-level input should close the menu, and
/// publishes the close request when it does.
#[derive(Debug, Clone)]
struct CloseRule<R> {
    region: R,
    bus: MenuBus,
}

impl<R: RenderedRegion> CloseRule<R> {
    /// A pointer-down outside the region, or an Escape release. A pointer
    /// event without a target never qualifies.
    fn qualifies(&self, msg: &Msg) -> bool {
        match msg {
            Msg::Mouse { action, target, .. } if action.is_press() => {
                target.is_some_and(|t| !self.region.contains(t))
            }
            Msg::KeyUp {
                key: Key::Escape, ..
            } => true,
            _ => false,
        }
    }

    fn apply(&self, msg: &Msg) -> bool {
        if !self.qualifies(msg) {
            return false;
        }
        self.bus.fire_menu_event(msg.target(), MenuLifecycleAction::Close);
        true
    }
}

// ---------------------------------------------------------------------------
// NodeMenu
// ---------------------------------------------------------------------------

/// A contextual popup menu for a tree node.
///
/// Creating a menu mounts it into the element tree; it starts
/// [`Inactive`](MenuState::Inactive). While [`Active`](MenuState::Active) it
/// holds two document listeners (key-up and pointer-down) and publishes a
/// close request on the [`MenuBus`] for outside clicks and Escape. A primary
/// click on an entry emits a [`SelectionEvent`] and then a close request.
///
/// Dropping the menu deactivates it and removes its elements.
#[derive(Debug)]
pub struct NodeMenu {
    items: MenuItems,
    document: Document,
    bus: MenuBus,
    region: MountedRegion,
    item_elements: Vec<ElementId>,
    selections: EventEmitter<SelectionEvent>,
    listeners: Vec<ListenerHandle>,
    state: MenuState,
}

impl NodeMenu {
    /// Validate the entries and mount the menu into `tree`.
    pub fn new(
        config: NodeMenuConfig,
        document: Document,
        bus: MenuBus,
        tree: ElementTree,
    ) -> Result<Self, MenuError> {
        let items = MenuItems::new(config.items)?;

        let row_width = items
            .iter()
            .map(|item| item.label().chars().count() as i32)
            .max()
            .unwrap_or(0)
            + 2;
        let size = Point::new(row_width + 2 * PADDING, items.len() as i32 + 2 * PADDING);
        let container = tree.insert(None, Range::at(config.origin, size), "node-menu");
        let item_elements = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let row = config.origin.shift(PADDING, PADDING + i as i32);
                let class = format!("node-menu-item {}", item.css_class);
                tree.insert(Some(container), Range::at(row, Point::new(row_width, 1)), &class)
            })
            .collect();
        log::debug!(
            "node menu mounted at {} with {} item(s)",
            config.origin,
            items.len()
        );

        Ok(Self {
            items,
            document,
            bus,
            region: MountedRegion::new(tree, container),
            item_elements,
            selections: EventEmitter::new(),
            listeners: Vec::new(),
            state: MenuState::Inactive,
        })
    }

    /// Start listening for document-level key-up and pointer-down input.
    ///
    /// Fails with [`MenuError::AlreadyActive`] if the menu is active, or with
    /// the document's error if a listener cannot be registered; in both cases
    /// no listener is left behind.
    pub fn activate(&mut self) -> Result<(), MenuError> {
        if self.state == MenuState::Active {
            log::warn!("node menu {} activated twice", self.region.root());
            return Err(MenuError::AlreadyActive);
        }
        let rule = self.close_rule();
        let key_up = self
            .document
            .listen(ListenerKind::KeyUp, move |msg| {
                rule.apply(msg);
            })?;
        let rule = self.close_rule();
        let pointer_down = self
            .document
            .listen(ListenerKind::PointerDown, move |msg| {
                rule.apply(msg);
            })?;
        self.listeners = vec![key_up, pointer_down];
        self.state = MenuState::Active;
        log::debug!("node menu {} active", self.region.root());
        Ok(())
    }

    /// Dispose every document listener this menu registered. Safe to call
    /// any number of times.
    pub fn deactivate(&mut self) {
        if self.listeners.is_empty() && self.state == MenuState::Inactive {
            return;
        }
        for handle in self.listeners.drain(..) {
            handle.dispose();
        }
        self.state = MenuState::Inactive;
        log::debug!("node menu {} inactive", self.region.root());
    }

    /// Handle a pointer interaction on `item`.
    ///
    /// Only a primary-button press on an active menu, for one of this menu's
    /// own entries, is accepted: it emits a [`SelectionEvent`] and then
    /// publishes a close request whose sender is the event target. Returns
    /// whether the interaction was accepted.
    pub fn on_item_activated(&self, msg: &Msg, item: &MenuItem) -> bool {
        if self.state != MenuState::Active || !msg.is_primary_press() {
            return false;
        }
        let own = self
            .items
            .position(item.action)
            .and_then(|i| self.items.get(i))
            .is_some_and(|entry| entry == item);
        if !own {
            log::warn!(
                "node menu {}: {} is not one of its items",
                self.region.root(),
                item.action
            );
            return false;
        }
        log::trace!("node menu: {} chosen", item.action);
        self.selections.emit(&SelectionEvent {
            action: item.action,
        });
        self.bus.fire_menu_event(msg.target(), MenuLifecycleAction::Close);
        true
    }

    /// Apply the close rule to a document-level input. Returns whether a
    /// close request was published.
    pub fn on_global_input(&self, msg: &Msg) -> bool {
        self.state == MenuState::Active && self.close_rule().apply(msg)
    }

    /// Route a click to the entry under its target, if any.
    pub fn handle_click(&self, msg: &Msg) -> bool {
        match msg.target().and_then(|t| self.item_at(t)) {
            Some(item) => self.on_item_activated(msg, item),
            None => false,
        }
    }

    /// The entry whose element is, or contains, `target`.
    pub fn item_at(&self, target: ElementId) -> Option<&MenuItem> {
        let tree = self.region.tree();
        self.item_elements
            .iter()
            .position(|&el| tree.contains(el, target))
            .and_then(|i| self.items.get(i))
    }

    /// Subscribe to the selection events of this menu.
    pub fn on_selection<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&SelectionEvent) + 'static,
    {
        self.selections.subscribe(callback)
    }

    pub fn selections(&self) -> &EventEmitter<SelectionEvent> {
        &self.selections
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == MenuState::Active
    }

    pub fn items(&self) -> &MenuItems {
        &self.items
    }

    pub fn region(&self) -> &MountedRegion {
        &self.region
    }

    /// The element of the `i`-th entry.
    pub fn item_element(&self, i: usize) -> Option<ElementId> {
        self.item_elements.get(i).copied()
    }

    /// Screen bounds of the menu container.
    pub fn bounds(&self) -> Range {
        self.region
            .tree()
            .bounds(self.region.root())
            .unwrap_or_default()
    }

    /// Paint the menu: a surface with one row per entry.
    pub fn draw(&self, scene: &mut Scene) {
        scene.fill(self.bounds(), Tone::Surface);
        let tree = self.region.tree();
        for (item, &el) in self.items.iter().zip(&self.item_elements) {
            if let Some(row) = tree.bounds(el) {
                scene.print(row.min, &format!(" {}", item.label()), Tone::Surface);
            }
        }
    }

    fn close_rule(&self) -> CloseRule<MountedRegion> {
        CloseRule {
            region: self.region.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl Drop for NodeMenu {
    fn drop(&mut self) {
        self.deactivate();
        self.region.tree().remove(self.region.root());
    }
}
