//! Shared code for the nodemenu demos: a tiny tag tree that opens a
//! [`NodeMenu`] on right click.

use std::cell::RefCell;
use std::rc::Rc;

use nodemenu_core::app::{Effect, Model};
use nodemenu_core::messages::{Key, MouseAction, Msg};
use nodemenu_core::{
    Document, ElementId, ElementTree, LifecycleEvent, MenuBus, MenuItemAction, Point, Range,
    Scene, Subscription, Tone,
};
use nodemenu_ui::{NodeMenu, NodeMenuConfig};

pub const WIDTH: i32 = 80;
pub const HEIGHT: i32 = 24;

/// Column where the tree starts.
const TREE_X: i32 = 2;
/// First row of the tree.
const TREE_Y: i32 = 2;

/// What the host learned from the menu callbacks; handled after each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostEvent {
    Selected(MenuItemAction),
    Close(LifecycleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    pub name: String,
    pub depth: usize,
}

struct OpenMenu {
    menu: NodeMenu,
    node: usize,
    selection: Subscription,
}

/// The demo model: a tag tree plus at most one open menu.
pub struct TreeHost {
    tree: ElementTree,
    document: Document,
    bus: MenuBus,
    backdrop: ElementId,
    nodes: Vec<TagNode>,
    rows: Vec<ElementId>,
    open: Option<OpenMenu>,
    events: Rc<RefCell<Vec<HostEvent>>>,
    bus_sub: Option<Subscription>,
    created: usize,
    status: String,
}

impl TreeHost {
    pub fn new(width: i32, height: i32) -> Self {
        let tree = ElementTree::new();
        let backdrop = tree.insert(None, Range::new(0, 0, width, height), "tree-view");
        let bus = MenuBus::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let bus_sub = bus.subscribe(move |ev| sink.borrow_mut().push(HostEvent::Close(*ev)));

        let nodes = [("work", 0), ("reports", 1), ("drafts", 1), ("personal", 0), ("travel", 1)]
            .into_iter()
            .map(|(name, depth)| TagNode {
                name: name.to_owned(),
                depth,
            })
            .collect();

        let mut host = Self {
            tree,
            document: Document::new(),
            bus,
            backdrop,
            nodes,
            rows: Vec::new(),
            open: None,
            events,
            bus_sub: Some(bus_sub),
            created: 0,
            status: String::from("right click a tag"),
        };
        host.layout_rows();
        host
    }

    pub fn nodes(&self) -> &[TagNode] {
        &self.nodes
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn menu(&self) -> Option<&NodeMenu> {
        self.open.as_ref().map(|open| &open.menu)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Screen position of the label of node `i`.
    pub fn node_pos(&self, i: usize) -> Option<Point> {
        self.rows
            .get(i)
            .and_then(|&row| self.tree.bounds(row))
            .map(|r| r.min)
    }

    fn layout_rows(&mut self) {
        for row in self.rows.drain(..) {
            self.tree.remove(row);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let x = TREE_X + 2 * node.depth as i32;
            let width = node.name.chars().count() as i32 + 2;
            let bounds = Range::at(Point::new(x, TREE_Y + i as i32), Point::new(width, 1));
            self.rows.push(self.tree.insert(Some(self.backdrop), bounds, "tree-node"));
        }
    }

    fn node_at(&self, target: ElementId) -> Option<usize> {
        self.rows.iter().position(|&row| row == target)
    }

    fn open_menu(&mut self, node: usize, at: Point) {
        self.close_menu();
        let config = NodeMenuConfig {
            origin: at.shift(1, 1),
            ..NodeMenuConfig::default()
        };
        let opened = NodeMenu::new(
            config,
            self.document.clone(),
            self.bus.clone(),
            self.tree.clone(),
        )
        .and_then(|mut menu| {
            menu.activate()?;
            Ok(menu)
        });
        match opened {
            Ok(menu) => {
                let sink = Rc::clone(&self.events);
                let selection =
                    menu.on_selection(move |ev| sink.borrow_mut().push(HostEvent::Selected(ev.action)));
                self.open = Some(OpenMenu {
                    menu,
                    node,
                    selection,
                });
                self.status = format!("menu for '{}'", self.nodes[node].name);
            }
            Err(e) => {
                log::error!("cannot open node menu: {e}");
                self.status = format!("error: {e}");
            }
        }
    }

    fn close_menu(&mut self) {
        if let Some(OpenMenu {
            mut menu,
            selection,
            ..
        }) = self.open.take()
        {
            selection.unsubscribe();
            menu.deactivate();
        }
    }

    /// Handle everything the menu callbacks queued during the last input.
    fn drain_events(&mut self) {
        let events: Vec<HostEvent> = self.events.borrow_mut().drain(..).collect();
        for ev in events {
            match ev {
                HostEvent::Selected(action) => self.apply(action),
                HostEvent::Close(ev) => {
                    log::debug!("host: {ev}");
                    self.close_menu();
                }
            }
        }
    }

    fn apply(&mut self, action: MenuItemAction) {
        let Some(node) = self.open.as_ref().map(|open| open.node) else {
            return;
        };
        let name = self.nodes[node].name.clone();
        match action {
            MenuItemAction::CreateTag | MenuItemAction::NewTag | MenuItemAction::NewFolder => {
                self.created += 1;
                let child = TagNode {
                    name: format!("tag-{}", self.created),
                    depth: self.nodes[node].depth + 1,
                };
                self.nodes.insert(node + 1, child);
                self.status = format!("created a tag under '{name}'");
            }
            MenuItemAction::Rename => {
                self.status = format!("rename requested for '{name}'");
            }
            MenuItemAction::RemoveTag | MenuItemAction::Remove => {
                let depth = self.nodes[node].depth;
                let end = self.nodes[node + 1..]
                    .iter()
                    .position(|n| n.depth <= depth)
                    .map_or(self.nodes.len(), |p| node + 1 + p);
                self.nodes.drain(node..end);
                self.status = format!("removed '{name}'");
            }
        }
        self.layout_rows();
    }

    fn on_mouse(&mut self, msg: Msg) {
        let (action, pos) = match &msg {
            Msg::Mouse { action, pos, .. } => (*action, *pos),
            _ => return,
        };
        let msg = msg.with_target(self.tree.hit_test(pos));
        self.document.dispatch(&msg);
        if action == MouseAction::Main {
            if let Some(open) = &self.open {
                open.menu.handle_click(&msg);
            }
        }
        self.drain_events();

        if action == MouseAction::Secondary {
            let node = msg.target().and_then(|t| self.node_at(t));
            if let Some(node) = node {
                self.open_menu(node, pos);
            }
        }
    }
}

impl Model for TreeHost {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::KeyDown {
                key: Key::Char('q'),
                ..
            }
            | Msg::Quit => {
                self.close_menu();
                if let Some(sub) = self.bus_sub.take() {
                    sub.unsubscribe();
                }
                return Some(Effect::End);
            }
            Msg::KeyUp { .. } => {
                self.document.dispatch(&msg);
                self.drain_events();
            }
            Msg::Mouse { .. } => self.on_mouse(msg),
            Msg::Screen { width, height, .. } => {
                self.tree
                    .set_bounds(self.backdrop, Range::new(0, 0, width, height));
            }
            _ => {}
        }
        None
    }

    fn draw(&self, scene: &mut Scene) {
        scene.print(Point::new(TREE_X, 0), "Tags", Tone::Highlight);
        for (node, &row) in self.nodes.iter().zip(&self.rows) {
            if let Some(r) = self.tree.bounds(row) {
                let tone = match &self.open {
                    Some(open) if self.nodes.get(open.node) == Some(node) => Tone::Highlight,
                    _ => Tone::Normal,
                };
                scene.print(r.min, &format!("▸ {}", node.name), tone);
            }
        }
        let bottom = scene.size().y - 1;
        scene.print(Point::new(0, bottom - 1), &self.status, Tone::Muted);
        scene.print(
            Point::new(0, bottom),
            "right click: menu  left click: choose  esc: close  q: quit",
            Tone::Muted,
        );
        if let Some(open) = &self.open {
            open.menu.draw(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(host: &mut TreeHost, action: MouseAction, pos: Point) {
        host.update(Msg::mouse(action, pos, None));
    }

    fn open_on(host: &mut TreeHost, node: usize) {
        let pos = host.node_pos(node).unwrap();
        click(host, MouseAction::Secondary, pos);
        assert!(host.menu().is_some());
    }

    fn item_pos(host: &TreeHost, action: MenuItemAction) -> Point {
        let menu = host.menu().unwrap();
        let i = menu.items().position(action).unwrap();
        host.tree()
            .bounds(menu.item_element(i).unwrap())
            .unwrap()
            .min
    }

    #[test]
    fn right_click_opens_active_menu() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        assert!(host.menu().unwrap().is_active());
        assert_eq!(host.document().listener_count(), 2);
        assert_eq!(host.status(), "menu for 'work'");
    }

    #[test]
    fn escape_closes_menu() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 1);
        host.update(Msg::key_up(Key::Escape));
        assert!(host.menu().is_none());
        assert_eq!(host.document().listener_count(), 0);
    }

    #[test]
    fn outside_click_closes_menu() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        click(&mut host, MouseAction::Main, Point::new(70, 20));
        assert!(host.menu().is_none());
        assert_eq!(host.nodes().len(), 5);
    }

    #[test]
    fn click_on_menu_padding_keeps_it_open() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        let corner = host.menu().unwrap().bounds().min;
        click(&mut host, MouseAction::Main, corner);
        assert!(host.menu().is_some());
    }

    #[test]
    fn remove_tag_drops_node_and_children() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        let pos = item_pos(&host, MenuItemAction::RemoveTag);
        click(&mut host, MouseAction::Main, pos);

        assert!(host.menu().is_none());
        let names: Vec<_> = host.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["personal", "travel"]);
        assert_eq!(host.status(), "removed 'work'");
        assert_eq!(host.document().listener_count(), 0);
    }

    #[test]
    fn create_tag_inserts_child() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 3);
        let pos = item_pos(&host, MenuItemAction::CreateTag);
        click(&mut host, MouseAction::Main, pos);

        assert_eq!(
            host.nodes()[4],
            TagNode {
                name: "tag-1".into(),
                depth: 1
            }
        );
        assert!(host.node_pos(5).is_some());
    }

    #[test]
    fn right_click_elsewhere_moves_menu() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 4);
        let first = host.menu().unwrap().bounds();
        let pos = host.node_pos(0).unwrap();
        click(&mut host, MouseAction::Secondary, pos);
        let second = host.menu().unwrap().bounds();
        assert_ne!(first, second);
        assert_eq!(host.document().listener_count(), 2);
        assert_eq!(host.status(), "menu for 'work'");
    }

    #[test]
    fn repeated_open_and_close_keeps_tree_bounded() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        let idle = host.tree().len();
        for _ in 0..1000 {
            open_on(&mut host, 0);
            host.update(Msg::key_up(Key::Escape));
        }
        assert!(host.menu().is_none());
        assert_eq!(host.tree().len(), idle);
        assert_eq!(host.document().listener_count(), 0);
    }

    #[test]
    fn quit_ends_and_releases_listeners() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        assert_eq!(host.update(Msg::key(Key::Char('q'))), Some(Effect::End));
        assert_eq!(host.document().listener_count(), 0);
    }

    #[test]
    fn draw_shows_tree_and_menu() {
        let mut host = TreeHost::new(WIDTH, HEIGHT);
        open_on(&mut host, 0);
        let mut scene = Scene::new(WIDTH, HEIGHT);
        host.draw(&mut scene);
        let texts: Vec<_> = scene.runs().iter().map(|r| r.text.as_str()).collect();
        assert!(texts.contains(&"▸ work"));
        assert!(texts.contains(&" x Remove tag"));
    }
}
