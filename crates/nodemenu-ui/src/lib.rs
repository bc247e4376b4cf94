//! Contextual popup menu for tree nodes: the entry list and the
//! [`NodeMenu`] controller.

mod item;
mod menu;

pub use item::{MenuItem, MenuItems};
pub use menu::{MenuState, NodeMenu, NodeMenuConfig};
