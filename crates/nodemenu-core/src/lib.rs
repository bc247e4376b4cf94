//! **nodemenu-core** — core types for contextual node menus.
//!
//! Geometry, input messages, the rendered element tree used for hit testing,
//! the document-level listener registry, the synchronous event bus the menus
//! and their host share, the menu event types, and a small application loop
//! for drivers.

pub mod app;
pub mod bus;
pub mod document;
pub mod element;
pub mod error;
pub mod events;
pub mod geom;
pub mod messages;
pub mod scene;

pub use app::{App, AppConfig, Context, Driver, Effect, Model};
pub use bus::{EventEmitter, MenuBus, Subscription};
pub use document::{Document, ListenerHandle, ListenerKind};
pub use element::{ElementId, ElementTree, MountedRegion, RenderedRegion};
pub use error::MenuError;
pub use events::{LifecycleEvent, MenuItemAction, MenuLifecycleAction, SelectionEvent};
pub use geom::{Point, Range};
pub use messages::*;
pub use scene::{Scene, TextRun, Tone};
