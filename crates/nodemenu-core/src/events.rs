//! Menu events shared between a node menu and its host.

use std::fmt;

use crate::element::ElementId;

/// What the host should do in response to a menu selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MenuItemAction {
    NewFolder,
    NewTag,
    Rename,
    Remove,
    RemoveTag,
    CreateTag,
}

impl fmt::Display for MenuItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NewFolder => "new-folder",
            Self::NewTag => "new-tag",
            Self::Rename => "rename",
            Self::Remove => "remove",
            Self::RemoveTag => "remove-tag",
            Self::CreateTag => "create-tag",
        };
        f.write_str(s)
    }
}

/// Control signal broadcast to every open menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MenuLifecycleAction {
    Close,
}

impl fmt::Display for MenuLifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Close => f.write_str("close"),
        }
    }
}

/// Emitted once per accepted item activation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionEvent {
    pub action: MenuItemAction,
}

impl fmt::Display for SelectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "selected {}", self.action)
    }
}

/// Broadcast on the shared menu bus.
///
/// `sender` is the target element of the input that caused the event, or
/// `None` when that input had no target (e.g. a key press).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifecycleEvent {
    pub sender: Option<ElementId>,
    pub action: MenuLifecycleAction,
}

impl LifecycleEvent {
    pub const fn close(sender: Option<ElementId>) -> Self {
        Self {
            sender,
            action: MenuLifecycleAction::Close,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sender {
            Some(id) => write!(f, "{} from {id}", self.action),
            None => write!(f, "{}", self.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(MenuItemAction::RemoveTag.to_string(), "remove-tag");
        let ev = LifecycleEvent::close(Some(ElementId::from_raw(4)));
        assert_eq!(ev.to_string(), "close from #4");
        assert_eq!(LifecycleEvent::close(None).to_string(), "close");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let ev = SelectionEvent {
            action: MenuItemAction::Rename,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"action":"Rename"}"#);
        let back: SelectionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
