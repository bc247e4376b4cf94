//! Input events: [`Msg`], [`Key`], [`MouseAction`], [`ModMask`].

use std::time::Instant;

use crate::element::ElementId;
use crate::geom::Point;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A keyboard key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Home,
    End,
    /// A printable character.
    Char(char),
}

// ---------------------------------------------------------------------------
// ModMask
// ---------------------------------------------------------------------------

/// Bitmask of modifier keys held during an input event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModMask(pub u8);

impl ModMask {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CTRL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    pub const META: Self = Self(1 << 3);

    /// Whether this mask contains all bits of `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for ModMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// MouseAction
// ---------------------------------------------------------------------------

/// A mouse action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseAction {
    /// Primary (left) button pressed.
    Main,
    /// Middle button pressed.
    Auxiliary,
    /// Secondary (right) button pressed.
    Secondary,
    WheelUp,
    WheelDown,
    /// Button released.
    Release,
    /// Mouse moved (no button state change).
    Move,
}

impl MouseAction {
    /// Whether this is a button press (a pointer-down).
    #[inline]
    pub const fn is_press(self) -> bool {
        matches!(self, Self::Main | Self::Auxiliary | Self::Secondary)
    }
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// An input message delivered to the application.
#[derive(Clone, Debug)]
pub enum Msg {
    /// A key was pressed.
    KeyDown {
        key: Key,
        modifiers: ModMask,
        time: Instant,
    },
    /// A key was released.
    KeyUp {
        key: Key,
        modifiers: ModMask,
        time: Instant,
    },
    /// A mouse event. `target` is the element under the pointer, filled in
    /// by the host after hit testing; drivers leave it `None`.
    Mouse {
        action: MouseAction,
        pos: Point,
        target: Option<ElementId>,
        modifiers: ModMask,
        time: Instant,
    },
    /// The screen / terminal was resized.
    Screen {
        width: i32,
        height: i32,
        time: Instant,
    },
    /// Sent once when the application starts.
    Init,
    /// Request to quit.
    Quit,
}

impl Msg {
    /// Convenience: create a `KeyDown` with no modifiers.
    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    /// Convenience: create a `KeyUp` with no modifiers.
    pub fn key_up(key: Key) -> Self {
        Self::KeyUp {
            key,
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    /// Convenience: create a mouse message with no modifiers.
    pub fn mouse(action: MouseAction, pos: Point, target: Option<ElementId>) -> Self {
        Self::Mouse {
            action,
            pos,
            target,
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    /// The element the event was aimed at, if any.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Mouse { target, .. } => *target,
            _ => None,
        }
    }

    /// Return the message with its mouse target replaced. Other variants are
    /// returned unchanged.
    pub fn with_target(self, target: Option<ElementId>) -> Self {
        match self {
            Self::Mouse {
                action,
                pos,
                modifiers,
                time,
                ..
            } => Self::Mouse {
                action,
                pos,
                target,
                modifiers,
                time,
            },
            other => other,
        }
    }

    /// Whether this is a pointer-down (any button press).
    pub fn is_pointer_down(&self) -> bool {
        matches!(self, Self::Mouse { action, .. } if action.is_press())
    }

    /// Whether this is a press of the primary pointer button.
    pub fn is_primary_press(&self) -> bool {
        matches!(
            self,
            Self::Mouse {
                action: MouseAction::Main,
                ..
            }
        )
    }

    /// Whether this is the release of the Escape key.
    pub fn is_escape_up(&self) -> bool {
        matches!(
            self,
            Self::KeyUp {
                key: Key::Escape,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_press_only_for_main_button() {
        let p = Point::new(1, 1);
        assert!(Msg::mouse(MouseAction::Main, p, None).is_primary_press());
        assert!(!Msg::mouse(MouseAction::Secondary, p, None).is_primary_press());
        assert!(!Msg::mouse(MouseAction::Release, p, None).is_primary_press());
        assert!(!Msg::key(Key::Enter).is_primary_press());
    }

    #[test]
    fn pointer_down_covers_every_button() {
        let p = Point::ZERO;
        for action in [MouseAction::Main, MouseAction::Auxiliary, MouseAction::Secondary] {
            assert!(Msg::mouse(action, p, None).is_pointer_down());
        }
        for action in [MouseAction::Move, MouseAction::Release, MouseAction::WheelUp] {
            assert!(!Msg::mouse(action, p, None).is_pointer_down());
        }
    }

    #[test]
    fn escape_up_ignores_key_down() {
        assert!(Msg::key_up(Key::Escape).is_escape_up());
        assert!(!Msg::key(Key::Escape).is_escape_up());
        assert!(!Msg::key_up(Key::Char('q')).is_escape_up());
    }

    #[test]
    fn with_target_only_touches_mouse() {
        let id = ElementId::from_raw(3);
        let msg = Msg::mouse(MouseAction::Main, Point::ZERO, None).with_target(Some(id));
        assert_eq!(msg.target(), Some(id));
        let key = Msg::key_up(Key::Escape).with_target(Some(id));
        assert_eq!(key.target(), None);
    }
}
