//! Error type for menu configuration and environment failures.

use thiserror::Error;

use crate::events::MenuItemAction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("menu has no items")]
    EmptyMenu,

    #[error("duplicate menu action: {0}")]
    DuplicateAction(MenuItemAction),

    #[error("menu is already active")]
    AlreadyActive,

    #[error("document is not available for listener registration")]
    DocumentUnavailable,
}
