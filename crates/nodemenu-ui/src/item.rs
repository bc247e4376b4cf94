use nodemenu_core::{MenuError, MenuItemAction};

/// A single entry of a node menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Display label.
    pub name: String,
    /// What the host should do when the entry is chosen.
    pub action: MenuItemAction,
    /// Icon/style key.
    pub css_class: String,
}

impl MenuItem {
    pub fn new(name: &str, action: MenuItemAction, css_class: &str) -> Self {
        Self {
            name: name.to_owned(),
            action,
            css_class: css_class.to_owned(),
        }
    }

    /// One-character icon for the entry's css class.
    pub fn glyph(&self) -> char {
        match self.css_class.as_str() {
            "new-tag" | "new-folder" => '+',
            "rename" => '~',
            "remove" => 'x',
            _ => '*',
        }
    }

    /// The text shown for the entry: icon, a space, then the label.
    pub fn label(&self) -> String {
        format!("{} {}", self.glyph(), self.name)
    }
}

/// The fixed, ordered, non-empty list of entries of a menu.
///
/// Every action appears at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItems(Vec<MenuItem>);

impl MenuItems {
    /// Validate and wrap `items`.
    pub fn new(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        if items.is_empty() {
            return Err(MenuError::EmptyMenu);
        }
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|prev| prev.action == item.action) {
                return Err(MenuError::DuplicateAction(item.action));
            }
        }
        Ok(Self(items))
    }

    /// The stock menu of a tag tree node.
    pub fn tag_menu() -> Self {
        Self(vec![
            MenuItem::new("New tag", MenuItemAction::CreateTag, "new-tag"),
            MenuItem::new("Rename", MenuItemAction::Rename, "rename"),
            MenuItem::new("Remove tag", MenuItemAction::RemoveTag, "remove"),
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&MenuItem> {
        self.0.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MenuItem> {
        self.0.iter()
    }

    /// Index of the entry carrying `action`.
    pub fn position(&self, action: MenuItemAction) -> Option<usize> {
        self.0.iter().position(|item| item.action == action)
    }

    pub fn into_vec(self) -> Vec<MenuItem> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MenuItems {
    type Item = &'a MenuItem;
    type IntoIter = std::slice::Iter<'a, MenuItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
