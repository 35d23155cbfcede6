use crate::model::Product;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Modify,
    Remove,
    /// No row image. Notifications may have been lost upstream and
    /// subscribers should rebuild from the store.
    Resync,
}

/// Change notification for one product row, carrying the images before and
/// after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChange {
    pub event_name: ChangeKind,
    pub old_image: Option<Product>,
    pub new_image: Option<Product>,
}

impl ProductChange {
    pub fn insert(new_image: Product) -> Self {
        Self {
            event_name: ChangeKind::Insert,
            old_image: None,
            new_image: Some(new_image),
        }
    }

    pub fn modify(old_image: Product, new_image: Product) -> Self {
        Self {
            event_name: ChangeKind::Modify,
            old_image: Some(old_image),
            new_image: Some(new_image),
        }
    }

    pub fn remove(old_image: Product) -> Self {
        Self {
            event_name: ChangeKind::Remove,
            old_image: Some(old_image),
            new_image: None,
        }
    }

    pub fn resync() -> Self {
        Self {
            event_name: ChangeKind::Resync,
            old_image: None,
            new_image: None,
        }
    }

    pub fn is_resync(&self) -> bool {
        self.event_name == ChangeKind::Resync
    }

    /// Categories touched by this change, from either image.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        let new = self.new_image.as_ref().map(|p| p.category.as_str());
        let old = self
            .old_image
            .as_ref()
            .map(|p| p.category.as_str())
            .filter(|old| Some(*old) != new);

        new.into_iter().chain(old)
    }
}
