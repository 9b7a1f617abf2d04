use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::items::ItemList;

/// Version label given to modules created from scratch.
pub const DEFAULT_VERSION: &str = "V1 R1";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque, immutable identifier of a [`Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(Uuid);

impl ModuleId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an [`Item`], unique within its owning module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single BOM line-item.
///
/// `serial_no` is derived from the item's position in its [`ItemList`] and
/// is rewritten by every structural change to the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub serial_no: u32,
    pub component: String,
    pub value: String,
    pub total_quantity: u32,
    /// Quantity per board.
    pub pcb_quantity: u32,
    #[serde(default)]
    pub selected: bool,
}

/// Line-item contents without identity or position.
///
/// This is the shape suggestions and imports are merged from; the list
/// assigns the id and serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub component: String,
    pub value: String,
    pub total_quantity: u32,
    pub pcb_quantity: u32,
}

impl From<Item> for NewItem {
    fn from(item: Item) -> Self {
        Self {
            component: item.component,
            value: item.value,
            total_quantity: item.total_quantity,
            pcb_quantity: item.pcb_quantity,
        }
    }
}

impl NewItem {
    /// Attach an identity and position, producing a full [`Item`].
    pub fn into_item(self, serial_no: u32) -> Item {
        Item {
            id: ItemId::new(),
            serial_no,
            component: self.component,
            value: self.value,
            total_quantity: self.total_quantity,
            pcb_quantity: self.pcb_quantity,
            selected: false,
        }
    }
}

/// A named, versioned BOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub version: String,
    pub items: ItemList,
    pub last_modified: DateTime<Utc>,
}

impl Module {
    /// Build a module with a fresh identifier, stamped now.
    ///
    /// Fails if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        items: ItemList,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(Self {
            id: ModuleId::new(),
            name,
            version: version.into(),
            items,
            last_modified: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("module name is required")]
    NameRequired,

    #[error("component name is required")]
    ComponentRequired,
}
