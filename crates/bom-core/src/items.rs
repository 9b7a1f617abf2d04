//! The ordered line-item list of a module.
//!
//! [`ItemList`] owns its items exclusively and keeps serial numbers dense:
//! for `N` items the serials are exactly `1..=N` in list order after every
//! append, removal or merge. The inner vector is private, so the only way
//! to change the list is through methods that uphold this.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Item, ItemId, NewItem, ValidationError};

/// Raw, unparsed input for a single new line-item, as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub component: String,
    pub value: String,
    pub total_quantity: String,
    pub pcb_quantity: String,
}

impl ItemDraft {
    /// Validate and parse the draft.
    ///
    /// The component must be non-blank. Quantities go through
    /// [`parse_quantity`].
    pub fn to_new_item(&self) -> Result<NewItem, ValidationError> {
        if self.component.trim().is_empty() {
            return Err(ValidationError::ComponentRequired);
        }
        Ok(NewItem {
            component: self.component.clone(),
            value: self.value.clone(),
            total_quantity: parse_quantity(&self.total_quantity),
            pcb_quantity: parse_quantity(&self.pcb_quantity),
        })
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Parse a quantity field.
///
/// Empty, non-numeric, negative, fractional and out-of-range input all map
/// to 0.
pub fn parse_quantity(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

/// Ordered line-items with contiguous 1-based serial numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Append one item parsed from user input.
    ///
    /// Returns the new item. On a validation error the list is unchanged.
    pub fn append(&mut self, draft: &ItemDraft) -> Result<&Item, ValidationError> {
        let new_item = draft.to_new_item()?;
        Ok(self.push(new_item))
    }

    /// Append one already-validated item with serial `len + 1`.
    pub fn push(&mut self, new_item: NewItem) -> &Item {
        let serial = self.next_serial();
        let item = new_item.into_item(serial);
        debug!(item_id = %item.id, serial, component = %item.component, "appended item");
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Remove the item with the given id and renumber the rest.
    ///
    /// Unknown ids are ignored and return `None`.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        let removed = self.items.remove(pos);
        self.renumber();
        debug!(item_id = %id, remaining = self.items.len(), "removed item");
        Some(removed)
    }

    /// Append a batch of suggested items in input order.
    ///
    /// Each one gets a fresh id and a serial continuing from `len + 1`.
    /// Existing items are left as they are. Returns the number appended.
    pub fn merge<I>(&mut self, suggested: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<NewItem>,
    {
        let start = self.items.len();
        let mut serial = self.next_serial();
        let batch: Vec<Item> = suggested
            .into_iter()
            .map(|s| {
                let item = s.into().into_item(serial);
                serial += 1;
                item
            })
            .collect();
        self.items.extend(batch);
        let added = self.items.len() - start;
        debug!(added, total = self.items.len(), "merged items");
        added
    }

    /// Set the selection flag of one item. Returns `false` if the id is unknown.
    pub fn set_selected(&mut self, id: ItemId, selected: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.selected = selected;
                true
            }
            None => false,
        }
    }

    fn next_serial(&self) -> u32 {
        serial_for(self.items.len())
    }

    fn renumber(&mut self) {
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.serial_no = serial_for(idx);
        }
    }
}

/// 1-based serial for a 0-based position.
fn serial_for(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}

impl From<Vec<Item>> for ItemList {
    /// Take ownership of the items in their given order.
    ///
    /// Incoming serial numbers are never trusted; they are recomputed.
    fn from(items: Vec<Item>) -> Self {
        let mut list = Self { items };
        list.renumber();
        list
    }
}

impl From<ItemList> for Vec<Item> {
    fn from(list: ItemList) -> Self {
        list.items
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
