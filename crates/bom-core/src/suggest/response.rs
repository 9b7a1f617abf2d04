//! Validation and mapping of the model's structured output.

use serde::Deserialize;

use crate::model::{Item, NewItem};

/// One object of the declared output schema.
///
/// Every field is required; quantities must be non-negative integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedItem {
    pub component: String,
    pub value: String,
    pub total_quantity: u32,
    pub pcb_quantity: u32,
}

impl From<SuggestedItem> for NewItem {
    fn from(s: SuggestedItem) -> Self {
        Self {
            component: s.component,
            value: s.value,
            total_quantity: s.total_quantity,
            pcb_quantity: s.pcb_quantity,
        }
    }
}

/// Parse the model's JSON text into items numbered `1..=K`.
///
/// The whole array is decoded before anything is returned, so a single bad
/// object fails the entire batch. Blank text yields an empty list.
pub fn parse_suggestions(text: &str) -> Result<Vec<Item>, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<SuggestedItem> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .zip(1u32..)
        .map(|(s, serial)| NewItem::from(s).into_item(serial))
        .collect())
}
