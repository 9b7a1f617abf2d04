//! Core logic for the BOM editor.
//!
//! - [`items`]: the ordered line-item list and its serial-number invariant.
//! - [`catalog`]: the in-memory collection of modules.
//! - [`editor`]: a single editing session over one module's working copy.
//! - [`suggest`]: the AI suggestion boundary (prompt, schema, client).
//! - [`export`]: CSV rendering of an item list.
//! - [`module_file`]: TOML import format for module definitions.

pub mod catalog;
pub mod config;
pub mod editor;
pub mod export;
pub mod items;
pub mod model;
pub mod module_file;
pub mod suggest;

pub use catalog::{ModuleCatalog, UpsertOutcome};
pub use editor::{EditorError, EditorSession, SessionToken, SuggestionTicket};
pub use items::{ItemDraft, ItemList, parse_quantity};
pub use model::{DEFAULT_VERSION, Item, ItemId, Module, ModuleId, NewItem, ValidationError};
