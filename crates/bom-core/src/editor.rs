//! A single editing session over one module.
//!
//! The session holds a working copy of the module's fields and items. The
//! catalog is only touched when the caller takes the result of
//! [`EditorSession::save`] and upserts it.
//!
//! Suggestion fetches are asynchronous, so results are matched back to the
//! session with a [`SuggestionTicket`]:
//!
//! ```text
//! begin_suggestion() -> ticket{session, generation}   (pending = generation)
//!          ...fetch runs elsewhere...
//! apply_suggestions(ticket, items)
//!     session token matches && pending == generation  -> merge, pending = None
//!     otherwise                                       -> StaleSuggestion
//! ```
//!
//! At most one fetch is pending at a time.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::export;
use crate::items::{ItemDraft, ItemList};
use crate::model::{DEFAULT_VERSION, Item, ItemId, Module, ModuleId, ValidationError};
use crate::suggest::SuggestionRequest;

/// Identity of one editor session; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Proof that a suggestion fetch was started by a particular session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    session: SessionToken,
    generation: u64,
    request: SuggestionRequest,
}

impl SuggestionTicket {
    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &SuggestionRequest {
        &self.request
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a suggestion request is already in progress")]
    SuggestionInFlight,

    #[error("suggestion result no longer matches this editor session")]
    StaleSuggestion,
}

/// Working copy of a module being edited.
#[derive(Debug, Clone)]
pub struct EditorSession {
    token: SessionToken,
    module_id: ModuleId,
    is_new: bool,
    pub name: String,
    pub version: String,
    items: ItemList,
    generation: u64,
    pending: Option<u64>,
}

impl EditorSession {
    /// Start editing `existing`, or a blank module when `None`.
    ///
    /// A blank module has an empty name, version [`DEFAULT_VERSION`] and no
    /// items. Its id is fixed now so repeated saves upsert the same record.
    pub fn open(existing: Option<&Module>) -> Self {
        let session = match existing {
            Some(m) => Self {
                token: SessionToken::new(),
                module_id: m.id,
                is_new: false,
                name: m.name.clone(),
                version: m.version.clone(),
                items: m.items.clone(),
                generation: 0,
                pending: None,
            },
            None => Self {
                token: SessionToken::new(),
                module_id: ModuleId::new(),
                is_new: true,
                name: String::new(),
                version: DEFAULT_VERSION.to_string(),
                items: ItemList::new(),
                generation: 0,
                pending: None,
            },
        };
        debug!(module_id = %session.module_id, is_new = session.is_new, "opened editor session");
        session
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn items(&self) -> &ItemList {
        &self.items
    }

    /// Whether a suggestion fetch is outstanding.
    pub fn is_suggesting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn add_item(&mut self, draft: &ItemDraft) -> Result<&Item, EditorError> {
        Ok(self.items.append(draft)?)
    }

    pub fn delete_item(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(id)
    }

    /// Flip the selection flag of an item. Returns `false` for unknown ids.
    pub fn toggle_selected(&mut self, id: ItemId) -> bool {
        match self.items.get(id).map(|i| i.selected) {
            Some(current) => self.items.set_selected(id, !current),
            None => false,
        }
    }

    /// Start a suggestion fetch for the current name and version.
    ///
    /// Requires a non-blank name and no fetch already in flight.
    pub fn begin_suggestion(&mut self) -> Result<SuggestionTicket, EditorError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired.into());
        }
        if self.pending.is_some() {
            return Err(EditorError::SuggestionInFlight);
        }

        self.generation += 1;
        self.pending = Some(self.generation);
        let request = SuggestionRequest {
            module_name: name.to_string(),
            context: Some(format!("Version: {}", self.version.trim())),
        };
        info!(module = %request.module_name, generation = self.generation, "suggestion fetch started");

        Ok(SuggestionTicket {
            session: self.token,
            generation: self.generation,
            request,
        })
    }

    fn ticket_is_current(&self, ticket: &SuggestionTicket) -> bool {
        ticket.session == self.token && self.pending == Some(ticket.generation)
    }

    /// Merge a completed fetch into the working item list.
    ///
    /// Returns the number of items appended. Tickets from another session,
    /// or from a fetch that was cancelled or already resolved, are rejected
    /// and the list is left untouched.
    pub fn apply_suggestions(
        &mut self,
        ticket: &SuggestionTicket,
        suggestions: Vec<Item>,
    ) -> Result<usize, EditorError> {
        if !self.ticket_is_current(ticket) {
            debug!(generation = ticket.generation, "discarding stale suggestions");
            return Err(EditorError::StaleSuggestion);
        }
        self.pending = None;
        let added = self.items.merge(suggestions);
        info!(added, total = self.items.len(), "suggestions merged");
        Ok(added)
    }

    /// Record that the fetch for `ticket` failed. Returns `false` if the
    /// ticket was already stale.
    pub fn fail_suggestion(&mut self, ticket: &SuggestionTicket) -> bool {
        if self.ticket_is_current(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Abandon any in-flight fetch; its result will be treated as stale.
    pub fn cancel_suggestion(&mut self) {
        if self.pending.take().is_some() {
            debug!(generation = self.generation, "suggestion fetch cancelled");
        }
    }

    /// Produce the finished module record.
    ///
    /// Fails without side effects if the name is blank.
    pub fn save(&self) -> Result<Module, EditorError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired.into());
        }
        Ok(Module {
            id: self.module_id,
            name: self.name.clone(),
            version: self.version.clone(),
            items: self.items.clone(),
            last_modified: chrono::Utc::now(),
        })
    }

    /// CSV rendering of the working item list.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.items)
    }

    /// File name for [`Self::export_csv`].
    pub fn export_file_name(&self) -> String {
        export::file_name(&self.name, &self.version)
    }
}
