//! TUI application state and actions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use bom_core::suggest::{FAILURE_MESSAGE, SuggestError, Suggester};
use bom_core::{EditorError, EditorSession, Item, ItemDraft, ModuleCatalog, SuggestionTicket};

use crate::export_cmd;

/// Which view the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Editor,
    Help,
}

/// Input focus inside the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Version,
    Component,
    Value,
    TotalQuantity,
    PcbQuantity,
    Items,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Version,
            Focus::Version => Focus::Component,
            Focus::Component => Focus::Value,
            Focus::Value => Focus::TotalQuantity,
            Focus::TotalQuantity => Focus::PcbQuantity,
            Focus::PcbQuantity => Focus::Items,
            Focus::Items => Focus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Name => Focus::Items,
            Focus::Version => Focus::Name,
            Focus::Component => Focus::Version,
            Focus::Value => Focus::Component,
            Focus::TotalQuantity => Focus::Value,
            Focus::PcbQuantity => Focus::TotalQuantity,
            Focus::Items => Focus::PcbQuantity,
        }
    }

    /// Whether this focus is one of the new-item input fields.
    pub fn is_draft_field(self) -> bool {
        matches!(
            self,
            Focus::Component | Focus::Value | Focus::TotalQuantity | Focus::PcbQuantity
        )
    }
}

/// A finished suggestion fetch, delivered back to the event loop.
#[derive(Debug)]
pub struct SuggestionOutcome {
    pub ticket: SuggestionTicket,
    pub result: Result<Vec<Item>, SuggestError>,
}

/// Application state for the TUI.
pub struct App {
    pub catalog: ModuleCatalog,
    pub current_view: View,
    pub selected_module: usize,
    pub editor: Option<EditorSession>,
    pub draft: ItemDraft,
    pub focus: Focus,
    pub selected_item: usize,
    pub export_dir: PathBuf,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
    suggester: Arc<dyn Suggester>,
    outcome_tx: mpsc::UnboundedSender<SuggestionOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SuggestionOutcome>,
    fetch_cancel: Option<CancellationToken>,
}

impl App {
    pub fn new(catalog: ModuleCatalog, suggester: Arc<dyn Suggester>, export_dir: PathBuf) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            current_view: View::Dashboard,
            selected_module: 0,
            editor: None,
            draft: ItemDraft::default(),
            focus: Focus::Name,
            selected_item: 0,
            export_dir,
            tick_rate: Duration::from_millis(100),
            should_quit: false,
            status_message: None,
            suggester,
            outcome_tx,
            outcome_rx,
            fetch_cancel: None,
        }
    }

    /// Whether the open editor has a fetch in flight.
    pub fn is_generating(&self) -> bool {
        self.editor.as_ref().is_some_and(EditorSession::is_suggesting)
    }

    // -- Navigation --

    pub fn navigate_back(&mut self) {
        match self.current_view {
            View::Dashboard => self.should_quit = true,
            View::Help => self.current_view = View::Dashboard,
            View::Editor => self.close_editor(),
        }
    }

    /// Open the selected module in the editor.
    pub fn edit_selected(&mut self) {
        if let Some(module) = self.catalog.modules().get(self.selected_module) {
            let session = EditorSession::open(Some(module));
            self.enter_editor(session, Focus::Items);
        }
    }

    /// Open a blank module in the editor.
    pub fn new_module(&mut self) {
        self.enter_editor(EditorSession::open(None), Focus::Name);
    }

    fn enter_editor(&mut self, session: EditorSession, focus: Focus) {
        self.editor = Some(session);
        self.draft.clear();
        self.focus = focus;
        self.selected_item = 0;
        self.current_view = View::Editor;
    }

    /// Leave the editor, discarding the working copy and any in-flight fetch.
    pub fn close_editor(&mut self) {
        self.cancel_fetch();
        self.editor = None;
        self.draft.clear();
        self.current_view = View::Dashboard;
    }

    fn cancel_fetch(&mut self) {
        if let Some(token) = self.fetch_cancel.take() {
            token.cancel();
        }
        if let Some(session) = self.editor.as_mut() {
            session.cancel_suggestion();
        }
    }

    pub fn move_up(&mut self) {
        match self.current_view {
            View::Dashboard => {
                self.selected_module = self.selected_module.saturating_sub(1);
            }
            View::Editor if self.focus == Focus::Items => {
                self.selected_item = self.selected_item.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn move_down(&mut self) {
        match self.current_view {
            View::Dashboard => {
                if self.selected_module + 1 < self.catalog.len() {
                    self.selected_module += 1;
                }
            }
            View::Editor if self.focus == Focus::Items => {
                let len = self.item_count();
                if self.selected_item + 1 < len {
                    self.selected_item += 1;
                }
            }
            _ => {}
        }
    }

    pub fn show_help(&mut self) {
        self.current_view = View::Help;
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn cycle_focus_back(&mut self) {
        self.focus = self.focus.prev();
    }

    fn item_count(&self) -> usize {
        self.editor.as_ref().map_or(0, |s| s.items().len())
    }

    fn clamp_item_selection(&mut self) {
        let len = self.item_count();
        if self.selected_item >= len {
            self.selected_item = len.saturating_sub(1);
        }
    }

    // -- Text input --

    fn focused_field(&mut self) -> Option<&mut String> {
        let session = self.editor.as_mut()?;
        match self.focus {
            Focus::Name => Some(&mut session.name),
            Focus::Version => Some(&mut session.version),
            Focus::Component => Some(&mut self.draft.component),
            Focus::Value => Some(&mut self.draft.value),
            Focus::TotalQuantity => Some(&mut self.draft.total_quantity),
            Focus::PcbQuantity => Some(&mut self.draft.pcb_quantity),
            Focus::Items => None,
        }
    }

    /// Append a character to the focused text field.
    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.focused_field() {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field() {
            field.pop();
        }
    }

    // -- Editor actions --

    /// Add the draft row as a new item.
    pub fn add_draft_item(&mut self) {
        let Some(session) = self.editor.as_mut() else {
            return;
        };
        match session.add_item(&self.draft) {
            Ok(item) => {
                self.status_message = Some(format!("Added item {}", item.serial_no));
                self.draft.clear();
                self.focus = Focus::Component;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn delete_selected_item(&mut self) {
        let Some(session) = self.editor.as_mut() else {
            return;
        };
        let Some(id) = session.items().as_slice().get(self.selected_item).map(|i| i.id) else {
            return;
        };
        if let Some(removed) = session.delete_item(id) {
            self.status_message = Some(format!("Deleted {}", removed.component));
        }
        self.clamp_item_selection();
    }

    pub fn toggle_selected_item(&mut self) {
        let Some(session) = self.editor.as_mut() else {
            return;
        };
        if let Some(id) = session.items().as_slice().get(self.selected_item).map(|i| i.id) {
            session.toggle_selected(id);
        }
    }

    /// Start an AI suggestion fetch for the open module.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_suggestion(&mut self) {
        let Some(session) = self.editor.as_mut() else {
            return;
        };
        let ticket = match session.begin_suggestion() {
            Ok(ticket) => ticket,
            Err(EditorError::Validation(_)) => {
                self.status_message =
                    Some("Please enter a module name to generate suggestions".to_string());
                return;
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.outcome_tx.clone();
        let suggester = Arc::clone(&self.suggester);
        tokio::spawn(async move {
            let request = ticket.request().clone();
            tokio::select! {
                () = token.cancelled() => {
                    debug!("suggestion fetch cancelled");
                }
                result = suggester.suggest(&request) => {
                    // The receiver lives as long as the app.
                    let _ = tx.send(SuggestionOutcome { ticket, result });
                }
            }
        });

        self.fetch_cancel = Some(cancel);
        self.status_message = Some("Generating suggestions...".to_string());
    }

    /// Apply any fetches that have completed since the last call.
    pub fn poll_suggestions(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.handle_suggestion(outcome);
        }
    }

    /// Apply one completed fetch, if it still belongs to the open editor.
    pub fn handle_suggestion(&mut self, outcome: SuggestionOutcome) {
        let Some(session) = self.editor.as_mut() else {
            warn!("suggestions arrived after the editor closed; discarding");
            return;
        };

        match outcome.result {
            Ok(items) => match session.apply_suggestions(&outcome.ticket, items) {
                Ok(added) => {
                    self.fetch_cancel = None;
                    self.status_message = Some(format!("Added {added} suggested items"));
                }
                Err(e) => warn!(error = %e, "discarding suggestions"),
            },
            Err(e) => {
                if session.fail_suggestion(&outcome.ticket) {
                    self.fetch_cancel = None;
                    warn!(backend = self.suggester.name(), error = %e, "suggestion fetch failed");
                    self.status_message = Some(FAILURE_MESSAGE.to_string());
                } else {
                    debug!(error = %e, "ignoring failure of a stale fetch");
                }
            }
        }
    }

    /// Write the open module's CSV into the export directory.
    pub fn export_current(&mut self) {
        let Some(session) = self.editor.as_ref() else {
            return;
        };
        match export_cmd::write_export(&self.export_dir, &session.name, &session.version, session.items())
        {
            Ok(path) => self.status_message = Some(format!("Exported to {}", path.display())),
            Err(e) => self.status_message = Some(format!("Export failed: {e:#}")),
        }
    }

    /// Save the open module into the catalog and return to the dashboard.
    pub fn save_current(&mut self) {
        let Some(session) = self.editor.as_ref() else {
            return;
        };
        let module = match session.save() {
            Ok(module) => module,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };

        let id = module.id;
        let name = module.name.clone();
        self.catalog.upsert(module);
        self.close_editor();
        self.selected_module = self
            .catalog
            .modules()
            .iter()
            .position(|m| m.id == id)
            .unwrap_or(0);
        self.status_message = Some(format!("Saved {name}"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bom_test_utils::{FakeSuggester, draft, sample_suggestions};

    fn app_with(suggester: FakeSuggester) -> (App, Arc<FakeSuggester>) {
        let suggester = Arc::new(suggester);
        let app = App::new(
            ModuleCatalog::with_demo_modules(),
            Arc::clone(&suggester) as Arc<dyn Suggester>,
            std::env::temp_dir(),
        );
        (app, suggester)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.input_char(c);
        }
    }

    async fn next_outcome(app: &mut App) -> SuggestionOutcome {
        tokio::time::timeout(Duration::from_secs(5), app.outcome_rx.recv())
            .await
            .expect("fetch should complete")
            .expect("channel open")
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        let mut focus = Focus::Name;
        for _ in 0..7 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Name);
        assert_eq!(Focus::Name.prev(), Focus::Items);
        assert!(Focus::Value.is_draft_field());
        assert!(!Focus::Items.is_draft_field());
    }

    #[test]
    fn dashboard_navigation_stays_in_bounds() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.move_up();
        assert_eq!(app.selected_module, 0);
        app.move_down();
        app.move_down();
        assert_eq!(app.selected_module, 1);
    }

    #[test]
    fn back_from_dashboard_quits() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.show_help();
        app.navigate_back();
        assert_eq!(app.current_view, View::Dashboard);
        assert!(!app.should_quit);
        app.navigate_back();
        assert!(app.should_quit);
    }

    #[test]
    fn new_module_starts_blank() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        let session = app.editor.as_ref().unwrap();
        assert_eq!(app.current_view, View::Editor);
        assert_eq!(session.name, "");
        assert_eq!(session.version, "V1 R1");
        assert_eq!(app.focus, Focus::Name);
    }

    #[test]
    fn typing_edits_focused_field_and_enter_adds_item() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        type_str(&mut app, "Hub");
        app.focus = Focus::Component;
        type_str(&mut app, "Resistor");
        app.cycle_focus();
        type_str(&mut app, "10k");
        app.cycle_focus();
        type_str(&mut app, "2");
        app.cycle_focus();
        type_str(&mut app, "1");
        app.add_draft_item();

        let session = app.editor.as_ref().unwrap();
        assert_eq!(session.name, "Hub");
        let item = &session.items().as_slice()[0];
        assert_eq!(item.serial_no, 1);
        assert_eq!(item.component, "Resistor");
        assert_eq!(item.total_quantity, 2);
        assert_eq!(app.draft, ItemDraft::default());
        assert_eq!(app.focus, Focus::Component);
    }

    #[test]
    fn empty_component_shows_message() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        app.add_draft_item();
        assert!(app.editor.as_ref().unwrap().items().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("component name is required"));
    }

    #[test]
    fn delete_and_toggle_act_on_selected_row() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        {
            let session = app.editor.as_mut().unwrap();
            for c in ["A", "B", "C"] {
                session.add_item(&draft(c, "", "1", "1")).unwrap();
            }
        }
        app.focus = Focus::Items;
        app.move_down();
        app.toggle_selected_item();
        assert!(app.editor.as_ref().unwrap().items().as_slice()[1].selected);

        app.move_down();
        app.delete_selected_item();
        let session = app.editor.as_ref().unwrap();
        let names: Vec<&str> = session.items().iter().map(|i| i.component.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(app.selected_item, 1);
    }

    #[test]
    fn save_without_name_stays_in_editor() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        app.save_current();
        assert_eq!(app.current_view, View::Editor);
        assert_eq!(app.catalog.len(), 2);
        assert_eq!(app.status_message.as_deref(), Some("module name is required"));
    }

    #[test]
    fn save_new_module_inserts_at_front() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.new_module();
        type_str(&mut app, "Hub");
        app.save_current();
        assert_eq!(app.current_view, View::Dashboard);
        assert!(app.editor.is_none());
        assert_eq!(app.catalog.len(), 3);
        assert_eq!(app.catalog.modules()[0].name, "Hub");
        assert_eq!(app.selected_module, 0);
    }

    #[test]
    fn save_existing_module_replaces_in_place() {
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.move_down();
        app.edit_selected();
        app.focus = Focus::Version;
        type_str(&mut app, ".1");
        app.save_current();
        assert_eq!(app.catalog.len(), 2);
        assert_eq!(app.catalog.modules()[1].version, "V1.2.1");
        assert_eq!(app.selected_module, 1);
    }

    #[test]
    fn export_writes_into_export_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (mut app, _) = app_with(FakeSuggester::returning(Vec::new()));
        app.export_dir = tmp.path().to_path_buf();
        app.edit_selected();
        app.export_current();

        let path = tmp.path().join("3 Inch Thermal Printer_V3 R1_BOM.csv");
        let csv = std::fs::read_to_string(path).unwrap();
        assert!(csv.contains("1,\"Thermal Head\",\"FTP-628\",1,1\n"));
        assert!(app.status_message.unwrap().starts_with("Exported to"));
    }

    #[tokio::test]
    async fn suggestion_requires_name() {
        let (mut app, suggester) = app_with(FakeSuggester::returning(sample_suggestions()));
        app.new_module();
        app.start_suggestion();
        assert!(!app.is_generating());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Please enter a module name to generate suggestions")
        );
        tokio::task::yield_now().await;
        assert_eq!(suggester.calls(), 0);
    }

    #[tokio::test]
    async fn suggestions_are_merged_after_existing_items() {
        let (mut app, suggester) = app_with(FakeSuggester::returning(sample_suggestions()));
        app.edit_selected();
        app.start_suggestion();
        assert!(app.is_generating());

        let outcome = next_outcome(&mut app).await;
        app.handle_suggestion(outcome);

        assert!(!app.is_generating());
        let session = app.editor.as_ref().unwrap();
        let serials: Vec<u32> = session.items().iter().map(|i| i.serial_no).collect();
        assert_eq!(serials, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(session.items().as_slice()[3].component, "Resistor");
        assert_eq!(app.status_message.as_deref(), Some("Added 3 suggested items"));

        let request = &suggester.requests()[0];
        assert_eq!(request.module_name, "3 Inch Thermal Printer");
        assert_eq!(request.context.as_deref(), Some("Version: V3 R1"));
    }

    #[tokio::test]
    async fn failed_fetch_shows_message_and_keeps_items() {
        let (mut app, _) = app_with(FakeSuggester::failing(500));
        app.edit_selected();
        let before = app.editor.as_ref().unwrap().items().clone();
        app.start_suggestion();

        let outcome = next_outcome(&mut app).await;
        app.handle_suggestion(outcome);

        assert_eq!(app.status_message.as_deref(), Some(FAILURE_MESSAGE));
        assert_eq!(app.editor.as_ref().unwrap().items(), &before);
        assert!(!app.is_generating());
    }

    #[tokio::test]
    async fn second_fetch_while_generating_is_refused() {
        let (mut app, suggester) = app_with(
            FakeSuggester::returning(sample_suggestions()).with_delay(Duration::from_millis(50)),
        );
        app.edit_selected();
        app.start_suggestion();
        app.start_suggestion();
        assert_eq!(
            app.status_message.as_deref(),
            Some("a suggestion request is already in progress")
        );

        let outcome = next_outcome(&mut app).await;
        app.handle_suggestion(outcome);
        assert_eq!(suggester.calls(), 1);
        assert_eq!(app.editor.as_ref().unwrap().items().len(), 6);
    }

    #[tokio::test]
    async fn leaving_editor_cancels_fetch() {
        let (mut app, suggester) = app_with(
            FakeSuggester::returning(sample_suggestions()).with_delay(Duration::from_secs(30)),
        );
        app.edit_selected();
        app.start_suggestion();
        // Let the spawned task reach the suggester.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        app.navigate_back();
        assert_eq!(app.current_view, View::Dashboard);

        let waited = tokio::time::timeout(Duration::from_millis(100), app.outcome_rx.recv()).await;
        assert!(waited.is_err(), "cancelled fetch must not deliver a result");
        assert!(suggester.calls() <= 1);
    }

    #[tokio::test]
    async fn result_for_previous_session_is_discarded() {
        let (mut app, _) = app_with(FakeSuggester::returning(sample_suggestions()));
        app.edit_selected();
        app.start_suggestion();
        let outcome = next_outcome(&mut app).await;

        // Reopen the same module before the result is handled.
        app.close_editor();
        app.edit_selected();
        app.handle_suggestion(outcome);

        assert_eq!(app.editor.as_ref().unwrap().items().len(), 3);
    }

    #[tokio::test]
    async fn result_after_editor_closed_is_discarded() {
        let (mut app, _) = app_with(FakeSuggester::returning(sample_suggestions()));
        app.edit_selected();
        app.start_suggestion();
        let outcome = next_outcome(&mut app).await;
        app.close_editor();

        app.handle_suggestion(outcome);
        assert!(app.editor.is_none());
        assert_eq!(app.catalog.modules()[0].items.len(), 3);
    }
}
