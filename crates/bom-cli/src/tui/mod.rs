//! Interactive TUI: module dashboard and BOM editor.

pub mod app;
mod ui;

use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::{App, Focus, View};

/// Launch the interactive TUI.
pub async fn run_dashboard(mut app: App) -> Result<()> {
    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        // Pick up finished fetches before drawing.
        app.poll_suggestions();

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for events with a timeout matching the tick rate. The
        // blocking poll runs off the runtime so fetch tasks keep going.
        let ready = tokio::task::block_in_place(|| event::poll(tick_rate))?;
        if ready {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route one key press to the current view.
fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.current_view {
        View::Dashboard => handle_dashboard_key(app, key),
        View::Help => {
            // Any key leaves help.
            app.navigate_back();
        }
        View::Editor => handle_editor_key(app, key),
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    // Clear status message on any keypress.
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.navigate_back(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Enter => app.edit_selected(),
        KeyCode::Char('n') => app.new_module(),
        KeyCode::Char('?') => app.show_help(),
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    // Keep the "generating" notice until the fetch resolves.
    if !app.is_generating() {
        app.status_message = None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('g') => app.start_suggestion(),
            KeyCode::Char('s') => app.save_current(),
            KeyCode::Char('e') => app.export_current(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.navigate_back(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::BackTab => app.cycle_focus_back(),
        KeyCode::Enter if app.focus.is_draft_field() => app.add_draft_item(),
        KeyCode::Enter => app.cycle_focus(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Up if app.focus == Focus::Items => app.move_up(),
        KeyCode::Down if app.focus == Focus::Items => app.move_down(),
        KeyCode::Char(c) if app.focus == Focus::Items => match c {
            'j' => app.move_down(),
            'k' => app.move_up(),
            'd' => app.delete_selected_item(),
            ' ' => app.toggle_selected_item(),
            'g' => app.start_suggestion(),
            'e' => app.export_current(),
            's' => app.save_current(),
            _ => {}
        },
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
