//! TUI rendering using ratatui.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use bom_core::EditorSession;

use super::app::{App, Focus, View};

/// Render the current view.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    match app.current_view {
        View::Dashboard => render_dashboard(f, app, chunks[0]),
        View::Editor => match &app.editor {
            Some(session) => render_editor(f, app, session, chunks[0]),
            None => render_dashboard(f, app, chunks[0]),
        },
        View::Help => render_help(f, chunks[0]),
    }

    render_status_bar(f, app, chunks[1]);
}

fn header_row<'a>(titles: &[&'a str]) -> Row<'a> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    Row::new(cells).height(1)
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let header = header_row(&["Name", "Version", "Components", "Last Modified"]);

    let rows = app.catalog.modules().iter().enumerate().map(|(i, m)| {
        let modified = m
            .last_modified
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        Row::new(vec![
            Cell::from(m.name.clone()),
            Cell::from(m.version.clone()),
            Cell::from(m.items.len().to_string()),
            Cell::from(modified),
        ])
        .style(selected_style(i == app.selected_module))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(45),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Modules ({}) ", app.catalog.len())),
    );

    f.render_widget(table, area);
}

/// A labelled input field, highlighted when focused.
fn field<'a>(label: &'a str, value: &'a str, focused: bool) -> Vec<Span<'a>> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if focused { "_" } else { "" };
    vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Yellow)),
        Span::styled(format!("[{value}{cursor}]"), value_style),
        Span::raw("  "),
    ]
}

fn render_editor(f: &mut Frame, app: &App, session: &EditorSession, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // module fields
            Constraint::Min(5),    // items
            Constraint::Length(3), // new item row
        ])
        .split(area);

    // Module fields.
    let mut spans = field("Name", &session.name, app.focus == Focus::Name);
    spans.extend(field("Version", &session.version, app.focus == Focus::Version));
    let title = if session.is_new() {
        " New Module "
    } else {
        " Edit Module "
    };
    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(header, chunks[0]);

    // Item table.
    let table_focused = app.focus == Focus::Items;
    let header = header_row(&["", "S.No", "Component", "Value", "Total Qty", "PCB Qty"]);
    let rows = session.items().iter().enumerate().map(|(i, item)| {
        Row::new(vec![
            Cell::from(if item.selected { "[x]" } else { "[ ]" }),
            Cell::from(item.serial_no.to_string()),
            Cell::from(item.component.clone()),
            Cell::from(item.value.clone()),
            Cell::from(item.total_quantity.to_string()),
            Cell::from(item.pcb_quantity.to_string()),
        ])
        .style(selected_style(table_focused && i == app.selected_item))
    });
    let border_style = if table_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" Items ({}) ", session.items().len())),
    );
    f.render_widget(table, chunks[1]);

    // New item row.
    let draft = &app.draft;
    let mut spans = field("Component", &draft.component, app.focus == Focus::Component);
    spans.extend(field("Value", &draft.value, app.focus == Focus::Value));
    spans.extend(field(
        "Total",
        &draft.total_quantity,
        app.focus == Focus::TotalQuantity,
    ));
    spans.extend(field("PCB", &draft.pcb_quantity, app.focus == Focus::PcbQuantity));
    let new_row = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Add Item (Enter) "),
    );
    f.render_widget(new_row, chunks[2]);
}

fn render_help(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])
    };

    let text = vec![
        Line::from(""),
        section("  Dashboard"),
        Line::from("    j/Down    Move down"),
        Line::from("    k/Up      Move up"),
        Line::from("    Enter     Edit selected module"),
        Line::from("    n         New module"),
        Line::from("    Esc/q     Quit"),
        Line::from(""),
        section("  Editor"),
        Line::from("    Tab       Next field (name, version, new item, items)"),
        Line::from("    Enter     Add the new item"),
        Line::from("    Esc       Back to dashboard, discarding changes"),
        Line::from("    Ctrl+G    AI auto-fill components"),
        Line::from("    Ctrl+S    Save module"),
        Line::from("    Ctrl+E    Export CSV"),
        Line::from(""),
        section("  Items table"),
        Line::from("    j/k       Move"),
        Line::from("    Space     Toggle selection"),
        Line::from("    d         Delete item"),
        Line::from("    g / s / e AI auto-fill / Save / Export"),
        Line::from(""),
    ];

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Help "));
    f.render_widget(help, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let view_name = match app.current_view {
        View::Dashboard => "Dashboard",
        View::Editor => "Editor",
        View::Help => "Help",
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");

    let mut spans = vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
    ];
    if app.is_generating() {
        spans.push(Span::styled(
            "generating… ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(status_msg, Style::default().fg(Color::Green)));
    spans.push(Span::raw(match app.current_view {
        View::Dashboard => "  q:quit  ?:help  n:new  Enter:edit",
        View::Editor => "  Esc:back  Tab:next field  Ctrl+G:AI fill  Ctrl+S:save",
        View::Help => "  any key: back",
    }));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
