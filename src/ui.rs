//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]). Renderers only read state that the
//! feed callbacks have already parsed — nothing in this module fetches.
//!
//! Layout: a one-line panel switcher on top, the focused panel's body, any
//! active notices, and a one-line status bar at the bottom.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, InputMode, PanelKind};
use crate::chat::ChatRole;
use crate::notify::Notice;
use crate::panel::{pin_bounds, status_color};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let notice_lines = app.notices.len().min(3) as u16;
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(notice_lines),
        Constraint::Length(1),
    ])
    .split(frame.area());

    draw_panel_bar(app, frame, chunks[0]);
    match app.panel {
        PanelKind::Users => draw_users(app, frame, chunks[1]),
        PanelKind::Documents => draw_documents(app, frame, chunks[1]),
        PanelKind::Businesses => draw_businesses(app, frame, chunks[1]),
        PanelKind::Map => draw_map(app, frame, chunks[1]),
        PanelKind::Chat => draw_chat(app, frame, chunks[1]),
    }
    draw_notices(app, frame, chunks[2]);
    draw_status_bar(app, frame, chunks[3]);
}

/// One-line panel switcher, with a refresh marker on panels mid-fetch.
fn draw_panel_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for panel in PanelKind::ALL {
        let style = if panel == app.panel {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if app.flags.is_loading(panel) { "⟳" } else { "" };
        spans.push(Span::styled(format!(" {}{marker} ", panel.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn panel_block(app: &App, panel: PanelKind) -> Block<'static> {
    let suffix = if app.flags.is_loading(panel) {
        " (refreshing…)"
    } else {
        ""
    };
    Block::default()
        .title(format!(" {}{suffix} ", panel.title()))
        .borders(Borders::ALL)
}

fn highlight() -> Style {
    Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
}

fn draw_users(app: &mut App, frame: &mut Frame, area: Rect) {
    let header = Row::new(vec!["Name", "Email", "Role", "Resume", "Permit", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .users
        .iter()
        .map(|user| {
            let doc = |present: bool| if present { "✓" } else { "-" };
            Row::new(vec![
                Cell::from(user.full_name()),
                Cell::from(user.email.clone()),
                Cell::from(user.role.clone()),
                Cell::from(doc(user.has_resume())),
                Cell::from(doc(user.has_permit())),
                Cell::from(Span::styled(
                    user.verification_status.clone(),
                    Style::default().fg(status_color(&user.verification_status)),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Percentage(28),
            Constraint::Percentage(14),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Percentage(14),
        ],
    )
    .header(header)
    .block(panel_block(app, PanelKind::Users))
    .row_highlight_style(highlight())
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.users_state);
}

fn draw_documents(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = panel_block(app, PanelKind::Documents);

    if app.documents.is_empty() {
        let empty = Paragraph::new("No pending documents")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["User", "Type", "Submitted"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app
        .documents
        .iter()
        .map(|doc| {
            Row::new(vec![
                Cell::from(doc.user_name.clone()),
                Cell::from(doc.doc_type.clone()),
                Cell::from(doc.submitted()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(highlight())
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.documents_state);
}

fn draw_businesses(app: &mut App, frame: &mut Frame, area: Rect) {
    let [filter_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);

    // Filter line; a trailing cursor shows while the query is being edited.
    let cursor = if app.mode == InputMode::FilterEdit { "▏" } else { "" };
    let category = if app.filter.category.is_empty() {
        "all".to_string()
    } else {
        app.filter.category.clone()
    };
    let location = if app.filter.location.is_empty() {
        "all".to_string()
    } else {
        app.filter.location.clone()
    };
    let hint = if app.filter.is_empty() && app.mode == InputMode::Normal {
        "  (/ search · c category · l location)"
    } else {
        ""
    };
    let visible = app.visible_businesses();
    let shown = if app.businesses_total > 0 {
        format!("  {} shown of {}", visible.len(), app.businesses_total)
    } else {
        String::new()
    };
    let filter_line = Line::from(vec![
        Span::raw(" search: "),
        Span::styled(
            format!("{}{cursor}", app.filter.query),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  category: {category}  location: {location}{shown}{hint}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(filter_line), filter_area);
    if visible.is_empty() {
        let empty = Paragraph::new("No businesses found.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(panel_block(app, PanelKind::Businesses));
        frame.render_widget(empty, table_area);
        return;
    }

    let header = Row::new(vec!["Name", "Category", "Location", "Coords", "Description"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = visible
        .iter()
        .map(|b| {
            let coords = match (b.latitude, b.longitude) {
                (Some(lat), Some(lon)) => format!("{lat:.2},{lon:.2}"),
                _ => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(b.business_name.clone()),
                Cell::from(b.category.clone()),
                Cell::from(b.location.clone()),
                Cell::from(coords),
                Cell::from(b.description.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(24),
            Constraint::Percentage(14),
            Constraint::Percentage(18),
            Constraint::Length(14),
            Constraint::Percentage(36),
        ],
    )
    .header(header)
    .block(panel_block(app, PanelKind::Businesses))
    .row_highlight_style(highlight())
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, table_area, &mut app.businesses_state);
}

fn draw_map(app: &mut App, frame: &mut Frame, area: Rect) {
    let [table_area, bounds_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let pins = app.visible_pins();

    let header = Row::new(vec!["Kind", "Title", "Detail", "Lat", "Lon", "About"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = pins
        .iter()
        .map(|(kind, pin)| {
            Row::new(vec![
                Cell::from(Span::styled(
                    *kind,
                    Style::default().fg(if *kind == "job" { Color::Cyan } else { Color::Magenta }),
                )),
                Cell::from(pin.title.clone()),
                Cell::from(pin.detail()),
                Cell::from(format!("{:.4}", pin.latitude.unwrap_or_default())),
                Cell::from(format!("{:.4}", pin.longitude.unwrap_or_default())),
                Cell::from(pin.blurb()),
            ])
        })
        .collect();

    // The terminal stand-in for the map's zoom-to-fit.
    let summary = match pin_bounds(pins.iter().map(|(_, p)| *p)) {
        Some(b) => format!(
            " {} pins · lat {:.2}–{:.2} · lon {:.2}–{:.2}",
            pins.len(),
            b.min_lat,
            b.max_lat,
            b.min_lon,
            b.max_lon
        ),
        None => " no pins with coordinates".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Percentage(22),
            Constraint::Percentage(18),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Percentage(35),
        ],
    )
    .header(header)
    .block(panel_block(app, PanelKind::Map))
    .row_highlight_style(highlight())
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, table_area, &mut app.pins_state);
    frame.render_widget(
        Paragraph::new(Span::styled(summary, Style::default().fg(Color::DarkGray))),
        bounds_area,
    );
}

fn draw_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, suggestion_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Transcript, latest at the bottom.
    let mut lines: Vec<Line> = app
        .chat
        .iter()
        .map(|msg| match msg.role {
            ChatRole::User => Line::from(vec![
                Span::styled(" You ▸ ", Style::default().fg(Color::Cyan)),
                Span::raw(msg.text.clone()),
            ]),
            ChatRole::Bot => Line::from(vec![
                Span::styled(" Bot ▸ ", Style::default().fg(Color::Green)),
                Span::styled(
                    msg.text.clone(),
                    if msg.is_error {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    },
                ),
            ]),
        })
        .collect();
    if app.chat_pending {
        lines.push(Line::from(Span::styled(
            " Bot ▸ thinking…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let inner_height = transcript_area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(inner_height);
    let transcript = Paragraph::new(lines.split_off(skip))
        .block(panel_block(app, PanelKind::Chat));
    frame.render_widget(transcript, transcript_area);

    let suggestions = if app.chat_suggestions.is_empty() {
        String::new()
    } else {
        format!(" try: {}", app.chat_suggestions.join(" · "))
    };
    frame.render_widget(
        Paragraph::new(Span::styled(suggestions, Style::default().fg(Color::DarkGray))),
        suggestion_area,
    );

    let input = Paragraph::new(format!("{}▏", app.chat_input)).block(
        Block::default()
            .title(" Message (Enter to send) ")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, input_area);
}

fn draw_notices(app: &App, frame: &mut Frame, area: Rect) {
    if area.height == 0 || app.notices.is_empty() {
        return;
    }
    let lines: Vec<Line> = app
        .notices
        .iter()
        .rev()
        .take(area.height as usize)
        .map(notice_line)
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn notice_line(notice: &Notice) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            format!(" {}: ", notice.title),
            Style::default()
                .fg(notice.severity.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            notice.message.clone(),
            Style::default().fg(notice.severity.color()),
        ),
    ])
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let polling = if app.polling {
        Span::styled("●", Style::default().fg(Color::Green))
    } else {
        Span::styled("⏸ paused", Style::default().fg(Color::Yellow))
    };
    let counts = format!(
        "{} users  {} docs  {} businesses  {} pins",
        app.users.len(),
        app.documents.len(),
        app.businesses.len(),
        app.visible_pins().len()
    );
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        polling,
        Span::raw("  "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(counts, Style::default().fg(Color::Green)),
        Span::raw("  q: quit  Tab: panel  r: refresh  p: pause  ↑/↓: scroll"),
    ]));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppMsg, PanelFlags};
    use crate::panel::{Business, MapPin, PendingDocument, UserRow};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered_text(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    fn app() -> App {
        App::new(PanelFlags::new())
    }

    #[test]
    fn draw_does_not_panic_with_no_data() {
        let mut app = app();
        for panel in PanelKind::ALL {
            app.select_panel(panel);
            rendered_text(&mut app);
        }
    }

    #[test]
    fn users_panel_shows_rows() {
        let mut app = app();
        app.apply(AppMsg::Users(vec![UserRow {
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            email: "maria@example.com".into(),
            role: "job_seeker".into(),
            verification_status: "pending".into(),
            ..UserRow::default()
        }]));
        let text = rendered_text(&mut app);
        assert!(text.contains("Maria Santos"));
        assert!(text.contains("pending"));
    }

    #[test]
    fn documents_panel_shows_the_empty_state() {
        let mut app = app();
        app.select_panel(PanelKind::Documents);
        let text = rendered_text(&mut app);
        assert!(text.contains("No pending documents"));
    }

    #[test]
    fn documents_panel_shows_rows_when_present() {
        let mut app = app();
        app.select_panel(PanelKind::Documents);
        app.apply(AppMsg::Documents(vec![PendingDocument {
            user_name: "Jose Cruz".into(),
            doc_type: "permit".into(),
            submitted_date: "2026-07-30 09:15:00".into(),
        }]));
        let text = rendered_text(&mut app);
        assert!(text.contains("Jose Cruz"));
        assert!(!text.contains("No pending documents"));
    }

    #[test]
    fn businesses_panel_shows_the_filtered_empty_state() {
        let mut app = app();
        app.select_panel(PanelKind::Businesses);
        app.apply(AppMsg::Businesses(crate::panel::DirectoryPayload {
            businesses: vec![Business {
                business_name: "Island Grill".into(),
                ..Business::default()
            }],
            total: 1,
        }));
        app.filter.query = "no-such-business".into();
        let text = rendered_text(&mut app);
        assert!(text.contains("No businesses found."));
    }

    #[test]
    fn map_panel_summarises_bounds() {
        let mut app = app();
        app.select_panel(PanelKind::Map);
        app.apply(AppMsg::Jobs(vec![MapPin {
            title: "Store clerk".into(),
            company_name: Some("Island Grill".into()),
            latitude: Some(13.58),
            longitude: Some(124.23),
            ..MapPin::default()
        }]));
        let text = rendered_text(&mut app);
        assert!(text.contains("Store clerk"));
        assert!(text.contains("1 pins"));
    }

    #[test]
    fn chat_panel_shows_transcript_and_thinking_marker() {
        let mut app = app();
        app.select_panel(PanelKind::Chat);
        app.begin_chat_exchange("hello");
        let text = rendered_text(&mut app);
        assert!(text.contains("You ▸ hello"));
        assert!(text.contains("thinking…"));
    }

    #[test]
    fn status_bar_shows_counts_and_status() {
        let mut app = app();
        app.apply(AppMsg::Users(vec![UserRow::default(), UserRow::default()]));
        app.status = "Users updated (2 rows)".into();
        let text = rendered_text(&mut app);
        assert!(text.contains("2 users"));
        assert!(text.contains("Users updated"));
    }

    #[test]
    fn paused_polling_is_visible() {
        let mut app = app();
        app.polling = false;
        let text = rendered_text(&mut app);
        assert!(text.contains("paused"));
    }
}
