//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations. Anything with a side effect
//! beyond app state — refreshing a feed, sending a chat message, pausing the
//! poller — is returned as a [`Command`] for the main loop to execute, so
//! this module stays free of network and timer concerns.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, InputMode, PanelKind};

/// A side effect requested by a keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Re-fetch these feeds out of band.
    Refresh(&'static [&'static str]),
    /// Send this message to the chatbot.
    SendChat(String),
    /// Pause or resume polling.
    TogglePolling,
}

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl-C always quits, whatever is focused.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return None;
    }

    if app.mode == InputMode::FilterEdit {
        return handle_filter_edit(app, key);
    }
    if app.panel == PanelKind::Chat {
        return handle_chat_panel(app, key);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Tab => app.select_panel(app.panel.next()),
        KeyCode::BackTab => app.select_panel(app.panel.previous()),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') => return Some(Command::Refresh(app.panel.feed_keys())),
        KeyCode::Char('p') => return Some(Command::TogglePolling),
        KeyCode::Char('/') if app.panel == PanelKind::Businesses => {
            app.mode = InputMode::FilterEdit;
        }
        KeyCode::Char('c') if app.panel == PanelKind::Businesses => app.cycle_category(),
        KeyCode::Char('l') if app.panel == PanelKind::Businesses => app.cycle_location(),
        _ => {}
    }
    None
}

/// Keystrokes while editing the directory filter query.
fn handle_filter_edit(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.filter.query.pop();
        }
        KeyCode::Char(c) => app.filter.query.push(c),
        _ => {}
    }
    None
}

/// Keystrokes while the chat panel is focused: printable characters compose
/// the outgoing message, so the usual letter bindings don't apply here.
fn handle_chat_panel(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Esc => app.quit = true,
        KeyCode::Tab => app.select_panel(app.panel.next()),
        KeyCode::BackTab => app.select_panel(app.panel.previous()),
        KeyCode::Enter => {
            // One outstanding exchange at a time; input is held until the
            // reply lands.
            if app.chat_pending {
                return None;
            }
            let text = app.chat_input.trim().to_string();
            if text.is_empty() {
                return None;
            }
            app.chat_input.clear();
            app.begin_chat_exchange(&text);
            return Some(Command::SendChat(text));
        }
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) => app.chat_input.push(c),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelFlags;

    fn app() -> App {
        App::new(PanelFlags::new())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits_from_a_table_panel() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn key_release_events_are_ignored() {
        let mut app = app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, key);
        assert!(!app.quit);
    }

    #[test]
    fn tab_cycles_panels() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(app.panel, PanelKind::Documents);
        handle_key_event(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.panel, PanelKind::Users);
    }

    #[test]
    fn r_requests_a_refresh_of_the_focused_panel() {
        let mut app = app();
        app.select_panel(PanelKind::Map);
        let command = handle_key_event(&mut app, press(KeyCode::Char('r')));
        assert_eq!(command, Some(Command::Refresh(&["jobs", "services"])));
    }

    #[test]
    fn p_toggles_polling() {
        let mut app = app();
        let command = handle_key_event(&mut app, press(KeyCode::Char('p')));
        assert_eq!(command, Some(Command::TogglePolling));
    }

    #[test]
    fn slash_edits_the_filter_on_the_businesses_panel_only() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.mode, InputMode::Normal);

        app.select_panel(PanelKind::Businesses);
        handle_key_event(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.mode, InputMode::FilterEdit);

        handle_key_event(&mut app, press(KeyCode::Char('g')));
        handle_key_event(&mut app, press(KeyCode::Char('r')));
        assert_eq!(app.filter.query, "gr");

        handle_key_event(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.filter.query, "g");

        handle_key_event(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, InputMode::Normal);
    }

    #[test]
    fn chat_panel_captures_letters_instead_of_binding_them() {
        let mut app = app();
        app.select_panel(PanelKind::Chat);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        handle_key_event(&mut app, press(KeyCode::Char('r')));
        assert!(!app.quit);
        assert_eq!(app.chat_input, "qr");
    }

    #[test]
    fn enter_sends_a_trimmed_chat_message() {
        let mut app = app();
        app.select_panel(PanelKind::Chat);
        for c in "  hello ".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)));
        }
        let command = handle_key_event(&mut app, press(KeyCode::Enter));
        assert_eq!(command, Some(Command::SendChat("hello".into())));
        assert!(app.chat_input.is_empty());
        assert!(app.chat_pending);
    }

    #[test]
    fn empty_or_pending_chat_input_is_not_sent() {
        let mut app = app();
        app.select_panel(PanelKind::Chat);
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), None);

        app.chat_input = "again".into();
        app.chat_pending = true;
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), None);
        assert_eq!(app.chat_input, "again", "input kept while a reply is pending");
    }

    #[test]
    fn ctrl_c_quits_even_while_composing() {
        let mut app = app();
        app.select_panel(PanelKind::Chat);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, key);
        assert!(app.quit);
    }
}
