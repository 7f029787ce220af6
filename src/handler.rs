use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use smartdoc_core::{EmergencyStep, QuickAction, SendOutcome, TextField};
use crate::app::App;
use crate::tui::AppEvent;
use crate::ui;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick().await,
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return;
    }

    // The emergency shortcut wins over the config dialog
    if ctrl && key.code == KeyCode::Char('e') && !app.session.emergency_dialog.is_open() {
        app.session.cancel_config();
        app.session.emergency_dialog.open();
        return;
    }

    if app.session.config_dialog.is_open() {
        handle_config_dialog(app, key);
    } else if app.session.emergency_dialog.is_open() {
        handle_emergency_dialog(app, key);
    } else {
        handle_chat(app, key);
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Enter => {
            let outcome = app.session.submit_input();
            dispatch(app, outcome);
        }
        KeyCode::Char('o') if ctrl => app.session.open_config(),

        // Quick actions
        KeyCode::F(n @ 1..=4) => {
            let action = QuickAction::all()[usize::from(n - 1)];
            let outcome = app.session.quick_action(action);
            dispatch(app, outcome);
        }
        KeyCode::F(5) => {
            if let Some(pending) = app.session.begin_health() {
                app.spawn_health(pending);
            }
        }

        // Transcript scrolling
        KeyCode::PageUp => {
            let page = app.page();
            app.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.page();
            let max = ui::max_chat_scroll(app);
            app.scroll_down(page, max);
        }

        KeyCode::Esc => app.session.input.clear(),
        _ => edit_field(&mut app.session.input, key),
    }
}

fn dispatch(app: &mut App, outcome: SendOutcome) {
    match outcome {
        SendOutcome::Sent(pending) => app.spawn_chat(pending),
        SendOutcome::Busy => tracing::debug!("send ignored, a request is already in flight"),
        SendOutcome::Ignored | SendOutcome::ConfigMissing => {}
    }
}

fn handle_config_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.session.cancel_config(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.session.config_dialog.toggle_focus();
        }
        KeyCode::Enter => {
            // Validation errors are shown inline by the dialog
            let _ = app.session.save_config();
        }
        _ => edit_field(app.session.config_dialog.focused_field(), key),
    }
}

fn handle_emergency_dialog(app: &mut App, key: KeyEvent) {
    let dialog = &mut app.session.emergency_dialog;

    match dialog.step() {
        EmergencyStep::Confirming => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('o') | KeyCode::Char('O') | KeyCode::Enter => {
                dialog.confirm();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => dialog.decline(),
            _ => {}
        },
        EmergencyStep::EnteringReason => match key.code {
            KeyCode::Esc => dialog.cancel(),
            KeyCode::Enter => {
                if let Some(pending) = app.session.submit_emergency_dialog() {
                    app.spawn_emergency(pending);
                }
            }
            _ => edit_field(&mut dialog.reason, key),
        },
        EmergencyStep::Closed => {}
    }
}

fn edit_field(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.insert(c),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let session = &mut app.session;
    let field = if session.config_dialog.is_open() {
        session.config_dialog.focused_field()
    } else if session.emergency_dialog.step() == EmergencyStep::EnteringReason {
        &mut session.emergency_dialog.reason
    } else if session.emergency_dialog.is_open() {
        return;
    } else {
        &mut session.input
    };

    // Single-line fields: newlines become spaces
    for c in text.chars() {
        field.insert(if c == '\n' || c == '\r' { ' ' } else { c });
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => {
            let max = ui::max_chat_scroll(app);
            app.scroll_down(3, max);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::TerminalFeedback;
    use smartdoc_core::{ChatRequest, ChatResponse, ChatTransport, FileStore, Session, TransportError};
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait::async_trait]
    impl ChatTransport for Unreachable {
        async fn send(&self, _endpoint: &str, _request: &ChatRequest) -> Result<ChatResponse, TransportError> {
            Err(TransportError::Network("unreachable".into()))
        }

        async fn health(&self, _endpoint: &str) -> Result<(), TransportError> {
            Err(TransportError::Network("unreachable".into()))
        }
    }

    fn unconfigured_app(dir: &tempfile::TempDir) -> App {
        let store = FileStore::open(dir.path().join("config.json"));
        App::new(Session::new(store, Arc::new(Unreachable), TerminalFeedback { muted: true }))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_enter_without_config_opens_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        type_text(&mut app, "Bonjour");
        press(&mut app, KeyCode::Enter);

        assert!(app.session.config_dialog.is_open());
        assert!(app.tasks.is_empty());
        assert!(app.session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_config_dialog_saves_through_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        ctrl(&mut app, 'o');
        type_text(&mut app, "https://api.example.com");
        press(&mut app, KeyCode::Tab);
        // Replace the default user id
        for _ in 0..32 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "bob");
        press(&mut app, KeyCode::Enter);

        assert!(!app.session.config_dialog.is_open());
        assert_eq!(app.session.config().api_base_url, "https://api.example.com");
        assert_eq!(app.session.config().user_id, "bob");
        assert_eq!(app.session.transcript().len(), 1);

        let reopened = FileStore::open(dir.path().join("config.json"));
        assert_eq!(
            smartdoc_core::KeyValueStore::get(&reopened, "smartdoc_user_id").as_deref(),
            Some("bob")
        );
    }

    #[tokio::test]
    async fn test_emergency_decline_via_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        ctrl(&mut app, 'e');
        assert_eq!(app.session.emergency_dialog.step(), EmergencyStep::Confirming);
        press(&mut app, KeyCode::Char('n'));

        assert!(!app.session.emergency_dialog.is_open());
        assert!(app.session.transcript().is_empty());
        assert!(app.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_emergency_confirm_via_keys_spawns_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        ctrl(&mut app, 'e');
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.session.emergency_dialog.step(), EmergencyStep::EnteringReason);
        press(&mut app, KeyCode::Enter);

        assert!(!app.session.emergency_dialog.is_open());
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_ctrl_e_reaches_emergency_from_config_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        app.session.start();
        assert!(app.session.config_dialog.is_open());

        ctrl(&mut app, 'e');
        assert!(!app.session.config_dialog.is_open());
        assert_eq!(app.session.emergency_dialog.step(), EmergencyStep::Confirming);
    }

    #[tokio::test]
    async fn test_paste_goes_to_focused_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);

        handle_paste(&mut app, "ligne un\nligne deux");
        assert_eq!(app.session.input.value(), "ligne un ligne deux");

        ctrl(&mut app, 'o');
        handle_paste(&mut app, "https://api.example.com");
        assert_eq!(app.session.config_dialog.api_url.value(), "https://api.example.com");
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = unconfigured_app(&dir);
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }
}
