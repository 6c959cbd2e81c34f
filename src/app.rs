use std::sync::Arc;
use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use diffdrill::config::{Config, SourceKind};
use diffdrill::report::{AttemptReporter, NullReporter};
use diffdrill::session::attempt::{AttemptSession, Phase};
use diffdrill::session::event::SessionEvent;
use diffdrill::session::keys::{Key, KeyOutcome, KeyPress, Modifiers};
use diffdrill::source::{CatalogueSource, ProblemSource};

use crate::event::AppEvent;
use crate::ui::code_editor::{CodeEditor, EditResult};
use crate::ui::theme::Theme;

pub type Session = AttemptSession<Sender<AppEvent>>;

pub struct App {
    pub session: Session,
    pub editor: CodeEditor,
    pub theme: Theme,
    pub config: Config,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, theme: Theme, sender: Sender<AppEvent>) -> Result<Self> {
        let (source, reporter) = build_backends(&config)?;
        info!(source = %source.describe(), "starting session");
        let mut session = AttemptSession::new(source, reporter, sender, config.session_options());
        session.load();
        let editor = CodeEditor::new(session.current_text(), session.editor_epoch());
        Ok(Self {
            session,
            editor,
            theme,
            config,
            should_quit: false,
        })
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        self.session.handle(event);
        self.sync_editor();
    }

    /// Keeps the time display moving when the ticker is disabled.
    pub fn on_idle(&mut self) {
        if self.config.tick_interval_ms == 0 {
            self.session.refresh();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C')) {
            self.quit();
            return;
        }

        match self.session.phase().clone() {
            Phase::Loading => {}
            Phase::Idle { .. } => {
                if key.code == KeyCode::Enter {
                    self.session.load();
                }
            }
            Phase::Completed => match key.code {
                KeyCode::Char('r') if key.modifiers.is_empty() => self.session.reset(),
                KeyCode::Char('n' | 's') if key.modifiers.is_empty() => {
                    self.session.skip();
                }
                _ => {
                    self.session.on_key(&key_press(&key));
                }
            },
            Phase::Running | Phase::Paused => {
                if key.code == KeyCode::Esc {
                    let focused = self.session.editor_focused();
                    self.session.set_editor_focus(!focused);
                } else if let KeyOutcome::Hotkey(_) = self.session.on_key(&key_press(&key)) {
                    // Reset and skip rebuild the editor below.
                } else if self.session.editor_focused()
                    && self.editor.handle(key) == EditResult::Changed
                {
                    self.session.on_edit(self.editor.value());
                }
            }
        }
        self.sync_editor();
    }

    pub fn quit(&mut self) {
        self.session.teardown();
        self.should_quit = true;
    }

    fn sync_editor(&mut self) {
        if self.editor.epoch() != self.session.editor_epoch() {
            self.editor = CodeEditor::new(self.session.current_text(), self.session.editor_epoch());
        }
    }
}

/// Picks the problem source and attempt reporter from the config. Without the
/// `network` feature a remote source falls back to the bundled catalogue.
pub fn build_backends(config: &Config) -> Result<(Arc<dyn ProblemSource>, Arc<dyn AttemptReporter>)> {
    match config.problem_source {
        SourceKind::Catalogue => Ok((Arc::new(CatalogueSource::embedded()?), Arc::new(NullReporter))),
        #[cfg(feature = "network")]
        SourceKind::Remote => {
            use diffdrill::api::ApiClient;
            use diffdrill::report::HttpReporter;
            use diffdrill::source::RemoteSource;

            let client = ApiClient::new(
                &config.api_url,
                config.session_id.clone(),
                config.request_timeout(),
            )?;
            Ok((
                Arc::new(RemoteSource::new(client.clone())),
                Arc::new(HttpReporter::new(client)),
            ))
        }
        #[cfg(not(feature = "network"))]
        SourceKind::Remote => {
            tracing::warn!("built without network support, using the bundled catalogue");
            Ok((Arc::new(CatalogueSource::embedded()?), Arc::new(NullReporter)))
        }
    }
}

pub fn key_press(event: &KeyEvent) -> KeyPress {
    let modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        meta: event.modifiers.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    };
    let key = match event.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        KeyCode::Modifier(_) => Key::Modifier,
        _ => Key::Other,
    };
    KeyPress::new(key, modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::ModifierKeyCode;
    use std::sync::mpsc;
    use std::time::Duration;

    fn test_app() -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        let app = App::new(config, Theme::default(), tx).unwrap();
        (app, rx)
    }

    fn wait_loaded(app: &mut App, rx: &mpsc::Receiver<AppEvent>) {
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            if let AppEvent::Session(event) = event {
                app.handle_session_event(event);
                if app.session.phase() == &Phase::Running {
                    return;
                }
            }
        }
        panic!("problem never loaded");
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_press_conversion() {
        let ctrl_s = key_press(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(ctrl_s, KeyPress::ctrl('s'));
        let bare = key_press(&KeyEvent::new(
            KeyCode::Modifier(ModifierKeyCode::LeftControl),
            KeyModifiers::CONTROL,
        ));
        assert_eq!(bare.key, Key::Modifier);
        assert_eq!(key_press(&press(KeyCode::F(5))).key, Key::Other);
    }

    #[test]
    fn test_editor_follows_loaded_problem() {
        let (mut app, rx) = test_app();
        wait_loaded(&mut app, &rx);
        assert_eq!(app.editor.value(), app.session.current_text());
        assert_eq!(app.editor.epoch(), app.session.editor_epoch());
    }

    #[test]
    fn test_typing_counts_and_edits() {
        let (mut app, rx) = test_app();
        wait_loaded(&mut app, &rx);
        let before = app.session.current_text().to_string();
        app.handle_key(press(KeyCode::Char('Z')));
        assert_eq!(app.session.keystrokes(), 1);
        assert_eq!(app.session.current_text(), format!("Z{before}"));
    }

    #[test]
    fn test_escape_pauses_without_counting() {
        let (mut app, rx) = test_app();
        wait_loaded(&mut app, &rx);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.session.phase(), &Phase::Paused);
        app.handle_key(press(KeyCode::Char('x')));
        assert_eq!(app.session.keystrokes(), 0);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.session.phase(), &Phase::Running);
    }

    #[test]
    fn test_ctrl_r_restores_editor() {
        let (mut app, rx) = test_app();
        wait_loaded(&mut app, &rx);
        let original = app.session.current_text().to_string();
        app.handle_key(press(KeyCode::Char('q')));
        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(app.editor.value(), original);
        assert_eq!(app.session.keystrokes(), 0);
    }

    #[test]
    fn test_ctrl_c_quits_and_tears_down() {
        let (mut app, _rx) = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
