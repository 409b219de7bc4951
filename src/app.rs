use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tracing::{info, trace, warn};

use crate::config::Config;
use crate::runtime::{keystroke_from_event, AppEvent};
use crate::session::{Session, SessionPhase};
use crate::store::{MemoryStore, Settings};
use crate::target::TargetProvider;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session<MemoryStore>,
    pub state: AppState,
    pub config: Config,
    provider: Box<dyn TargetProvider>,
    blink_elapsed: Duration,
    caret_visible: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("blink_elapsed", &self.blink_elapsed)
            .field("caret_visible", &self.caret_visible)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(mut provider: Box<dyn TargetProvider>, config: Config) -> Result<Self> {
        config.validate()?;
        let target = provider.next_target()?;
        let store = MemoryStore::new(Settings::from(&config));
        Ok(Self {
            session: Session::from_config(target, store, &config),
            state: AppState::Typing,
            config,
            provider,
            blink_elapsed: Duration::ZERO,
            caret_visible: true,
        })
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn show_errors(&self) -> bool {
        self.config.show_errors
    }

    /// Feed one event. `dt` is the host time since the previous call and is
    /// credited to the session before the event itself is handled.
    pub fn handle(&mut self, event: AppEvent, dt: Duration) -> Flow {
        self.advance(dt);
        match event {
            AppEvent::Tick | AppEvent::Resize => Flow::Continue,
            AppEvent::Paste(text) => {
                trace!(len = text.len(), "paste rejected");
                Flow::Continue
            }
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.session.on_tick(dt);
        self.sync_state();

        self.blink_elapsed += dt;
        if self.blink_elapsed >= Duration::from_millis(self.config.caret_blink_ms) {
            self.blink_elapsed = Duration::ZERO;
            self.caret_visible = !self.caret_visible;
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state {
            AppState::Typing => {
                if let Some(keystroke) = keystroke_from_event(&key) {
                    self.session.handle_keystroke(keystroke);
                    self.blink_elapsed = Duration::ZERO;
                    self.caret_visible = true;
                    self.sync_state();
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char('n') => self.next_target(),
                _ => {}
            },
        }
        Flow::Continue
    }

    fn sync_state(&mut self) {
        if self.state == AppState::Typing && self.session.phase() == SessionPhase::Complete {
            self.state = AppState::Results;
        }
    }

    pub fn retry(&mut self) {
        self.session.restart();
        self.state = AppState::Typing;
        info!("retrying same target");
    }

    pub fn next_target(&mut self) {
        match self.provider.next_target() {
            Ok(target) => {
                let store = MemoryStore::new(Settings::from(&self.config));
                self.session = Session::from_config(target, store, &self.config);
                self.state = AppState::Typing;
            }
            Err(e) => {
                warn!(error = %e, "could not load a new target, retrying current one");
                self.retry();
            }
        }
    }
}
