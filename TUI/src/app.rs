use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;

use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::action::Action;
use crate::catalog::{DefenseLayer, LayerCatalog};
use crate::command::CommandParser;
use crate::config::{Config, COMMANDS};
use crate::controller::{Controller, ControllerState};
use crate::ui_state::{Focus, Screen, UIState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Selection,
    Request,
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub struct App {
    pub ui: UIState,
    pub config: Config,
    pub controller: Arc<Controller>,
    /// Latest controller snapshot, refreshed by `sync_state`.
    pub state: ControllerState,
    /// Catalog layers, outermost ring first.
    pub rings: LayerCatalog,
    pub activity: VecDeque<ActivityEntry>,
    pub animation_frame: usize,
    pub animation_tick: u64,
    pub offline: bool,
    pub should_quit: bool,
    generation: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(controller: Arc<Controller>, config: Config, offline: bool) -> Self {
        let rings = controller.catalog().rings_outside_in();
        let state = controller.state();

        Self {
            ui: UIState::new(),
            config,
            controller,
            state,
            rings,
            activity: VecDeque::new(),
            animation_frame: 0,
            animation_tick: 0,
            offline,
            should_quit: false,
            generation: None,
        }
    }

    pub fn cursor_layer(&self) -> Option<&Arc<DefenseLayer>> {
        self.rings.get(self.ui.cursor)
    }

    /// True from the moment a request is spawned until its result is written.
    pub fn is_generating(&self) -> bool {
        self.state.is_loading
            || self
                .generation
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    pub fn tick(&mut self) {
        self.animation_tick += 1;
        self.animation_frame = (self.animation_frame + 1) % self.config.animation_frame_mod;

        if self.ui.status_message.is_some()
            && self.animation_tick.saturating_sub(self.ui.status_set_tick)
                >= self.config.status_timeout_ticks
        {
            self.ui.status_message = None;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status_message = Some(message.into().replace('\n', " "));
        self.ui.status_set_tick = self.animation_tick;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.dispatch(Action::Quit);
            return;
        }

        match self.ui.screen {
            Screen::Home => {
                // Any key except Esc enters the layer view
                if key.code == KeyCode::Esc {
                    self.dispatch(Action::Quit);
                } else {
                    self.ui.screen = Screen::Layers;
                }
            }
            Screen::Layers => match self.ui.focus {
                Focus::Command => self.handle_command_key(key),
                Focus::Rings => self.handle_ring_key(key),
            },
        }
    }

    fn handle_ring_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Esc => {
                if self.ui.show_help || self.ui.show_activity {
                    self.ui.show_help = false;
                    self.ui.show_activity = false;
                    return;
                }
                Action::Quit
            }
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
            KeyCode::Enter | KeyCode::Char(' ') => Action::SelectCursor,
            KeyCode::Backspace | KeyCode::Delete => Action::Deselect,
            KeyCode::Char('g') => Action::Generate,
            KeyCode::Char('y') => Action::CopyChecklist,
            KeyCode::Char('a') => Action::ToggleActivity,
            KeyCode::Char('?') => Action::Help,
            KeyCode::Char('/') => {
                self.ui.focus = Focus::Command;
                self.ui.input = "/".to_string();
                return;
            }
            _ => return,
        };
        self.dispatch(action);
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.input.clear();
                self.ui.focus = Focus::Rings;
            }
            KeyCode::Enter => self.submit_command(),
            KeyCode::Tab => self.complete_command(),
            KeyCode::Backspace => {
                self.ui.input.pop();
                if self.ui.input.is_empty() {
                    self.ui.focus = Focus::Rings;
                }
            }
            KeyCode::Char(c) => self.ui.input.push(c),
            _ => {}
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.ui.focus != Focus::Command {
            return;
        }
        // Single-line input: drop carriage returns, fold newlines
        let filtered: String = text
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        self.ui.input.push_str(&filtered);
    }

    /// Check if command popup should be shown
    pub fn showing_command_popup(&self) -> bool {
        self.ui.focus == Focus::Command
            && self.ui.input.starts_with('/')
            && !self.ui.input.contains(' ')
    }

    /// Get filtered commands based on current input
    pub fn get_filtered_commands(&self) -> Vec<(&'static str, &'static str)> {
        if !self.ui.input.starts_with('/') {
            return vec![];
        }
        let filter = &self.ui.input[1..];
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd[1..].starts_with(filter))
            .copied()
            .collect()
    }

    fn complete_command(&mut self) {
        if let Some((cmd, _)) = self.get_filtered_commands().first() {
            self.ui.input = if *cmd == "/select" {
                format!("{} ", cmd)
            } else {
                cmd.to_string()
            };
        }
    }

    fn submit_command(&mut self) {
        let input = std::mem::take(&mut self.ui.input);
        self.ui.focus = Focus::Rings;

        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return;
        }

        match CommandParser::parse(trimmed) {
            Ok(action) => self.dispatch(action),
            Err(message) => self.set_status(message),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::CursorUp => {
                self.ui.cursor = self.ui.cursor.saturating_sub(1);
            }
            Action::CursorDown => {
                if self.ui.cursor + 1 < self.rings.len() {
                    self.ui.cursor += 1;
                }
            }
            Action::SelectCursor => {
                let layer = self.cursor_layer().cloned();
                self.controller.select_layer(layer);
                self.sync_state(self.controller.state());
            }
            Action::Select { id } => {
                if !self.controller.select_by_id(&id) {
                    self.set_status(format!("Unknown layer: {} (selection cleared)", id));
                }
                self.sync_state(self.controller.state());
            }
            Action::Deselect => {
                self.controller.select_layer(None);
                self.sync_state(self.controller.state());
            }
            Action::Generate => self.start_generation(),
            Action::CopyChecklist => self.copy_checklist(),
            Action::ToggleActivity => {
                self.ui.show_activity = !self.ui.show_activity;
            }
            Action::Help => {
                self.ui.show_help = !self.ui.show_help;
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    fn start_generation(&mut self) {
        if self.is_generating() {
            self.set_status("A checklist is already being generated");
            return;
        }
        let Some(layer) = self.state.selected_layer.clone() else {
            self.set_status("Select a layer first");
            return;
        };

        self.record(
            ActivityKind::Request,
            format!("Generating checklist for {}", layer.name),
        );
        let controller = Arc::clone(&self.controller);
        self.generation = Some(tokio::spawn(async move {
            controller.generate_checklist().await;
        }));
    }

    /// Checklist formatted for the clipboard.
    pub fn checklist_text(&self) -> Option<String> {
        let items = self.state.generated_checklist.as_ref()?;
        if items.is_empty() {
            return None;
        }

        let mut text = match &self.state.selected_layer {
            Some(layer) => format!("{} security checklist\n", layer.name),
            None => String::new(),
        };
        for item in items {
            text.push_str(&format!("- {}\n", item));
        }
        Some(text)
    }

    fn copy_checklist(&mut self) {
        let Some(text) = self.checklist_text() else {
            self.set_status("No checklist to copy");
            return;
        };

        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.set_status("Checklist copied to clipboard"),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.set_status(format!("Clipboard unavailable: {}", e));
            }
        }
    }

    /// Adopt a new controller snapshot and log what changed.
    pub fn sync_state(&mut self, next: ControllerState) {
        if next == self.state {
            return;
        }
        let previous = std::mem::replace(&mut self.state, next);

        let mut entries = Vec::new();
        if previous.selected_id() != self.state.selected_id() {
            match &self.state.selected_layer {
                Some(layer) => {
                    if let Some(pos) = self.rings.position(&layer.id) {
                        self.ui.cursor = pos;
                    }
                    entries.push((ActivityKind::Selection, format!("Selected {}", layer.name)));
                }
                None => entries.push((ActivityKind::Selection, "Selection cleared".to_string())),
            }
        }

        let layer_name = self
            .state
            .selected_layer
            .as_ref()
            .map(|l| l.name.clone())
            .unwrap_or_else(|| "no layer".to_string());
        if self.state.generated_checklist != previous.generated_checklist {
            if let Some(items) = &self.state.generated_checklist {
                entries.push((
                    ActivityKind::Success,
                    format!("Checklist ready for {}: {} items", layer_name, items.len()),
                ));
            }
        }
        if self.state.error != previous.error {
            if let Some(error) = &self.state.error {
                entries.push((ActivityKind::Failure, format!("{}: {}", layer_name, error)));
            }
        }

        for (kind, message) in entries {
            self.record(kind, message);
        }
    }

    fn record(&mut self, kind: ActivityKind, message: String) {
        self.activity.push_back(ActivityEntry {
            kind,
            message,
            timestamp: Utc::now(),
        });
        while self.activity.len() > self.config.activity_log_capacity {
            self.activity.pop_front();
        }
    }
}
