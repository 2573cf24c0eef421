// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the application state. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::warn;

use huddle_core::model::Winner;

use crate::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Modal state
// ---------------------------------------------------------------------------

/// What the single-line input bar is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Comma or newline separated names.
    AddNames,
    /// Path to a UTF-8 text file with one name per line.
    ImportPath,
    Prize,
}

impl InputKind {
    pub fn prompt(self) -> &'static str {
        match self {
            InputKind::AddNames => "Names (comma separated): ",
            InputKind::ImportPath => "Import file: ",
            InputKind::Prize => "Prize: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    pub kind: InputKind,
    pub text: String,
}

/// Actions that need a y/n confirmation before they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Quit,
    ClearRoster,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the dashboard.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Latest full snapshot from the orchestrator.
    pub snapshot: AppSnapshot,
    /// Which tab is active in the main panel.
    pub active_tab: TabId,
    /// Selected row in the roster list.
    pub selected: usize,
    /// Names in the pool of the current or last spin.
    pub spin_names: Vec<String>,
    /// Pool index currently highlighted by the spin.
    pub spin_index: Option<usize>,
    pub last_winner: Option<Winner>,
    pub announcement: Option<String>,
    pub notice: Option<Notice>,
    /// Active text prompt, if any.
    pub input: Option<InputPrompt>,
    /// Pending confirmation dialog, if any.
    pub confirm: Option<ConfirmKind>,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator.
    ///
    /// Spin, announcement and notice state are not part of the snapshot and
    /// are left unchanged.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if let Some(tab) = snapshot.active_tab {
            self.active_tab = tab;
        }
        // A spin that stopped without a winner was cancelled.
        if self.snapshot.spinning && !snapshot.spinning && self.last_winner.is_none() {
            self.spin_names.clear();
            self.spin_index = None;
        }
        self.selected = self
            .selected
            .min(snapshot.participants.len().saturating_sub(1));
        self.snapshot = snapshot;
    }

    /// The name the spin highlight is resting on, if a spin has started.
    pub fn highlighted_name(&self) -> Option<&str> {
        self.spin_index
            .and_then(|i| self.spin_names.get(i))
            .map(String::as_str)
    }

    pub fn scroll(&self, key: &str) -> usize {
        self.scroll_offset.get(key).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::SpinStarted { names, start_index } => {
            state.spin_names = names;
            state.spin_index = Some(start_index);
            state.last_winner = None;
            state.announcement = None;
            state.snapshot.spinning = true;
        }
        UiUpdate::SpinStep { index } => {
            state.spin_index = Some(index);
        }
        UiUpdate::SpinSettled(winner) => {
            state.last_winner = Some(winner);
            state.announcement = None;
        }
        UiUpdate::Announcement(text) => {
            state.announcement = Some(text);
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.active_tab);

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active_tab {
        TabId::Roster => widgets::roster_list::render(frame, layout.main_panel, state),
        TabId::Draw => {
            widgets::draw_panel::render(frame, layout.main_panel, state);
            if let Some(side) = layout.side_panel {
                widgets::winners::render(frame, side, state);
            }
        }
        TabId::Groups => widgets::groups::render(frame, layout.main_panel, state),
    }
    widgets::input_bar::render(frame, layout.input_bar, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(kind) = state.confirm {
        widgets::confirm::render(frame, frame.area(), kind);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen, bracketed paste).
/// 2. Installs a panic hook that restores the terminal before reporting.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit, including the error path.
pub async fn run(
    ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    // Without bracketed paste a pasted list arrives as key presses, and every
    // newline would submit the prompt.
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableBracketedPaste) {
        warn!("Bracketed paste unavailable: {e}");
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let result = event_loop(ui_rx, cmd_tx, &mut terminal).await;
    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    result
}

async fn event_loop(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    terminal: &mut ratatui::DefaultTerminal,
) -> anyhow::Result<()> {
    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break,
                }
            }

            // Keyboard and paste input
            maybe_event = event_stream.next() => {
                let cmd = match maybe_event {
                    Some(Ok(Event::Key(key_event))) => input::handle_key(key_event, &mut view_state),
                    Some(Ok(Event::Paste(text))) => input::handle_paste(text, &mut view_state),
                    // Mouse and resize events are picked up by the next render.
                    Some(Ok(_)) => None,
                    Some(Err(_)) | None => Some(UserCommand::Quit),
                };
                if let Some(cmd) = cmd {
                    let quit = cmd == UserCommand::Quit;
                    let _ = cmd_tx.send(cmd).await;
                    if quit {
                        break;
                    }
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
