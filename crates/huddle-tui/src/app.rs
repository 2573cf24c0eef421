// Application state and orchestration logic.
//
// The central event loop owns every piece of session state: the roster, the
// draw engine and winner history, and the current group batch. It reacts to
// user commands from the TUI and to results from the background tasks it
// spawns (spin animation, team naming, winner announcements), and pushes UI
// updates to the TUI render loop.

use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use huddle_core::config::Config;
use huddle_core::db::Database;
use huddle_core::decorate::{self, TextGenerator};
use huddle_core::draw::{self, DrawEngine, DrawError, DrawPhase, SpinPlan, WinnerHistory};
use huddle_core::export;
use huddle_core::grouping::{self, GroupSize, GroupingError, Theme};
use huddle_core::ingest;
use huddle_core::model::{Group, Winner};
use huddle_core::roster::Roster;

use crate::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// Task events
// ---------------------------------------------------------------------------

/// Results reported back by spawned tasks. Each carries the generation it was
/// started under so superseded results can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    SpinStep { generation: u64, index: usize },
    SpinFinished { generation: u64 },
    Announcement { generation: u64, text: String },
    TeamNames { generation: u64, names: Vec<String> },
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub roster: Roster,
    pub draw: DrawEngine,
    pub winners: WinnerHistory,
    /// Prize label for the next draw. Blank means the configured default.
    pub prize: String,
    /// Prize the running spin was started for.
    pub spin_prize: String,
    pub groups: Vec<Group>,
    pub group_size: GroupSize,
    pub theme: Theme,
    pub active_tab: TabId,
    /// Pool index the spin highlight last rested on.
    pub highlight: usize,
    /// Identifies the current draw; bumped on every spin start.
    pub draw_generation: u64,
    /// Identifies the current group batch; bumped on every grouping run.
    pub group_generation: u64,
    pub naming_in_progress: bool,
    pub spin_task: Option<JoinHandle<()>>,
    pub announcement_task: Option<JoinHandle<()>>,
    pub naming_task: Option<JoinHandle<()>>,
    pub generator: Arc<dyn TextGenerator>,
    pub task_tx: mpsc::Sender<TaskEvent>,
    pub rng: StdRng,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        generator: Arc<dyn TextGenerator>,
        task_tx: mpsc::Sender<TaskEvent>,
        rng: StdRng,
    ) -> Self {
        let draw = DrawEngine::new(config.draw.spin_settings(), config.draw.allow_repeat);
        let group_size = config.grouping.group_size();
        let theme = config.grouping.default_theme;

        AppState {
            config,
            db,
            roster: Roster::new(),
            draw,
            winners: WinnerHistory::new(),
            prize: String::new(),
            spin_prize: String::new(),
            groups: Vec::new(),
            group_size,
            theme,
            active_tab: TabId::Roster,
            highlight: 0,
            draw_generation: 0,
            group_generation: 0,
            naming_in_progress: false,
            spin_task: None,
            announcement_task: None,
            naming_task: None,
            generator,
            task_tx,
            rng,
        }
    }

    /// Build a snapshot of the state for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            participants: self.roster.participants().to_vec(),
            name_counts: self.roster.name_frequency(),
            winners: self.winners.winners().to_vec(),
            eligible_count: self
                .draw
                .eligible_pool(self.roster.participants(), &self.winners)
                .len(),
            allow_repeat: self.draw.allow_repeat(),
            prize: self.prize.clone(),
            spinning: self.draw.is_spinning(),
            group_size: self.group_size.get(),
            theme: self.theme,
            groups: self.groups.clone(),
            naming_in_progress: self.naming_in_progress,
            active_tab: Some(self.active_tab),
        }
    }

    /// Write the roster to the database. Failures are logged; the in-memory
    /// roster stays authoritative.
    pub fn persist_roster(&self) {
        if let Err(e) = self.db.save_roster(self.roster.participants()) {
            error!("Failed to persist roster: {e:#}");
        }
    }

    /// Abort every background task.
    pub fn cancel_tasks(&mut self) {
        for handle in [self.announcement_task.take(), self.naming_task.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
        self.cancel_spin();
    }

    /// Abort the spin animation and return the engine to Idle without
    /// recording a winner. Returns whether a spin was running.
    pub fn cancel_spin(&mut self) -> bool {
        if let Some(handle) = self.spin_task.take() {
            handle.abort();
        }
        let cancelled = self.draw.cancel();
        if cancelled {
            info!("Cancelled in-progress spin");
        }
        cancelled
    }

    /// Cancel the running spin if its chosen winner is no longer on the
    /// roster. Called after every removal.
    fn cancel_spin_if_winner_removed(&mut self) -> bool {
        let winner_gone = match self.draw.phase() {
            DrawPhase::Spinning(plan) => self.roster.get(&plan.winner().id).is_none(),
            _ => false,
        };
        winner_gone && self.cancel_spin()
    }

    fn effective_prize(&self) -> &str {
        if self.prize.trim().is_empty() {
            &self.config.draw.default_prize
        } else {
            &self.prize
        }
    }

    /// Begin a draw: pick the winner, then spawn the animation that lands on it.
    pub fn start_draw(&mut self) -> Result<&SpinPlan, DrawError> {
        let prize = self.effective_prize().to_string();
        let plan = self.draw.start(
            self.roster.participants(),
            &self.winners,
            self.highlight,
            &mut self.rng,
        )?;

        self.draw_generation += 1;
        self.spin_prize = prize;
        if let Some(handle) = self.announcement_task.take() {
            handle.abort();
        }
        self.spin_task = Some(spawn_spin(plan, self.draw_generation, self.task_tx.clone()));
        Ok(plan)
    }

    /// Settle the current spin under the prize it started with and request
    /// its announcement.
    fn settle_draw(&mut self) -> Option<Winner> {
        let prize = std::mem::take(&mut self.spin_prize);
        let winner = self
            .draw
            .settle(&mut self.winners, &prize, draw::now_millis())?;
        self.spin_task = None;

        let generator = Arc::clone(&self.generator);
        let tx = self.task_tx.clone();
        let generation = self.draw_generation;
        let name = winner.name.clone();
        let limit = self.config.llm.timeout();
        self.announcement_task = Some(tokio::spawn(async move {
            let text = decorate::announcement_or_fallback(generator.as_ref(), &name, limit).await;
            let _ = tx.send(TaskEvent::Announcement { generation, text }).await;
        }));

        Some(winner)
    }

    /// Partition the roster into a new batch, committed immediately under
    /// fallback names, and request themed names for it.
    pub fn generate_groups(&mut self) -> Result<usize, GroupingError> {
        let groups = grouping::partition(self.roster.participants(), self.group_size, &mut self.rng)?;
        let count = groups.len();
        self.groups = groups;
        self.group_generation += 1;
        self.naming_in_progress = true;
        info!(
            "Grouped {} participants into {} groups of {}",
            self.roster.len(),
            count,
            self.group_size.get()
        );

        if let Some(handle) = self.naming_task.take() {
            handle.abort();
        }
        let generator = Arc::clone(&self.generator);
        let tx = self.task_tx.clone();
        let generation = self.group_generation;
        let theme = self.theme;
        let limit = self.config.llm.timeout();
        self.naming_task = Some(tokio::spawn(async move {
            let names = decorate::team_names_or_fallback(generator.as_ref(), count, theme, limit).await;
            let _ = tx.send(TaskEvent::TeamNames { generation, names }).await;
        }));

        Ok(count)
    }
}

/// Spawn the animation task: one `SpinStep` per planned delay, then
/// `SpinFinished`.
fn spawn_spin(plan: &SpinPlan, generation: u64, tx: mpsc::Sender<TaskEvent>) -> JoinHandle<()> {
    let steps: Vec<_> = plan
        .delays
        .iter()
        .enumerate()
        .map(|(i, delay)| (*delay, plan.index_at(i + 1)))
        .collect();

    tokio::spawn(async move {
        for (delay, index) in steps {
            tokio::time::sleep(delay).await;
            if tx.send(TaskEvent::SpinStep { generation, index }).await.is_err() {
                return;
            }
        }
        let _ = tx.send(TaskEvent::SpinFinished { generation }).await;
    })
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Results from background tasks
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut task_rx: mpsc::Receiver<TaskEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // AppState holds a sender, so this channel never closes while the
            // loop runs.
            Some(event) = task_rx.recv() => {
                handle_task_event(&mut state, event, &ui_tx).await;
            }
        }
    }

    state.cancel_tasks();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::StateSnapshot(Box::new(state.build_snapshot())))
        .await;
}

async fn send_notice(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Handle a result from a background task.
async fn handle_task_event(state: &mut AppState, event: TaskEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        TaskEvent::SpinStep { generation, index } => {
            if generation != state.draw_generation || !state.draw.is_spinning() {
                debug!("Discarding stale spin step (gen {generation})");
                return;
            }
            state.highlight = index;
            let _ = ui_tx.send(UiUpdate::SpinStep { index }).await;
        }
        TaskEvent::SpinFinished { generation } => {
            if generation != state.draw_generation {
                debug!("Discarding stale spin finish (gen {generation})");
                return;
            }
            if let Some(winner) = state.settle_draw() {
                let _ = ui_tx.send(UiUpdate::SpinSettled(winner)).await;
                send_snapshot(state, ui_tx).await;
            }
        }
        TaskEvent::Announcement { generation, text } => {
            if generation != state.draw_generation || state.draw.is_spinning() {
                debug!("Discarding stale announcement (gen {generation})");
                return;
            }
            state.announcement_task = None;
            let _ = ui_tx.send(UiUpdate::Announcement(text)).await;
        }
        TaskEvent::TeamNames { generation, names } => {
            if generation != state.group_generation {
                debug!("Discarding stale team names (gen {generation})");
                return;
            }
            grouping::apply_names(&mut state.groups, &names);
            state.naming_in_progress = false;
            state.naming_task = None;
            send_snapshot(state, ui_tx).await;
        }
    }
}

/// Handle a command from the TUI.
async fn handle_user_command(state: &mut AppState, cmd: UserCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
    match cmd {
        UserCommand::SwitchTab(tab) => {
            state.active_tab = tab;
            debug!("Switched to tab: {:?}", tab);
        }

        // --- Roster ---
        UserCommand::AddNames(text) => {
            let added = state.roster.ingest(&text, &mut state.rng);
            if added.is_empty() {
                send_notice(ui_tx, Notice::warning("No names found in input")).await;
                return;
            }
            info!("Added {} participants", added.len());
            state.persist_roster();
            send_notice(ui_tx, Notice::info(format!("Added {} participants", added.len()))).await;
        }
        UserCommand::ImportFile(path) => match state.roster.ingest_file(&path, &mut state.rng) {
            Ok(added) if added.is_empty() => {
                send_notice(ui_tx, Notice::warning(format!("No names found in {}", path.display()))).await;
                return;
            }
            Ok(added) => {
                info!("Imported {} participants from {}", added.len(), path.display());
                state.persist_roster();
                send_notice(
                    ui_tx,
                    Notice::info(format!("Imported {} participants from {}", added.len(), path.display())),
                )
                .await;
            }
            Err(e) => {
                warn!("Import failed: {e}");
                send_notice(ui_tx, Notice::error(e.to_string())).await;
                return;
            }
        },
        UserCommand::AddSampleNames => {
            let added = state.roster.add_names(ingest::sample_names(), &mut state.rng);
            state.persist_roster();
            send_notice(ui_tx, Notice::info(format!("Added {} sample names", added.len()))).await;
        }
        UserCommand::RemoveDuplicates => {
            let removed = state.roster.deduplicate_by_name();
            if removed > 0 {
                info!("Removed {removed} duplicate participants");
                state.persist_roster();
                if state.cancel_spin_if_winner_removed() {
                    send_notice(ui_tx, Notice::warning("Draw cancelled: the drawn participant was removed")).await;
                }
            }
            send_notice(ui_tx, Notice::info(format!("Removed {removed} duplicates"))).await;
        }
        UserCommand::RemoveParticipant(id) => {
            if !state.roster.remove_by_id(&id) {
                return;
            }
            state.persist_roster();
            if state.cancel_spin_if_winner_removed() {
                send_notice(ui_tx, Notice::warning("Draw cancelled: the drawn participant was removed")).await;
            }
        }
        UserCommand::ClearRoster => {
            state.roster.clear_all();
            info!("Roster cleared");
            state.persist_roster();
            state.cancel_spin();
            send_notice(ui_tx, Notice::info("Roster cleared")).await;
        }

        // --- Draw ---
        UserCommand::StartDraw => match state.start_draw() {
            Ok(plan) => {
                let names = plan.pool.iter().map(|p| p.name.clone()).collect();
                let start_index = plan.start_index;
                let _ = ui_tx.send(UiUpdate::SpinStarted { names, start_index }).await;
            }
            Err(DrawError::NoEligibleParticipants) => {
                send_notice(ui_tx, Notice::warning("No eligible participants to draw from")).await;
                return;
            }
            Err(DrawError::AlreadySpinning) => return,
        },
        UserCommand::SetPrize(label) => {
            if state.draw.is_spinning() {
                send_notice(ui_tx, Notice::warning("The prize cannot change while the draw is spinning")).await;
                return;
            }
            state.prize = label.trim().to_string();
        }
        UserCommand::ToggleAllowRepeat => {
            let allow = state.draw.toggle_allow_repeat();
            info!("Allow repeat winners: {allow}");
        }
        UserCommand::ClearWinners => {
            state.winners.clear();
            info!("Winner history cleared");
            send_notice(ui_tx, Notice::info("Winner history cleared")).await;
        }

        // --- Groups ---
        UserCommand::IncreaseGroupSize => {
            state.group_size = state.group_size.increment();
        }
        UserCommand::DecreaseGroupSize => {
            state.group_size = state.group_size.decrement();
        }
        UserCommand::CycleTheme => {
            state.theme = state.theme.next();
        }
        UserCommand::GenerateGroups => match state.generate_groups() {
            Ok(count) => {
                send_notice(ui_tx, Notice::info(format!("Created {count} groups"))).await;
            }
            Err(GroupingError::EmptyRoster) => {
                send_notice(ui_tx, Notice::warning("Add participants before grouping")).await;
                return;
            }
        },
        UserCommand::ExportGroups => {
            let today = chrono::Local::now().date_naive();
            match export::write_groups_csv(&state.groups, &state.config.export_dir(), today) {
                Ok(path) => {
                    send_notice(ui_tx, Notice::info(format!("Exported to {}", path.display()))).await;
                }
                Err(e) => {
                    warn!("Export failed: {e}");
                    send_notice(ui_tx, Notice::error(e.to_string())).await;
                }
            }
            return;
        }

        UserCommand::Quit => {
            // Handled in the main loop
            return;
        }
    }

    send_snapshot(state, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Startup restore
// ---------------------------------------------------------------------------

/// Load the persisted roster into `state`. Returns the number of participants
/// restored.
pub fn restore_from_db(state: &mut AppState) -> anyhow::Result<usize> {
    let stored = state.db.load_roster()?;
    state.roster = Roster::from_participants(stored, &mut state.rng);
    let count = state.roster.len();
    if count > 0 {
        info!("Restored {count} participants from previous session");
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::config::*;
    use huddle_core::decorate::OfflineGenerator;
    use huddle_core::model::Participant;
    use rand::SeedableRng;

    fn test_config() -> Config {
        Config {
            draw: DrawConfig {
                min_spin_steps: 5,
                spin_step_range: 3,
                initial_delay_ms: 10,
                slowdown_after: 0.7,
                slowdown_increment_ms: 5,
                default_prize: "Lucky Prize".into(),
                allow_repeat: false,
            },
            grouping: GroupingConfig {
                default_size: 2,
                default_theme: Theme::Professional,
            },
            llm: LlmConfig {
                model: "test".into(),
                team_names_max_tokens: 100,
                announcement_max_tokens: 100,
                timeout_secs: 5,
            },
            database: DatabaseConfig {
                path: ":memory:".into(),
            },
            export: ExportConfig {
                directory: std::env::temp_dir()
                    .join("huddle_app_export_test")
                    .to_string_lossy()
                    .into_owned(),
            },
            credentials: CredentialsConfig::default(),
        }
    }

    fn test_state() -> (AppState, mpsc::Receiver<TaskEvent>) {
        let (task_tx, task_rx) = mpsc::channel(64);
        let state = AppState::new(
            test_config(),
            Database::open(":memory:").unwrap(),
            Arc::new(OfflineGenerator),
            task_tx,
            StdRng::seed_from_u64(1),
        );
        (state, task_rx)
    }

    fn drain(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<UiUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = ui_rx.try_recv() {
            out.push(update);
        }
        out
    }

    fn last_snapshot(updates: &[UiUpdate]) -> Option<&AppSnapshot> {
        updates.iter().rev().find_map(|u| match u {
            UiUpdate::StateSnapshot(s) => Some(s.as_ref()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn add_names_persists_and_snapshots() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("A, B\nC".into()), &ui_tx).await;

        assert_eq!(state.roster.len(), 3);
        assert_eq!(state.db.load_roster().unwrap().len(), 3);
        let updates = drain(&mut ui_rx);
        assert_eq!(last_snapshot(&updates).unwrap().participants.len(), 3);
    }

    #[tokio::test]
    async fn blank_input_adds_nothing_and_warns() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames(" , \n".into()), &ui_tx).await;

        assert!(state.roster.is_empty());
        let updates = drain(&mut ui_rx);
        assert!(matches!(updates.as_slice(), [UiUpdate::Notice(_)]));
    }

    #[tokio::test]
    async fn dedup_and_remove_update_storage() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,A".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::RemoveDuplicates, &ui_tx).await;
        assert_eq!(state.db.load_roster().unwrap().len(), 2);

        let id = state.roster.participants()[0].id.clone();
        handle_user_command(&mut state, UserCommand::RemoveParticipant(id), &ui_tx).await;
        let stored: Vec<String> = state
            .db
            .load_roster()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(stored, vec!["B"]);
    }

    #[tokio::test]
    async fn draw_on_empty_roster_warns_and_stays_idle() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;

        assert!(!state.draw.is_spinning());
        assert!(state.spin_task.is_none());
        let updates = drain(&mut ui_rx);
        assert!(matches!(updates.as_slice(), [UiUpdate::Notice(_)]));
    }

    #[tokio::test(start_paused = true)]
    async fn full_spin_records_winner_then_announces() {
        let (mut state, mut task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(256);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::SetPrize("iPad".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        assert!(state.draw.is_spinning());

        // Pump task events until the announcement arrives.
        let mut announced = None;
        while announced.is_none() {
            let event = task_rx.recv().await.unwrap();
            if let TaskEvent::Announcement { text, .. } = &event {
                announced = Some(text.clone());
            }
            handle_task_event(&mut state, event, &ui_tx).await;
        }

        assert_eq!(state.winners.len(), 1);
        let winner = &state.winners.winners()[0];
        assert_eq!(winner.prize, "iPad");
        assert_eq!(
            announced.unwrap(),
            format!("Congratulations, {}! You are the winner!", winner.name)
        );

        let updates = drain(&mut ui_rx);
        let settled_at = updates
            .iter()
            .position(|u| matches!(u, UiUpdate::SpinSettled(_)))
            .unwrap();
        let announced_at = updates
            .iter()
            .position(|u| matches!(u, UiUpdate::Announcement(_)))
            .unwrap();
        assert!(settled_at < announced_at);
        // The highlight rests on the winner.
        let rest = updates[..settled_at]
            .iter()
            .rev()
            .find_map(|u| match u {
                UiUpdate::SpinStep { index } => Some(*index),
                _ => None,
            })
            .unwrap();
        assert_eq!(state.roster.participants()[rest].id, winner.id);
    }

    #[tokio::test(start_paused = true)]
    async fn prize_is_fixed_when_the_spin_starts() {
        let (mut state, mut task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(256);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::SetPrize("iPad".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        drain(&mut ui_rx);

        handle_user_command(&mut state, UserCommand::SetPrize("Mug".into()), &ui_tx).await;
        assert_eq!(state.prize, "iPad");
        match drain(&mut ui_rx).as_slice() {
            [UiUpdate::Notice(notice)] => {
                assert_eq!(notice.level, crate::protocol::NoticeLevel::Warning)
            }
            other => panic!("expected a single warning, got {other:?}"),
        }

        while state.draw.is_spinning() {
            let event = task_rx.recv().await.unwrap();
            handle_task_event(&mut state, event, &ui_tx).await;
        }
        assert_eq!(state.winners.winners()[0].prize, "iPad");

        // Once settled the prize can change again.
        handle_user_command(&mut state, UserCommand::SetPrize("Mug".into()), &ui_tx).await;
        assert_eq!(state.prize, "Mug");
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_roster_cancels_the_spin() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(256);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        let generation = state.draw_generation;

        handle_user_command(&mut state, UserCommand::ClearRoster, &ui_tx).await;
        assert!(!state.draw.is_spinning());
        assert!(state.spin_task.is_none());
        assert!(!state.build_snapshot().spinning);

        // A finish that was already queued settles nothing.
        handle_task_event(&mut state, TaskEvent::SpinFinished { generation }, &ui_tx).await;
        assert!(state.winners.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn removing_the_drawn_participant_cancels_the_spin() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(256);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        let (winner_id, bystander_id) = match state.draw.phase() {
            DrawPhase::Spinning(plan) => {
                let winner = plan.winner().id.clone();
                let other = plan.pool.iter().find(|p| p.id != winner).unwrap().id.clone();
                (winner, other)
            }
            other => panic!("expected a spin, got {other:?}"),
        };

        handle_user_command(&mut state, UserCommand::RemoveParticipant(bystander_id), &ui_tx).await;
        assert!(state.draw.is_spinning());

        handle_user_command(&mut state, UserCommand::RemoveParticipant(winner_id), &ui_tx).await;
        assert!(!state.draw.is_spinning());
        assert!(state.spin_task.is_none());
    }

    #[tokio::test]
    async fn stale_spin_and_announcement_events_are_ignored() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        state.draw_generation = 3;

        handle_task_event(&mut state, TaskEvent::SpinStep { generation: 2, index: 1 }, &ui_tx).await;
        handle_task_event(&mut state, TaskEvent::SpinFinished { generation: 2 }, &ui_tx).await;
        handle_task_event(
            &mut state,
            TaskEvent::Announcement {
                generation: 2,
                text: "old".into(),
            },
            &ui_tx,
        )
        .await;

        assert!(drain(&mut ui_rx).is_empty());
        assert!(state.winners.is_empty());
    }

    #[tokio::test]
    async fn groups_commit_before_names_arrive() {
        let (mut state, mut task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C,D,E".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;

        // Committed with fallback names while naming is in flight.
        assert_eq!(state.groups.len(), 3);
        assert!(state.naming_in_progress);
        assert_eq!(state.groups[0].name, "Team 1");

        let event = task_rx.recv().await.unwrap();
        handle_task_event(&mut state, event, &ui_tx).await;
        assert!(!state.naming_in_progress);

        let updates = drain(&mut ui_rx);
        let snapshot = last_snapshot(&updates).unwrap();
        assert_eq!(snapshot.groups.len(), 3);
        assert!(!snapshot.naming_in_progress);
    }

    #[tokio::test]
    async fn stale_team_names_do_not_overwrite_newer_batch() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("A,B,C,D".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;
        let first_generation = state.group_generation;
        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;

        handle_task_event(
            &mut state,
            TaskEvent::TeamNames {
                generation: first_generation,
                names: vec!["Old".into(), "Names".into()],
            },
            &ui_tx,
        )
        .await;

        assert!(state.groups.iter().all(|g| g.name.starts_with("Team ")));
        assert!(state.naming_in_progress);
    }

    #[tokio::test]
    async fn grouping_empty_roster_warns() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::GenerateGroups, &ui_tx).await;

        assert!(state.groups.is_empty());
        assert!(state.naming_task.is_none());
        assert!(matches!(drain(&mut ui_rx).as_slice(), [UiUpdate::Notice(_)]));
    }

    #[tokio::test]
    async fn group_size_never_drops_below_one() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(64);
        for _ in 0..5 {
            handle_user_command(&mut state, UserCommand::DecreaseGroupSize, &ui_tx).await;
        }
        assert_eq!(state.group_size.get(), 1);
        handle_user_command(&mut state, UserCommand::IncreaseGroupSize, &ui_tx).await;
        assert_eq!(state.group_size.get(), 2);
    }

    #[tokio::test]
    async fn export_without_groups_reports_error() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::ExportGroups, &ui_tx).await;

        match drain(&mut ui_rx).as_slice() {
            [UiUpdate::Notice(notice)] => {
                assert_eq!(notice.level, crate::protocol::NoticeLevel::Error)
            }
            other => panic!("expected a single error notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn restore_reads_persisted_roster() {
        let (mut state, _task_rx) = test_state();
        state
            .db
            .save_roster(&[Participant {
                id: "abc".into(),
                name: "王小明".into(),
            }])
            .unwrap();

        assert_eq!(restore_from_db(&mut state).unwrap(), 1);
        assert_eq!(state.roster.participants()[0].name, "王小明");
    }

    #[tokio::test]
    async fn cancel_tasks_aborts_spin() {
        let (mut state, _task_rx) = test_state();
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::AddNames("A,B".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::StartDraw, &ui_tx).await;
        assert!(state.spin_task.is_some());

        state.cancel_tasks();
        assert!(state.spin_task.is_none());
        assert!(!state.draw.is_spinning());
        assert!(state.winners.is_empty());
    }
}
