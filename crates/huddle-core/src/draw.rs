// Lucky draw engine: eligibility, the Idle -> Spinning -> Settled cycle, and
// winner history.
//
// The winner is picked uniformly from the eligible pool when the spin starts.
// The spin itself is only an animation schedule: its step count is stretched
// so the cycling highlight comes to rest on the winner that was already
// chosen, which keeps every eligible participant equally likely regardless of
// where the highlight started.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::model::{Participant, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("no eligible participants to draw from")]
    NoEligibleParticipants,

    #[error("a draw is already in progress")]
    AlreadySpinning,
}

// ---------------------------------------------------------------------------
// Spin animation
// ---------------------------------------------------------------------------

/// Tuning for the cosmetic spin animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSettings {
    /// Minimum number of highlight steps before the spin may stop.
    pub min_steps: usize,
    /// Up to this many extra steps are added at random.
    pub step_range: usize,
    /// Pause between steps at full speed.
    pub initial_delay: Duration,
    /// Fraction of the spin after which every step slows down further.
    pub slowdown_after: f64,
    /// Added to the pause for every step past `slowdown_after`.
    pub slowdown_increment: Duration,
}

impl Default for SpinSettings {
    fn default() -> Self {
        SpinSettings {
            min_steps: 40,
            step_range: 20,
            initial_delay: Duration::from_millis(50),
            slowdown_after: 0.7,
            slowdown_increment: Duration::from_millis(10),
        }
    }
}

/// A fully determined spin: the pool snapshot, the pre-selected winner and
/// the pause before each highlight step.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlan {
    pub pool: Vec<Participant>,
    pub start_index: usize,
    pub winner_index: usize,
    pub delays: Vec<Duration>,
}

impl SpinPlan {
    /// Pick a winner uniformly from `pool` and build the animation that lands
    /// on it. `pool` must be non-empty.
    fn build<R: Rng + ?Sized>(
        pool: Vec<Participant>,
        start_index: usize,
        settings: &SpinSettings,
        rng: &mut R,
    ) -> Self {
        let m = pool.len();
        let winner_index = rng.gen_range(0..m);
        let start_index = start_index % m;

        let base = settings.min_steps
            + if settings.step_range > 0 {
                rng.gen_range(0..settings.step_range)
            } else {
                0
            };
        let landing = (start_index + base) % m;
        let steps = base + (winner_index + m - landing) % m;

        SpinPlan {
            pool,
            start_index,
            winner_index,
            delays: spin_delays(steps, settings),
        }
    }

    pub fn steps(&self) -> usize {
        self.delays.len()
    }

    /// Highlighted pool index after `step` steps (0 = before the first step).
    pub fn index_at(&self, step: usize) -> usize {
        (self.start_index + step) % self.pool.len()
    }

    pub fn winner(&self) -> &Participant {
        &self.pool[self.winner_index]
    }

    pub fn total_duration(&self) -> Duration {
        self.delays.iter().sum()
    }
}

/// Pause before each step: constant at first, then growing by
/// `slowdown_increment` per step once past the slowdown threshold.
fn spin_delays(steps: usize, settings: &SpinSettings) -> Vec<Duration> {
    let threshold = steps as f64 * settings.slowdown_after;
    let mut delay = settings.initial_delay;
    (1..=steps)
        .map(|step| {
            let current = delay;
            if step as f64 > threshold {
                delay += settings.slowdown_increment;
            }
            current
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Winner history
// ---------------------------------------------------------------------------

/// Past winners, most recent first.
#[derive(Debug, Clone, Default)]
pub struct WinnerHistory {
    winners: Vec<Winner>,
}

impl WinnerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, winner: Winner) {
        self.winners.insert(0, winner);
    }

    /// Forget every winner. Idempotent.
    pub fn clear(&mut self) {
        self.winners.clear();
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.winners.iter().any(|w| w.id == participant_id)
    }
}

/// The roster minus prior winners (unless repeats are allowed), in roster order.
pub fn eligible_pool(
    roster: &[Participant],
    history: &WinnerHistory,
    allow_repeat: bool,
) -> Vec<Participant> {
    if allow_repeat {
        return roster.to_vec();
    }
    let won: HashSet<&str> = history.winners().iter().map(|w| w.id.as_str()).collect();
    roster
        .iter()
        .filter(|p| !won.contains(p.id.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// DrawEngine
// ---------------------------------------------------------------------------

/// Where the draw cycle currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPhase {
    Idle,
    Spinning(SpinPlan),
    Settled(Winner),
}

/// Drives one draw at a time through Idle -> Spinning -> Settled.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    phase: DrawPhase,
    settings: SpinSettings,
    allow_repeat: bool,
}

impl DrawEngine {
    pub fn new(settings: SpinSettings, allow_repeat: bool) -> Self {
        DrawEngine {
            phase: DrawPhase::Idle,
            settings,
            allow_repeat,
        }
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, DrawPhase::Spinning(_))
    }

    pub fn allow_repeat(&self) -> bool {
        self.allow_repeat
    }

    pub fn set_allow_repeat(&mut self, allow: bool) {
        self.allow_repeat = allow;
    }

    /// Flip the repeat rule and return the new value.
    pub fn toggle_allow_repeat(&mut self) -> bool {
        self.allow_repeat = !self.allow_repeat;
        self.allow_repeat
    }

    pub fn eligible_pool(&self, roster: &[Participant], history: &WinnerHistory) -> Vec<Participant> {
        eligible_pool(roster, history, self.allow_repeat)
    }

    /// Begin a spin. On error the phase is left unchanged.
    ///
    /// `start_index` is the pool index the highlight is currently showing; it
    /// only affects the animation, never who wins.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        roster: &[Participant],
        history: &WinnerHistory,
        start_index: usize,
        rng: &mut R,
    ) -> Result<&SpinPlan, DrawError> {
        if self.is_spinning() {
            return Err(DrawError::AlreadySpinning);
        }
        let pool = self.eligible_pool(roster, history);
        if pool.is_empty() {
            return Err(DrawError::NoEligibleParticipants);
        }

        let plan = SpinPlan::build(pool, start_index, &self.settings, rng);
        info!(
            "Spin started: pool={}, steps={}, duration={:?}",
            plan.pool.len(),
            plan.steps(),
            plan.total_duration()
        );
        self.phase = DrawPhase::Spinning(plan);
        match &self.phase {
            DrawPhase::Spinning(plan) => Ok(plan),
            _ => unreachable!("phase was just set to Spinning"),
        }
    }

    /// Finish the current spin: snapshot the winner, prepend it to `history`
    /// and move to Settled. Returns `None` if no spin is in progress.
    pub fn settle(&mut self, history: &mut WinnerHistory, prize: &str, timestamp: i64) -> Option<Winner> {
        let DrawPhase::Spinning(plan) = &self.phase else {
            return None;
        };
        let winner = Winner::from_participant(plan.winner(), prize, timestamp);
        history.record(winner.clone());
        info!("Draw settled: {} wins {}", winner.name, winner.prize);
        self.phase = DrawPhase::Settled(winner.clone());
        Some(winner)
    }

    /// Abandon an in-progress spin without recording a winner.
    /// Returns whether a spin was cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.is_spinning() {
            self.phase = DrawPhase::Idle;
            info!("Spin cancelled");
            true
        } else {
            false
        }
    }
}

impl Default for DrawEngine {
    fn default() -> Self {
        DrawEngine::new(SpinSettings::default(), false)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
