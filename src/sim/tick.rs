//! Timed work and per-frame dispatch
//!
//! Everything the session schedules is a [`Task`] value. Mode engines never
//! hold timers themselves: they return [`Followup`]s and the session decides
//! whether those are still live when they come due.

use super::players::PlayerId;
use super::state::{GameMode, Notice, SessionState};
use super::{ball, farming, fishing};

/// Work fired by the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// ~60 Hz physics/animation step
    FastTick,
    /// Mode-specific turn (dice rolls)
    Turn,
    /// Begin a mode after the switch buffer
    StartMode(GameMode),
    /// Delayed notice (staggered roll announcements)
    Announce(Notice),
    FarmingRoll(PlayerId),
    FarmingWin(PlayerId),
    LuckyCircle(PlayerId),
    FishingRoll(PlayerId),
    FishCaught(PlayerId),
}

/// Deferred work requested by a mode engine
#[derive(Debug, Clone, PartialEq)]
pub struct Followup {
    pub delay_ms: f64,
    pub task: Task,
}

impl Followup {
    pub fn new(delay_ms: f64, task: Task) -> Self {
        Self { delay_ms, task }
    }
}

/// Result of a turn tick
#[derive(Debug, Clone, PartialEq)]
pub enum TurnResult {
    Continue(Vec<Followup>),
    /// The mode cannot run with the current roster; the session must stop
    NotEnoughPlayers,
}

/// Run the active mode's turn
pub fn run_turn(state: &mut SessionState) -> TurnResult {
    match state.mode {
        GameMode::Ball => ball::run_turn(state),
        GameMode::Farming => farming::run_turn(state),
        GameMode::Fishing => fishing::run_turn(state),
    }
}

/// Per-player deferred mode work
pub fn run_player_task(state: &mut SessionState, task: &Task) -> Vec<Followup> {
    match *task {
        Task::FarmingRoll(id) => farming::roll(state, id),
        Task::FarmingWin(id) => farming::win(state, id),
        Task::LuckyCircle(id) => {
            farming::lucky_circle(state, id);
            Vec::new()
        }
        Task::FishingRoll(id) => fishing::roll(state, id),
        Task::FishCaught(id) => {
            fishing::catch_fish(state, id);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Advance one fast tick
///
/// Ball projectile physics runs in every mode when `ball_physics_all_modes`
/// is set, matching the long-standing behavior where leftover projectiles
/// keep animating. Fishing motion runs only in fishing mode.
pub fn fast_tick(state: &mut SessionState, ball_physics_all_modes: bool) {
    if state.mode == GameMode::Fishing {
        fishing::fast_tick(state);
    }
    if ball_physics_all_modes || state.mode == GameMode::Ball {
        ball::fast_tick(state);
    }
}
