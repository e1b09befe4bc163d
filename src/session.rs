//! Session controller
//!
//! Owns the simulation state and the timer wheel, and is the only thing a
//! host talks to. Hosts feed commands and elapsed time in, and read
//! snapshots and notices out.
//!
//! Lifecycle:
//! - `start` resets stats and begins the ball game
//! - `next_mode` tears the current mode down and begins the next one after
//!   a short buffer
//! - `stop` tears down, resets stats and returns to the ball game
//!
//! Every scheduled task carries the generation it was scheduled in. Teardown
//! bumps the generation, so work queued by an earlier mode never runs.

use glam::Vec2;
use serde::Serialize;

use crate::input::{InputMode, PointerAction};
use crate::settings::Settings;
use crate::sim::shop::{self, PurchaseOutcome, ShopError, UpgradeKind, UpgradeTarget};
use crate::sim::tick::{self, Followup, Task, TurnResult};
use crate::sim::{
    Bounds, Dice, FarmedCircle, Fish, Fisherman, GameMode, Notice, PlayerId, Projectile,
    Scheduler, SessionState, Severity, TimerId,
};

/// Why a command was refused
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    AlreadyRunning,
    NotRunning,
    NotEnoughPlayers,
    /// Roster changes are locked while a game runs
    RosterLocked,
    NoPlayerAt(Vec2),
    UnknownPlayer(PlayerId),
    Shop(ShopError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "A game is already running"),
            Self::NotRunning => write!(f, "No game is running"),
            Self::NotEnoughPlayers => write!(f, "You need at least two players!"),
            Self::RosterLocked => write!(f, "Stop the game to change players"),
            Self::NoPlayerAt(p) => write!(f, "No player found at ({}, {})", p.x, p.y),
            Self::UnknownPlayer(id) => write!(f, "No player with id {}", id),
            Self::Shop(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shop(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShopError> for CommandError {
    fn from(e: ShopError) -> Self {
        Self::Shop(e)
    }
}

/// A task stamped with the generation that scheduled it
#[derive(Debug, Clone)]
struct Scheduled {
    generation: u64,
    task: Task,
}

/// Player as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub pos: Vec2,
    pub score: u64,
    pub total_xp: u64,
    pub level: u32,
    /// Percent toward the next level
    pub level_progress: u32,
    pub last_roll: u32,
    pub speed: f32,
    pub winning_threshold: u32,
    pub lucky_chance: u32,
    pub max_fish: u32,
    /// Fisherman catch toward `max_fish` (fishing game only)
    pub fish_count: Option<u32>,
}

/// Shop entry on offer right now
#[derive(Debug, Clone, Serialize)]
pub struct ShopItem {
    pub kind: UpgradeKind,
    pub cost: u64,
}

/// Read-only view of everything the renderer draws
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// RNG seed; replaying the same commands from it reproduces the session
    pub seed: u64,
    pub now_ms: f64,
    pub running: bool,
    pub mode: GameMode,
    pub mode_name: &'static str,
    pub bounds: Bounds,
    pub players: Vec<PlayerView>,
    pub projectiles: Vec<Projectile>,
    pub farmed_circles: Vec<FarmedCircle>,
    pub fishermen: Vec<Fisherman>,
    pub fish: Vec<Fish>,
    pub notice: Option<Notice>,
    pub input_mode: InputMode,
    pub selected_target: UpgradeTarget,
    pub shop: Vec<ShopItem>,
}

/// A running (or idle) party game
pub struct Session {
    state: SessionState,
    scheduler: Scheduler<Scheduled>,
    /// Fast-tick and turn intervals of the running mode
    mode_timers: Vec<TimerId>,
    settings: Settings,
    input_mode: InputMode,
    selected_target: UpgradeTarget,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random::<u64>);
        log::info!("Session created with seed: {}", seed);

        let bounds = Bounds::new(settings.width, settings.height);
        Self {
            state: SessionState::new(bounds, seed, settings.notice_duration_ms),
            scheduler: Scheduler::new(),
            mode_timers: Vec::new(),
            settings,
            input_mode: InputMode::Idle,
            selected_target: UpgradeTarget::All,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Random source, exposed so hosts and tests can rig rolls
    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.state.dice
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn selected_target(&self) -> UpgradeTarget {
        self.selected_target
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    // === Roster ===

    /// Add a player on the edge nearest `point`
    pub fn add_player(&mut self, point: Vec2) -> Result<PlayerId, CommandError> {
        if self.state.running {
            self.state.notify("Stop the game to add players.", Severity::Info);
            return Err(CommandError::RosterLocked);
        }
        let name = self.state.players.next_name();
        let id = self.state.players.add_player(point, self.state.bounds);
        self.state.notify(format!("Added {}!", name), Severity::Success);
        Ok(id)
    }

    /// Remove the player whose square contains `point`
    pub fn remove_player(&mut self, point: Vec2) -> Result<PlayerId, CommandError> {
        if self.state.running {
            self.state.notify("Stop the game to remove players.", Severity::Info);
            return Err(CommandError::RosterLocked);
        }
        let Some(id) = self.state.players.player_at(point) else {
            self.state.notify("No player found.", Severity::Error);
            return Err(CommandError::NoPlayerAt(point));
        };
        if let Some(removed) = self.state.players.remove_player(id) {
            self.state
                .notify(format!("Removed {}.", removed.name), Severity::Info);
        }
        if self.selected_target == UpgradeTarget::Player(id) {
            self.selected_target = UpgradeTarget::All;
        }
        Ok(id)
    }

    // === Lifecycle ===

    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.state.running {
            return Err(self.reject(CommandError::AlreadyRunning));
        }
        if self.state.players.len() < 2 {
            return Err(self.reject(CommandError::NotEnoughPlayers));
        }

        self.state.players.reset_stats();
        self.state.running = true;
        self.input_mode = InputMode::Idle;
        log::info!("Game started with {} players", self.state.players.len());
        self.begin_mode(GameMode::Ball);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), CommandError> {
        if !self.state.running {
            return Err(self.reject(CommandError::NotRunning));
        }
        self.halt();
        Ok(())
    }

    /// Switch to the next mode after the configured buffer
    pub fn next_mode(&mut self) -> Result<GameMode, CommandError> {
        if !self.state.running {
            return Err(self.reject(CommandError::NotRunning));
        }
        self.teardown();
        let next = self.state.mode.next();
        log::info!("Switching {} -> {}", self.state.mode.as_str(), next.as_str());
        self.schedule_once(self.settings.mode_switch_buffer_ms, Task::StartMode(next));
        Ok(next)
    }

    /// Surface a refused command as an error notice; state is left untouched
    fn reject(&mut self, err: CommandError) -> CommandError {
        self.state.notify(err.to_string(), Severity::Error);
        err
    }

    /// Cancel all timers and clear mode entities; safe to call repeatedly
    fn teardown(&mut self) {
        self.state.generation += 1;
        self.mode_timers.clear();
        self.scheduler.cancel_all();
        self.state.clear_entities();
    }

    /// Full stop: teardown plus stat reset
    fn halt(&mut self) {
        self.teardown();
        self.state.running = false;
        self.state.players.reset_stats();
        self.state.mode = GameMode::Ball;
        self.state.notify("Game stopped. Scores reset.", Severity::Info);
        log::info!("Game stopped");
    }

    fn begin_mode(&mut self, mode: GameMode) {
        self.state.mode = mode;
        match mode {
            GameMode::Ball => self.state.notify("Ball Game starting...", Severity::Info),
            GameMode::Farming => {
                self.state.notify("Farming Mode starting...", Severity::Success);
                crate::sim::farming::setup(&mut self.state);
            }
            GameMode::Fishing => {
                self.state.notify("Fishing Mode starting...", Severity::Success);
                crate::sim::fishing::setup(&mut self.state);
            }
        }

        // Exactly one fast tick and one turn interval per running mode
        for id in self.mode_timers.drain(..) {
            self.scheduler.cancel(id);
        }
        let generation = self.state.generation;
        let fast_tick = self.scheduler.schedule_interval(
            self.settings.fast_tick_ms,
            Scheduled {
                generation,
                task: Task::FastTick,
            },
        );
        let turn = self.scheduler.schedule_interval(
            self.settings.turn_ms(mode),
            Scheduled {
                generation,
                task: Task::Turn,
            },
        );
        self.mode_timers = vec![fast_tick, turn];
        self.run_turn();
    }

    fn run_turn(&mut self) {
        match tick::run_turn(&mut self.state) {
            TurnResult::Continue(followups) => self.schedule_all(followups),
            TurnResult::NotEnoughPlayers => {
                log::warn!("Turn aborted: fewer than two players");
                self.halt();
            }
        }
    }

    // === Scheduling ===

    fn schedule_once(&mut self, delay_ms: f64, task: Task) {
        let generation = self.state.generation;
        self.scheduler
            .schedule_once(delay_ms, Scheduled { generation, task });
    }

    fn schedule_all(&mut self, followups: Vec<Followup>) {
        for Followup { delay_ms, task } in followups {
            self.schedule_once(delay_ms, task);
        }
    }

    /// Advance the virtual clock, firing every timer that comes due
    pub fn advance(&mut self, elapsed_ms: f64) {
        let target = self.scheduler.now_ms() + elapsed_ms.max(0.0);

        while let Some(Scheduled { generation, task }) = self.scheduler.pop_due(target) {
            self.state.now_ms = self.scheduler.now_ms();
            if generation != self.state.generation {
                log::debug!("Dropping stale task {:?}", task);
                continue;
            }
            self.run_task(task);
        }

        self.scheduler.settle(target);
        self.state.now_ms = target;
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::FastTick => {
                tick::fast_tick(&mut self.state, self.settings.cross_mode_ball_physics)
            }
            Task::Turn => self.run_turn(),
            Task::StartMode(mode) => {
                if self.state.running {
                    self.begin_mode(mode);
                }
            }
            Task::Announce(notice) => self.state.notify(notice.text, notice.severity),
            other => {
                let followups = tick::run_player_task(&mut self.state, &other);
                self.schedule_all(followups);
            }
        }
    }

    // === Shop ===

    pub fn purchase_upgrade(
        &mut self,
        kind: UpgradeKind,
        target: UpgradeTarget,
    ) -> Result<PurchaseOutcome, CommandError> {
        Ok(shop::purchase(&mut self.state, kind, target)?)
    }

    /// Buy for whoever the shop selector points at
    pub fn purchase_selected(&mut self, kind: UpgradeKind) -> Result<PurchaseOutcome, CommandError> {
        self.purchase_upgrade(kind, self.selected_target)
    }

    pub fn select_upgrade_target(&mut self, target: UpgradeTarget) -> Result<(), CommandError> {
        if let UpgradeTarget::Player(id) = target {
            if self.state.players.get(id).is_none() {
                return Err(self.reject(CommandError::UnknownPlayer(id)));
            }
        }
        self.selected_target = target;
        Ok(())
    }

    // === Input ===

    pub fn begin_add_player(&mut self) -> Result<(), CommandError> {
        self.arm(InputMode::AddingPlayer)
    }

    pub fn begin_remove_player(&mut self) -> Result<(), CommandError> {
        self.arm(InputMode::RemovingPlayer)
    }

    fn arm(&mut self, mode: InputMode) -> Result<(), CommandError> {
        if self.state.running {
            return Err(self.reject(CommandError::RosterLocked));
        }
        self.input_mode = mode;
        if let Some(prompt) = mode.prompt() {
            self.state.notify(prompt, Severity::Info);
        }
        Ok(())
    }

    /// Canvas press; completes an armed add/remove gesture
    pub fn handle_pointer_event(&mut self, point: Vec2) -> Result<Option<PlayerId>, CommandError> {
        if self.state.running {
            return Ok(None);
        }
        let (action, next) = self.input_mode.press(point);
        self.input_mode = next;
        match action {
            PointerAction::AddPlayer(p) => self.add_player(p).map(Some),
            PointerAction::RemovePlayer(p) => self.remove_player(p).map(Some),
            PointerAction::None => Ok(None),
        }
    }

    /// Canvas resized; squares are pulled back inside
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.state.bounds = Bounds::new(width, height);
        self.state.players.clamp_to(self.state.bounds);
    }

    // === Output ===

    pub fn active_notice(&self) -> Option<&Notice> {
        self.state.notices.active(self.state.now_ms)
    }

    /// Every notice raised since the last call
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.state.notices.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let players = state
            .players
            .iter()
            .map(|p| {
                let (level, level_progress) = p.level();
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    color: p.color.clone(),
                    pos: p.pos,
                    score: p.score,
                    total_xp: p.total_xp,
                    level,
                    level_progress,
                    last_roll: p.last_roll,
                    speed: p.speed,
                    winning_threshold: p.winning_threshold,
                    lucky_chance: p.lucky_chance,
                    max_fish: p.max_fish,
                    fish_count: state
                        .fishermen
                        .iter()
                        .find(|f| f.owner == p.id)
                        .map(|f| f.fish_count),
                }
            })
            .collect();

        Snapshot {
            seed: state.dice.seed(),
            now_ms: state.now_ms,
            running: state.running,
            mode: state.mode,
            mode_name: state.mode.as_str(),
            bounds: state.bounds,
            players,
            projectiles: state.projectiles.clone(),
            farmed_circles: state.farmed_circles.clone(),
            fishermen: state.fishermen.clone(),
            fish: state.fish.clone(),
            notice: self.active_notice().cloned(),
            input_mode: self.input_mode,
            selected_target: self.selected_target,
            shop: UpgradeKind::available(state.running, state.mode)
                .into_iter()
                .map(|kind| ShopItem {
                    kind,
                    cost: kind.cost(),
                })
                .collect(),
        }
    }
}
