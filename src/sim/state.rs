//! Session state and core simulation types
//!
//! One owned [`SessionState`] holds everything the mode engines mutate.
//! Entity collections are cleared on every mode switch and on stop.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dice::Dice;
use super::geometry::{BezierPath, Bounds, Placeable};
use super::players::{PlayerId, PlayerRegistry};
use crate::consts::*;

/// The three mini-games, in rotation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Ball,
    Farming,
    Fishing,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Ball, GameMode::Farming, GameMode::Fishing];

    pub fn index(self) -> usize {
        match self {
            GameMode::Ball => 0,
            GameMode::Farming => 1,
            GameMode::Fishing => 2,
        }
    }

    /// Next mode in rotation (wraps)
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Ball => "Ball Game",
            GameMode::Farming => "Farming Game",
            GameMode::Fishing => "Fishing Game",
        }
    }
}

/// Notice severity, mapped to a color by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Notification channel: one active notice plus an outbox for the host
#[derive(Debug, Clone, Default)]
pub struct Notices {
    active: Option<(Notice, f64)>,
    outbox: Vec<Notice>,
}

impl Notices {
    /// Show `notice` until `expires_at_ms`, replacing whatever was showing
    pub fn show(&mut self, notice: Notice, expires_at_ms: f64) {
        match notice.severity {
            Severity::Error => log::warn!("{}", notice.text),
            _ => log::info!("{}", notice.text),
        }
        self.outbox.push(notice.clone());
        self.active = Some((notice, expires_at_ms));
    }

    /// The showing notice, if it has not been dismissed by `now_ms`
    pub fn active(&self, now_ms: f64) -> Option<&Notice> {
        self.active
            .as_ref()
            .filter(|(_, expires)| now_ms < *expires)
            .map(|(notice, _)| notice)
    }

    /// Take every notice raised since the last drain
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.outbox)
    }
}

/// A ball-game projectile travelling along a Bezier path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub source: PlayerId,
    pub color: String,
    pub path: BezierPath,
    /// Path parameter in [0, 1)
    pub progress: f32,
    /// Progress per fast tick
    pub speed: f32,
    pub is_large: bool,
    pub health: i32,
    pub radius: f32,
    pub score_value: u64,
    pub pos: Vec2,
}

impl Projectile {
    pub fn large(id: u32, source: PlayerId, color: &str, path: BezierPath, speed: f32) -> Self {
        Self {
            id,
            source,
            color: color.to_string(),
            path,
            progress: 0.0,
            speed,
            is_large: true,
            health: BALL_GAME_PROJECTILE_HEALTH,
            radius: BALL_GAME_PROJECTILE_RADIUS,
            score_value: BALL_GAME_PROJECTILE_SCORE,
            pos: path.start,
        }
    }

    pub fn small(id: u32, source: PlayerId, color: &str, path: BezierPath, speed: f32) -> Self {
        Self {
            id,
            source,
            color: color.to_string(),
            path,
            progress: 0.0,
            speed,
            is_large: false,
            health: 1,
            radius: SMALL_PROJECTILE_RADIUS,
            score_value: 1,
            pos: path.start,
        }
    }
}

/// A farming-mode circle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmedCircle {
    pub pos: Vec2,
    pub radius: f32,
    pub color: String,
    pub owner: PlayerId,
}

impl Placeable for FarmedCircle {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn extent(&self) -> f32 {
        self.radius
    }
}

/// Fisherman lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FishermanState {
    /// At home, rolling for fish each turn
    Fishing,
    /// Travelling to the current delivery target
    Delivering,
    /// Parked at the target while its fish swim in
    AwaitingDelivery,
    /// Travelling back home
    Returning,
}

/// A fishing-mode fisherman, one per player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fisherman {
    pub id: u32,
    pub owner: PlayerId,
    pub color: String,
    /// Center position
    pub pos: Vec2,
    pub radius: f32,
    pub state: FishermanState,
    pub home: Vec2,
    pub path: Option<BezierPath>,
    pub progress: f32,
    /// Opponents to visit on the current delivery run, in order
    pub delivery_targets: Vec<PlayerId>,
    /// Index into `delivery_targets`, `None` when not on a run
    pub current_target: Option<usize>,
    pub fish_count: u32,
}

impl Fisherman {
    pub fn new(id: u32, owner: PlayerId, color: &str, pos: Vec2) -> Self {
        Self {
            id,
            owner,
            color: color.to_string(),
            pos,
            radius: FISHERMAN_RADIUS,
            state: FishermanState::Fishing,
            home: pos,
            path: None,
            progress: 0.0,
            delivery_targets: Vec::new(),
            current_target: None,
            fish_count: 0,
        }
    }

    /// Player currently being delivered to
    pub fn current_target_id(&self) -> Option<PlayerId> {
        self.current_target
            .and_then(|i| self.delivery_targets.get(i))
            .copied()
    }

    /// Back to idle fishing with no run in progress
    pub fn reset_delivery(&mut self) {
        self.state = FishermanState::Fishing;
        self.fish_count = 0;
        self.delivery_targets.clear();
        self.current_target = None;
        self.path = None;
        self.progress = 0.0;
    }
}

impl Placeable for Fisherman {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn extent(&self) -> f32 {
        self.radius
    }
}

/// A caught fish, waiting for or on its way to delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    pub id: u32,
    pub owner: PlayerId,
    pub color: String,
    pub pos: Vec2,
    pub radius: f32,
    /// Opponent this fish is assigned to, `None` until a run starts
    pub target: Option<PlayerId>,
}

impl Placeable for Fish {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn extent(&self) -> f32 {
        self.radius
    }
}

/// Complete mutable session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub bounds: Bounds,
    pub players: PlayerRegistry,
    pub mode: GameMode,
    pub running: bool,
    /// Bumped on every teardown; deferred work from older generations is dropped
    pub generation: u64,
    /// Virtual time of the event being processed
    pub now_ms: f64,
    pub projectiles: Vec<Projectile>,
    /// Spawned this turn, instantiated one per fast tick
    pub projectile_queue: VecDeque<Projectile>,
    pub farmed_circles: Vec<FarmedCircle>,
    pub fishermen: Vec<Fisherman>,
    pub fish: Vec<Fish>,
    pub dice: Dice,
    pub notices: Notices,
    pub notice_duration_ms: f64,
    next_id: u32,
}

impl SessionState {
    pub fn new(bounds: Bounds, seed: u64, notice_duration_ms: f64) -> Self {
        Self {
            bounds,
            players: PlayerRegistry::new(),
            mode: GameMode::Ball,
            running: false,
            generation: 0,
            now_ms: 0.0,
            projectiles: Vec::new(),
            projectile_queue: VecDeque::new(),
            farmed_circles: Vec::new(),
            fishermen: Vec::new(),
            fish: Vec::new(),
            dice: Dice::new(seed),
            notices: Notices::default(),
            notice_duration_ms,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Raise a notice that auto-dismisses after the configured duration
    pub fn notify(&mut self, text: impl Into<String>, severity: Severity) {
        let expires = self.now_ms + self.notice_duration_ms;
        self.notices.show(Notice::new(text, severity), expires);
    }

    pub fn player_name(&self, id: PlayerId) -> String {
        self.players
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown player".to_string())
    }

    /// Drop every mode entity and clear last rolls
    pub fn clear_entities(&mut self) {
        self.projectiles.clear();
        self.projectile_queue.clear();
        self.farmed_circles.clear();
        self.fishermen.clear();
        self.fish.clear();
        self.players.clear_rolls();
    }
}
