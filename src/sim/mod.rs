//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (see [`scheduler`])
//! - Seeded RNG only (see [`dice`])
//! - Stable iteration order (registry order for players, push order for entities)
//! - No rendering or platform dependencies

pub mod ball;
pub mod collision;
pub mod dice;
pub mod farming;
pub mod fishing;
pub mod geometry;
pub mod players;
pub mod scheduler;
pub mod shop;
pub mod state;
pub mod tick;

pub use dice::Dice;
pub use geometry::{BezierPath, Bounds, Placeable, find_open_position, generate_random_path};
pub use players::{Player, PlayerId, PlayerRegistry, level_of};
pub use scheduler::{Scheduler, TimerId};
pub use shop::{PurchaseOutcome, ShopError, UpgradeKind, UpgradeResult, UpgradeTarget};
pub use state::{
    FarmedCircle, Fish, Fisherman, FishermanState, GameMode, Notice, Projectile, SessionState,
    Severity,
};
pub use tick::{Followup, Task, TurnResult};
