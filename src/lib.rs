//! Dice Party - a dice-driven party mini-game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (players, mode engines, shop, scheduler)
//! - `session`: Session controller and command surface
//! - `input`: Pointer dispatch for add/remove player gestures
//! - `settings`: Data-driven configuration

pub mod input;
pub mod session;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::InputMode;
pub use session::{CommandError, Session};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Player square side length
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Player colors, cycled by join order
    pub const PLAYER_COLORS: [&str; 6] = [
        "#6a82fb", "#ff6b6b", "#ffd166", "#06d6a0", "#118ab2", "#ef476f",
    ];

    /// Player stat defaults (restored on start/stop)
    pub const DEFAULT_WINNING_THRESHOLD: u32 = 20;
    pub const DEFAULT_LUCKY_CHANCE: u32 = 0;
    pub const DEFAULT_MAX_FISH: u32 = 20;

    /// Faces on the die every mode rolls
    pub const DIE_FACES: u32 = 20;

    /// Ball game: rolls at or above this fire a large projectile
    pub const BALL_GAME_ROLL_THRESHOLD: u32 = 15;
    pub const BALL_GAME_PROJECTILE_HEALTH: i32 = 20;
    pub const BALL_GAME_PROJECTILE_SCORE: u64 = 20;
    pub const BALL_GAME_PROJECTILE_RADIUS: f32 = 10.0;
    pub const SMALL_PROJECTILE_RADIUS: f32 = 3.0;
    /// Path progress per fast tick
    pub const DEFAULT_PROJECTILE_SPEED: f32 = 0.0002;
    pub const MIN_PROJECTILE_SPEED: f32 = 0.00005;
    /// Damage a large projectile takes per small projectile it absorbs
    pub const SMALL_HIT_DAMAGE: i32 = 1;
    /// Damage two overlapping large projectiles deal each other per frame
    pub const LARGE_CLASH_DAMAGE: i32 = 10;

    /// Farming game
    pub const FARMING_GAME_WIN_SCORE: u64 = 10;
    pub const FARMED_CIRCLE_RADIUS: f32 = 10.0;

    /// Fishing game
    pub const FISHERMAN_SPEED: f32 = 0.0005;
    pub const FISHERMAN_RADIUS: f32 = 15.0;
    pub const FISH_RADIUS: f32 = 3.0;
    pub const FISHING_GAME_ROLL_THRESHOLD: u32 = 15;
    pub const FISHING_GAME_FISH_SCORE: u64 = 10;
    /// Fraction of the remaining offset a fish covers per frame
    pub const FISH_FOLLOW_FACTOR: f32 = 0.08;
    pub const FISH_HOMING_FACTOR: f32 = 0.1;

    /// Open-position spiral search
    pub const PLACEMENT_MAX_ITERATIONS: usize = 300;
    pub const PLACEMENT_ANGLE_STEP: f32 = 0.2;

    /// Shop costs and effects
    pub const SHOP_SPEED_UPGRADE_COST: u64 = 10;
    pub const SHOP_SPEED_UPGRADE_BOOST: f32 = 0.00005;
    pub const SHOP_SLOW_UPGRADE_COST: u64 = 10;
    pub const SHOP_SLOW_UPGRADE_SLOW: f32 = 0.00005;
    pub const SHOP_WINNING_NUMBER_UPGRADE_COST: u64 = 1000;
    pub const SHOP_LUCKY_CHANCE_UPGRADE_COST: u64 = 100;
    pub const SHOP_INVENTORY_UPGRADE_COST: u64 = 10;

    /// Level curve
    pub const FIRST_LEVEL_COST: f64 = 1000.0;
    pub const LEVEL_COST_GROWTH: f64 = 1.2;

    /// Staggers between per-player effects (milliseconds)
    pub const BALL_ROLL_NOTICE_STAGGER_MS: f64 = 100.0;
    pub const TURN_STAGGER_MS: f64 = 1000.0;
    pub const ROLL_RESULT_DELAY_MS: f64 = 500.0;
    pub const LUCKY_CIRCLE_DELAY_MS: f64 = 250.0;
}
