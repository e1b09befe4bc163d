//! Shop: spend score on per-mode upgrades
//!
//! Every upgrade belongs to one mode and can only be bought while that mode
//! is running. Purchases target every player or a single one; players who
//! cannot afford an upgrade are skipped, never charged.

use serde::{Deserialize, Serialize};

use super::players::{Player, PlayerId};
use super::state::{GameMode, SessionState, Severity};
use crate::consts::*;

/// The five upgrades on sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Faster projectiles
    SpeedUp,
    /// Slower projectiles (floor-clamped)
    SlowDown,
    /// Lower the farming win cutoff by one
    WinningThreshold,
    /// One more percent of lucky bonus circles
    LuckyChance,
    /// One more fish per delivery run
    Inventory,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::SpeedUp,
        UpgradeKind::SlowDown,
        UpgradeKind::WinningThreshold,
        UpgradeKind::LuckyChance,
        UpgradeKind::Inventory,
    ];

    pub fn cost(self) -> u64 {
        match self {
            UpgradeKind::SpeedUp => SHOP_SPEED_UPGRADE_COST,
            UpgradeKind::SlowDown => SHOP_SLOW_UPGRADE_COST,
            UpgradeKind::WinningThreshold => SHOP_WINNING_NUMBER_UPGRADE_COST,
            UpgradeKind::LuckyChance => SHOP_LUCKY_CHANCE_UPGRADE_COST,
            UpgradeKind::Inventory => SHOP_INVENTORY_UPGRADE_COST,
        }
    }

    /// Mode the upgrade can be bought in
    pub fn mode(self) -> GameMode {
        match self {
            UpgradeKind::SpeedUp | UpgradeKind::SlowDown => GameMode::Ball,
            UpgradeKind::WinningThreshold | UpgradeKind::LuckyChance => GameMode::Farming,
            UpgradeKind::Inventory => GameMode::Fishing,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speed" | "speed_up" | "speedup" => Some(UpgradeKind::SpeedUp),
            "slow" | "slow_down" | "slowdown" => Some(UpgradeKind::SlowDown),
            "winning" | "winning_threshold" | "winning_number" => {
                Some(UpgradeKind::WinningThreshold)
            }
            "lucky" | "lucky_chance" => Some(UpgradeKind::LuckyChance),
            "inventory" | "max_fish" => Some(UpgradeKind::Inventory),
            _ => None,
        }
    }

    /// Upgrades the shop shows right now
    pub fn available(running: bool, mode: GameMode) -> Vec<UpgradeKind> {
        if !running {
            return Vec::new();
        }
        Self::ALL.into_iter().filter(|k| k.mode() == mode).collect()
    }
}

/// Who a purchase applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpgradeTarget {
    #[default]
    All,
    Player(PlayerId),
}

/// Why a purchase was refused outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The upgrade's mode is not the running one (or nothing is running)
    WrongMode { needed: GameMode },
    UnknownPlayer(PlayerId),
}

impl std::fmt::Display for ShopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongMode { needed } => write!(f, "This upgrade is for the {}!", needed.as_str()),
            Self::UnknownPlayer(id) => write!(f, "No player with id {}", id),
        }
    }
}

impl std::error::Error for ShopError {}

/// Per-player result of an attempted upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeResult {
    Applied,
    CannotAfford,
    /// Stat already at its limit; nothing charged
    Maxed,
}

/// Outcome of a purchase that passed the mode gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub results: Vec<(PlayerId, UpgradeResult)>,
}

impl PurchaseOutcome {
    /// At least one player received the upgrade
    pub fn any_applied(&self) -> bool {
        self.results.iter().any(|(_, r)| *r == UpgradeResult::Applied)
    }
}

/// Charge and apply one upgrade to one player
pub fn apply_upgrade(player: &mut Player, kind: UpgradeKind) -> UpgradeResult {
    let cost = kind.cost();
    if player.score < cost {
        return UpgradeResult::CannotAfford;
    }
    if kind == UpgradeKind::WinningThreshold && player.winning_threshold <= 1 {
        return UpgradeResult::Maxed;
    }
    player.score -= cost;

    match kind {
        UpgradeKind::SpeedUp => player.speed += SHOP_SPEED_UPGRADE_BOOST,
        UpgradeKind::SlowDown => {
            player.speed = (player.speed - SHOP_SLOW_UPGRADE_SLOW).max(MIN_PROJECTILE_SPEED)
        }
        UpgradeKind::WinningThreshold => player.winning_threshold -= 1,
        UpgradeKind::LuckyChance => player.lucky_chance += 1,
        UpgradeKind::Inventory => player.max_fish += 1,
    }
    UpgradeResult::Applied
}

/// Success message for a single-player purchase
fn applied_message(player: &Player, kind: UpgradeKind) -> String {
    match kind {
        UpgradeKind::SpeedUp => format!("{} speed up!", player.name),
        UpgradeKind::SlowDown => format!("{} slowed!", player.name),
        UpgradeKind::WinningThreshold => {
            format!("{}'s wins: {}-20!", player.name, player.winning_threshold)
        }
        UpgradeKind::LuckyChance => format!("{}'s Lucky Chance: {}%!", player.name, player.lucky_chance),
        UpgradeKind::Inventory => format!("{}'s inventory is now {}!", player.name, player.max_fish),
    }
}

fn applied_all_message(kind: UpgradeKind) -> &'static str {
    match kind {
        UpgradeKind::SpeedUp => "Speed upgraded!",
        UpgradeKind::SlowDown => "Slow applied!",
        UpgradeKind::WinningThreshold => "Upgraded for affordable players!",
        UpgradeKind::LuckyChance => "Lucky Chance up!",
        UpgradeKind::Inventory => "Inventory upgraded for affordable players!",
    }
}

/// Buy `kind` for `target`, raising the matching notices
pub fn purchase(
    state: &mut SessionState,
    kind: UpgradeKind,
    target: UpgradeTarget,
) -> Result<PurchaseOutcome, ShopError> {
    if !state.running || state.mode != kind.mode() {
        let err = ShopError::WrongMode { needed: kind.mode() };
        state.notify(err.to_string(), Severity::Error);
        return Err(err);
    }

    match target {
        UpgradeTarget::All => {
            let mut results = Vec::new();
            let mut maxed = Vec::new();
            for player in state.players.iter_mut() {
                let result = apply_upgrade(player, kind);
                if result == UpgradeResult::Maxed {
                    maxed.push(player.name.clone());
                }
                results.push((player.id, result));
            }
            for name in maxed {
                state.notify(format!("{} maxed!", name), Severity::Info);
            }

            let outcome = PurchaseOutcome { results };
            if outcome.any_applied() {
                state.notify(applied_all_message(kind), Severity::Success);
            } else {
                state.notify("None could afford.", Severity::Error);
            }
            Ok(outcome)
        }
        UpgradeTarget::Player(id) => {
            let Some(player) = state.players.get_mut(id) else {
                let err = ShopError::UnknownPlayer(id);
                state.notify(err.to_string(), Severity::Error);
                return Err(err);
            };
            let result = apply_upgrade(player, kind);
            let (text, severity) = match result {
                UpgradeResult::Applied => (applied_message(player, kind), Severity::Success),
                UpgradeResult::CannotAfford => {
                    (format!("{} can't afford that.", player.name), Severity::Error)
                }
                UpgradeResult::Maxed => (format!("{} maxed!", player.name), Severity::Info),
            };
            state.notify(text, severity);
            Ok(PurchaseOutcome {
                results: vec![(id, result)],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Bounds;
    use glam::Vec2;

    fn shop(mode: GameMode) -> (SessionState, PlayerId, PlayerId) {
        let mut state = SessionState::new(Bounds::new(800.0, 600.0), 2, 2000.0);
        let a = state.players.add_player(Vec2::new(400.0, 0.0), state.bounds);
        let b = state.players.add_player(Vec2::new(400.0, 600.0), state.bounds);
        state.running = true;
        state.mode = mode;
        (state, a, b)
    }

    #[test]
    fn test_wrong_mode_is_rejected() {
        let (mut state, a, _) = shop(GameMode::Ball);
        state.players.add_score(a, 5000);
        let err = purchase(&mut state, UpgradeKind::Inventory, UpgradeTarget::All).unwrap_err();
        assert_eq!(err, ShopError::WrongMode { needed: GameMode::Fishing });
        assert_eq!(state.players.get(a).unwrap().score, 5000);

        state.running = false;
        state.mode = GameMode::Ball;
        assert!(purchase(&mut state, UpgradeKind::SpeedUp, UpgradeTarget::All).is_err());
    }

    #[test]
    fn test_all_target_charges_only_affordable_players() {
        let (mut state, a, b) = shop(GameMode::Ball);
        state.players.add_score(a, 15);
        let outcome = purchase(&mut state, UpgradeKind::SpeedUp, UpgradeTarget::All).unwrap();
        assert!(outcome.any_applied());
        assert_eq!(
            outcome.results,
            vec![(a, UpgradeResult::Applied), (b, UpgradeResult::CannotAfford)]
        );
        let pa = state.players.get(a).unwrap();
        assert_eq!(pa.score, 5);
        assert!((pa.speed - (DEFAULT_PROJECTILE_SPEED + SHOP_SPEED_UPGRADE_BOOST)).abs() < 1e-9);
        // XP is never spent
        assert_eq!(pa.total_xp, 15);
        assert_eq!(state.players.get(b).unwrap().speed, DEFAULT_PROJECTILE_SPEED);
    }

    #[test]
    fn test_none_afford_reports_error() {
        let (mut state, _, _) = shop(GameMode::Fishing);
        let outcome = purchase(&mut state, UpgradeKind::Inventory, UpgradeTarget::All).unwrap();
        assert!(!outcome.any_applied());
        let last = state.notices.drain().pop().unwrap();
        assert_eq!(last.severity, Severity::Error);
    }

    #[test]
    fn test_slow_down_is_floor_clamped() {
        let (mut state, a, _) = shop(GameMode::Ball);
        state.players.add_score(a, 100);
        for _ in 0..10 {
            purchase(&mut state, UpgradeKind::SlowDown, UpgradeTarget::Player(a)).unwrap();
        }
        let p = state.players.get(a).unwrap();
        assert_eq!(p.speed, MIN_PROJECTILE_SPEED);
        assert_eq!(p.score, 0);
    }

    #[test]
    fn test_winning_threshold_stops_at_one() {
        let (mut state, a, _) = shop(GameMode::Farming);
        let player = state.players.get_mut(a).unwrap();
        player.winning_threshold = 2;
        player.add_score(5000);

        let first = purchase(&mut state, UpgradeKind::WinningThreshold, UpgradeTarget::Player(a))
            .unwrap();
        assert_eq!(first.results, vec![(a, UpgradeResult::Applied)]);
        let second = purchase(&mut state, UpgradeKind::WinningThreshold, UpgradeTarget::Player(a))
            .unwrap();
        assert_eq!(second.results, vec![(a, UpgradeResult::Maxed)]);

        let p = state.players.get(a).unwrap();
        assert_eq!(p.winning_threshold, 1);
        // Maxed purchase is not charged
        assert_eq!(p.score, 4000);
        let last = state.notices.drain().pop().unwrap();
        assert_eq!(last.severity, Severity::Info);
    }

    #[test]
    fn test_lucky_and_inventory_upgrades() {
        let (mut state, a, _) = shop(GameMode::Farming);
        state.players.add_score(a, 200);
        purchase(&mut state, UpgradeKind::LuckyChance, UpgradeTarget::Player(a)).unwrap();
        purchase(&mut state, UpgradeKind::LuckyChance, UpgradeTarget::Player(a)).unwrap();
        assert_eq!(state.players.get(a).unwrap().lucky_chance, 2);

        state.mode = GameMode::Fishing;
        state.players.add_score(a, 10);
        purchase(&mut state, UpgradeKind::Inventory, UpgradeTarget::Player(a)).unwrap();
        assert_eq!(state.players.get(a).unwrap().max_fish, DEFAULT_MAX_FISH + 1);
    }

    #[test]
    fn test_single_player_cannot_afford() {
        let (mut state, a, _) = shop(GameMode::Fishing);
        let outcome =
            purchase(&mut state, UpgradeKind::Inventory, UpgradeTarget::Player(a)).unwrap();
        assert_eq!(outcome.results, vec![(a, UpgradeResult::CannotAfford)]);
        assert_eq!(state.players.get(a).unwrap().max_fish, DEFAULT_MAX_FISH);
    }

    #[test]
    fn test_unknown_player() {
        let (mut state, _, _) = shop(GameMode::Ball);
        assert_eq!(
            purchase(&mut state, UpgradeKind::SpeedUp, UpgradeTarget::Player(404)),
            Err(ShopError::UnknownPlayer(404))
        );
    }

    #[test]
    fn test_available_by_mode() {
        assert_eq!(
            UpgradeKind::available(true, GameMode::Farming),
            vec![UpgradeKind::WinningThreshold, UpgradeKind::LuckyChance]
        );
        assert_eq!(UpgradeKind::available(true, GameMode::Fishing), vec![UpgradeKind::Inventory]);
        assert!(UpgradeKind::available(false, GameMode::Ball).is_empty());
        assert_eq!(UpgradeKind::from_str("Lucky"), Some(UpgradeKind::LuckyChance));
        assert_eq!(UpgradeKind::from_str("nope"), None);
    }
}
