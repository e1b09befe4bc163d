//! Player registry
//!
//! Holds who is playing and their long-lived stats. Mode-specific entities
//! (projectiles, circles, fishermen, fish) live in the session state instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{point_in_square, Bounds, Placeable};
use crate::consts::*;

/// Stable player identity (survives renumbering)
pub type PlayerId = u32;

/// A player square on the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    /// Top-left corner of the player square
    pub pos: Vec2,
    /// Spendable currency
    pub score: u64,
    /// Lifetime XP (never spent)
    pub total_xp: u64,
    /// Last die result, 0 if none this mode
    pub last_roll: u32,
    /// Ball game: projectile path progress per fast tick
    pub speed: f32,
    /// Farming game: minimum winning roll (1-20)
    pub winning_threshold: u32,
    /// Farming game: bonus circle chance in percent
    pub lucky_chance: u32,
    /// Fishing game: fish needed before a delivery run
    pub max_fish: u32,
}

impl Player {
    fn new(id: PlayerId, number: u32, pos: Vec2) -> Self {
        let color = PLAYER_COLORS[(number.saturating_sub(1) as usize) % PLAYER_COLORS.len()];
        let mut player = Self {
            id,
            name: format!("Player {}", number),
            color: color.to_string(),
            pos,
            score: 0,
            total_xp: 0,
            last_roll: 0,
            speed: 0.0,
            winning_threshold: 0,
            lucky_chance: 0,
            max_fish: 0,
        };
        player.reset_stats();
        player
    }

    /// Center of the player square
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PLAYER_SIZE / 2.0)
    }

    /// Whether a point falls strictly inside the player square
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_square(point, self.pos, PLAYER_SIZE)
    }

    /// Credit currency and lifetime XP together
    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
        self.total_xp += amount;
    }

    /// Spend `cost` if affordable
    pub fn try_spend(&mut self, cost: u64) -> bool {
        if self.score >= cost {
            self.score -= cost;
            true
        } else {
            false
        }
    }

    /// Restore every per-session stat to its default
    pub fn reset_stats(&mut self) {
        self.score = 0;
        self.total_xp = 0;
        self.last_roll = 0;
        self.speed = DEFAULT_PROJECTILE_SPEED;
        self.winning_threshold = DEFAULT_WINNING_THRESHOLD;
        self.lucky_chance = DEFAULT_LUCKY_CHANCE;
        self.max_fish = DEFAULT_MAX_FISH;
    }

    /// Current level and percent progress toward the next
    pub fn level(&self) -> (u32, u32) {
        level_of(self.total_xp)
    }
}

impl Placeable for Player {
    fn center(&self) -> Vec2 {
        Player::center(self)
    }

    fn extent(&self) -> f32 {
        PLAYER_SIZE / 2.0
    }
}

/// Level for a lifetime XP total, plus floor percent progress to the next level
///
/// Level 1 costs 1000 XP to leave; each further level costs 20% more.
pub fn level_of(xp: u64) -> (u32, u32) {
    let mut level = 1;
    let mut next_cost = FIRST_LEVEL_COST;
    let mut remaining = xp as f64;

    while remaining >= next_cost {
        remaining -= next_cost;
        level += 1;
        next_cost *= LEVEL_COST_GROWTH;
    }

    let progress = (remaining / next_cost * 100.0).floor() as u32;
    (level, progress)
}

/// Ordered collection of players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    /// Number used for the next player's name
    next_number: u32,
    next_id: PlayerId,
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            next_number: 1,
            next_id: 1,
        }
    }

    /// Add a player on the canvas edge nearest `point`
    pub fn add_player(&mut self, point: Vec2, bounds: Bounds) -> PlayerId {
        let id = self.next_id;
        self.next_id += 1;
        let pos = bounds.closest_edge_point(point);
        self.players.push(Player::new(id, self.next_number, pos));
        self.next_number += 1;
        id
    }

    /// Remove a player and renumber the rest `Player 1..n` in order
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(index);
        for (i, player) in self.players.iter_mut().enumerate() {
            player.name = format!("Player {}", i + 1);
        }
        self.next_number = self.players.len() as u32 + 1;
        Some(removed)
    }

    /// First player whose square contains `point`
    pub fn player_at(&self, point: Vec2) -> Option<PlayerId> {
        self.players.iter().find(|p| p.contains(point)).map(|p| p.id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Everyone except `id`, in registry order
    pub fn opponents_of(&self, id: PlayerId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.id != id)
            .map(|p| p.id)
            .collect()
    }

    /// Credit a player; unknown ids are ignored
    pub fn add_score(&mut self, id: PlayerId, amount: u64) {
        if let Some(player) = self.get_mut(id) {
            player.add_score(amount);
        }
    }

    pub fn reset_stats(&mut self) {
        for player in &mut self.players {
            player.reset_stats();
        }
    }

    pub fn clear_rolls(&mut self) {
        for player in &mut self.players {
            player.last_roll = 0;
        }
    }

    /// Re-clamp every square after the canvas changes size
    pub fn clamp_to(&mut self, bounds: Bounds) {
        for player in &mut self.players {
            player.pos = bounds.clamp_square(player.pos, PLAYER_SIZE);
        }
    }

    /// Name of the player the next `add_player` call creates
    pub fn next_name(&self) -> String {
        format!("Player {}", self.next_number)
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn test_level_of_fixed_points() {
        assert_eq!(level_of(0), (1, 0));
        assert_eq!(level_of(500), (1, 50));
        assert_eq!(level_of(999), (1, 99));
        assert_eq!(level_of(1000), (2, 0));
        // Level 2 costs 1200
        assert_eq!(level_of(1600), (2, 50));
        assert_eq!(level_of(2200), (3, 0));
    }

    #[test]
    fn test_add_score_moves_score_and_xp() {
        let mut registry = PlayerRegistry::new();
        let id = registry.add_player(Vec2::new(0.0, 300.0), bounds());
        registry.add_score(id, 25);
        let p = registry.get(id).unwrap();
        assert_eq!(p.score, 25);
        assert_eq!(p.total_xp, 25);

        let p = registry.get_mut(id).unwrap();
        assert!(p.try_spend(10));
        assert_eq!(p.score, 15);
        // Spending never touches XP
        assert_eq!(p.total_xp, 25);
        assert!(!p.try_spend(100));
        assert_eq!(p.score, 15);
    }

    #[test]
    fn test_new_player_defaults_and_palette() {
        let mut registry = PlayerRegistry::new();
        let ids: Vec<_> = (0..7)
            .map(|i| registry.add_player(Vec2::new(100.0 * i as f32, 5.0), bounds()))
            .collect();
        let first = registry.get(ids[0]).unwrap();
        assert_eq!(first.name, "Player 1");
        assert_eq!(first.color, PLAYER_COLORS[0]);
        assert_eq!(first.winning_threshold, DEFAULT_WINNING_THRESHOLD);
        assert_eq!(first.max_fish, DEFAULT_MAX_FISH);
        assert_eq!(first.speed, DEFAULT_PROJECTILE_SPEED);
        // Seventh player wraps around the palette
        assert_eq!(registry.get(ids[6]).unwrap().color, PLAYER_COLORS[0]);
    }

    #[test]
    fn test_remove_renumbers_and_resets_counter() {
        let mut registry = PlayerRegistry::new();
        let a = registry.add_player(Vec2::new(10.0, 5.0), bounds());
        let b = registry.add_player(Vec2::new(200.0, 5.0), bounds());
        let c = registry.add_player(Vec2::new(400.0, 5.0), bounds());
        let d = registry.add_player(Vec2::new(600.0, 5.0), bounds());

        let removed = registry.remove_player(b).unwrap();
        assert_eq!(removed.name, "Player 2");

        let names: Vec<_> = registry.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["Player 1", "Player 2", "Player 3"]);
        // Ids are stable across renumbering
        assert_eq!(registry.ids(), vec![a, c, d]);
        assert_eq!(registry.next_name(), "Player 4");

        let e = registry.add_player(Vec2::new(300.0, 595.0), bounds());
        assert_eq!(registry.get(e).unwrap().name, "Player 4");
        assert!(registry.ids().iter().filter(|&&id| id == e).count() == 1);
        assert!(registry.remove_player(999).is_none());
    }

    #[test]
    fn test_player_at_hit_test() {
        let mut registry = PlayerRegistry::new();
        let id = registry.add_player(Vec2::new(400.0, 2.0), bounds());
        assert_eq!(registry.player_at(Vec2::new(420.0, 20.0)), Some(id));
        assert_eq!(registry.player_at(Vec2::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_clamp_to_smaller_canvas() {
        let mut registry = PlayerRegistry::new();
        let id = registry.add_player(Vec2::new(790.0, 590.0), bounds());
        registry.clamp_to(Bounds::new(400.0, 300.0));
        let p = registry.get(id).unwrap();
        assert!(p.pos.x + PLAYER_SIZE <= 400.0);
        assert!(p.pos.y + PLAYER_SIZE <= 300.0);
    }

    proptest! {
        #[test]
        fn prop_level_monotonic(a in 0u64..5_000_000, b in 0u64..5_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (la, pa) = level_of(lo);
            let (lb, pb) = level_of(hi);
            prop_assert!(la < lb || (la == lb && pa <= pb));
            prop_assert!(pa < 100 && pb < 100);
        }

        #[test]
        fn prop_add_score_exact(start in 0u64..1_000_000, n in 0u64..1_000_000) {
            let mut registry = PlayerRegistry::new();
            let id = registry.add_player(Vec2::new(0.0, 0.0), bounds());
            registry.add_score(id, start);
            registry.add_score(id, n);
            let p = registry.get(id).unwrap();
            prop_assert_eq!(p.score, start + n);
            prop_assert_eq!(p.total_xp, start + n);
        }

        #[test]
        fn prop_added_players_stay_in_bounds(x in -100.0f32..900.0, y in -100.0f32..700.0) {
            let mut registry = PlayerRegistry::new();
            let id = registry.add_player(Vec2::new(x, y), bounds());
            let p = registry.get(id).unwrap();
            prop_assert!(p.pos.x >= 0.0 && p.pos.x + PLAYER_SIZE <= 800.0);
            prop_assert!(p.pos.y >= 0.0 && p.pos.y + PLAYER_SIZE <= 600.0);
        }
    }
}
