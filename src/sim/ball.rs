//! Ball game: dice-driven projectile volleys between players
//!
//! Each turn every player rolls. High rolls launch one large projectile at a
//! random opponent; anything else spreads that many small projectiles over
//! all opponents. Projectiles are queued and released one per fast tick.

use super::collision::resolve_projectile_collisions;
use super::geometry::generate_random_path;
use super::players::PlayerId;
use super::state::{Notice, Projectile, SessionState, Severity};
use super::tick::{Followup, Task, TurnResult};
use crate::consts::*;

/// Split `roll` small projectiles round-robin over `opponents` slots
pub fn round_robin(roll: u32, opponents: usize) -> Vec<u32> {
    let mut assignments = vec![0; opponents];
    if opponents == 0 {
        return assignments;
    }
    for i in 0..roll as usize {
        assignments[i % opponents] += 1;
    }
    assignments
}

/// Roll for every player and queue the resulting volleys
pub fn run_turn(state: &mut SessionState) -> TurnResult {
    if state.players.len() < 2 {
        return TurnResult::NotEnoughPlayers;
    }

    let mut followups = Vec::new();
    for (index, id) in state.players.ids().into_iter().enumerate() {
        let roll = state.dice.d20();
        let Some(player) = state.players.get_mut(id) else {
            continue;
        };
        player.last_roll = roll;
        let name = player.name.clone();

        followups.push(Followup::new(
            index as f64 * BALL_ROLL_NOTICE_STAGGER_MS,
            Task::Announce(Notice::new(format!("{} rolls a {}!", name, roll), Severity::Info)),
        ));

        fire_volley(state, id, roll);
    }

    log::debug!("Ball turn queued {} projectiles", state.projectile_queue.len());
    TurnResult::Continue(followups)
}

/// Queue the projectiles one player's roll produces
pub fn fire_volley(state: &mut SessionState, source: PlayerId, roll: u32) {
    let opponents = state.players.opponents_of(source);
    if opponents.is_empty() {
        return;
    }
    let Some(player) = state.players.get(source) else {
        return;
    };
    let start = player.center();
    let speed = player.speed;
    let color = player.color.clone();

    if roll >= BALL_GAME_ROLL_THRESHOLD {
        let target = opponents[state.dice.pick(opponents.len())];
        let Some(end) = state.players.get(target).map(|p| p.center()) else {
            return;
        };
        let path = generate_random_path(start, end, state.bounds, &mut state.dice);
        let id = state.next_entity_id();
        state
            .projectile_queue
            .push_back(Projectile::large(id, source, &color, path, speed));
    } else {
        let assignments = round_robin(roll, opponents.len());
        for (target, count) in opponents.into_iter().zip(assignments) {
            let Some(end) = state.players.get(target).map(|p| p.center()) else {
                continue;
            };
            // One curve per opponent; the whole stream follows it
            let path = generate_random_path(start, end, state.bounds, &mut state.dice);
            for _ in 0..count {
                let id = state.next_entity_id();
                state
                    .projectile_queue
                    .push_back(Projectile::small(id, source, &color, path, speed));
            }
        }
    }
}

/// Release one queued projectile, advance all of them, then resolve hits
pub fn fast_tick(state: &mut SessionState) {
    if let Some(projectile) = state.projectile_queue.pop_front() {
        state.projectiles.push(projectile);
    }

    for p in &mut state.projectiles {
        p.progress += p.speed;
        p.pos = p.path.sample(p.progress);
    }
    // Reached the end of the path without hitting anything
    state.projectiles.retain(|p| p.progress < 1.0);

    resolve_projectile_collisions(state);
}
