//! Fishing game: catch fish, then carry them to every opponent for points
//!
//! Each player owns one fisherman cycling through
//! `Fishing -> Delivering -> AwaitingDelivery -> Returning -> Fishing`.
//! A delivery run visits opponents in registry order; at each stop the fish
//! assigned to that opponent swim into its square and score for the owner.

use glam::Vec2;

use super::geometry::{find_open_position, generate_random_path};
use super::players::PlayerId;
use super::state::{Fish, Fisherman, FishermanState, SessionState, Severity};
use super::tick::{Followup, Task, TurnResult};
use crate::consts::*;

/// Give every player a fisherman parked next to its square
pub fn setup(state: &mut SessionState) {
    state.fishermen.clear();
    state.fish.clear();

    for owner in state.players.ids() {
        let Some(player) = state.players.get(owner) else {
            continue;
        };
        let color = player.color.clone();
        let spot = find_open_position(
            player,
            FISHERMAN_RADIUS,
            &state.fishermen,
            state.bounds,
            &mut state.dice,
        );
        match spot {
            Some(pos) => {
                let id = state.next_entity_id();
                state.fishermen.push(Fisherman::new(id, owner, &color, pos));
            }
            None => {
                let name = state.player_name(owner);
                state.notify(format!("Fisherman for {} is out of space!", name), Severity::Error);
            }
        }
    }
}

fn fisherman_of(state: &SessionState, owner: PlayerId) -> Option<&Fisherman> {
    state.fishermen.iter().find(|f| f.owner == owner)
}

fn fisherman_of_mut(state: &mut SessionState, owner: PlayerId) -> Option<&mut Fisherman> {
    state.fishermen.iter_mut().find(|f| f.owner == owner)
}

fn is_fishing(state: &SessionState, owner: PlayerId) -> bool {
    fisherman_of(state, owner).is_some_and(|f| f.state == FishermanState::Fishing)
}

/// Schedule a roll for every player whose fisherman is at home
pub fn run_turn(state: &mut SessionState) -> TurnResult {
    let state: &SessionState = state;
    let followups = state
        .players
        .ids()
        .into_iter()
        .enumerate()
        .filter(|(_, id)| is_fishing(state, *id))
        .map(|(index, id)| Followup::new(index as f64 * TURN_STAGGER_MS, Task::FishingRoll(id)))
        .collect();
    TurnResult::Continue(followups)
}

/// One player's fishing roll; a bite lands after a short delay
pub fn roll(state: &mut SessionState, owner: PlayerId) -> Vec<Followup> {
    if !is_fishing(state, owner) {
        return Vec::new();
    }
    let roll = state.dice.d20();
    let Some(player) = state.players.get_mut(owner) else {
        return Vec::new();
    };
    player.last_roll = roll;
    let name = player.name.clone();
    state.notify(format!("{} rolled a {}.", name, roll), Severity::Info);

    if roll >= FISHING_GAME_ROLL_THRESHOLD {
        vec![Followup::new(ROLL_RESULT_DELAY_MS, Task::FishCaught(owner))]
    } else {
        Vec::new()
    }
}

/// Land a fish; a full catch sends the fisherman off on a delivery run
pub fn catch_fish(state: &mut SessionState, owner: PlayerId) {
    // The fisherman may have left on a run since the roll
    if !is_fishing(state, owner) {
        return;
    }
    add_fish(state, owner);

    let max_fish = state.players.get(owner).map_or(DEFAULT_MAX_FISH, |p| p.max_fish);
    let Some(fisherman) = fisherman_of_mut(state, owner) else {
        return;
    };
    fisherman.fish_count += 1;
    let count = fisherman.fish_count;

    let name = state.player_name(owner);
    state.notify(
        format!("{} caught a fish! ({}/{})", name, count, max_fish),
        Severity::Success,
    );

    if count >= max_fish {
        state.notify(
            format!("{}'s fisherman is preparing to deliver fish!", name),
            Severity::Info,
        );
        start_delivery(state, owner);
    }
}

/// Spawn a fish next to `owner`'s fisherman, clear of its other fish
pub fn add_fish(state: &mut SessionState, owner: PlayerId) -> bool {
    let Some(fisherman) = state.fishermen.iter().find(|f| f.owner == owner) else {
        return false;
    };
    let color = fisherman.color.clone();
    let spot = {
        let own_fish: Vec<&Fish> = state.fish.iter().filter(|f| f.owner == owner).collect();
        find_open_position(fisherman, FISH_RADIUS, &own_fish, state.bounds, &mut state.dice)
    };

    match spot {
        Some(pos) => {
            let id = state.next_entity_id();
            state.fish.push(Fish {
                id,
                owner,
                color,
                pos,
                radius: FISH_RADIUS,
                target: None,
            });
            true
        }
        None => {
            let name = state.player_name(owner);
            state.notify(format!("Fisherman for {} is out of space!", name), Severity::Error);
            false
        }
    }
}

/// Split the catch between opponents and head for the first one
pub fn start_delivery(state: &mut SessionState, owner: PlayerId) {
    let opponents = state.players.opponents_of(owner);
    let name = state.player_name(owner);

    if opponents.is_empty() {
        state.notify(
            format!("No one for {} to deliver to! Fish reset.", name),
            Severity::Info,
        );
        state.fish.retain(|f| f.owner != owner);
        if let Some(fisherman) = fisherman_of_mut(state, owner) {
            fisherman.reset_delivery();
        }
        return;
    }

    for (i, fish) in state
        .fish
        .iter_mut()
        .filter(|f| f.owner == owner && f.target.is_none())
        .enumerate()
    {
        fish.target = Some(opponents[i % opponents.len()]);
    }

    let Some(first) = state.players.get(opponents[0]).map(|p| p.center()) else {
        return;
    };
    let bounds = state.bounds;
    let Some(fisherman) = state.fishermen.iter_mut().find(|f| f.owner == owner) else {
        return;
    };
    fisherman.path = Some(generate_random_path(fisherman.pos, first, bounds, &mut state.dice));
    fisherman.progress = 0.0;
    fisherman.delivery_targets = opponents;
    fisherman.current_target = Some(0);
    fisherman.state = FishermanState::Delivering;

    state.notify(format!("{}'s fisherman begins its delivery run!", name), Severity::Success);
}

/// Advance fishermen along their runs, then move and deliver fish
pub fn fast_tick(state: &mut SessionState) {
    move_fishermen(state);
    move_fish(state);
}

fn move_fishermen(state: &mut SessionState) {
    for i in 0..state.fishermen.len() {
        let owner = state.fishermen[i].owner;
        match state.fishermen[i].state {
            FishermanState::Fishing => {}
            FishermanState::Delivering | FishermanState::Returning => {
                let fisherman = &mut state.fishermen[i];
                let Some(path) = fisherman.path else {
                    // Nothing to follow; abandon the run
                    fisherman.reset_delivery();
                    continue;
                };
                fisherman.progress += FISHERMAN_SPEED;
                fisherman.pos = path.sample(fisherman.progress.min(1.0));
                if fisherman.progress >= 1.0 {
                    arrive(state, i, owner);
                }
            }
            FishermanState::AwaitingDelivery => {
                let target = state.fishermen[i].current_target_id();
                let remaining = target.is_some_and(|t| {
                    state
                        .fish
                        .iter()
                        .any(|f| f.owner == owner && f.target == Some(t))
                });
                if !remaining {
                    let bounds = state.bounds;
                    let fisherman = &mut state.fishermen[i];
                    fisherman.path = Some(generate_random_path(
                        fisherman.pos,
                        fisherman.home,
                        bounds,
                        &mut state.dice,
                    ));
                    fisherman.progress = 0.0;
                    fisherman.state = FishermanState::Returning;
                    let name = state.player_name(owner);
                    state.notify(format!("{}'s fisherman is returning home.", name), Severity::Info);
                }
            }
        }
    }
}

/// Fisherman `i` reached the end of its current path
fn arrive(state: &mut SessionState, i: usize, owner: PlayerId) {
    match state.fishermen[i].state {
        FishermanState::Delivering => {
            state.fishermen[i].state = FishermanState::AwaitingDelivery;
            if let Some(target) = state.fishermen[i].current_target_id() {
                let target_name = state.player_name(target);
                state.notify(
                    format!("Fisherman has reached {}. Fish are incoming!", target_name),
                    Severity::Info,
                );
            }
        }
        FishermanState::Returning => {
            let next = state.fishermen[i].current_target.map_or(0, |c| c + 1);
            let next_target = state.fishermen[i].delivery_targets.get(next).copied();
            let next_center = next_target.and_then(|t| state.players.get(t)).map(|p| p.center());

            match next_center {
                Some(end) => {
                    let bounds = state.bounds;
                    let fisherman = &mut state.fishermen[i];
                    fisherman.current_target = Some(next);
                    fisherman.path =
                        Some(generate_random_path(fisherman.pos, end, bounds, &mut state.dice));
                    fisherman.progress = 0.0;
                    fisherman.state = FishermanState::Delivering;
                }
                None => {
                    state.fishermen[i].reset_delivery();
                    let name = state.player_name(owner);
                    state.notify(
                        format!("{}'s fisherman has completed its run!", name),
                        Severity::Success,
                    );
                }
            }
        }
        _ => {}
    }
}

/// Where a fish assigned to the current stop should swim this frame
struct Lure {
    target_player: PlayerId,
    /// Point to move toward and the fraction of the gap covered per frame
    goal: Vec2,
    factor: f32,
    /// Hold still when this close (only while following a moving fisherman)
    hold_within: Option<f32>,
}

fn lure_for(state: &SessionState, fish: &Fish) -> Option<Lure> {
    let target = fish.target?;
    let fisherman = fisherman_of(state, fish.owner)?;
    // Only fish bound for the current stop move
    if fisherman.current_target_id()? != target {
        return None;
    }

    if fisherman.state == FishermanState::AwaitingDelivery {
        let goal = state.players.get(target)?.center();
        Some(Lure {
            target_player: target,
            goal,
            factor: FISH_HOMING_FACTOR,
            hold_within: None,
        })
    } else {
        Some(Lure {
            target_player: target,
            goal: fisherman.pos,
            factor: FISH_FOLLOW_FACTOR,
            hold_within: Some(fisherman.radius * 2.5),
        })
    }
}

fn move_fish(state: &mut SessionState) {
    let mut delivered: Vec<(u32, PlayerId)> = Vec::new();

    for i in 0..state.fish.len() {
        // Fish whose fisherman or stop is gone are left alone this frame
        let Some(lure) = lure_for(state, &state.fish[i]) else {
            continue;
        };

        let fish = &mut state.fish[i];
        let offset = lure.goal - fish.pos;
        let distance = offset.length();
        let holding = lure.hold_within.is_some_and(|d| distance < d);
        if distance > 1.0 && !holding {
            fish.pos += offset * lure.factor;
        }

        let landed = state
            .players
            .get(lure.target_player)
            .is_some_and(|p| p.contains(state.fish[i].pos));
        if landed {
            delivered.push((state.fish[i].id, state.fish[i].owner));
        }
    }

    for (fish_id, owner) in &delivered {
        state.players.add_score(*owner, FISHING_GAME_FISH_SCORE);
        let name = state.player_name(*owner);
        state.notify(
            format!("{} scored! +{} points.", name, FISHING_GAME_FISH_SCORE),
            Severity::Success,
        );
        log::trace!("Fish {} delivered", fish_id);
    }
    if !delivered.is_empty() {
        state.fish.retain(|f| !delivered.iter().any(|(id, _)| *id == f.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Bounds;

    fn pond(players: usize) -> SessionState {
        let mut state = SessionState::new(Bounds::new(800.0, 600.0), 77, 2000.0);
        let spots = [
            Vec2::new(400.0, 0.0),
            Vec2::new(400.0, 600.0),
            Vec2::new(0.0, 300.0),
        ];
        for spot in spots.iter().take(players) {
            state.players.add_player(*spot, state.bounds);
        }
        setup(&mut state);
        state
    }

    fn fisherman(state: &SessionState, owner: PlayerId) -> &Fisherman {
        fisherman_of(state, owner).unwrap()
    }

    /// Run fast ticks until `done` or the budget runs out
    fn tick_until(state: &mut SessionState, budget: usize, done: impl Fn(&SessionState) -> bool) {
        for _ in 0..budget {
            if done(state) {
                return;
            }
            fast_tick(state);
        }
        assert!(done(state), "condition not reached within {} ticks", budget);
    }

    #[test]
    fn test_setup_one_fisherman_per_player() {
        let state = pond(3);
        assert_eq!(state.fishermen.len(), 3);
        for f in &state.fishermen {
            assert_eq!(f.state, FishermanState::Fishing);
            assert_eq!(f.home, f.pos);
            assert!(state.bounds.contains_circle(f.pos, f.radius));
        }
    }

    #[test]
    fn test_roll_threshold() {
        let mut state = pond(2);
        let a = state.players.ids()[0];
        state.dice.rig([14, 15]);
        assert!(roll(&mut state, a).is_empty());
        let followups = roll(&mut state, a);
        assert!(matches!(
            followups.as_slice(),
            [Followup { task: Task::FishCaught(id), .. }] if *id == a
        ));
    }

    #[test]
    fn test_reaching_max_fish_starts_delivery() {
        let mut state = pond(3);
        let a = state.players.ids()[0];
        state.players.get_mut(a).unwrap().max_fish = 4;

        for _ in 0..3 {
            catch_fish(&mut state, a);
        }
        assert_eq!(fisherman(&state, a).state, FishermanState::Fishing);
        assert_eq!(fisherman(&state, a).fish_count, 3);

        catch_fish(&mut state, a);
        let f = fisherman(&state, a);
        assert_eq!(f.state, FishermanState::Delivering);
        assert_eq!(f.current_target, Some(0));
        assert_eq!(f.delivery_targets, state.players.opponents_of(a));

        // Four fish split round-robin over two opponents
        let targets: Vec<_> = state.fish.iter().map(|f| f.target).collect();
        let [b, c] = [f.delivery_targets[0], f.delivery_targets[1]];
        assert_eq!(targets, vec![Some(b), Some(c), Some(b), Some(c)]);

        // Busy fishermen do not roll or catch
        assert!(roll(&mut state, a).is_empty());
        catch_fish(&mut state, a);
        assert_eq!(state.fish.len(), 4);
    }

    #[test]
    fn test_delivery_without_opponents_resets() {
        let mut state = pond(1);
        let a = state.players.ids()[0];
        state.players.get_mut(a).unwrap().max_fish = 2;
        catch_fish(&mut state, a);
        catch_fish(&mut state, a);

        let f = fisherman(&state, a);
        assert_eq!(f.state, FishermanState::Fishing);
        assert_eq!(f.fish_count, 0);
        assert!(state.fish.iter().all(|f| f.owner != a));
    }

    #[test]
    fn test_full_delivery_run_scores_every_fish() {
        let mut state = pond(3);
        let a = state.players.ids()[0];
        state.players.get_mut(a).unwrap().max_fish = 4;
        for _ in 0..4 {
            catch_fish(&mut state, a);
        }

        // First stop: travel, wait for the two fish, head home
        tick_until(&mut state, 5000, |s| {
            fisherman(s, a).state == FishermanState::AwaitingDelivery
        });
        tick_until(&mut state, 5000, |s| {
            fisherman(s, a).state == FishermanState::Returning
        });
        assert_eq!(state.fish.len(), 2);
        assert_eq!(state.players.get(a).unwrap().score, 2 * FISHING_GAME_FISH_SCORE);

        // Second stop, then the run completes
        tick_until(&mut state, 5000, |s| {
            fisherman(s, a).current_target == Some(1)
        });
        tick_until(&mut state, 20000, |s| {
            fisherman(s, a).state == FishermanState::Fishing
        });

        let f = fisherman(&state, a);
        assert_eq!(f.fish_count, 0);
        assert!(f.delivery_targets.is_empty());
        assert!(state.fish.is_empty());
        let owner = state.players.get(a).unwrap();
        assert_eq!(owner.score, 4 * FISHING_GAME_FISH_SCORE);
        assert_eq!(owner.total_xp, 4 * FISHING_GAME_FISH_SCORE);
    }

    #[test]
    fn test_orphaned_fish_are_ignored() {
        let mut state = pond(2);
        let a = state.players.ids()[0];
        let b = state.players.ids()[1];
        let id = state.next_entity_id();
        let pos = Vec2::new(300.0, 300.0);
        state.fish.push(Fish {
            id,
            owner: a,
            color: "#fff".into(),
            pos,
            radius: FISH_RADIUS,
            target: Some(b),
        });
        // Fisherman is not on a run, so the fish has no valid stop
        fast_tick(&mut state);
        assert_eq!(state.fish[0].pos, pos);

        // No fisherman at all
        state.fishermen.clear();
        fast_tick(&mut state);
        assert_eq!(state.fish[0].pos, pos);
    }
}
