//! Farming game: roll high enough to grow a circle next to your square
//!
//! Rolls are staggered per player so their notices do not overlap. A win is
//! paid out after a short delay, with a chance of a free bonus circle.

use super::geometry::find_open_position;
use super::players::PlayerId;
use super::state::{FarmedCircle, SessionState, Severity};
use super::tick::{Followup, Task, TurnResult};
use crate::consts::*;

/// Seed the field with one circle per player
pub fn setup(state: &mut SessionState) {
    state.farmed_circles.clear();
    for id in state.players.ids() {
        add_farmed_circle(state, id);
    }
}

/// Place one circle next to `owner`; returns whether there was room
pub fn add_farmed_circle(state: &mut SessionState, owner: PlayerId) -> bool {
    let Some(player) = state.players.get(owner) else {
        return false;
    };
    let color = player.color.clone();
    let spot = find_open_position(
        player,
        FARMED_CIRCLE_RADIUS,
        &state.farmed_circles,
        state.bounds,
        &mut state.dice,
    );

    match spot {
        Some(pos) => {
            state.farmed_circles.push(FarmedCircle {
                pos,
                radius: FARMED_CIRCLE_RADIUS,
                color,
                owner,
            });
            true
        }
        None => {
            let name = state.player_name(owner);
            state.notify(format!("{} is out of space!", name), Severity::Error);
            false
        }
    }
}

/// Schedule each player's roll, `index × 1s` apart
pub fn run_turn(state: &mut SessionState) -> TurnResult {
    let followups = state
        .players
        .ids()
        .into_iter()
        .enumerate()
        .map(|(index, id)| Followup::new(index as f64 * TURN_STAGGER_MS, Task::FarmingRoll(id)))
        .collect();
    TurnResult::Continue(followups)
}

/// One player's roll; a win pays out after a short delay
pub fn roll(state: &mut SessionState, id: PlayerId) -> Vec<Followup> {
    let roll = state.dice.d20();
    let Some(player) = state.players.get_mut(id) else {
        return Vec::new();
    };
    player.last_roll = roll;
    let threshold = player.winning_threshold;
    let name = player.name.clone();
    state.notify(format!("{} rolled a {}.", name, roll), Severity::Info);

    if roll >= threshold {
        vec![Followup::new(ROLL_RESULT_DELAY_MS, Task::FarmingWin(id))]
    } else {
        Vec::new()
    }
}

/// Pay out a win, then check for a lucky bonus circle
pub fn win(state: &mut SessionState, id: PlayerId) -> Vec<Followup> {
    let Some(player) = state.players.get_mut(id) else {
        return Vec::new();
    };
    player.add_score(FARMING_GAME_WIN_SCORE);
    let lucky_chance = player.lucky_chance as f32;
    let name = player.name.clone();

    add_farmed_circle(state, id);
    state.notify(
        format!("{} wins a circle! +{} points.", name, FARMING_GAME_WIN_SCORE),
        Severity::Success,
    );

    if state.dice.percent() < lucky_chance {
        vec![Followup::new(LUCKY_CIRCLE_DELAY_MS, Task::LuckyCircle(id))]
    } else {
        Vec::new()
    }
}

/// Place the bonus circle from a lucky draw (no score)
pub fn lucky_circle(state: &mut SessionState, id: PlayerId) {
    if add_farmed_circle(state, id) {
        let name = state.player_name(id);
        state.notify(format!("{} gets a lucky extra circle!", name), Severity::Success);
    }
}
