//! Ball-game collision resolution
//!
//! Projectiles hit players by landing inside their square, and hit each other
//! by circle overlap. Damage between projectiles is accumulated over the
//! whole frame and applied once at the end.

use std::collections::{BTreeMap, HashSet};

use super::geometry::circles_overlap;
use super::state::{Projectile, SessionState};
use crate::consts::{LARGE_CLASH_DAMAGE, SMALL_HIT_DAMAGE};

/// What happens when two projectiles from different players overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashOutcome {
    /// The small one (first or second) is destroyed; the large one takes a hit
    SmallAbsorbed { small_is_first: bool },
    /// Two small projectiles annihilate
    BothDestroyed,
    /// Two large projectiles grind each other down
    LargeClash,
}

/// Classify an overlap by projectile size
pub fn clash(a: &Projectile, b: &Projectile) -> ClashOutcome {
    match (a.is_large, b.is_large) {
        (true, false) => ClashOutcome::SmallAbsorbed {
            small_is_first: false,
        },
        (false, true) => ClashOutcome::SmallAbsorbed {
            small_is_first: true,
        },
        (false, false) => ClashOutcome::BothDestroyed,
        (true, true) => ClashOutcome::LargeClash,
    }
}

/// Resolve player hits and projectile-projectile clashes for this frame
pub fn resolve_projectile_collisions(state: &mut SessionState) {
    let mut removed: HashSet<u32> = HashSet::new();
    // Ordered so damage application is deterministic
    let mut damage: BTreeMap<u32, i32> = BTreeMap::new();

    // --- Projectile vs player ---
    let mut awards = Vec::new();
    for p in &state.projectiles {
        let hit = state
            .players
            .iter()
            .any(|pl| pl.id != p.source && pl.contains(p.pos));
        if hit {
            removed.insert(p.id);
            awards.push((p.source, p.score_value));
        }
    }
    for (source, amount) in awards {
        state.players.add_score(source, amount);
    }

    // --- Projectile vs projectile ---
    let projectiles = &state.projectiles;
    for i in 0..projectiles.len() {
        for j in (i + 1)..projectiles.len() {
            let (a, b) = (&projectiles[i], &projectiles[j]);
            if a.source == b.source || removed.contains(&a.id) || removed.contains(&b.id) {
                continue;
            }
            if !circles_overlap(a.pos, a.radius, b.pos, b.radius) {
                continue;
            }

            match clash(a, b) {
                ClashOutcome::SmallAbsorbed { small_is_first } => {
                    let (small, large) = if small_is_first { (a, b) } else { (b, a) };
                    removed.insert(small.id);
                    *damage.entry(large.id).or_insert(0) += SMALL_HIT_DAMAGE;
                }
                ClashOutcome::BothDestroyed => {
                    removed.insert(a.id);
                    removed.insert(b.id);
                }
                ClashOutcome::LargeClash => {
                    *damage.entry(a.id).or_insert(0) += LARGE_CLASH_DAMAGE;
                    *damage.entry(b.id).or_insert(0) += LARGE_CLASH_DAMAGE;
                }
            }
        }
    }

    // A projectile worn down to zero health pays out its full value
    let mut destroyed = Vec::new();
    for (id, amount) in damage {
        if let Some(p) = state.projectiles.iter_mut().find(|p| p.id == id) {
            p.health -= amount;
            if p.health <= 0 {
                log::trace!("Projectile {} destroyed", id);
                removed.insert(id);
                destroyed.push((p.source, p.score_value));
            }
        }
    }
    for (source, amount) in destroyed {
        state.players.add_score(source, amount);
    }

    if !removed.is_empty() {
        state.projectiles.retain(|p| !removed.contains(&p.id));
    }
}
