//! Dice Party entry point
//!
//! The browser build is driven by `WebSession` from JavaScript. Natively this
//! runs a headless demo: a few players, every mode in turn, and a scoreboard.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dice_party::consts::*;
    use dice_party::{Session, Settings};
    use glam::Vec2;

    env_logger::init();
    log::info!("Dice Party (native) starting...");

    let settings = Settings::load();
    let (width, height) = (settings.width, settings.height);
    let mut session = Session::new(settings);

    for point in [
        Vec2::new(width / 2.0, 0.0),
        Vec2::new(width / 2.0, height),
        Vec2::new(0.0, height / 2.0),
    ] {
        if let Err(e) = session.add_player(point) {
            log::error!("Could not add player: {}", e);
            return;
        }
    }
    if let Err(e) = session.start() {
        log::error!("Could not start: {}", e);
        return;
    }

    // Thirty simulated seconds per mode, stepped at display rate
    let frame_ms = 1000.0 / 60.0;
    let frames_per_mode = (30_000.0 / frame_ms) as usize;
    for round in 0..3 {
        for _ in 0..frames_per_mode {
            session.advance(frame_ms);
        }
        let snap = session.snapshot();
        log::info!("--- {} (round {}) ---", snap.mode_name, round + 1);
        for p in &snap.players {
            log::info!(
                "{}: score {} | level {} ({}%) | last roll {}",
                p.name,
                p.score,
                p.level,
                p.level_progress,
                p.last_roll
            );
        }
        if round < 2 && session.next_mode().is_err() {
            break;
        }
        session.advance(frame_ms * 6.0);
    }

    let best = session
        .snapshot()
        .players
        .into_iter()
        .max_by_key(|p| p.total_xp);
    if let Some(best) = best {
        log::info!(
            "{} leads with {} XP (first level costs {})",
            best.name,
            best.total_xp,
            FIRST_LEVEL_COST
        );
    }

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode snapshot: {}", e),
    }

    let _ = session.stop();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library, this is just to satisfy the compiler
}
