//! Browser bridge
//!
//! Exposes [`Session`] to JavaScript. The page owns the canvas and the
//! animation loop: it forwards clicks and elapsed time, then draws whatever
//! `snapshot_json` returns.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{PlayerId, UpgradeKind, UpgradeTarget};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Dice Party starting...");
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebSession {
    inner: Session,
}

#[wasm_bindgen]
impl WebSession {
    /// New session using settings from LocalStorage, sized to the canvas
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebSession {
        let mut settings = Settings::load();
        settings.width = width;
        settings.height = height;
        WebSession {
            inner: Session::new(settings),
        }
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.inner.start().map_err(to_js)
    }

    pub fn stop(&mut self) -> Result<(), JsValue> {
        self.inner.stop().map_err(to_js)
    }

    pub fn toggle(&mut self) -> Result<(), JsValue> {
        if self.inner.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    pub fn next_mode(&mut self) -> Result<(), JsValue> {
        self.inner.next_mode().map(|_| ()).map_err(to_js)
    }

    pub fn begin_add_player(&mut self) -> Result<(), JsValue> {
        self.inner.begin_add_player().map_err(to_js)
    }

    pub fn begin_remove_player(&mut self) -> Result<(), JsValue> {
        self.inner.begin_remove_player().map_err(to_js)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle_pointer_event(Vec2::new(x, y))
            .map(|_| ())
            .map_err(to_js)
    }

    /// Select a shop target: 0 for everyone, otherwise a player id
    pub fn select_target(&mut self, id: PlayerId) -> Result<(), JsValue> {
        let target = if id == 0 {
            UpgradeTarget::All
        } else {
            UpgradeTarget::Player(id)
        };
        self.inner.select_upgrade_target(target).map_err(to_js)
    }

    /// Buy an upgrade for the selected target ("speed", "slow", "winning", "lucky", "inventory")
    pub fn purchase(&mut self, kind: &str) -> Result<(), JsValue> {
        let kind = UpgradeKind::from_str(kind)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown upgrade: {}", kind)))?;
        self.inner.purchase_selected(kind).map(|_| ()).map_err(to_js)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner.set_bounds(width, height);
    }

    /// Advance by `elapsed_ms` of wall time (clamped so a hidden tab does not
    /// replay minutes of timers at once)
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.inner.advance(elapsed_ms.min(1_000.0));
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot()).map_err(to_js)
    }

    /// Notices raised since the last call, as a JSON array
    pub fn drain_notices_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.drain_notices()).map_err(to_js)
    }
}
