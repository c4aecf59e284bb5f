//! AEGIS configuration.
//!
//! Provides operator-tunable thresholds, cooldowns and intervals loaded from
//! TOML, replacing the hardcoded constants in [`defaults`].
//!
//! ## Loading Order
//!
//! 1. `AEGIS_CONFIG` environment variable (path to TOML file)
//! 2. `aegis.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(Settings::load());
//! let w = config::get().detection.posture_window_secs;
//! ```

pub mod defaults;
mod settings;

pub use settings::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Initialize the global settings. Must be called exactly once before any
/// call to `get()`. Logs a warning (does not panic) if called twice.
pub fn init(settings: Settings) {
    if SETTINGS.set(settings).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global settings.
///
/// Panics if `init()` has not been called — a missing config is a fatal
/// startup bug, not a recoverable condition.
pub fn get() -> &'static Settings {
    SETTINGS
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

pub fn is_initialized() -> bool {
    SETTINGS.get().is_some()
}
