//! Runtime settings loaded from `assets/bubbles.toml`.
//!
//! [`BubbleSettings`] is a Bevy [`Resource`] holding every knob the physics
//! engine reads, plus the handful the host application needs (camera, seed,
//! audio).  At startup, [`load_bubble_settings`] reads `assets/bubbles.toml`
//! and overwrites the defaults with any values present in the file.  Missing
//! keys fall back to the compile-time defaults, so a minimal TOML can override
//! just the values you care about.
//!
//! ## Hot reload
//!
//! [`hot_reload_settings_system`] polls the file's modification time every
//! `SETTINGS_POLL_SECS` and swaps in the new values.  The engine receives the
//! current resource on every tick, so edits take effect on the next frame
//! without a restart.
//!
//! ## Sanitizing
//!
//! The engine itself does not clamp settings.  Every load path runs
//! [`BubbleSettings::sanitized`], which clamps each knob to its safe range and
//! reports the clamped ones as warnings.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::*;
use crate::error::{clamp_setting, SimError, SimResult};

/// Runtime-tunable physics and host configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BubbleSettings {
    // ── Physics ──────────────────────────────────────────────────────────────
    pub bubble_speed: f32,
    pub gravity: f32,
    pub bounce_energy: f32,
    pub explosion_power: f32,
    pub particle_force: f32,

    // ── Spawner ──────────────────────────────────────────────────────────────
    pub spawn_size: f32,
    pub grenade_chance: f32,
    /// Milliseconds between spawn attempts.
    pub spawn_rate: f32,
    pub max_bubbles: usize,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub camera_fov_deg: f32,
    pub camera_z: f32,
    /// Used for the play bounds until a window reports its size.
    pub aspect_ratio: f32,

    // ── Host ─────────────────────────────────────────────────────────────────
    pub laser_cooldown: f32,
    /// Fixed seed for a reproducible run; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    pub audio_enabled: bool,
    /// When set, a bubble touching the ceiling ends the round.
    pub ceiling_ends_game: bool,
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            bubble_speed: BUBBLE_SPEED,
            gravity: GRAVITY,
            bounce_energy: BOUNCE_ENERGY,
            explosion_power: EXPLOSION_POWER,
            particle_force: PARTICLE_FORCE,
            spawn_size: SPAWN_SIZE,
            grenade_chance: GRENADE_CHANCE,
            spawn_rate: SPAWN_RATE_MS,
            max_bubbles: MAX_BUBBLES,
            camera_fov_deg: CAMERA_FOV_DEG,
            camera_z: CAMERA_Z,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            laser_cooldown: LASER_COOLDOWN,
            rng_seed: None,
            audio_enabled: false,
            ceiling_ends_game: false,
        }
    }
}

impl BubbleSettings {
    /// Impact speed above which a colliding pair pops.
    ///
    /// A non-positive `explosion_power` disables collision pops entirely.
    pub fn explosion_threshold(&self) -> f32 {
        if self.explosion_power > 0.0 {
            EXPLOSION_BASE_THRESHOLD / self.explosion_power
        } else {
            f32::INFINITY
        }
    }

    /// Spawn interval in seconds.
    pub fn spawn_interval_secs(&self) -> f32 {
        self.spawn_rate / 1000.0
    }

    /// Return a copy with every knob clamped to its safe range, together with
    /// one [`SimError::UnsafeSetting`] per clamped value.
    pub fn sanitized(&self) -> (Self, Vec<SimError>) {
        let mut w = Vec::new();
        let mut s = self.clone();

        s.bubble_speed = clamp_setting("bubble_speed", s.bubble_speed, 0.0, 20.0, "[0, 20]", &mut w);
        s.gravity = clamp_setting("gravity", s.gravity, -20.0, 20.0, "[-20, 20]", &mut w);
        s.bounce_energy = clamp_setting("bounce_energy", s.bounce_energy, 0.0, 2.0, "[0, 2]", &mut w);
        s.explosion_power =
            clamp_setting("explosion_power", s.explosion_power, 0.0, 100.0, "[0, 100]", &mut w);
        s.particle_force =
            clamp_setting("particle_force", s.particle_force, 0.0, 50.0, "[0, 50]", &mut w);
        s.spawn_size = clamp_setting("spawn_size", s.spawn_size, 0.05, 5.0, "[0.05, 5]", &mut w);
        s.grenade_chance =
            clamp_setting("grenade_chance", s.grenade_chance, 0.0, 1.0, "[0, 1]", &mut w);
        s.spawn_rate =
            clamp_setting("spawn_rate", s.spawn_rate, 16.0, 60_000.0, "[16, 60000] ms", &mut w);
        s.camera_fov_deg =
            clamp_setting("camera_fov_deg", s.camera_fov_deg, 10.0, 150.0, "[10, 150]", &mut w);
        s.camera_z = clamp_setting("camera_z", s.camera_z, 0.5, 1000.0, "[0.5, 1000]", &mut w);
        s.aspect_ratio =
            clamp_setting("aspect_ratio", s.aspect_ratio, 0.1, 10.0, "[0.1, 10]", &mut w);
        s.laser_cooldown =
            clamp_setting("laser_cooldown", s.laser_cooldown, 0.0, 10.0, "[0, 10]", &mut w);

        (s, w)
    }

    /// Read and parse a settings file.  Does not sanitize.
    pub fn from_file(path: &Path) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            SimError::ConfigParse { source, .. } => SimError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse settings from a TOML string.  Does not sanitize.
    pub fn from_toml_str(contents: &str) -> SimResult<Self> {
        toml::from_str::<Self>(contents).map_err(|source| SimError::ConfigParse {
            path: PathBuf::new(),
            source,
        })
    }
}

/// Tracks the settings file for [`hot_reload_settings_system`].
#[derive(Resource, Debug, Clone)]
pub struct SettingsSource {
    pub path: PathBuf,
    pub last_modified: Option<SystemTime>,
    /// Seconds until the next modification-time check.
    pub poll_timer: f32,
}

impl Default for SettingsSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(SETTINGS_PATH),
            last_modified: None,
            poll_timer: SETTINGS_POLL_SECS,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Sanitize `loaded`, log every clamped value, and store it.
fn apply_loaded(settings: &mut BubbleSettings, loaded: BubbleSettings) {
    let (clean, warnings) = loaded.sanitized();
    for w in &warnings {
        warn!("[config] {w}");
    }
    *settings = clean;
}

/// Startup system: attempt to load the settings file and overwrite the
/// `BubbleSettings` resource with any values present in it.
///
/// A missing file is not an error (defaults are already in place from
/// `init_resource`).  Read or parse errors are logged and the defaults kept.
pub fn load_bubble_settings(
    mut settings: ResMut<BubbleSettings>,
    mut source: ResMut<SettingsSource>,
) {
    if !source.path.exists() {
        info!(
            "[config] No {} found; using compiled defaults",
            source.path.display()
        );
        return;
    }
    source.last_modified = modified_time(&source.path);
    match BubbleSettings::from_file(&source.path) {
        Ok(loaded) => {
            apply_loaded(&mut settings, loaded);
            info!("[config] Loaded settings from {}", source.path.display());
        }
        Err(e) => warn!("[config] {e}; using defaults"),
    }
}

/// Poll the settings file and reload it when its modification time changes.
///
/// A broken edit keeps the previous values in place.
pub fn hot_reload_settings_system(
    time: Res<Time>,
    mut settings: ResMut<BubbleSettings>,
    mut source: ResMut<SettingsSource>,
) {
    source.poll_timer -= time.delta_secs();
    if source.poll_timer > 0.0 {
        return;
    }
    source.poll_timer = SETTINGS_POLL_SECS;

    let modified = modified_time(&source.path);
    if modified.is_none() || modified == source.last_modified {
        return;
    }
    source.last_modified = modified;

    match BubbleSettings::from_file(&source.path) {
        Ok(loaded) => {
            apply_loaded(&mut settings, loaded);
            info!("[config] Reloaded settings from {}", source.path.display());
        }
        Err(e) => warn!("[config] {e}; keeping previous settings"),
    }
}
