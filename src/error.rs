//! Simulation-specific error types.
//!
//! Nothing in the per-frame physics path can fail; these errors only surface
//! at the engine's outer entry points (external pop / fire requests) and while
//! loading settings.  Every one of them is a soft fault: callers log it and
//! carry on with the next frame.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::error::SimError;
//!
//! match world.pop_bubble(id, &mut rng) {
//!     Ok(events) => forward(events),
//!     Err(SimError::UnknownBubble(id)) => debug!("{id} already gone"),
//!     Err(e) => warn!("{e}"),
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::bubble::BubbleId;

/// Top-level error enum for the bubble simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A request referenced a bubble that is not (or no longer) live.
    ///
    /// Popping an already-popped bubble lands here; it is a no-op, not a fault.
    #[error("bubble {0} is not live")]
    UnknownBubble(BubbleId),

    /// A laser was fired with a zero-length direction.
    #[error("laser direction must be non-zero")]
    DegenerateDirection,

    /// A setting is outside its safe operating range and was clamped.
    #[error("setting '{name}' = {value} is outside safe range {safe_range}")]
    UnsafeSetting {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The settings file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`crate::config::BubbleSettings`].
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Clamp `value` into `[min, max]`, recording a warning when it was outside.
pub(crate) fn clamp_setting(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    safe_range: &'static str,
    warnings: &mut Vec<SimError>,
) -> f32 {
    if value.is_nan() || value < min || value > max {
        warnings.push(SimError::UnsafeSetting {
            name,
            value,
            safe_range,
        });
        if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        }
    } else {
        value
    }
}
