//! Dash Juice - collision-driven feedback sequences for a top-down action game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (phase sequences, characters, props, camera, overlay)
//! - `settings`: Player-facing feedback preferences
//! - `tuning`: Data-driven feel parameters

pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use serde::{Deserialize, Serialize};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep used by the demo driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Timers within this distance of zero count as elapsed.
    /// Summing f32 deltas (0.05 three times) lands a few ulps above 0.15.
    pub const TIME_EPSILON: f32 = 1e-5;

    /// Sustained camera shake oscillation frequencies (rad/s)
    pub const SHAKE_FREQ_X: f32 = 80.0;
    pub const SHAKE_FREQ_Y: f32 = 90.0;
    /// Impact jolt oscillation frequencies (rad/s)
    pub const IMPACT_FREQ_X: f32 = 120.0;
    pub const IMPACT_FREQ_Y: f32 = 130.0;

    /// How much the prop hitstop shake amplitude decays by the end of the freeze
    pub const PROP_SHAKE_DECAY: f32 = 0.5;
    /// How much the character damage shake amplitude decays by the end of the flash
    pub const CHARACTER_SHAKE_DECAY: f32 = 0.3;
    /// Y-axis frequency ratio for the character damage shake
    pub const CHARACTER_SHAKE_Y_RATIO: f32 = 1.1;

    /// Sorting order that forces spawned damage explosions above everything
    pub const EXPLOSION_SORTING_ORDER: i32 = 1000;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Linear interpolation, `t` unclamped
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear RGBA color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = clamp01(t);
        Self {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
            a: lerp(self.a, other.a, t),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
