//! Data-driven feel parameters
//!
//! Every table has sensible defaults so a partial JSON file only overrides what it
//! names. Loading is the only fallible operation in the crate.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;
use crate::sim::character::{DamageParams, ShakeRequest};
use crate::sim::host::{EffectId, SoundCue};

/// Tuning load failure
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Player character movement and dash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    /// Walk speed (units/s)
    pub speed: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Impulse along the contact normal when a dash smashes a prop
    pub bounce_force: f32,
    /// Seconds of lost control after a bounce
    pub bounce_stun: f32,
    /// Peak of the half-sine dash flash
    pub dash_flash_peak: f32,
    pub dash_flash_color: Color,
    /// Seconds between afterimage spawns while dashing
    pub trail_interval: f32,
    /// Seconds between footsteps while walking
    pub footstep_interval: f32,
    pub dash_start_effect: Option<EffectId>,
    pub trail_effect: Option<EffectId>,
    pub impact_effect: Option<EffectId>,
    pub footsteps: Option<SoundCue>,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            dash_speed: 15.0,
            dash_duration: 0.15,
            dash_cooldown: 0.4,
            bounce_force: 6.0,
            bounce_stun: 0.25,
            dash_flash_peak: 0.6,
            dash_flash_color: Color::WHITE,
            trail_interval: 0.03,
            footstep_interval: 0.35,
            dash_start_effect: None,
            trail_effect: None,
            impact_effect: None,
            footsteps: None,
        }
    }
}

/// Destructible prop hitstop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropTuning {
    /// Impulse away from the hit point
    pub explosion_force: f32,
    /// Seconds the prop flies before freezing
    pub push_duration: f32,
    pub freeze_duration: f32,
    pub shake_intensity: f32,
    /// Shake oscillation speed (rad/s)
    pub shake_speed: f32,
    pub flash_color: Color,
    pub explosion_effect: Option<EffectId>,
}

impl Default for PropTuning {
    fn default() -> Self {
        Self {
            explosion_force: 8.0,
            push_duration: 0.05,
            freeze_duration: 0.12,
            shake_intensity: 0.05,
            shake_speed: 60.0,
            flash_color: Color::WHITE,
            explosion_effect: None,
        }
    }
}

/// Damaging hazard and the damage sequence it starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Phase 1: full freeze
    pub initial_freeze: f32,
    /// Impact jolt instead of a sustained shake over the freeze
    pub use_impact_shake: bool,
    pub screen_shake_intensity: f32,
    pub impact_shake_duration: f32,
    /// Phase 2: shake + flash
    pub flash_duration: f32,
    pub flash_color: Color,
    pub character_shake_intensity: f32,
    pub character_shake_speed: f32,
    /// Phase 3: hidden while the explosion plays
    pub respawn_delay: f32,
    /// Extra seconds before the hazard can trigger again
    pub rearm_slack: f32,
    pub hit_sound: Option<SoundCue>,
    pub explosion_effect: Option<EffectId>,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            initial_freeze: 0.5,
            use_impact_shake: true,
            screen_shake_intensity: 0.4,
            impact_shake_duration: 0.15,
            flash_duration: 0.8,
            flash_color: Color::RED,
            character_shake_intensity: 0.05,
            character_shake_speed: 50.0,
            respawn_delay: 3.0,
            rearm_slack: 0.2,
            hit_sound: None,
            explosion_effect: None,
        }
    }
}

impl HazardTuning {
    /// Damage sequence parameters handed to the character
    pub fn damage_params(&self) -> DamageParams {
        let screen_shake = if self.use_impact_shake {
            ShakeRequest::Impact {
                intensity: self.screen_shake_intensity,
                duration: self.impact_shake_duration,
            }
        } else {
            ShakeRequest::Sustained {
                duration: self.initial_freeze,
                intensity: self.screen_shake_intensity,
            }
        };
        DamageParams {
            initial_freeze: self.initial_freeze,
            flash_duration: self.flash_duration,
            shake_intensity: self.character_shake_intensity,
            shake_speed: self.character_shake_speed,
            respawn_delay: self.respawn_delay,
            flash_color: self.flash_color,
            screen_shake: Some(screen_shake),
        }
    }

    /// Seconds from trigger until the hazard re-arms
    pub fn rearm_delay(&self) -> f32 {
        self.initial_freeze + self.flash_duration + self.respawn_delay + self.rearm_slack
    }
}

/// Follow camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub lerp_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self { lerp_speed: 1.0 }
    }
}

/// Screen vignette overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTuning {
    /// Color of `show()` (damage)
    pub damage_color: Color,
    pub damage_fade_in: f32,
    pub damage_fade_out: f32,
    /// Default color of `flash()` (positive hits)
    pub hit_color: Color,
    /// 0 snaps straight to full alpha
    pub hit_fade_in: f32,
    pub hit_fade_out: f32,
    /// Transparent center radius, normalized
    pub inner_radius: f32,
    pub edge_softness: f32,
}

impl Default for OverlayTuning {
    fn default() -> Self {
        Self {
            damage_color: Color::new(0.8, 0.0, 0.0, 0.9),
            damage_fade_in: 0.1,
            damage_fade_out: 0.5,
            hit_color: Color::new(1.0, 1.0, 1.0, 0.7),
            hit_fade_in: 0.0,
            hit_fade_out: 0.1,
            inner_radius: 0.4,
            edge_softness: 0.5,
        }
    }
}

/// All tuning tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub character: CharacterTuning,
    pub prop: PropTuning,
    pub hazard: HazardTuning,
    pub camera: CameraTuning,
    pub overlay: OverlayTuning,
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
