//! Host-facing capabilities
//!
//! The simulation owns the physics-facing ([`Body`]) and render-facing ([`Renderer`])
//! state of its entities; the host mirrors those into its physics world and sprites
//! after every tick. Fire-and-forget side effects (sounds, spawned visual effects,
//! despawns, scene reset) are queued as [`HostCommand`]s in the [`Outbox`] and
//! drained by the host.
//!
//! Every optional resource is an `Option`. A missing sound cue or effect id makes
//! the outbox skip that side effect without complaint.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::overlay::ScreenOverlay;
use crate::Color;

/// Stable entity handle
pub type EntityId = u32;

/// Name of a visual effect prefab the host knows how to spawn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub String);

impl EffectId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Name of an audio clip the host knows how to play
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub String);

impl SoundId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A sound with interchangeable variants; one is picked at random per play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub clips: Vec<SoundId>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl SoundCue {
    pub fn single(clip: impl Into<String>) -> Self {
        Self {
            clips: vec![SoundId::new(clip)],
            volume: 1.0,
        }
    }
}

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    /// Layer the dash passes through
    pub const ENEMY: LayerMask = LayerMask(1 << 3);

    pub fn contains(self, other: LayerMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: LayerMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: LayerMask) {
        self.0 &= !other.0;
    }
}

/// Rigid body state mirrored to the host physics world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub mass: f32,
    /// Kinematic bodies ignore impulses and are not integrated
    pub kinematic: bool,
    pub collider_enabled: bool,
    /// Layers this body does not collide with
    pub excluded_layers: LayerMask,
}

impl Body {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            kinematic: false,
            collider_enabled: true,
            excluded_layers: LayerMask::NONE,
        }
    }

    /// Instant change in momentum
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.kinematic || self.mass <= 0.0 {
            return;
        }
        self.velocity += impulse / self.mass;
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    /// Stop all motion
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }

    /// Explicit Euler step, used when the host does not run its own physics
    pub fn integrate(&mut self, dt: f32) {
        if !self.kinematic {
            self.position += self.velocity * dt;
        }
    }
}

/// Sprite render state mirrored to the host renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Renderer {
    pub visible: bool,
    /// Physics/render layer index
    pub layer: u32,
    pub sorting_layer: String,
    pub sorting_order: i32,
    /// Flash shader channel. `None` when the material has no flash support;
    /// flashes then interpolate `tint` instead.
    pub flash: Option<f32>,
    pub tint: Color,
    base_tint: Color,
    /// Animation playback speed, 0 halts the animator
    pub animation_speed: f32,
}

impl Renderer {
    pub fn new(layer: u32, sorting_layer: impl Into<String>) -> Self {
        Self {
            visible: true,
            layer,
            sorting_layer: sorting_layer.into(),
            sorting_order: 0,
            flash: Some(0.0),
            tint: Color::WHITE,
            base_tint: Color::WHITE,
            animation_speed: 1.0,
        }
    }

    /// Renderer without a flash channel
    pub fn without_flash(mut self) -> Self {
        self.flash = None;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self.base_tint = tint;
        self
    }

    /// Drive the flash toward `color` by `amount` in [0, 1]
    pub fn set_flash(&mut self, amount: f32, color: Color) {
        let amount = crate::clamp01(amount);
        match self.flash.as_mut() {
            Some(flash) => *flash = amount,
            None => self.tint = self.base_tint.lerp(color, amount),
        }
    }

    pub fn clear_flash(&mut self) {
        if let Some(flash) = self.flash.as_mut() {
            *flash = 0.0;
        }
        self.tint = self.base_tint;
    }

    /// Current flash amount, or 0 without a flash channel
    pub fn flash_amount(&self) -> f32 {
        self.flash.unwrap_or(0.0)
    }

    pub fn sorting(&self) -> SortingContext {
        SortingContext {
            sorting_layer: self.sorting_layer.clone(),
            sorting_order: self.sorting_order,
        }
    }
}

/// Where a spawned effect should sort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortingContext {
    pub sorting_layer: String,
    pub sorting_order: i32,
}

/// Side effect for the host to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    PlaySound {
        clip: SoundId,
        position: Vec2,
        volume: f32,
    },
    /// Release the looping footstep source of an entity
    StopFootsteps { entity: EntityId },
    SpawnEffect {
        effect: EffectId,
        position: Vec2,
        sorting: Option<SortingContext>,
    },
    Despawn { entity: EntityId },
    ResetScene,
}

/// Queue of host commands produced during a tick
#[derive(Debug, Clone)]
pub struct Outbox {
    commands: Vec<HostCommand>,
    rng: Pcg32,
    /// Multiplier applied to every sound volume
    pub sfx_volume: f32,
}

impl Outbox {
    pub fn new(seed: u64) -> Self {
        Self {
            commands: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            sfx_volume: 1.0,
        }
    }

    /// Play one variant of `cue` at `position`
    pub fn play(&mut self, cue: Option<&SoundCue>, position: Vec2) {
        let Some(cue) = cue else { return };
        if cue.clips.is_empty() || self.sfx_volume <= 0.0 {
            return;
        }
        let pick = self.rng.random_range(0..cue.clips.len());
        self.commands.push(HostCommand::PlaySound {
            clip: cue.clips[pick].clone(),
            position,
            volume: cue.volume * self.sfx_volume,
        });
    }

    pub fn stop_footsteps(&mut self, entity: EntityId) {
        self.commands.push(HostCommand::StopFootsteps { entity });
    }

    pub fn spawn(
        &mut self,
        effect: Option<&EffectId>,
        position: Vec2,
        sorting: Option<SortingContext>,
    ) {
        let Some(effect) = effect else { return };
        self.commands.push(HostCommand::SpawnEffect {
            effect: effect.clone(),
            position,
            sorting,
        });
    }

    pub fn despawn(&mut self, entity: EntityId) {
        self.commands.push(HostCommand::Despawn { entity });
    }

    pub fn reset_scene(&mut self) {
        self.commands.push(HostCommand::ResetScene);
    }

    /// Commands queued so far, oldest first
    pub fn pending(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Hand all queued commands to the host
    pub fn drain(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// Shared feedback services an entity may trigger during its tick
pub struct Feedback<'a> {
    pub camera: &'a mut CameraRig,
    pub overlay: &'a mut ScreenOverlay,
    pub outbox: &'a mut Outbox,
}
