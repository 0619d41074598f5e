//! Player character: movement, dash, bounce and the damage/respawn sequence
//!
//! Motion is a single [`MotionState`]. Transitions:
//!
//! | From          | Trigger                              | To       |
//! |---------------|--------------------------------------|----------|
//! | Idle          | dash input, cooldown elapsed         | Dashing  |
//! | Dashing       | dash timer runs out                  | Idle     |
//! | Dashing       | smashes an intact prop               | Bouncing |
//! | Bouncing      | stun timer runs out                  | Idle     |
//! | any but Frozen| damage                               | Frozen   |
//! | Frozen        | damage sequence completes (respawn)  | Idle     |
//!
//! No input is sampled while Dashing, Bouncing or Frozen.

use std::f32::consts::PI;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::host::{Body, EntityId, Feedback, LayerMask, Outbox, Renderer, SortingContext};
use super::sequence::{Phase, PhaseSequence, SequenceEvent};
use crate::Color;
use crate::consts::*;
use crate::tuning::CharacterTuning;

/// Damage sequence phases, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamagePhase {
    /// Everything stops, including animation time
    FullFreeze,
    /// Shake in place while tinting toward the flash color
    ShakeFlash,
    /// Invisible while the explosion plays
    HideEffect,
    /// Back at the spawn anchor
    Respawn,
}

/// Current motion state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    /// Standing or walking
    Idle,
    Dashing { timer: f32 },
    Bouncing { timer: f32 },
    Frozen { phase: DamagePhase },
}

/// Camera shake issued at the start of a damage sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShakeRequest {
    Sustained { duration: f32, intensity: f32 },
    Impact { intensity: f32, duration: f32 },
}

/// Timing and look of one damage sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageParams {
    pub initial_freeze: f32,
    pub flash_duration: f32,
    pub shake_intensity: f32,
    /// Shake oscillation speed (rad/s)
    pub shake_speed: f32,
    pub respawn_delay: f32,
    pub flash_color: Color,
    pub screen_shake: Option<ShakeRequest>,
}

impl DamageParams {
    pub fn total_duration(&self) -> f32 {
        self.initial_freeze + self.flash_duration + self.respawn_delay
    }
}

/// Passed to the midpoint hook when the character disappears
#[derive(Debug, Clone)]
pub struct MidpointContext {
    pub entity: EntityId,
    pub position: Vec2,
    /// Sorting layer of the primary renderer
    pub sorting_layer: String,
}

/// Runs once when the damage sequence hides the character
pub type MidpointHook = Box<dyn FnOnce(&MidpointContext, &mut Outbox)>;

/// Per-tick player input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Dash pressed this tick
    pub dash: bool,
}

impl MoveInput {
    /// Normalized direction. Left wins over right, up wins over down.
    pub fn direction(&self) -> Vec2 {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        let y = if self.up {
            1.0
        } else if self.down {
            -1.0
        } else {
            0.0
        };
        Vec2::new(x, y).normalize_or_zero()
    }
}

/// Layers of one renderer as spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLayer {
    pub layer: u32,
    pub sorting_layer: String,
}

/// Position and per-renderer layers restored on respawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnAnchor {
    pub position: Vec2,
    /// One entry per renderer, same order
    pub layers: Vec<RenderLayer>,
}

pub struct Character {
    pub id: EntityId,
    pub body: Body,
    pub renderers: Vec<Renderer>,
    tuning: CharacterTuning,
    state: MotionState,
    move_dir: Vec2,
    last_move_dir: Vec2,
    dash_cooldown: f32,
    trail_timer: f32,
    footstep_timer: f32,
    anchor: RespawnAnchor,
    damage: PhaseSequence<DamagePhase>,
    damage_params: Option<DamageParams>,
    on_midpoint: Option<MidpointHook>,
    shake_origin: Vec2,
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("position", &self.body.position)
            .field("last_move_dir", &self.last_move_dir)
            .field("dash_cooldown", &self.dash_cooldown)
            .field("damage_phase", &self.damage.current())
            .finish()
    }
}

impl Character {
    /// Spawn at `position`; the respawn anchor is captured here
    pub fn new(
        id: EntityId,
        position: Vec2,
        renderers: Vec<Renderer>,
        tuning: CharacterTuning,
    ) -> Self {
        let layers = renderers
            .iter()
            .map(|r| RenderLayer {
                layer: r.layer,
                sorting_layer: r.sorting_layer.clone(),
            })
            .collect();
        Self {
            id,
            body: Body::new(position),
            renderers,
            tuning,
            state: MotionState::Idle,
            move_dir: Vec2::ZERO,
            last_move_dir: Vec2::NEG_Y,
            dash_cooldown: 0.0,
            trail_timer: 0.0,
            footstep_timer: 0.0,
            anchor: RespawnAnchor { position, layers },
            damage: PhaseSequence::new(),
            damage_params: None,
            on_midpoint: None,
            shake_origin: position,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.state, MotionState::Dashing { .. })
    }

    pub fn is_bouncing(&self) -> bool {
        matches!(self.state, MotionState::Bouncing { .. })
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, MotionState::Frozen { .. })
    }

    /// Facing, used as the dash direction. Kept while standing still.
    pub fn last_move_direction(&self) -> Vec2 {
        self.last_move_dir
    }

    pub fn is_moving(&self) -> bool {
        self.move_dir != Vec2::ZERO
    }

    pub fn dash_cooldown(&self) -> f32 {
        self.dash_cooldown.max(0.0)
    }

    pub fn anchor(&self) -> &RespawnAnchor {
        &self.anchor
    }

    pub fn tuning(&self) -> &CharacterTuning {
        &self.tuning
    }

    /// Sorting of the primary renderer
    pub fn sorting(&self) -> Option<SortingContext> {
        self.renderers.first().map(Renderer::sorting)
    }

    /// Advance one tick
    pub fn tick(&mut self, dt: f32, input: &MoveInput, fx: &mut Feedback) {
        if self.dash_cooldown > 0.0 {
            self.dash_cooldown -= dt;
        }

        match self.state {
            MotionState::Frozen { .. } => {
                self.tick_damage(dt, fx);
                return;
            }
            MotionState::Bouncing { timer } => {
                let timer = timer - dt;
                if timer <= TIME_EPSILON {
                    self.state = MotionState::Idle;
                    self.body.halt();
                    log::debug!("Character {} recovered from bounce", self.id);
                } else {
                    self.state = MotionState::Bouncing { timer };
                }
            }
            MotionState::Idle => {
                self.sample_movement(input);
                if input.dash && self.dash_cooldown <= TIME_EPSILON {
                    self.start_dash(fx.outbox);
                } else {
                    self.body.set_velocity(self.move_dir * self.tuning.speed);
                    self.tick_footsteps(dt, fx.outbox);
                }
            }
            MotionState::Dashing { .. } => {}
        }

        if self.is_dashing() {
            self.tick_dash(dt, fx.outbox);
        }
    }

    fn sample_movement(&mut self, input: &MoveInput) {
        self.move_dir = input.direction();
        if self.move_dir != Vec2::ZERO {
            self.last_move_dir = self.move_dir;
        }
    }

    fn tick_footsteps(&mut self, dt: f32, outbox: &mut Outbox) {
        if self.move_dir == Vec2::ZERO {
            self.footstep_timer = 0.0;
            return;
        }
        self.footstep_timer -= dt;
        if self.footstep_timer <= TIME_EPSILON {
            outbox.play(self.tuning.footsteps.as_ref(), self.body.position);
            self.footstep_timer = self.tuning.footstep_interval;
        }
    }

    fn start_dash(&mut self, outbox: &mut Outbox) {
        self.state = MotionState::Dashing {
            timer: self.tuning.dash_duration,
        };
        self.dash_cooldown = self.tuning.dash_cooldown;
        self.move_dir = Vec2::ZERO;
        self.body.excluded_layers.insert(LayerMask::ENEMY);
        self.footstep_timer = 0.0;
        outbox.stop_footsteps(self.id);
        outbox.spawn(
            self.tuning.dash_start_effect.as_ref(),
            self.body.position,
            self.sorting(),
        );
        // First afterimage on the first dash tick
        self.trail_timer = 0.0;
        log::debug!("Character {} dash toward {:?}", self.id, self.last_move_dir);
    }

    fn tick_dash(&mut self, dt: f32, outbox: &mut Outbox) {
        let MotionState::Dashing { timer } = self.state else {
            return;
        };

        self.body
            .set_velocity(self.last_move_dir * self.tuning.dash_speed);
        let timer = timer - dt;

        self.trail_timer -= dt;
        if self.trail_timer <= TIME_EPSILON {
            outbox.spawn(
                self.tuning.trail_effect.as_ref(),
                self.body.position,
                self.sorting(),
            );
            self.trail_timer = self.tuning.trail_interval;
        }

        if timer <= TIME_EPSILON {
            self.end_dash();
            log::debug!("Character {} dash ended", self.id);
            return;
        }

        // Half-sine flash peaking mid-dash
        let duration = self.tuning.dash_duration.max(TIME_EPSILON);
        let progress = crate::clamp01(1.0 - timer / duration);
        let flash = (progress * PI).sin() * self.tuning.dash_flash_peak;
        let color = self.tuning.dash_flash_color;
        for renderer in &mut self.renderers {
            renderer.set_flash(flash, color);
        }
        self.state = MotionState::Dashing { timer };
    }

    /// Dash bookkeeping shared by expiry, bounce and damage
    fn end_dash(&mut self) {
        self.body.excluded_layers.remove(LayerMask::ENEMY);
        for renderer in &mut self.renderers {
            renderer.clear_flash();
        }
        self.state = MotionState::Idle;
    }

    /// Knock back along `normal` after smashing a prop. Only valid while dashing.
    pub fn bounce_off(&mut self, normal: Vec2) -> bool {
        if !self.is_dashing() {
            return false;
        }
        self.end_dash();
        self.body.halt();
        self.body
            .apply_impulse(normal.normalize_or_zero() * self.tuning.bounce_force);
        self.state = MotionState::Bouncing {
            timer: self.tuning.bounce_stun,
        };
        log::debug!("Character {} bounced along {:?}", self.id, normal);
        true
    }

    /// Start the damage sequence. Ignored while already frozen.
    pub fn take_damage(
        &mut self,
        params: DamageParams,
        on_midpoint: Option<MidpointHook>,
        outbox: &mut Outbox,
    ) -> bool {
        if self.is_frozen() {
            log::debug!("Character {} already frozen, damage ignored", self.id);
            return false;
        }
        if self.is_dashing() {
            self.end_dash();
        }
        self.body.halt();
        self.move_dir = Vec2::ZERO;
        self.footstep_timer = 0.0;
        outbox.stop_footsteps(self.id);

        self.damage.start([
            Phase::new(DamagePhase::FullFreeze, params.initial_freeze),
            Phase::new(DamagePhase::ShakeFlash, params.flash_duration),
            Phase::new(DamagePhase::HideEffect, params.respawn_delay),
            Phase::new(DamagePhase::Respawn, 0.0),
        ]);
        self.damage_params = Some(params);
        self.on_midpoint = on_midpoint;
        self.state = MotionState::Frozen {
            phase: DamagePhase::FullFreeze,
        };
        log::debug!(
            "Character {} damaged, sequence {:.2}s",
            self.id,
            params.total_duration()
        );
        true
    }

    fn tick_damage(&mut self, dt: f32, fx: &mut Feedback) {
        let Some(params) = self.damage_params else {
            return;
        };
        for event in self.damage.tick(dt) {
            match event {
                SequenceEvent::Entered(phase) => {
                    self.state = MotionState::Frozen { phase };
                    self.enter_damage_phase(phase, &params, fx);
                }
                SequenceEvent::Update {
                    phase: DamagePhase::ShakeFlash,
                    elapsed,
                    progress,
                } => {
                    for renderer in &mut self.renderers {
                        renderer.set_flash(progress, params.flash_color);
                    }
                    let amplitude =
                        params.shake_intensity * (1.0 - CHARACTER_SHAKE_DECAY * progress);
                    let phase = elapsed * params.shake_speed;
                    let offset = Vec2::new(
                        phase.sin(),
                        (phase * CHARACTER_SHAKE_Y_RATIO).cos(),
                    ) * amplitude;
                    self.body.position = self.shake_origin + offset;
                }
                SequenceEvent::Finished(DamagePhase::ShakeFlash) => {
                    self.body.position = self.shake_origin;
                }
                SequenceEvent::Completed => {
                    self.state = MotionState::Idle;
                    self.damage_params = None;
                    self.body.halt();
                    log::debug!("Character {} back in control", self.id);
                }
                _ => {}
            }
        }
    }

    fn enter_damage_phase(&mut self, phase: DamagePhase, params: &DamageParams, fx: &mut Feedback) {
        match phase {
            DamagePhase::FullFreeze => {
                for renderer in &mut self.renderers {
                    renderer.animation_speed = 0.0;
                }
                if let Some(shake) = params.screen_shake {
                    fx.camera.request(shake);
                }
                fx.overlay.show();
            }
            DamagePhase::ShakeFlash => {
                for renderer in &mut self.renderers {
                    renderer.animation_speed = 1.0;
                }
                self.shake_origin = self.body.position;
            }
            DamagePhase::HideEffect => {
                for renderer in &mut self.renderers {
                    renderer.visible = false;
                }
                if let Some(hook) = self.on_midpoint.take() {
                    let sorting_layer = self
                        .renderers
                        .first()
                        .map(|r| r.sorting_layer.clone())
                        .unwrap_or_else(|| "Default".to_string());
                    let ctx = MidpointContext {
                        entity: self.id,
                        position: self.body.position,
                        sorting_layer,
                    };
                    hook(&ctx, fx.outbox);
                }
            }
            DamagePhase::Respawn => self.respawn(fx),
        }
    }

    fn respawn(&mut self, fx: &mut Feedback) {
        self.body.position = self.anchor.position;
        self.body.halt();
        for (renderer, spawned) in self.renderers.iter_mut().zip(&self.anchor.layers) {
            renderer.layer = spawned.layer;
            renderer.sorting_layer = spawned.sorting_layer.clone();
        }
        for renderer in &mut self.renderers {
            renderer.clear_flash();
            renderer.visible = true;
            renderer.animation_speed = 1.0;
        }
        fx.overlay.hide();
        log::info!("Character {} respawned at {:?}", self.id, self.anchor.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::camera::CameraRig;
    use crate::sim::host::{EffectId, HostCommand};
    use crate::sim::overlay::ScreenOverlay;
    use crate::tuning::{HazardTuning, OverlayTuning};
    use glam::Vec3;

    struct Rig {
        camera: CameraRig,
        overlay: ScreenOverlay,
        outbox: Outbox,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                camera: CameraRig::new(Vec3::new(0.0, 0.0, -10.0), Vec2::ZERO, 1.0),
                overlay: ScreenOverlay::new(OverlayTuning::default()),
                outbox: Outbox::new(3),
            }
        }

        fn fx(&mut self) -> Feedback<'_> {
            Feedback {
                camera: &mut self.camera,
                overlay: &mut self.overlay,
                outbox: &mut self.outbox,
            }
        }
    }

    fn character() -> Character {
        Character::new(
            1,
            Vec2::new(2.0, 3.0),
            vec![Renderer::new(1, "Layer 1")],
            CharacterTuning::default(),
        )
    }

    fn dash() -> MoveInput {
        MoveInput {
            dash: true,
            ..Default::default()
        }
    }

    fn damage() -> DamageParams {
        DamageParams {
            initial_freeze: 0.5,
            flash_duration: 0.8,
            shake_intensity: 0.05,
            shake_speed: 50.0,
            respawn_delay: 1.0,
            flash_color: Color::RED,
            screen_shake: Some(ShakeRequest::Impact {
                intensity: 0.4,
                duration: 0.15,
            }),
        }
    }

    #[test]
    fn test_no_input_stays_put() {
        let mut rig = Rig::new();
        let mut c = character();
        c.tick(1.0, &MoveInput::default(), &mut rig.fx());
        c.body.integrate(1.0);
        assert_eq!(c.body.velocity, Vec2::ZERO);
        assert_eq!(c.body.position, Vec2::new(2.0, 3.0));
        assert_eq!(c.last_move_direction(), Vec2::NEG_Y);
    }

    #[test]
    fn test_walk_normalizes_and_remembers_facing() {
        let mut rig = Rig::new();
        let mut c = character();
        let input = MoveInput {
            up: true,
            right: true,
            ..Default::default()
        };
        c.tick(0.1, &input, &mut rig.fx());
        assert!((c.body.velocity.length() - 5.0).abs() < 1e-4);
        c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        assert_eq!(c.body.velocity, Vec2::ZERO);
        assert!((c.last_move_direction() - Vec2::new(1.0, 1.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_dash_timing_and_layer_exclusion() {
        let mut rig = Rig::new();
        let mut c = character();
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(c.is_dashing());
        assert!(c.body.excluded_layers.contains(LayerMask::ENEMY));
        c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        assert!(c.is_dashing());
        assert!(c.body.excluded_layers.contains(LayerMask::ENEMY));
        c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        assert!(!c.is_dashing());
        assert!(!c.body.excluded_layers.contains(LayerMask::ENEMY));
        assert_eq!(c.renderers[0].flash_amount(), 0.0);
    }

    #[test]
    fn test_stationary_dash_uses_last_heading() {
        let mut rig = Rig::new();
        let mut c = character();
        let left = MoveInput {
            left: true,
            ..Default::default()
        };
        c.tick(0.1, &left, &mut rig.fx());
        c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        c.tick(0.01, &dash(), &mut rig.fx());
        assert_eq!(c.body.velocity, Vec2::new(-15.0, 0.0));
    }

    #[test]
    fn test_dash_cooldown_blocks_redash() {
        let mut rig = Rig::new();
        let mut c = character();
        c.tick(0.05, &dash(), &mut rig.fx());
        for _ in 0..3 {
            c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        }
        assert!(!c.is_dashing());
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(!c.is_dashing());
        for _ in 0..4 {
            c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        }
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(c.is_dashing());
    }

    #[test]
    fn test_dash_flash_peaks_mid_dash() {
        let mut rig = Rig::new();
        let mut c = character();
        let mut tuning = CharacterTuning::default();
        tuning.dash_duration = 1.0;
        c.tuning = tuning;
        c.tick(0.25, &dash(), &mut rig.fx());
        let quarter = c.renderers[0].flash_amount();
        c.tick(0.25, &MoveInput::default(), &mut rig.fx());
        let half = c.renderers[0].flash_amount();
        c.tick(0.25, &MoveInput::default(), &mut rig.fx());
        let three_quarter = c.renderers[0].flash_amount();
        assert!((half - 0.6).abs() < 1e-4);
        assert!(quarter < half && three_quarter < half);
        assert!((quarter - three_quarter).abs() < 1e-4);
    }

    #[test]
    fn test_dash_start_side_effects() {
        let mut rig = Rig::new();
        let mut tuning = CharacterTuning::default();
        tuning.dash_start_effect = Some(EffectId::new("DashPuff"));
        tuning.trail_effect = Some(EffectId::new("Afterimage"));
        let mut c = Character::new(4, Vec2::ZERO, vec![Renderer::new(0, "Default")], tuning);
        c.tick(0.01, &dash(), &mut rig.fx());
        let cmds = rig.outbox.drain();
        assert_eq!(cmds[0], HostCommand::StopFootsteps { entity: 4 });
        assert!(matches!(&cmds[1], HostCommand::SpawnEffect { effect, .. } if effect.0 == "DashPuff"));
        assert!(matches!(&cmds[2], HostCommand::SpawnEffect { effect, .. } if effect.0 == "Afterimage"));
        // Next afterimage waits for the trail interval
        c.tick(0.01, &MoveInput::default(), &mut rig.fx());
        assert!(rig.outbox.pending().is_empty());
        c.tick(0.025, &MoveInput::default(), &mut rig.fx());
        assert_eq!(rig.outbox.pending().len(), 1);
    }

    #[test]
    fn test_bounce_then_recover() {
        let mut rig = Rig::new();
        let mut c = character();
        assert!(!c.bounce_off(Vec2::X));
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(c.bounce_off(Vec2::new(2.0, 0.0)));
        assert!(c.is_bouncing());
        assert!(!c.body.excluded_layers.contains(LayerMask::ENEMY));
        assert_eq!(c.body.velocity, Vec2::new(6.0, 0.0));

        // Input is ignored while stunned, including dash
        c.tick(0.1, &dash(), &mut rig.fx());
        assert!(c.is_bouncing());
        assert_eq!(c.body.velocity, Vec2::new(6.0, 0.0));
        c.tick(0.15, &MoveInput::default(), &mut rig.fx());
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_footsteps_cadence() {
        let mut rig = Rig::new();
        let mut tuning = CharacterTuning::default();
        tuning.footsteps = Some(crate::sim::host::SoundCue::single("step"));
        tuning.footstep_interval = 0.3;
        let mut c = Character::new(1, Vec2::ZERO, Vec::new(), tuning);
        let walk = MoveInput {
            down: true,
            ..Default::default()
        };
        c.tick(0.1, &walk, &mut rig.fx());
        assert_eq!(rig.outbox.drain().len(), 1);
        c.tick(0.1, &walk, &mut rig.fx());
        c.tick(0.1, &walk, &mut rig.fx());
        assert!(rig.outbox.drain().is_empty());
        c.tick(0.1, &walk, &mut rig.fx());
        assert_eq!(rig.outbox.drain().len(), 1);
        // Stopping resets the cadence so the next step fires immediately
        c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        c.tick(0.1, &walk, &mut rig.fx());
        assert_eq!(rig.outbox.drain().len(), 1);
    }

    #[test]
    fn test_damage_sequence_timeline() {
        let mut rig = Rig::new();
        let mut c = character();
        let walk = MoveInput {
            right: true,
            ..Default::default()
        };
        c.tick(0.1, &walk, &mut rig.fx());
        c.body.integrate(0.1);
        let hit_pos = c.body.position;
        assert_ne!(hit_pos, c.anchor().position);

        assert!(c.take_damage(damage(), None, &mut rig.outbox));
        assert!(c.is_frozen());
        assert_eq!(c.body.velocity, Vec2::ZERO);
        assert!(!c.take_damage(damage(), None, &mut rig.outbox));

        let dt = 0.01;
        let mut elapsed = 0.0f32;
        let mut saw = Vec::new();
        while c.is_frozen() {
            c.tick(dt, &walk, &mut rig.fx());
            elapsed += dt;
            if let MotionState::Frozen { phase } = c.state() {
                if !saw.contains(&phase) {
                    saw.push(phase);
                }
                // Never at the anchor before respawn
                assert_ne!(c.body.position, c.anchor().position);
            }
            assert!(elapsed < 10.0);
        }
        assert_eq!(
            saw,
            vec![
                DamagePhase::FullFreeze,
                DamagePhase::ShakeFlash,
                DamagePhase::HideEffect
            ]
        );
        assert!((elapsed - damage().total_duration()).abs() <= dt + 1e-4);
        assert_eq!(c.body.position, c.anchor().position);
        assert!(c.renderers[0].visible);
        assert_eq!(c.renderers[0].flash_amount(), 0.0);
        assert_eq!(c.state(), MotionState::Idle);
    }

    #[test]
    fn test_damage_phase_side_effects() {
        let mut rig = Rig::new();
        let mut c = character();
        let start = c.body.position;
        let hook: MidpointHook = Box::new(|ctx: &MidpointContext, outbox: &mut Outbox| {
            outbox.spawn(
                Some(&EffectId::new("Skull")),
                ctx.position,
                Some(SortingContext {
                    sorting_layer: ctx.sorting_layer.clone(),
                    sorting_order: EXPLOSION_SORTING_ORDER,
                }),
            );
        });
        c.take_damage(damage(), Some(hook), &mut rig.outbox);
        rig.outbox.drain();

        // Phase 1: animation halted, shake + vignette requested once
        c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        assert_eq!(c.renderers[0].animation_speed, 0.0);
        assert!(rig.camera.is_shaking());
        assert!(rig.overlay.is_animating());

        // Phase 2: animation resumes, flash ramps, shakes around the hit position
        for _ in 0..5 {
            c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        }
        assert_eq!(c.state(), MotionState::Frozen { phase: DamagePhase::ShakeFlash });
        assert_eq!(c.renderers[0].animation_speed, 1.0);
        let flash = c.renderers[0].flash_amount();
        assert!(flash > 0.0 && flash < 1.0);
        let offset = c.body.position - start;
        assert!(offset.x.abs() <= 0.05 + 1e-5 && offset.y.abs() <= 0.05 + 1e-5);

        // Phase 3: exact position restored, hidden, hook fired once
        for _ in 0..8 {
            c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        }
        assert_eq!(c.state(), MotionState::Frozen { phase: DamagePhase::HideEffect });
        assert!(!c.renderers[0].visible);
        let cmds = rig.outbox.drain();
        assert_eq!(cmds.len(), 1);
        match &cmds[0] {
            HostCommand::SpawnEffect { position, sorting, .. } => {
                assert_eq!(*position, start);
                let sorting = sorting.as_ref().unwrap();
                assert_eq!(sorting.sorting_layer, "Layer 1");
                assert_eq!(sorting.sorting_order, 1000);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_respawn_restores_anchor_layers() {
        let mut rig = Rig::new();
        let mut c = character();
        c.renderers[0].layer = 7;
        c.renderers[0].sorting_layer = "Layer 3".into();
        c.take_damage(
            HazardTuning {
                respawn_delay: 0.1,
                ..HazardTuning::default()
            }
            .damage_params(),
            None,
            &mut rig.outbox,
        );
        for _ in 0..200 {
            c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        }
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.renderers[0].layer, 1);
        assert_eq!(c.renderers[0].sorting_layer, "Layer 1");
        // Respawn asked the overlay to fade out
        rig.overlay.tick(1.0);
        assert_eq!(rig.overlay.alpha(), 0.0);
    }

    #[test]
    fn test_respawn_restores_each_renderer_layer() {
        let mut rig = Rig::new();
        let mut c = Character::new(
            1,
            Vec2::ZERO,
            vec![Renderer::new(4, "Characters"), Renderer::new(2, "Shadows")],
            CharacterTuning::default(),
        );
        for renderer in &mut c.renderers {
            renderer.layer = 9;
            renderer.sorting_layer = "Effects".into();
        }
        c.take_damage(damage(), None, &mut rig.outbox);
        for _ in 0..100 {
            c.tick(0.05, &MoveInput::default(), &mut rig.fx());
        }
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.renderers[0].layer, 4);
        assert_eq!(c.renderers[0].sorting_layer, "Characters");
        assert_eq!(c.renderers[1].layer, 2);
        assert_eq!(c.renderers[1].sorting_layer, "Shadows");
        assert!(c.renderers.iter().all(|r| r.visible));
    }

    #[test]
    fn test_damage_while_bouncing() {
        let mut rig = Rig::new();
        let mut c = character();
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(c.bounce_off(Vec2::X));
        assert!(c.is_bouncing());

        assert!(c.take_damage(damage(), None, &mut rig.outbox));
        assert_eq!(c.state(), MotionState::Frozen { phase: DamagePhase::FullFreeze });
        assert_eq!(c.body.velocity, Vec2::ZERO);

        // Outlasts the bounce stun without dropping back to Idle
        for _ in 0..6 {
            c.tick(0.05, &MoveInput::default(), &mut rig.fx());
            assert!(c.is_frozen());
            assert_eq!(c.body.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_moving_flag_and_cooldown_readout() {
        let mut rig = Rig::new();
        let mut c = character();
        assert!(!c.is_moving());
        let walk = MoveInput {
            left: true,
            ..Default::default()
        };
        c.tick(0.1, &walk, &mut rig.fx());
        assert!(c.is_moving());
        assert_eq!(c.dash_cooldown(), 0.0);
        c.tick(0.1, &dash(), &mut rig.fx());
        assert!(!c.is_moving());
        assert!((c.dash_cooldown() - 0.4).abs() < 1e-6);
        for _ in 0..10 {
            c.tick(0.1, &MoveInput::default(), &mut rig.fx());
        }
        assert_eq!(c.dash_cooldown(), 0.0);
    }

    #[test]
    fn test_damage_cancels_dash() {
        let mut rig = Rig::new();
        let mut c = character();
        c.tick(0.05, &dash(), &mut rig.fx());
        assert!(c.is_dashing());
        c.take_damage(damage(), None, &mut rig.outbox);
        assert!(c.is_frozen());
        assert!(!c.body.excluded_layers.contains(LayerMask::ENEMY));
        assert_eq!(c.body.velocity, Vec2::ZERO);
        assert!(rig
            .outbox
            .pending()
            .contains(&HostCommand::StopFootsteps { entity: 1 }));
    }
}
