//! Destructible prop and its hitstop explosion
//!
//! `Intact -> Exploding(Pushing -> Freezing) -> Exploded`. The only way in is
//! [`Prop::trigger_explosion`]; contacts route through it too.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::host::{Body, EntityId, Outbox, Renderer};
use super::sequence::{Phase, PhaseSequence, SequenceEvent};
use crate::consts::PROP_SHAKE_DECAY;
use crate::tuning::PropTuning;

/// Hitstop phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactPhase {
    /// Flying away from the hit, collider still live
    Pushing,
    /// Pinned in place, shaking and flashing
    Freezing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropState {
    Intact,
    Exploding(ImpactPhase),
    /// Effect spawned, despawn issued
    Exploded,
}

#[derive(Debug, Clone)]
pub struct Prop {
    pub id: EntityId,
    pub body: Body,
    pub renderers: Vec<Renderer>,
    tuning: PropTuning,
    state: PropState,
    exploded: bool,
    removed: bool,
    sequence: PhaseSequence<ImpactPhase>,
    origin: Vec2,
}

impl Prop {
    pub fn new(id: EntityId, position: Vec2, renderers: Vec<Renderer>, tuning: PropTuning) -> Self {
        Self {
            id,
            body: Body::new(position),
            renderers,
            tuning,
            state: PropState::Intact,
            exploded: false,
            removed: false,
            sequence: PhaseSequence::new(),
            origin: position,
        }
    }

    pub fn state(&self) -> PropState {
        self.state
    }

    /// True from the first trigger on, never resets
    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    /// Set once the despawn has been issued
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Start the hitstop. Returns false if the prop already exploded.
    pub fn trigger_explosion(&mut self, hit_point: Vec2) -> bool {
        if self.exploded {
            return false;
        }
        self.exploded = true;

        let away = (self.body.position - hit_point).normalize_or_zero();
        self.body.apply_impulse(away * self.tuning.explosion_force);
        self.sequence.start([
            Phase::new(ImpactPhase::Pushing, self.tuning.push_duration),
            Phase::new(ImpactPhase::Freezing, self.tuning.freeze_duration),
        ]);
        self.state = PropState::Exploding(ImpactPhase::Pushing);
        log::debug!("Prop {} triggered from {:?}", self.id, hit_point);
        true
    }

    /// Collision report. Only a dashing character sets the prop off.
    pub fn on_contact(&mut self, other_is_dashing: bool, hit_point: Vec2) -> bool {
        other_is_dashing && self.trigger_explosion(hit_point)
    }

    pub fn tick(&mut self, dt: f32, outbox: &mut Outbox) {
        for event in self.sequence.tick(dt) {
            match event {
                SequenceEvent::Entered(phase) => {
                    self.state = PropState::Exploding(phase);
                    if phase == ImpactPhase::Freezing {
                        self.freeze();
                    }
                }
                SequenceEvent::Update {
                    phase: ImpactPhase::Freezing,
                    elapsed,
                    progress,
                } => {
                    let amplitude =
                        self.tuning.shake_intensity * (1.0 - PROP_SHAKE_DECAY * progress);
                    let phase = elapsed * self.tuning.shake_speed;
                    self.body.position =
                        self.origin + Vec2::new(phase.sin(), phase.cos()) * amplitude;
                    for renderer in &mut self.renderers {
                        renderer.set_flash(progress, self.tuning.flash_color);
                    }
                }
                SequenceEvent::Finished(ImpactPhase::Freezing) => {
                    self.body.position = self.origin;
                    outbox.spawn(self.tuning.explosion_effect.as_ref(), self.origin, None);
                }
                SequenceEvent::Completed => {
                    self.state = PropState::Exploded;
                    if !self.removed {
                        self.removed = true;
                        outbox.despawn(self.id);
                        log::info!("Prop {} removed", self.id);
                    }
                }
                _ => {}
            }
        }
    }

    fn freeze(&mut self) {
        self.body.collider_enabled = false;
        self.body.halt();
        self.body.set_kinematic(true);
        self.origin = self.body.position;
        log::debug!("Prop {} frozen at {:?}", self.id, self.origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use crate::sim::host::{EffectId, HostCommand};

    fn prop(freeze: f32) -> Prop {
        Prop::new(
            9,
            Vec2::new(1.0, 0.0),
            vec![Renderer::new(0, "Default")],
            PropTuning {
                freeze_duration: freeze,
                shake_intensity: 0.05,
                explosion_effect: Some(EffectId::new("Explosion_1")),
                ..PropTuning::default()
            },
        )
    }

    #[test]
    fn test_trigger_is_guarded() {
        let mut p = prop(0.12);
        assert!(p.trigger_explosion(Vec2::ZERO));
        let v = p.body.velocity;
        assert_eq!(v, Vec2::new(8.0, 0.0));
        assert!(!p.trigger_explosion(Vec2::new(2.0, 0.0)));
        assert_eq!(p.body.velocity, v);
        assert!(p.has_exploded());
    }

    #[test]
    fn test_contact_needs_dash() {
        let mut p = prop(0.12);
        assert!(!p.on_contact(false, Vec2::ZERO));
        assert!(!p.has_exploded());
        assert!(p.on_contact(true, Vec2::ZERO));
        assert!(!p.on_contact(true, Vec2::ZERO));
    }

    #[test]
    fn test_push_keeps_collider_freeze_pins() {
        let mut p = prop(0.12);
        let mut outbox = Outbox::new(0);
        p.trigger_explosion(Vec2::ZERO);
        p.tick(0.02, &mut outbox);
        assert_eq!(p.state(), PropState::Exploding(ImpactPhase::Pushing));
        assert!(p.body.collider_enabled);
        p.body.integrate(0.02);

        p.tick(0.04, &mut outbox);
        assert_eq!(p.state(), PropState::Exploding(ImpactPhase::Freezing));
        assert!(!p.body.collider_enabled);
        assert!(p.body.kinematic);
        assert_eq!(p.body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_freeze_restores_origin_and_removes_once() {
        let mut p = prop(1.0);
        let mut outbox = Outbox::new(0);
        p.trigger_explosion(Vec2::ZERO);
        p.tick(0.05, &mut outbox);
        p.body.integrate(0.05);
        let origin = p.body.position;

        let mut moved = false;
        let mut elapsed = 0.0f32;
        while !p.is_removed() {
            p.tick(0.05, &mut outbox);
            elapsed += 0.05;
            if p.body.position != origin {
                moved = true;
                assert!((p.body.position - origin).length() <= 0.05 + 1e-6);
            }
            assert!(elapsed < 2.0);
        }
        assert!(moved);
        assert!((elapsed - 1.0).abs() < 1e-4);
        assert_eq!(p.body.position, origin);
        assert_eq!(p.renderers[0].flash_amount(), 1.0);
        assert_eq!(p.state(), PropState::Exploded);

        let cmds = outbox.drain();
        assert_eq!(cmds.len(), 2);
        assert!(matches!(&cmds[0], HostCommand::SpawnEffect { position, .. } if *position == origin));
        assert_eq!(cmds[1], HostCommand::Despawn { entity: 9 });

        p.tick(0.05, &mut outbox);
        assert!(outbox.pending().is_empty());
    }

    #[test]
    fn test_flash_ramps_linearly() {
        let mut p = prop(1.0);
        let mut outbox = Outbox::new(0);
        p.trigger_explosion(Vec2::ZERO);
        p.tick(0.05, &mut outbox);
        p.tick(0.25, &mut outbox);
        assert!((p.renderers[0].flash_amount() - 0.25).abs() < 1e-5);
        p.tick(0.25, &mut outbox);
        assert!((p.renderers[0].flash_amount() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_flash_tint_fallback() {
        let mut p = Prop::new(
            1,
            Vec2::ZERO,
            vec![Renderer::new(0, "Default").without_flash()],
            PropTuning {
                flash_color: Color::RED,
                ..PropTuning::default()
            },
        );
        let mut outbox = Outbox::new(0);
        p.trigger_explosion(Vec2::new(-1.0, 0.0));
        for _ in 0..20 {
            p.tick(0.01, &mut outbox);
        }
        assert!(p.is_removed());
        assert_eq!(p.renderers[0].tint, Color::RED);
    }

    #[test]
    fn test_missing_effect_still_removes() {
        let mut p = Prop::new(2, Vec2::ZERO, Vec::new(), PropTuning::default());
        let mut outbox = Outbox::new(0);
        p.trigger_explosion(Vec2::ZERO);
        for _ in 0..30 {
            p.tick(0.01, &mut outbox);
        }
        assert!(p.is_removed());
        assert_eq!(outbox.drain(), vec![HostCommand::Despawn { entity: 2 }]);
    }
}
