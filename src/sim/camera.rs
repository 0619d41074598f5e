//! Follow camera with layered shake
//!
//! The rig eases a smoothed base position toward `target + offset` and adds two
//! independent shake offsets on top:
//! - a sustained oscillating shake that decays linearly over its duration
//! - an impact jolt (its own single-phase sequence) that decays to zero
//!
//! The lerp runs on the base position only, so shake never feeds back into the
//! follow smoothing and the two offsets stay strictly additive.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::character::ShakeRequest;
use super::sequence::{Phase, PhaseSequence, SequenceEvent};
use crate::clamp01;
use crate::consts::*;

/// Single phase of the impact jolt timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoltPhase {
    Decay,
}

#[derive(Debug, Clone, Copy, Default)]
struct SustainedShake {
    timer: f32,
    duration: f32,
    intensity: f32,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Committed position: smoothed base plus shake
    pub position: Vec3,
    base: Vec3,
    offset: Vec3,
    pub lerp_speed: f32,
    /// Shake requests are ignored while false
    pub shake_enabled: bool,
    time: f32,
    sustained: SustainedShake,
    sustained_offset: Vec2,
    jolt: PhaseSequence<JoltPhase>,
    jolt_intensity: f32,
    jolt_offset: Vec2,
}

impl CameraRig {
    /// Capture the follow offset from the initial camera and target positions
    pub fn new(position: Vec3, target: Vec2, lerp_speed: f32) -> Self {
        Self {
            position,
            base: position,
            offset: position - target.extend(0.0),
            lerp_speed,
            shake_enabled: true,
            time: 0.0,
            sustained: SustainedShake::default(),
            sustained_offset: Vec2::ZERO,
            jolt: PhaseSequence::new(),
            jolt_intensity: 0.0,
            jolt_offset: Vec2::ZERO,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Smoothed position without shake
    pub fn base_position(&self) -> Vec3 {
        self.base
    }

    /// Seconds the rig has been ticked
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Sustained shake for `duration` seconds. Restarts any sustained shake,
    /// leaves the impact jolt alone.
    pub fn shake(&mut self, duration: f32, intensity: f32) {
        if !self.shake_enabled {
            return;
        }
        let duration = duration.max(0.0);
        self.sustained = SustainedShake {
            timer: duration,
            duration,
            intensity,
        };
        log::debug!("Camera shake {duration:.2}s x{intensity:.2}");
    }

    /// Decaying impact jolt. Restarts any jolt, leaves the sustained shake alone.
    pub fn impact_shake(&mut self, intensity: f32, duration: f32) {
        if !self.shake_enabled {
            return;
        }
        self.jolt_intensity = intensity;
        self.jolt.start([Phase::new(JoltPhase::Decay, duration)]);
        log::debug!("Camera impact shake x{intensity:.2} over {duration:.2}s");
    }

    /// Dispatch a shake request
    pub fn request(&mut self, request: ShakeRequest) {
        match request {
            ShakeRequest::Sustained {
                duration,
                intensity,
            } => self.shake(duration, intensity),
            ShakeRequest::Impact {
                intensity,
                duration,
            } => self.impact_shake(intensity, duration),
        }
    }

    pub fn is_shaking(&self) -> bool {
        self.sustained.timer > 0.0 || self.jolt.is_active()
    }

    /// Current sustained shake offset
    pub fn shake_offset(&self) -> Vec2 {
        self.sustained_offset
    }

    /// Current impact jolt offset
    pub fn impact_offset(&self) -> Vec2 {
        self.jolt_offset
    }

    pub fn total_offset(&self) -> Vec2 {
        self.sustained_offset + self.jolt_offset
    }

    /// Advance one frame. Without a target the base stays put but shakes still run.
    pub fn tick(&mut self, dt: f32, target: Option<Vec2>) {
        self.time += dt;

        if let Some(target) = target {
            let target_pos = target.extend(0.0) + self.offset;
            self.base = self.base.lerp(target_pos, clamp01(self.lerp_speed * dt));
        }

        self.tick_sustained(dt);
        self.tick_jolt(dt);

        self.position = self.base + self.total_offset().extend(0.0);
    }

    fn tick_sustained(&mut self, dt: f32) {
        let shake = &mut self.sustained;
        if shake.timer <= 0.0 {
            self.sustained_offset = Vec2::ZERO;
            return;
        }
        shake.timer -= dt;
        // 1 = just started, 0 = ending
        let progress = if shake.duration > 0.0 {
            clamp01(shake.timer / shake.duration)
        } else {
            0.0
        };
        let amplitude = shake.intensity * progress;
        self.sustained_offset = Vec2::new(
            (self.time * SHAKE_FREQ_X).sin() * amplitude,
            (self.time * SHAKE_FREQ_Y).cos() * amplitude,
        );
    }

    fn tick_jolt(&mut self, dt: f32) {
        for event in self.jolt.tick(dt) {
            match event {
                SequenceEvent::Update { progress, .. } => {
                    let amplitude = self.jolt_intensity * (1.0 - progress);
                    self.jolt_offset = Vec2::new(
                        (self.time * IMPACT_FREQ_X).sin() * amplitude,
                        (self.time * IMPACT_FREQ_Y).cos() * amplitude,
                    );
                }
                SequenceEvent::Completed => self.jolt_offset = Vec2::ZERO,
                _ => {}
            }
        }
    }
}
