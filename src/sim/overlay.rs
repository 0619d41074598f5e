//! Full-screen vignette overlay
//!
//! One animation owns `alpha` at a time: a linear fade toward 0 or 1, or a flash
//! (fade-in then fade-out) run as a phase sequence. Starting any animation replaces
//! the previous one and continues from the current alpha.

use serde::{Deserialize, Serialize};

use super::sequence::{Phase, PhaseSequence, SequenceEvent};
use crate::tuning::OverlayTuning;
use crate::{Color, clamp01, lerp};

/// Flash timeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashPhase {
    FadeIn,
    FadeOut,
}

#[derive(Debug, Clone)]
enum Animation {
    Idle,
    Fade {
        from: f32,
        to: f32,
        elapsed: f32,
        duration: f32,
    },
    Flash {
        from: f32,
        sequence: PhaseSequence<FlashPhase>,
    },
}

#[derive(Debug, Clone)]
pub struct ScreenOverlay {
    alpha: f32,
    color: Color,
    tuning: OverlayTuning,
    animation: Animation,
    /// Flashes are ignored while false
    pub flash_enabled: bool,
}

impl ScreenOverlay {
    pub fn new(tuning: OverlayTuning) -> Self {
        Self {
            alpha: 0.0,
            color: tuning.damage_color,
            tuning,
            animation: Animation::Idle,
            flash_enabled: true,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.animation, Animation::Idle)
    }

    /// Fade in with the damage color
    pub fn show(&mut self) {
        self.color = self.tuning.damage_color;
        self.fade_to(1.0, self.tuning.damage_fade_in);
    }

    /// Fade out
    pub fn hide(&mut self) {
        self.fade_to(0.0, self.tuning.damage_fade_out);
    }

    pub fn show_instant(&mut self) {
        self.animation = Animation::Idle;
        self.alpha = 1.0;
    }

    pub fn hide_instant(&mut self) {
        self.animation = Animation::Idle;
        self.alpha = 0.0;
    }

    /// One-shot flash. `color` overrides the hit color for this flash only.
    pub fn flash(&mut self, color: Option<Color>) {
        if !self.flash_enabled {
            return;
        }
        self.color = color.unwrap_or(self.tuning.hit_color);
        let mut sequence = PhaseSequence::new();
        sequence.start([
            Phase::new(FlashPhase::FadeIn, self.tuning.hit_fade_in),
            Phase::new(FlashPhase::FadeOut, self.tuning.hit_fade_out),
        ]);
        self.animation = Animation::Flash {
            from: self.alpha,
            sequence,
        };
        log::debug!("Overlay flash");
    }

    fn fade_to(&mut self, target: f32, duration: f32) {
        if duration <= 0.0 {
            self.animation = Animation::Idle;
            self.alpha = target;
            return;
        }
        self.animation = Animation::Fade {
            from: self.alpha,
            to: target,
            elapsed: 0.0,
            duration,
        };
    }

    pub fn tick(&mut self, dt: f32) {
        match &mut self.animation {
            Animation::Idle => {}
            Animation::Fade {
                from,
                to,
                elapsed,
                duration,
            } => {
                *elapsed += dt;
                let t = clamp01(*elapsed / *duration);
                self.alpha = lerp(*from, *to, t);
                if t >= 1.0 {
                    self.alpha = *to;
                    self.animation = Animation::Idle;
                }
            }
            Animation::Flash { from, sequence } => {
                let from = *from;
                let mut done = false;
                for event in sequence.tick(dt) {
                    match event {
                        SequenceEvent::Update {
                            phase: FlashPhase::FadeIn,
                            progress,
                            ..
                        } => self.alpha = lerp(from, 1.0, progress),
                        SequenceEvent::Update {
                            phase: FlashPhase::FadeOut,
                            progress,
                            ..
                        } => self.alpha = lerp(1.0, 0.0, progress),
                        SequenceEvent::Completed => done = true,
                        _ => {}
                    }
                }
                if done {
                    self.alpha = 0.0;
                    self.animation = Animation::Idle;
                }
            }
        }
    }

    /// Color to draw the vignette with, `None` when fully transparent
    pub fn draw_color(&self) -> Option<Color> {
        if self.alpha <= 0.0 {
            return None;
        }
        Some(self.color.with_alpha(self.alpha * self.color.a))
    }

    /// Vignette alpha mask sized for this overlay's tuning
    pub fn mask(&self, size: usize) -> Vec<f32> {
        vignette_mask(size, self.tuning.inner_radius, self.tuning.edge_softness)
    }
}

/// Square alpha mask, row-major: transparent inside `inner_radius` (normalized
/// distance from center), quadratic ease-in to opaque over `edge_softness`.
pub fn vignette_mask(size: usize, inner_radius: f32, edge_softness: f32) -> Vec<f32> {
    let half = size as f32 / 2.0;
    let mut pixels = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - half;
            let dy = y as f32 - half;
            let distance = if half > 0.0 {
                (dx * dx + dy * dy).sqrt() / half
            } else {
                0.0
            };
            let alpha = if distance <= inner_radius {
                0.0
            } else if edge_softness <= 0.0 {
                1.0
            } else {
                let t = clamp01((distance - inner_radius) / edge_softness);
                t * t
            };
            pixels.push(alpha);
        }
    }
    pixels
}
