//! Damaging hazard
//!
//! Dashing into an armed hazard starts the character's damage sequence and
//! disarms the hazard until that sequence (plus a little slack) is over.

use glam::Vec2;

use super::character::{Character, MidpointContext, MidpointHook};
use super::host::{EntityId, Outbox, SortingContext};
use crate::consts::EXPLOSION_SORTING_ORDER;
use crate::tuning::HazardTuning;

#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: EntityId,
    pub position: Vec2,
    tuning: HazardTuning,
    rearm_timer: f32,
}

impl Hazard {
    pub fn new(id: EntityId, position: Vec2, tuning: HazardTuning) -> Self {
        Self {
            id,
            position,
            tuning,
            rearm_timer: 0.0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.rearm_timer <= 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        if self.rearm_timer > 0.0 {
            self.rearm_timer = (self.rearm_timer - dt).max(0.0);
            if self.rearm_timer == 0.0 {
                log::debug!("Hazard {} re-armed", self.id);
            }
        }
    }

    /// Collision report. Damages a dashing character while armed.
    pub fn on_contact(&mut self, character: &mut Character, outbox: &mut Outbox) -> bool {
        if !self.is_armed() || !character.is_dashing() {
            return false;
        }

        let effect = self.tuning.explosion_effect.clone();
        let on_midpoint: MidpointHook = Box::new(move |ctx: &MidpointContext, out: &mut Outbox| {
            out.spawn(
                effect.as_ref(),
                ctx.position,
                Some(SortingContext {
                    sorting_layer: ctx.sorting_layer.clone(),
                    sorting_order: EXPLOSION_SORTING_ORDER,
                }),
            );
        });

        if !character.take_damage(self.tuning.damage_params(), Some(on_midpoint), outbox) {
            return false;
        }
        outbox.play(self.tuning.hit_sound.as_ref(), self.position);
        self.rearm_timer = self.tuning.rearm_delay();
        log::info!("Hazard {} hit character {}", self.id, character.id);
        true
    }
}
