//! Per-frame simulation tick and collision routing
//!
//! Order within a tick: characters, props, hazards, then camera and overlay so
//! feedback reflects this frame's triggers.

use glam::Vec2;

use super::character::MoveInput;
use super::host::{EntityId, Feedback};
use super::state::Simulation;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement and dash for the player character
    pub player: MoveInput,
    /// Pause toggle
    pub pause: bool,
    /// Ask the host to reload the scene
    pub restart: bool,
}

/// Contact reported by the host physics world for a character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub character: EntityId,
    pub other: EntityId,
    pub point: Vec2,
    /// Contact normal pointing toward the character
    pub normal: Vec2,
}

/// Advance the simulation by `dt` seconds
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) {
    if input.pause {
        sim.set_paused(!sim.paused);
    }
    if input.restart {
        sim.request_restart();
    }
    if sim.paused {
        return;
    }

    sim.time += dt;
    sim.tick_count += 1;

    let player = sim.player;
    let integrate = sim.integrate_bodies;
    let mut fx = Feedback {
        camera: &mut sim.camera,
        overlay: &mut sim.overlay,
        outbox: &mut sim.outbox,
    };
    for character in &mut sim.characters {
        let moves = if Some(character.id) == player {
            input.player
        } else {
            MoveInput::default()
        };
        character.tick(dt, &moves, &mut fx);
        if integrate {
            character.body.integrate(dt);
        }
    }

    for prop in &mut sim.props {
        if integrate {
            prop.body.integrate(dt);
        }
        prop.tick(dt, &mut sim.outbox);
    }
    sim.props.retain(|p| !p.is_removed());

    for hazard in &mut sim.hazards {
        hazard.tick(dt);
    }

    let target = player
        .and_then(|id| sim.characters.iter().find(|c| c.id == id))
        .map(|c| c.body.position);
    sim.camera.tick(dt, target);
    sim.overlay.tick(dt);
}

/// Route a contact to whatever the character touched.
///
/// A dashing character sets a prop off before its own dash is cleared, so the
/// prop always sees the dash that hit it. Returns true if the contact had an effect.
pub fn handle_collision(sim: &mut Simulation, event: CollisionEvent) -> bool {
    let Some(character) = sim
        .characters
        .iter_mut()
        .find(|c| c.id == event.character)
    else {
        return false;
    };

    if let Some(prop) = sim.props.iter_mut().find(|p| p.id == event.other) {
        if !prop.on_contact(character.is_dashing(), event.point) {
            return false;
        }
        let sorting = character.sorting();
        sim.outbox
            .spawn(character.tuning().impact_effect.as_ref(), event.point, sorting);
        sim.overlay.flash(None);
        character.bounce_off(event.normal);
        return true;
    }

    if let Some(hazard) = sim.hazards.iter_mut().find(|h| h.id == event.other) {
        return hazard.on_contact(character, &mut sim.outbox);
    }

    false
}
