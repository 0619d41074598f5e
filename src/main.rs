//! Dash Juice headless demo
//!
//! Runs a scripted session against the simulation core and logs every host
//! command it produces. Usage: `dash-juice [tuning.json] [seed]`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use dash_juice::consts::*;
use dash_juice::sim::{
    CollisionEvent, HostCommand, MoveInput, Renderer, Simulation, TickInput, handle_collision,
    tick,
};
use dash_juice::{Color, Settings, Tuning};

/// Contact distance for the demo's stand-in physics
const CONTACT_RADIUS: f32 = 0.6;
/// Simulated session length (seconds)
const SESSION_LENGTH: f32 = 20.0;

struct Demo {
    sim: Simulation,
    input: TickInput,
    rng: Pcg32,
    accumulator: f32,
    steer_timer: f32,
}

impl Demo {
    fn new(seed: u64, tuning: Tuning) -> Self {
        let mut sim = Simulation::new(seed, tuning, Settings::default());
        sim.spawn_player(Vec2::ZERO, vec![Renderer::new(0, "Characters")]);
        for i in 0..6 {
            let angle = i as f32 * std::f32::consts::TAU / 6.0;
            let pos = Vec2::from_angle(angle) * 3.0;
            if i % 3 == 0 {
                sim.spawn_hazard(pos);
            } else {
                let tint = Color::new(0.8, 0.7, 0.5, 1.0);
                sim.spawn_prop(pos, vec![Renderer::new(0, "Props").with_tint(tint)]);
            }
        }
        Self {
            sim,
            input: TickInput::default(),
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            accumulator: 0.0,
            steer_timer: 0.0,
        }
    }

    /// Pick a new heading every so often, sometimes dash
    fn steer(&mut self, dt: f32) {
        self.steer_timer -= dt;
        if self.steer_timer > 0.0 {
            return;
        }
        self.steer_timer = self.rng.random_range(0.2..0.8);
        self.input.player = MoveInput {
            up: self.rng.random_bool(0.4),
            down: self.rng.random_bool(0.4),
            left: self.rng.random_bool(0.4),
            right: self.rng.random_bool(0.4),
            dash: self.rng.random_bool(0.5),
        };
    }

    /// Stand-in for the host physics world: proximity contacts with the player
    fn contacts(&self) -> Vec<CollisionEvent> {
        let Some(player) = self.sim.player() else {
            return Vec::new();
        };
        let pos = player.body.position;
        let mut events = Vec::new();
        let props = self
            .sim
            .props
            .iter()
            .filter(|p| p.body.collider_enabled)
            .map(|p| (p.id, p.body.position));
        let hazards = self.sim.hazards.iter().map(|h| (h.id, h.position));
        for (id, other) in props.chain(hazards) {
            if pos.distance(other) < CONTACT_RADIUS {
                events.push(CollisionEvent {
                    character: player.id,
                    other: id,
                    point: (pos + other) * 0.5,
                    normal: (pos - other).normalize_or_zero(),
                });
            }
        }
        events
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.steer(SIM_DT);
            let input = self.input;
            tick(&mut self.sim, &input, SIM_DT);
            for event in self.contacts() {
                handle_collision(&mut self.sim, event);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.player.dash = false;
            self.input.pause = false;
            self.input.restart = false;
        }

        for command in self.sim.drain_commands() {
            log_command(self.sim.time, &command);
        }
    }
}

fn log_command(time: f32, command: &HostCommand) {
    match command {
        HostCommand::PlaySound { clip, volume, .. } => {
            log::info!("[{time:6.2}] play {} at {volume:.2}", clip.0);
        }
        HostCommand::SpawnEffect {
            effect, position, ..
        } => log::info!("[{time:6.2}] spawn {} at {position:?}", effect.0),
        other => log::info!("[{time:6.2}] {other:?}"),
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Dash Juice (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);

    match tuning.to_json() {
        Ok(json) => log::debug!("Tuning in effect:\n{json}"),
        Err(e) => log::warn!("Could not serialize tuning: {e}"),
    }

    let mut demo = Demo::new(seed, tuning);
    let mut frame_rng = Pcg32::seed_from_u64(seed);
    while demo.sim.time < SESSION_LENGTH {
        // Jittery frame times, like a real display loop
        let frame = SIM_DT * frame_rng.random_range(0.8..1.6);
        demo.update(frame);
    }

    let remaining = demo.sim.props.len();
    log::info!(
        "Session over after {} ticks, {} props left standing",
        demo.sim.tick_count,
        remaining
    );
}
