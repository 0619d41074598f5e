//! Simulation context
//!
//! Owns every entity plus the shared camera, overlay and outbox. Systems get
//! at each other through this struct; there is no global lookup.

use glam::{Vec2, Vec3};

use super::camera::CameraRig;
use super::character::Character;
use super::hazard::Hazard;
use super::host::{EntityId, HostCommand, Outbox, Renderer};
use super::overlay::ScreenOverlay;
use super::prop::Prop;
use crate::{Settings, Tuning};

/// Default camera placement relative to the origin
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, -10.0);

#[derive(Debug)]
pub struct Simulation {
    pub characters: Vec<Character>,
    pub props: Vec<Prop>,
    pub hazards: Vec<Hazard>,
    pub camera: CameraRig,
    pub overlay: ScreenOverlay,
    pub outbox: Outbox,
    pub settings: Settings,
    pub tuning: Tuning,
    pub paused: bool,
    /// Simulated seconds, excluding paused time
    pub time: f32,
    pub tick_count: u64,
    /// Character driven by `TickInput::player` and followed by the camera
    pub player: Option<EntityId>,
    /// Integrate bodies here instead of leaving it to the host physics world
    pub integrate_bodies: bool,
    next_id: EntityId,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut sim = Self {
            characters: Vec::new(),
            props: Vec::new(),
            hazards: Vec::new(),
            camera: CameraRig::new(CAMERA_START, Vec2::ZERO, tuning.camera.lerp_speed),
            overlay: ScreenOverlay::new(tuning.overlay.clone()),
            outbox: Outbox::new(seed),
            settings: Settings::default(),
            tuning,
            paused: false,
            time: 0.0,
            tick_count: 0,
            player: None,
            integrate_bodies: true,
            next_id: 1,
        };
        sim.apply_settings(settings);
        log::info!("Simulation created with seed: {}", seed);
        sim
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Re-place the camera; the follow offset is captured from these positions
    pub fn place_camera(&mut self, position: Vec3, target: Vec2) {
        let shake_enabled = self.camera.shake_enabled;
        self.camera = CameraRig::new(position, target, self.tuning.camera.lerp_speed);
        self.camera.shake_enabled = shake_enabled;
    }

    /// Spawn the player character. The first one also becomes the camera target.
    pub fn spawn_player(&mut self, position: Vec2, renderers: Vec<Renderer>) -> EntityId {
        let id = self.spawn_character(position, renderers);
        if self.player.is_none() {
            self.player = Some(id);
        }
        id
    }

    pub fn spawn_character(&mut self, position: Vec2, renderers: Vec<Renderer>) -> EntityId {
        let id = self.next_entity_id();
        self.characters.push(Character::new(
            id,
            position,
            renderers,
            self.tuning.character.clone(),
        ));
        id
    }

    pub fn spawn_prop(&mut self, position: Vec2, renderers: Vec<Renderer>) -> EntityId {
        let id = self.next_entity_id();
        self.props
            .push(Prop::new(id, position, renderers, self.tuning.prop.clone()));
        id
    }

    pub fn spawn_hazard(&mut self, position: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.hazards
            .push(Hazard::new(id, position, self.tuning.hazard.clone()));
        id
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn prop(&self, id: EntityId) -> Option<&Prop> {
        self.props.iter().find(|p| p.id == id)
    }

    pub fn hazard(&self, id: EntityId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    pub fn player(&self) -> Option<&Character> {
        self.player.and_then(|id| self.character(id))
    }

    /// Push player preferences into the feedback services
    pub fn apply_settings(&mut self, settings: Settings) {
        self.camera.shake_enabled = settings.effective_screen_shake();
        self.overlay.flash_enabled = settings.effective_screen_flash();
        self.outbox.sfx_volume = settings.effective_sfx_volume();
        self.settings = settings;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
    }

    /// Ask the host to reload the scene
    pub fn request_restart(&mut self) {
        self.outbox.reset_scene();
        log::info!("Scene reset requested");
    }

    /// Host commands produced since the last drain
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        self.outbox.drain()
    }
}
