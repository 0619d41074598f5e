//! Tick-driven simulation module
//!
//! All feedback sequencing lives here. Nothing in this module keeps its own clock:
//! - Every stateful component advances only when ticked with a delta
//! - Side effects the host carries out go through the [`Outbox`]
//! - Seeded RNG only
//! - No rendering, audio or physics dependencies

pub mod camera;
pub mod character;
pub mod hazard;
pub mod host;
pub mod overlay;
pub mod prop;
pub mod sequence;
pub mod state;
pub mod tick;

pub use camera::CameraRig;
pub use character::{
    Character, DamageParams, DamagePhase, MidpointContext, MidpointHook, MotionState, MoveInput,
    RenderLayer, RespawnAnchor, ShakeRequest,
};
pub use hazard::Hazard;
pub use host::{
    Body, EffectId, EntityId, Feedback, HostCommand, LayerMask, Outbox, Renderer, SortingContext,
    SoundCue, SoundId,
};
pub use overlay::{ScreenOverlay, vignette_mask};
pub use prop::{ImpactPhase, Prop, PropState};
pub use sequence::{Phase, PhaseSequence, SequenceEvent};
pub use state::Simulation;
pub use tick::{CollisionEvent, TickInput, handle_collision, tick};
