//! Timed phase sequences
//!
//! A [`PhaseSequence`] is a slot an entity owns for one kind of timed effect
//! (damage sequence, hitstop, impact jolt, overlay flash). It holds at most one
//! running timeline of [`Phase`]s and is advanced explicitly with [`PhaseSequence::tick`].
//!
//! Instead of calling closures, `tick` returns the [`SequenceEvent`]s that happened
//! during the step, in order. The owner matches on them with full mutable access to
//! its own state, which keeps the borrow checker out of the way.
//!
//! Timing rules:
//! - A phase's clock restarts at 0 when it becomes current; leftover time from the
//!   previous phase is dropped.
//! - The first phase is entered on the first tick after `start`. Later phases are
//!   entered in the same tick their predecessor finishes.
//! - Zero-duration phases run one update with progress 1 and finish in the tick
//!   they are entered.
//! - `start` on an occupied slot discards the old timeline; its `Completed` is never emitted.

use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::consts::TIME_EPSILON;

/// A timed segment of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase<K> {
    pub kind: K,
    /// Seconds, never negative
    pub duration: f32,
}

impl<K> Phase<K> {
    pub fn new(kind: K, duration: f32) -> Self {
        Self {
            kind,
            duration: duration.max(0.0),
        }
    }
}

/// Something that happened while ticking a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceEvent<K> {
    /// Phase became current
    Entered(K),
    /// Per-tick update; `elapsed` is clamped to the phase duration
    Update { phase: K, elapsed: f32, progress: f32 },
    /// Phase reached its duration
    Finished(K),
    /// Last phase finished, slot is now empty
    Completed,
}

#[derive(Debug, Clone)]
struct Running<K> {
    phases: Vec<Phase<K>>,
    index: usize,
    elapsed: f32,
    entered: bool,
}

/// Slot holding at most one running phase timeline
#[derive(Debug, Clone)]
pub struct PhaseSequence<K> {
    running: Option<Running<K>>,
}

impl<K> Default for PhaseSequence<K> {
    fn default() -> Self {
        Self { running: None }
    }
}

impl<K: Copy> PhaseSequence<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new timeline, replacing any running one.
    ///
    /// Returns true if a running timeline was discarded.
    pub fn start(&mut self, phases: impl IntoIterator<Item = Phase<K>>) -> bool {
        let replaced = self.running.is_some();
        self.running = Some(Running {
            phases: phases.into_iter().collect(),
            index: 0,
            elapsed: 0.0,
            entered: false,
        });
        replaced
    }

    /// Clear the slot without completing. Returns true if something was running.
    pub fn cancel(&mut self) -> bool {
        self.running.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Kind of the current phase, if any
    pub fn current(&self) -> Option<K> {
        let run = self.running.as_ref()?;
        run.phases.get(run.index).map(|p| p.kind)
    }

    /// Seconds spent in the current phase
    pub fn elapsed(&self) -> f32 {
        self.running.as_ref().map_or(0.0, |r| r.elapsed)
    }

    /// Sum of all phase durations of the running timeline
    pub fn total_duration(&self) -> f32 {
        self.running
            .as_ref()
            .map_or(0.0, |r| r.phases.iter().map(|p| p.duration).sum())
    }

    /// Advance the running timeline by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<SequenceEvent<K>> {
        let Some(run) = self.running.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();

        if let Some(phase) = run.phases.get(run.index).copied() {
            if !run.entered {
                run.entered = true;
                events.push(SequenceEvent::Entered(phase.kind));
            }

            run.elapsed += dt.max(0.0);
            let done = run.elapsed >= phase.duration - TIME_EPSILON;
            let progress = if done {
                1.0
            } else {
                clamp01(run.elapsed / phase.duration)
            };
            events.push(SequenceEvent::Update {
                phase: phase.kind,
                elapsed: run.elapsed.min(phase.duration),
                progress,
            });
            if !done {
                return events;
            }
            events.push(SequenceEvent::Finished(phase.kind));
            run.index += 1;
            run.elapsed = 0.0;
            run.entered = false;

            // Enter the next phase now; zero-duration phases run to completion inline
            while let Some(next) = run.phases.get(run.index).copied() {
                run.entered = true;
                events.push(SequenceEvent::Entered(next.kind));
                if next.duration > 0.0 {
                    return events;
                }
                events.push(SequenceEvent::Update {
                    phase: next.kind,
                    elapsed: 0.0,
                    progress: 1.0,
                });
                events.push(SequenceEvent::Finished(next.kind));
                run.index += 1;
                run.entered = false;
            }
        }

        self.running = None;
        events.push(SequenceEvent::Completed);
        events
    }
}
