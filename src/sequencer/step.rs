// Step - One slot in a track
// Holds the trigger flag, note data and per-step parameter locks

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for steps
pub type StepId = u64;

/// Clock pulses per sixteenth-note step (24 PPQN)
pub const PULSES_PER_STEP: u16 = 6;

/// Global entity ID generator (atomic for thread-safety)
/// Shared by steps, tracks, patterns and CV configs so an id is unique
/// across entity kinds within a process run.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique entity ID
pub fn mint_entity_id() -> u64 {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Raise the id counter above `floor` so ids minted after restoring a
/// snapshot never collide with ids already present in it.
pub fn claim_id_floor(floor: u64) {
    NEXT_ENTITY_ID.fetch_max(floor + 1, Ordering::Relaxed);
}

/// Parameter a step can lock for the tick where it is the cursor step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockableParam {
    Note,
    Velocity,
    Length,
    Probability,
}

/// A per-step override record, active only while the step is current
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterLock {
    pub param: LockableParam,
    pub value: i32,
}

/// One slot in a track
///
/// All numeric fields clamp on mutation and are never rejected:
/// `note` 0-127, `velocity` 1-127, `length` 1-96 (24 PPQN pulses, 6 per
/// step), `micro_timing` -50..=50 (signed percent of one tick window),
/// `probability` 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier
    pub id: StepId,

    /// Position within the owning track, immutable after creation
    pub index: usize,

    /// Trigger enabled
    pub is_on: bool,

    note: u8,
    velocity: u8,
    length: u8,
    micro_timing: i8,
    probability: u8,

    pub slide: bool,
    pub accent: bool,

    /// Per-step parameter locks, keyed by parameter name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    locks: Vec<ParameterLock>,
}

impl Step {
    /// Create a new step at the given track position, trigger off
    pub fn new(index: usize) -> Self {
        Self {
            id: mint_entity_id(),
            index,
            is_on: false,
            note: 60,
            velocity: 100,
            length: PULSES_PER_STEP as u8,
            micro_timing: 0,
            probability: 100,
            slide: false,
            accent: false,
            locks: Vec::new(),
        }
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn micro_timing(&self) -> i8 {
        self.micro_timing
    }

    pub fn probability(&self) -> u8 {
        self.probability
    }

    /// Set the MIDI note, clamped to 0-127
    pub fn set_note(&mut self, note: i32) {
        self.note = note.clamp(0, 127) as u8;
    }

    /// Set the velocity, clamped to 1-127
    pub fn set_velocity(&mut self, velocity: i32) {
        self.velocity = velocity.clamp(1, 127) as u8;
    }

    /// Set the gate length in pulses, clamped to 1-96
    pub fn set_length(&mut self, length: i32) {
        self.length = length.clamp(1, 96) as u8;
    }

    /// Set the micro-timing offset, clamped to -50..=50
    ///
    /// The offset shifts the trigger inside its own tick window; the
    /// +/-50 bound keeps it from crossing into a neighboring step.
    pub fn set_micro_timing(&mut self, offset: i32) {
        self.micro_timing = offset.clamp(-50, 50) as i8;
    }

    /// Set the fire probability in percent, clamped to 0-100
    pub fn set_probability(&mut self, probability: i32) {
        self.probability = probability.clamp(0, 100) as u8;
    }

    /// Adjust velocity by a signed delta, result clamped to 1-127
    pub fn adjust_velocity(&mut self, delta: i32) {
        self.set_velocity(self.velocity as i32 + delta);
    }

    /// Adjust micro-timing by a signed delta, result clamped to -50..=50
    pub fn adjust_micro_timing(&mut self, delta: i32) {
        self.set_micro_timing(self.micro_timing as i32 + delta);
    }

    /// Set or replace the lock for one parameter
    ///
    /// The value is clamped to the parameter's own domain at set time so
    /// lock resolution never has to re-validate.
    pub fn set_lock(&mut self, param: LockableParam, value: i32) {
        let value = match param {
            LockableParam::Note => value.clamp(0, 127),
            LockableParam::Velocity => value.clamp(1, 127),
            LockableParam::Length => value.clamp(1, 96),
            LockableParam::Probability => value.clamp(0, 100),
        };

        if let Some(lock) = self.locks.iter_mut().find(|l| l.param == param) {
            lock.value = value;
        } else {
            self.locks.push(ParameterLock { param, value });
        }
    }

    /// Remove the lock for one parameter, if present
    pub fn clear_lock(&mut self, param: LockableParam) {
        self.locks.retain(|l| l.param != param);
    }

    /// Get the lock value for one parameter, if present
    pub fn lock(&self, param: LockableParam) -> Option<i32> {
        self.locks
            .iter()
            .find(|l| l.param == param)
            .map(|l| l.value)
    }

    pub fn locks(&self) -> &[ParameterLock] {
        &self.locks
    }

    /// Note with the step's lock applied
    pub fn effective_note(&self) -> u8 {
        self.lock(LockableParam::Note)
            .map_or(self.note, |v| v as u8)
    }

    /// Velocity with the step's lock applied
    pub fn effective_velocity(&self) -> u8 {
        self.lock(LockableParam::Velocity)
            .map_or(self.velocity, |v| v as u8)
    }

    /// Length with the step's lock applied
    pub fn effective_length(&self) -> u8 {
        self.lock(LockableParam::Length)
            .map_or(self.length, |v| v as u8)
    }

    /// Probability with the step's lock applied
    pub fn effective_probability(&self) -> u8 {
        self.lock(LockableParam::Probability)
            .map_or(self.probability, |v| v as u8)
    }
}
