// CV/gate output mapper - Turns fire events into per-channel CV values

use crate::cv::config::{ConfigId, CvOutputConfig, OutputKind};
use crate::cv::interface::AudioInterface;
use crate::sequencer::evaluator::FireEvent;
use crate::sequencer::track::Track;

/// DAC full scale assumed for normalization, in volts
const FULL_SCALE_VOLTS: f32 = 10.0;

/// A value change on one physical output channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CvEvent {
    /// Pitch CV level for a channel, normalized to the DAC full scale.
    /// `slide` asks the receiving voice to slew into the new level.
    Pitch {
        channel: u16,
        value: f32,
        slide: bool,
    },
    GateOn {
        channel: u16,
        accent: bool,
    },
    GateOff {
        channel: u16,
    },
}

/// Pitch CV for a MIDI note on a 1 V/oct scale, C4 = 0 V,
/// normalized to a +/-10 V full scale
pub fn pitch_cv(note: u8) -> f32 {
    let volts = (note as f32 - 60.0) / 12.0;
    (volts / FULL_SCALE_VOLTS).clamp(-1.0, 1.0)
}

/// A gate currently held high, counting down in clock pulses
#[derive(Debug, Clone, Copy)]
struct ActiveGate {
    channel: u16,
    remaining_pulses: u16,
}

/// Maps (track, fired step) events to physical output channels
///
/// Holds the active configuration set and the countdown state of open
/// gates. Config back-references into deleted tracks are skipped, never
/// an error.
#[derive(Debug, Default)]
pub struct CvGateMapper {
    configs: Vec<CvOutputConfig>,
    gates: Vec<ActiveGate>,
}

impl CvGateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configs(&self) -> &[CvOutputConfig] {
        &self.configs
    }

    pub fn config(&self, id: ConfigId) -> Option<&CvOutputConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// Rebuild the default channel assignment for an interface
    ///
    /// Track i (0-based) tentatively takes pitch on channel 2i+1 and
    /// gate on 2i+2; an assignment is committed only while the channel
    /// fits the interface's output budget, so tracks beyond the budget
    /// are silently dropped. Non-DC-coupled interfaces never carry CV
    /// and end up with an empty set. Replaces the whole configuration.
    pub fn configure_for_interface(&mut self, interface: &AudioInterface, tracks: &[Track]) {
        self.configs.clear();
        self.gates.clear();

        if !interface.dc_coupled {
            return;
        }

        for (i, track) in tracks.iter().enumerate() {
            let pitch_channel = (2 * i + 1) as u16;
            let gate_channel = (2 * i + 2) as u16;

            if pitch_channel <= interface.output_count {
                self.configs.push(CvOutputConfig::new(
                    pitch_channel,
                    OutputKind::Pitch,
                    Some(track.id),
                ));
            }
            if gate_channel <= interface.output_count {
                self.configs.push(CvOutputConfig::new(
                    gate_channel,
                    OutputKind::Gate,
                    Some(track.id),
                ));
            }
        }
    }

    /// Append one unassigned config on the next free channel
    ///
    /// No-op when the interface's channel budget is exhausted or no
    /// interface is selected.
    pub fn add_config(&mut self, interface: Option<&AudioInterface>) -> Option<ConfigId> {
        let interface = interface?;
        let next_channel = self
            .configs
            .iter()
            .map(|c| c.channel)
            .max()
            .unwrap_or(0)
            + 1;

        if next_channel > interface.output_count {
            return None;
        }

        let config = CvOutputConfig::new(next_channel, OutputKind::Pitch, None);
        let id = config.id;
        self.configs.push(config);
        Some(id)
    }

    /// Replace the whole configuration set, e.g. when restoring a
    /// snapshot; open gates are dropped
    pub fn set_configs(&mut self, configs: Vec<CvOutputConfig>) {
        self.configs = configs;
        self.gates.clear();
    }

    /// Replace the config with a matching id; unknown ids are ignored
    pub fn update_config(&mut self, config: CvOutputConfig) {
        if let Some(existing) = self.configs.iter_mut().find(|c| c.id == config.id) {
            *existing = config;
        }
    }

    /// Delete a config by id; unknown ids are ignored
    pub fn remove_config(&mut self, id: ConfigId) {
        self.configs.retain(|c| c.id != id);
    }

    /// Map one fire event to CV events on the channels assigned to its
    /// track
    ///
    /// A gate that is still high on its channel restarts its countdown
    /// rather than emitting a second edge.
    pub fn map_fire(&mut self, event: &FireEvent) -> Vec<CvEvent> {
        let mut out = Vec::new();

        for config in &self.configs {
            if config.track_id != Some(event.track_id) {
                continue;
            }

            match config.kind {
                OutputKind::Pitch => {
                    out.push(CvEvent::Pitch {
                        channel: config.channel,
                        value: pitch_cv(event.note),
                        slide: event.slide,
                    });
                }
                OutputKind::Gate => {
                    let remaining = event.length.max(1) as u16;
                    if let Some(gate) = self
                        .gates
                        .iter_mut()
                        .find(|g| g.channel == config.channel)
                    {
                        gate.remaining_pulses = remaining;
                    } else {
                        self.gates.push(ActiveGate {
                            channel: config.channel,
                            remaining_pulses: remaining,
                        });
                        out.push(CvEvent::GateOn {
                            channel: config.channel,
                            accent: event.accent,
                        });
                    }
                }
            }
        }

        out
    }

    /// Advance gate countdowns by `pulses`, releasing expired gates
    pub fn advance(&mut self, pulses: u16) -> Vec<CvEvent> {
        let mut out = Vec::new();

        self.gates.retain_mut(|gate| {
            gate.remaining_pulses = gate.remaining_pulses.saturating_sub(pulses);
            if gate.remaining_pulses == 0 {
                out.push(CvEvent::GateOff {
                    channel: gate.channel,
                });
                false
            } else {
                true
            }
        });

        out
    }

    /// Release every open gate, used when the transport stops
    pub fn all_gates_off(&mut self) -> Vec<CvEvent> {
        self.gates
            .drain(..)
            .map(|gate| CvEvent::GateOff {
                channel: gate.channel,
            })
            .collect()
    }
}
