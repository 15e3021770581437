// Audio/CV interface descriptors and host device discovery

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};

/// Interfaces known to expose DC-coupled outputs usable for CV
///
/// Matched as a substring of the device name reported by the host.
/// Everything else is assumed AC-coupled and never receives CV.
const DC_COUPLED_MODELS: [&str; 5] = [
    "ES-3",
    "ES-8",
    "ES-9",
    "MOTU 828",
    "MOTU UltraLite",
];

/// Descriptor of an audio/CV interface as the engine sees it
///
/// The engine never talks to drivers; it only needs the channel budget
/// and whether the outputs can carry DC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInterface {
    pub name: String,
    pub output_count: u16,
    pub dc_coupled: bool,
}

impl AudioInterface {
    pub fn new(name: impl Into<String>, output_count: u16, dc_coupled: bool) -> Self {
        Self {
            name: name.into(),
            output_count,
            dc_coupled,
        }
    }
}

/// Lists the host's output devices as interface descriptors
///
/// Lives on the collaborator side of the engine boundary: the engine
/// consumes descriptors through `select_audio_interface` and does not
/// care where they came from.
pub struct InterfaceManager {
    host: cpal::Host,
}

impl InterfaceManager {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List all output devices as interface descriptors
    pub fn list_output_interfaces(&self) -> Vec<AudioInterface> {
        let mut interfaces = Vec::new();

        if let Ok(devices) = self.host.output_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    let output_count = device
                        .default_output_config()
                        .map(|config| config.channels())
                        .unwrap_or(2);

                    interfaces.push(AudioInterface {
                        dc_coupled: is_dc_coupled(&name),
                        name,
                        output_count,
                    });
                }
            }
        }

        interfaces
    }

    /// Descriptor for the default output device, if any
    pub fn default_output_interface(&self) -> Option<AudioInterface> {
        let device = self.host.default_output_device()?;
        let name = device.name().ok()?;
        let output_count = device
            .default_output_config()
            .map(|config| config.channels())
            .unwrap_or(2);

        Some(AudioInterface {
            dc_coupled: is_dc_coupled(&name),
            name,
            output_count,
        })
    }
}

impl Default for InterfaceManager {
    fn default() -> Self {
        Self::new()
    }
}

fn is_dc_coupled(device_name: &str) -> bool {
    DC_COUPLED_MODELS
        .iter()
        .any(|model| device_name.contains(model))
}
