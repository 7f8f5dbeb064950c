//! bluetooth module types.

use serde::Deserialize;

/// Simulated adapter states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterState {
    /// No adapter present.
    Absent,
    /// Adapter present but powered off.
    PoweredOff,
    /// Adapter powered on.
    PoweredOn,
}

impl AdapterState {
    /// CDP BluetoothEmulation state string.
    pub fn as_cdp(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::PoweredOff => "powered-off",
            Self::PoweredOn => "powered-on",
        }
    }
}

/// Parameters for bluetooth.simulateAdapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateAdapterParams {
    /// Context to simulate in.
    pub context: String,
    /// Simulated adapter state.
    pub state: AdapterState,
    /// Whether the adapter supports BLE.
    pub le_supported: Option<bool>,
}

/// Parameters for bluetooth.disableSimulation.
#[derive(Debug, Clone, Deserialize)]
pub struct DisableSimulationParams {
    /// Context to stop simulating in.
    pub context: String,
}
