//! BluetoothEmulation domain types.

use serde::Serialize;

/// Parameters for BluetoothEmulation.enable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    /// Simulated adapter state ("absent", "powered-off", "powered-on").
    pub state: String,
    /// Whether the adapter supports BLE.
    pub le_supported: bool,
}

/// Parameters for BluetoothEmulation.disable (none).
#[derive(Debug, Clone, Serialize, Default)]
pub struct DisableParams {}
