//! bluetooth.* command processor.

use std::sync::Arc;

use crosswire_bidi::bluetooth as bidi_bluetooth;
use crosswire_bidi::{BidiError, Command};
use crosswire_cdp::protocol::bluetooth as cdp_bluetooth;
use serde_json::Value;

use crate::error::{cdp_to_bidi, Result};
use crate::target::manager::CdpTargetManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles bluetooth.* commands.
pub struct BluetoothProcessor {
    manager: Arc<CdpTargetManager>,
}

impl BluetoothProcessor {
    /// New processor.
    pub fn new(manager: Arc<CdpTargetManager>) -> Self {
        Self { manager }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "simulateAdapter" => {
                let params: bidi_bluetooth::SimulateAdapterParams = parse_params(&command)?;
                let target = self
                    .manager
                    .target_for_context(&params.context)
                    .await
                    .ok_or_else(|| BidiError::no_such_frame(&params.context))?;
                target
                    .session()
                    .send_command::<_, Value>(
                        "BluetoothEmulation.enable",
                        Some(cdp_bluetooth::EnableParams {
                            state: params.state.as_cdp().to_string(),
                            le_supported: params.le_supported.unwrap_or(true),
                        }),
                    )
                    .await
                    .map_err(|e| cdp_to_bidi(&e))?;
                Ok(empty_result())
            }
            "disableSimulation" => {
                let params: bidi_bluetooth::DisableSimulationParams = parse_params(&command)?;
                let target = self
                    .manager
                    .target_for_context(&params.context)
                    .await
                    .ok_or_else(|| BidiError::no_such_frame(&params.context))?;
                target
                    .session()
                    .send_command::<_, Value>(
                        "BluetoothEmulation.disable",
                        Some(cdp_bluetooth::DisableParams {}),
                    )
                    .await
                    .map_err(|e| cdp_to_bidi(&e))?;
                Ok(empty_result())
            }
            other => Err(unknown_operation("bluetooth", other)),
        }
    }
}
