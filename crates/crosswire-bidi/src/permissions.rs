//! permissions module types.

use serde::Deserialize;

/// Permission descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionDescriptor {
    /// Permission name ("geolocation", "notifications", ...).
    pub name: String,
}

/// Permission states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Granted.
    Granted,
    /// Denied.
    Denied,
    /// Prompt on use.
    Prompt,
}

impl PermissionState {
    /// CDP permission setting string.
    pub fn as_cdp(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
        }
    }
}

/// Parameters for permissions.setPermission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionParams {
    /// Which permission.
    pub descriptor: PermissionDescriptor,
    /// Desired state.
    pub state: PermissionState,
    /// Origin the permission applies to.
    pub origin: String,
    /// User context to apply in.
    pub user_context: Option<String>,
}
