//! input module types.
//!
//! W3C Actions: per-source action lists, executed tick by tick.

use serde::Deserialize;

use crate::script::RemoteReference;

/// Parameters for input.performActions.
#[derive(Debug, Clone, Deserialize)]
pub struct PerformActionsParams {
    /// Top-level context to act on.
    pub context: String,
    /// One entry per input source.
    pub actions: Vec<SourceActions>,
}

/// Actions of one input source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceActions {
    /// A null source: only pauses.
    None {
        /// Source id.
        id: String,
        /// Action items.
        actions: Vec<NoneAction>,
    },
    /// A key source.
    Key {
        /// Source id.
        id: String,
        /// Action items.
        actions: Vec<KeyAction>,
    },
    /// A pointer source.
    Pointer {
        /// Source id.
        id: String,
        /// Pointer parameters.
        #[serde(default)]
        parameters: PointerParameters,
        /// Action items.
        actions: Vec<PointerAction>,
    },
    /// A wheel source.
    Wheel {
        /// Source id.
        id: String,
        /// Action items.
        actions: Vec<WheelAction>,
    },
}

impl SourceActions {
    /// The client-assigned source id.
    pub fn id(&self) -> &str {
        match self {
            Self::None { id, .. }
            | Self::Key { id, .. }
            | Self::Pointer { id, .. }
            | Self::Wheel { id, .. } => id,
        }
    }

    /// Number of action items for this source.
    pub fn len(&self) -> usize {
        match self {
            Self::None { actions, .. } => actions.len(),
            Self::Key { actions, .. } => actions.len(),
            Self::Pointer { actions, .. } => actions.len(),
            Self::Wheel { actions, .. } => actions.len(),
        }
    }

    /// Whether this source has no action items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pointer source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerParameters {
    /// Pointer kind.
    #[serde(default)]
    pub pointer_type: PointerType,
}

impl Default for PointerParameters {
    fn default() -> Self {
        Self {
            pointer_type: PointerType::Mouse,
        }
    }
}

/// Pointer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    /// Mouse pointer.
    #[default]
    Mouse,
    /// Pen pointer.
    Pen,
    /// Touch pointer.
    Touch,
}

impl PointerType {
    /// CDP pointerType string.
    pub fn as_cdp(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Pen => "pen",
            Self::Touch => "touch",
        }
    }
}

/// Action item of a null source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NoneAction {
    /// Do nothing for a duration.
    Pause {
        /// Pause length in milliseconds.
        duration: Option<u64>,
    },
}

/// Action item of a key source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KeyAction {
    /// Do nothing for a duration.
    Pause {
        /// Pause length in milliseconds.
        duration: Option<u64>,
    },
    /// Press a key.
    KeyDown {
        /// Key value: a single code point or a grapheme.
        value: String,
    },
    /// Release a key.
    KeyUp {
        /// Key value.
        value: String,
    },
}

/// Common pointer event properties.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointerCommonProperties {
    /// Contact width.
    pub width: Option<f64>,
    /// Contact height.
    pub height: Option<f64>,
    /// Pressure (0..1).
    pub pressure: Option<f64>,
    /// Tangential pressure.
    pub tangential_pressure: Option<f64>,
    /// Twist in degrees.
    pub twist: Option<u32>,
    /// Altitude angle in radians.
    pub altitude_angle: Option<f64>,
    /// Azimuth angle in radians.
    pub azimuth_angle: Option<f64>,
}

/// Action item of a pointer source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    /// Do nothing for a duration.
    Pause {
        /// Pause length in milliseconds.
        duration: Option<u64>,
    },
    /// Press a button.
    PointerDown {
        /// W3C button index (0 left, 1 middle, 2 right, ...).
        button: u32,
        /// Common properties.
        #[serde(flatten)]
        properties: PointerCommonProperties,
    },
    /// Release a button.
    PointerUp {
        /// W3C button index.
        button: u32,
    },
    /// Move the pointer.
    PointerMove {
        /// Destination x, relative to origin.
        x: f64,
        /// Destination y, relative to origin.
        y: f64,
        /// Movement duration in milliseconds.
        duration: Option<u64>,
        /// Coordinate origin.
        #[serde(default)]
        origin: Origin,
        /// Common properties.
        #[serde(flatten)]
        properties: PointerCommonProperties,
    },
}

/// Action item of a wheel source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WheelAction {
    /// Do nothing for a duration.
    Pause {
        /// Pause length in milliseconds.
        duration: Option<u64>,
    },
    /// Scroll.
    #[serde(rename_all = "camelCase")]
    Scroll {
        /// Scroll origin x.
        x: i64,
        /// Scroll origin y.
        y: i64,
        /// Horizontal scroll delta.
        delta_x: i64,
        /// Vertical scroll delta.
        delta_y: i64,
        /// Scroll duration in milliseconds.
        duration: Option<u64>,
        /// Coordinate origin.
        #[serde(default)]
        origin: Origin,
    },
}

/// Where pointer coordinates are relative to.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(untagged)]
pub enum Origin {
    /// A keyword origin: "viewport" or "pointer".
    Keyword(OriginKeyword),
    /// An element origin.
    Element {
        /// Marker; always "element".
        #[serde(rename = "type")]
        origin_type: String,
        /// The element.
        element: RemoteReference,
    },
    /// Viewport origin (the default).
    #[default]
    #[serde(skip)]
    Default,
}

/// Keyword origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKeyword {
    /// Relative to the viewport.
    Viewport,
    /// Relative to the current pointer position.
    Pointer,
}

/// Parameters for input.releaseActions.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseActionsParams {
    /// Top-level context whose input state to release.
    pub context: String,
}

/// Parameters for input.setFiles.
#[derive(Debug, Clone, Deserialize)]
pub struct SetFilesParams {
    /// Context owning the element.
    pub context: String,
    /// The file input element.
    pub element: RemoteReference,
    /// Absolute file paths.
    pub files: Vec<String>,
}

#[cfg(test)]
mod tests;
