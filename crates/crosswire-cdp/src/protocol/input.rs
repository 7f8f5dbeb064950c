//! Input domain types.
//!
//! Raw trusted-event dispatch. The action dispatcher lowers W3C action
//! sequences onto these params.

use serde::Serialize;

/// Parameters for Input.dispatchKeyEvent.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DispatchKeyEventParams {
    /// Event kind ("keyDown", "keyUp", "rawKeyDown", "char").
    #[serde(rename = "type")]
    pub event_type: String,
    /// Bit field of pressed modifiers (alt=1, ctrl=2, meta=4, shift=8).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<u32>,
    /// Text generated by the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text that would be generated without modifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmodified_text: Option<String>,
    /// DOM key value ("Enter", "a", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// DOM code value ("KeyA", "Enter", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Windows virtual key code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_virtual_key_code: Option<u32>,
    /// Key location (0 standard, 1 left, 2 right, 3 numpad).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    /// Whether the event was generated from auto repeat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_repeat: Option<bool>,
    /// Whether the event was generated from the keypad.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_keypad: Option<bool>,
    /// Editing commands to execute with the event (macOS only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
}

/// Parameters for Input.dispatchMouseEvent.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMouseEventParams {
    /// Event kind ("mousePressed", "mouseReleased", "mouseMoved", "mouseWheel").
    #[serde(rename = "type")]
    pub event_type: String,
    /// X coordinate in CSS pixels, relative to the viewport.
    pub x: f64,
    /// Y coordinate in CSS pixels, relative to the viewport.
    pub y: f64,
    /// Bit field of pressed modifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<u32>,
    /// Button that generated the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    /// Bit field of currently pressed buttons
    /// (left=1, right=2, middle=4, back=8, forward=16).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<u32>,
    /// Number of times the button was clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u32>,
    /// X delta for wheel events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_x: Option<f64>,
    /// Y delta for wheel events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_y: Option<f64>,
    /// Pointer type ("mouse" or "pen").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_type: Option<String>,
    /// Touch contact width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Touch contact height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Pointer pressure (0..1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<f64>,
    /// Pointer rotation angle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twist: Option<u32>,
    /// Pointer tilt about the X axis in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt_x: Option<f64>,
    /// Pointer tilt about the Y axis in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt_y: Option<f64>,
}

/// Parameters for Input.insertText.
#[derive(Debug, Clone, Serialize)]
pub struct InsertTextParams {
    /// Text to insert at the current selection.
    pub text: String,
}
