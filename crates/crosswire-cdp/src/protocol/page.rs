//! Page domain types.
//!
//! Navigation commands plus the frame lifecycle events the navigation
//! tracker is built from.

use serde::{Deserialize, Serialize};

/// Unique frame identifier.
pub type FrameId = String;

/// Identifier of the loader responsible for a document.
pub type LoaderId = String;

/// Parameters for Page.navigate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
    /// URL to navigate the frame to.
    pub url: String,
    /// Referrer URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Intended transition type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_type: Option<String>,
    /// Frame to navigate; the top frame when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
}

/// Result of Page.navigate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
    /// Frame that was navigated.
    pub frame_id: FrameId,
    /// Loader id for the navigation; absent for same-document navigations.
    pub loader_id: Option<LoaderId>,
    /// Error text when the navigation was rejected.
    pub error_text: Option<String>,
}

/// Parameters for Page.reload.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
    /// Whether to bypass the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_cache: Option<bool>,
}

/// Parameters for Page.setLifecycleEventsEnabled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLifecycleEventsEnabledParams {
    /// Whether lifecycle events are emitted.
    pub enabled: bool,
}

/// Parameters for Page.addScriptToEvaluateOnNewDocument.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScriptToEvaluateOnNewDocumentParams {
    /// Script source.
    pub source: String,
    /// Isolated world to evaluate the script in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_name: Option<String>,
    /// Run the script immediately on existing contexts as well.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_immediately: Option<bool>,
}

/// Result of Page.addScriptToEvaluateOnNewDocument.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScriptToEvaluateOnNewDocumentResult {
    /// Identifier of the installed script.
    pub identifier: String,
}

/// Parameters for Page.removeScriptToEvaluateOnNewDocument.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveScriptToEvaluateOnNewDocumentParams {
    /// Identifier returned by addScriptToEvaluateOnNewDocument.
    pub identifier: String,
}

/// Parameters for Page.createIsolatedWorld.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIsolatedWorldParams {
    /// Frame to create the world in.
    pub frame_id: FrameId,
    /// Name of the world.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_name: Option<String>,
    /// Whether to grant the world universal access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_univeral_access: Option<bool>,
}

/// Result of Page.createIsolatedWorld.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIsolatedWorldResult {
    /// Execution context of the created world.
    pub execution_context_id: i64,
}

/// Parameters for Page.handleJavaScriptDialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleJavaScriptDialogParams {
    /// Whether to accept or dismiss the dialog.
    pub accept: bool,
    /// Text to enter into a prompt before accepting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
}

/// Parameters for Page.captureScreenshot.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
    /// Image compression format ("png", "jpeg", "webp").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Compression quality for lossy formats (0..100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    /// Region of the page to capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<Viewport>,
    /// Capture beyond the viewport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_beyond_viewport: Option<bool>,
}

/// Result of Page.captureScreenshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureScreenshotResult {
    /// Base64-encoded image data.
    pub data: String,
}

/// Viewport clip region in CSS pixels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// X offset.
    pub x: f64,
    /// Y offset.
    pub y: f64,
    /// Rectangle width.
    pub width: f64,
    /// Rectangle height.
    pub height: f64,
    /// Page scale factor.
    pub scale: f64,
}

/// Parameters for Page.getNavigationHistory (none).
#[derive(Debug, Clone, Serialize, Default)]
pub struct GetNavigationHistoryParams {}

/// Result of Page.getNavigationHistory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNavigationHistoryResult {
    /// Index of the current entry.
    pub current_index: i64,
    /// History entries, oldest first.
    pub entries: Vec<NavigationEntry>,
}

/// One session history entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    /// Unique entry id.
    pub id: i64,
    /// Entry URL.
    pub url: String,
    /// URL the user typed.
    pub user_typed_url: String,
    /// Entry title.
    pub title: String,
    /// Transition type.
    pub transition_type: String,
}

/// Parameters for Page.navigateToHistoryEntry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateToHistoryEntryParams {
    /// Entry id to navigate to.
    pub entry_id: i64,
}

/// A frame in the frame tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Frame id.
    pub id: FrameId,
    /// Parent frame id, absent for the top frame.
    pub parent_id: Option<FrameId>,
    /// Loader id of the current document.
    pub loader_id: LoaderId,
    /// Frame document URL without fragment.
    pub url: String,
    /// Frame document URL fragment, including '#'.
    pub url_fragment: Option<String>,
}

/// Result of Page.getFrameTree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFrameTreeResult {
    /// Root of the frame tree.
    pub frame_tree: FrameTree,
}

/// Frame tree node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTree {
    /// The frame.
    pub frame: Frame,
    /// Child frames.
    pub child_frames: Option<Vec<FrameTree>>,
}

/// Event: Page.lifecycleEvent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    /// Frame the event belongs to.
    pub frame_id: FrameId,
    /// Loader the event belongs to.
    pub loader_id: LoaderId,
    /// Lifecycle event name ("init", "DOMContentLoaded", "load", ...).
    pub name: String,
    /// Monotonic timestamp.
    pub timestamp: f64,
}

/// Event: Page.frameAttached
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAttachedEvent {
    /// Attached frame id.
    pub frame_id: FrameId,
    /// Parent frame id.
    pub parent_frame_id: FrameId,
}

/// Event: Page.frameDetached
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDetachedEvent {
    /// Detached frame id.
    pub frame_id: FrameId,
    /// Why the frame was detached ("remove" or "swap").
    pub reason: Option<String>,
}

/// Event: Page.frameNavigated
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameNavigatedEvent {
    /// Navigated frame.
    pub frame: Frame,
    /// Navigation kind.
    #[serde(rename = "type")]
    pub navigation_type: Option<String>,
}

/// Event: Page.frameRequestedNavigation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequestedNavigationEvent {
    /// Frame that requested the navigation.
    pub frame_id: FrameId,
    /// Reason for the navigation.
    pub reason: String,
    /// Destination URL.
    pub url: String,
    /// Navigation disposition.
    pub disposition: Option<String>,
}

/// Event: Page.frameStartedNavigating
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStartedNavigatingEvent {
    /// Frame that started navigating.
    pub frame_id: FrameId,
    /// Destination URL.
    pub url: String,
    /// Loader id assigned to the navigation.
    pub loader_id: LoaderId,
    /// Navigation kind ("differentDocument", "sameDocument", ...).
    pub navigation_type: Option<String>,
}

/// Event: Page.navigatedWithinDocument
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatedWithinDocumentEvent {
    /// Frame that navigated.
    pub frame_id: FrameId,
    /// New document URL.
    pub url: String,
    /// Same-document navigation kind ("fragment", "historyApi").
    pub navigation_type: Option<String>,
}

/// Event: Page.javascriptDialogOpening
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavascriptDialogOpeningEvent {
    /// URL of the frame that opened the dialog.
    pub url: String,
    /// Dialog message.
    pub message: String,
    /// Dialog type ("alert", "confirm", "prompt", "beforeunload").
    #[serde(rename = "type")]
    pub dialog_type: String,
    /// Default prompt text.
    pub default_prompt: Option<String>,
}

/// Event: Page.javascriptDialogClosed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavascriptDialogClosedEvent {
    /// Frame the dialog belonged to.
    pub frame_id: Option<FrameId>,
    /// Whether the dialog was accepted.
    pub result: bool,
    /// Prompt text supplied by the user.
    pub user_input: String,
}
