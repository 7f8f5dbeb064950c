//! browsingContext module types.

use serde::{Deserialize, Serialize};

/// Browsing context identifier.
pub type BrowsingContext = String;

/// Navigation identifier.
pub type Navigation = String;

/// How long a navigate / reload command waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    /// Return as soon as the navigation starts.
    None,
    /// Return at DOMContentLoaded.
    Interactive,
    /// Return at load.
    #[default]
    Complete,
}

/// Parameters for browsingContext.create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    /// Kind of top-level context to create.
    #[serde(rename = "type")]
    pub context_type: CreateType,
    /// Context to open the new one next to.
    pub reference_context: Option<BrowsingContext>,
    /// Whether to create in the background.
    #[serde(default)]
    pub background: bool,
    /// User context to create in.
    pub user_context: Option<String>,
}

/// Kind of created context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateType {
    /// A tab.
    Tab,
    /// A window.
    Window,
}

/// Result of browsingContext.create.
#[derive(Debug, Clone, Serialize)]
pub struct CreateResult {
    /// Id of the new top-level context.
    pub context: BrowsingContext,
}

/// Parameters for browsingContext.navigate.
#[derive(Debug, Clone, Deserialize)]
pub struct NavigateParams {
    /// Context to navigate.
    pub context: BrowsingContext,
    /// Destination URL.
    pub url: String,
    /// Readiness to wait for.
    #[serde(default)]
    pub wait: ReadinessState,
}

/// Result of browsingContext.navigate / reload.
#[derive(Debug, Clone, Serialize)]
pub struct NavigateResult {
    /// The navigation, absent for navigations that never started.
    pub navigation: Option<Navigation>,
    /// Final URL.
    pub url: String,
}

/// Parameters for browsingContext.reload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
    /// Context to reload.
    pub context: BrowsingContext,
    /// Whether to bypass the cache.
    pub ignore_cache: Option<bool>,
    /// Readiness to wait for.
    #[serde(default)]
    pub wait: ReadinessState,
}

/// Parameters for browsingContext.close.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseParams {
    /// Top-level context to close.
    pub context: BrowsingContext,
    /// Whether beforeunload prompts run.
    #[serde(default)]
    pub prompt_unload: bool,
}

/// Parameters for browsingContext.activate.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivateParams {
    /// Top-level context to bring to the foreground.
    pub context: BrowsingContext,
}

/// Parameters for browsingContext.getTree.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetTreeParams {
    /// Depth limit.
    pub max_depth: Option<u64>,
    /// Subtree root; all top-level contexts when omitted.
    pub root: Option<BrowsingContext>,
}

/// One node of the context tree.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// Context id.
    pub context: BrowsingContext,
    /// Current document URL.
    pub url: String,
    /// Child contexts; `None` when pruned by maxDepth.
    pub children: Option<Vec<Info>>,
    /// Parent context id, for non-root nodes when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<BrowsingContext>,
    /// Owning user context.
    pub user_context: String,
    /// Opener context, when the context was opened by script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_opener: Option<BrowsingContext>,
}

/// Result of browsingContext.getTree.
#[derive(Debug, Clone, Serialize)]
pub struct GetTreeResult {
    /// Matching tree nodes.
    pub contexts: Vec<Info>,
}

/// Parameters for browsingContext.traverseHistory.
#[derive(Debug, Clone, Deserialize)]
pub struct TraverseHistoryParams {
    /// Top-level context whose history to traverse.
    pub context: BrowsingContext,
    /// Steps to move; negative is back.
    pub delta: i64,
}

/// Parameters for browsingContext.handleUserPrompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleUserPromptParams {
    /// Context showing the prompt.
    pub context: BrowsingContext,
    /// Whether to accept; dismiss when false or omitted.
    pub accept: Option<bool>,
    /// Text for prompt dialogs.
    pub user_text: Option<String>,
}

/// Parameters for browsingContext.captureScreenshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
    /// Context to capture.
    pub context: BrowsingContext,
    /// Capture origin ("viewport" or "document").
    #[serde(default)]
    pub origin: ScreenshotOrigin,
    /// Image format.
    pub format: Option<ImageFormat>,
    /// Clip rectangle.
    pub clip: Option<ClipRectangle>,
}

/// Screenshot origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotOrigin {
    /// Capture the viewport.
    #[default]
    Viewport,
    /// Capture the full document.
    Document,
}

/// Requested image format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFormat {
    /// Mime type ("image/png", "image/jpeg").
    #[serde(rename = "type")]
    pub format_type: String,
    /// Quality for lossy formats (0..1).
    pub quality: Option<f64>,
}

/// Box clip rectangle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRectangle {
    /// Clip kind; only "box" is supported.
    #[serde(rename = "type")]
    pub clip_type: String,
    /// X offset.
    pub x: f64,
    /// Y offset.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Result of browsingContext.captureScreenshot.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureScreenshotResult {
    /// Base64-encoded image.
    pub data: String,
}

/// Parameters for browsingContext.setViewport.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetViewportParams {
    /// Top-level context to change.
    pub context: Option<BrowsingContext>,
    /// New viewport; `null` clears the override. The field being absent
    /// leaves the viewport untouched.
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub viewport: Option<Option<Viewport>>,
    /// Device pixel ratio override; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub device_pixel_ratio: Option<Option<f64>>,
    /// Apply to all contexts of these user contexts instead.
    pub user_contexts: Option<Vec<String>>,
}

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u64,
    /// Height in CSS pixels.
    pub height: u64,
}

fn deserialize_double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Payload shared by the navigation lifecycle events.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavigationInfo {
    /// Context the navigation belongs to.
    pub context: BrowsingContext,
    /// The navigation, when one was assigned.
    pub navigation: Option<Navigation>,
    /// Event timestamp in milliseconds since epoch.
    pub timestamp: u64,
    /// URL the navigation was heading to when the event fired.
    pub url: String,
}

/// Payload of browsingContext.contextCreated / contextDestroyed.
pub type InfoEventParams = Info;

/// Payload of browsingContext.userPromptOpened.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPromptOpenedParams {
    /// Context showing the prompt.
    pub context: BrowsingContext,
    /// How the prompt will be handled ("accept", "dismiss", "ignore").
    pub handler: String,
    /// Prompt message.
    pub message: String,
    /// Prompt kind ("alert", "confirm", "prompt", "beforeunload").
    #[serde(rename = "type")]
    pub prompt_type: String,
    /// Default prompt value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Payload of browsingContext.userPromptClosed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPromptClosedParams {
    /// Context the prompt belonged to.
    pub context: BrowsingContext,
    /// Whether the prompt was accepted.
    pub accepted: bool,
    /// Prompt kind.
    #[serde(rename = "type")]
    pub prompt_type: String,
    /// Text the user entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
}
