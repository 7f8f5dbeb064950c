//! Action dispatch.
//!
//! Lowers W3C action sequences to CDP input events. Actions are grouped
//! into ticks (the i-th item of every source forms tick i); a tick's
//! items are dispatched together and the tick waits out its longest
//! duration before the next begins.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crosswire_bidi::input::{
    KeyAction, NoneAction, Origin, OriginKeyword, PointerAction, PointerType, SourceActions,
    WheelAction,
};
use crosswire_bidi::{BidiError, ErrorCode};
use crosswire_cdp::protocol::dom as cdp_dom;
use crosswire_cdp::protocol::input as cdp_input;
use crosswire_cdp::protocol::runtime as cdp_runtime;
use crosswire_cdp::CdpSession;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::keys::{key_definition, macos_command, modifier_bit, modifier};
use super::{button_name, CancelAction, InputState};
use crate::clock::Clock;
use crate::error::cdp_to_bidi;
use crate::realm::RealmStorage;
use crate::script::shared_id::parse_shared_id;

/// One tick entry: a source paired with its action at the tick index.
enum TickItem<'a> {
    None(&'a str, &'a NoneAction),
    Key(&'a str, &'a KeyAction),
    Pointer(&'a str, PointerType, &'a PointerAction),
    Wheel(&'a str, &'a WheelAction),
}

/// Lowers action sequences onto one CDP session.
pub struct ActionDispatcher {
    session: CdpSession,
    context_id: String,
    state: Arc<Mutex<InputState>>,
    realms: Arc<RealmStorage>,
    clock: Arc<dyn Clock>,
    is_macos: bool,
}

impl ActionDispatcher {
    /// Dispatcher for one top-level context.
    pub fn new(
        session: CdpSession,
        context_id: String,
        state: Arc<Mutex<InputState>>,
        realms: Arc<RealmStorage>,
        clock: Arc<dyn Clock>,
        is_macos: bool,
    ) -> Self {
        Self {
            session,
            context_id,
            state,
            realms,
            clock,
            is_macos,
        }
    }

    /// Perform the action sequences tick by tick.
    ///
    /// All items of one tick are dispatched concurrently; the tick then
    /// waits out its longest duration. A failing item does not stop its
    /// siblings in the same tick, but the first error ends the sequence
    /// once the tick has run.
    pub async fn perform(&self, sources: &[SourceActions]) -> Result<(), BidiError> {
        let tick_count = sources.iter().map(SourceActions::len).max().unwrap_or(0);
        for tick in 0..tick_count {
            let results = join_all(
                sources
                    .iter()
                    .filter_map(|source| tick_item(source, tick))
                    .map(|item| async move { self.dispatch_item(&item).await }),
            )
            .await;

            let mut max_duration = 0u64;
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(duration) => max_duration = max_duration.max(duration),
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            if let Some(err) = first_error {
                return Err(err);
            }
            if max_duration > 0 {
                tokio::time::sleep(Duration::from_millis(max_duration)).await;
            }
        }
        Ok(())
    }

    /// Undo every recorded press in reverse order.
    pub async fn release(&self) -> Result<(), BidiError> {
        let cancel_list = {
            let mut state = self.state.lock().await;
            let mut list = std::mem::take(&mut state.cancel_list);
            list.reverse();
            list
        };
        for action in cancel_list {
            match action {
                CancelAction::KeyUp { source, value } => {
                    self.key_up(&source, &value).await?;
                }
                CancelAction::PointerUp { source, button } => {
                    self.pointer_up(&source, PointerType::Mouse, button).await?;
                }
            }
        }
        Ok(())
    }

    async fn dispatch_item(&self, item: &TickItem<'_>) -> Result<u64, BidiError> {
        match item {
            TickItem::None(_, NoneAction::Pause { duration }) => Ok(duration.unwrap_or(0)),
            TickItem::Key(_, KeyAction::Pause { duration })
            | TickItem::Pointer(_, _, PointerAction::Pause { duration })
            | TickItem::Wheel(_, WheelAction::Pause { duration }) => Ok(duration.unwrap_or(0)),
            TickItem::Key(source, KeyAction::KeyDown { value }) => {
                self.key_down(source, value).await?;
                Ok(0)
            }
            TickItem::Key(source, KeyAction::KeyUp { value }) => {
                self.key_up(source, value).await?;
                Ok(0)
            }
            TickItem::Pointer(source, pointer_type, PointerAction::PointerDown { button, .. }) => {
                self.pointer_down(source, *pointer_type, *button).await?;
                Ok(0)
            }
            TickItem::Pointer(source, pointer_type, PointerAction::PointerUp { button }) => {
                self.pointer_up(source, *pointer_type, *button).await?;
                Ok(0)
            }
            TickItem::Pointer(
                source,
                pointer_type,
                PointerAction::PointerMove {
                    x,
                    y,
                    duration,
                    origin,
                    ..
                },
            ) => {
                self.pointer_move(source, *pointer_type, *x, *y, origin).await?;
                Ok(duration.unwrap_or(0))
            }
            TickItem::Wheel(
                _source,
                WheelAction::Scroll {
                    x,
                    y,
                    delta_x,
                    delta_y,
                    duration,
                    origin,
                },
            ) => {
                self.scroll(*x, *y, *delta_x, *delta_y, origin).await?;
                Ok(duration.unwrap_or(0))
            }
        }
    }

    async fn key_down(&self, source_id: &str, value: &str) -> Result<(), BidiError> {
        let definition = key_definition(value)
            .ok_or_else(|| BidiError::invalid_argument(format!("unknown key value {value:?}")))?;

        let (modifiers, commands) = {
            let mut state = self.state.lock().await;
            let source = state.key_source(source_id);
            match modifier_bit(value) {
                Some(modifier::ALT) => source.alt = true,
                Some(modifier::CTRL) => source.ctrl = true,
                Some(modifier::META) => source.meta = true,
                Some(modifier::SHIFT) => source.shift = true,
                _ => {}
            }
            source.pressed.insert(value.to_string());
            let meta = source.meta;
            let shift = source.shift;
            state.cancel_list.push(CancelAction::KeyUp {
                source: source_id.to_string(),
                value: value.to_string(),
            });
            let modifiers = state.modifiers();
            let commands = if self.is_macos && meta {
                macos_command(&definition.key, shift).map(|c| vec![c.to_string()])
            } else {
                None
            };
            (modifiers, commands)
        };

        let event_type = if definition.text.is_some() {
            "keyDown"
        } else {
            "rawKeyDown"
        };
        self.dispatch_key(event_type, value, modifiers, commands).await
    }

    async fn key_up(&self, source_id: &str, value: &str) -> Result<(), BidiError> {
        let modifiers = {
            let mut state = self.state.lock().await;
            let source = state.key_source(source_id);
            match modifier_bit(value) {
                Some(modifier::ALT) => source.alt = false,
                Some(modifier::CTRL) => source.ctrl = false,
                Some(modifier::META) => source.meta = false,
                Some(modifier::SHIFT) => source.shift = false,
                _ => {}
            }
            source.pressed.remove(value);
            state
                .cancel_list
                .retain(|action| !matches!(action, CancelAction::KeyUp { source, value: v }
                    if source == source_id && v == value));
            state.modifiers()
        };

        self.dispatch_key("keyUp", value, modifiers, None).await
    }

    async fn dispatch_key(
        &self,
        event_type: &str,
        value: &str,
        modifiers: u32,
        commands: Option<Vec<String>>,
    ) -> Result<(), BidiError> {
        // The caller already validated the value.
        let definition = key_definition(value)
            .ok_or_else(|| BidiError::invalid_argument(format!("unknown key value {value:?}")))?;
        let params = cdp_input::DispatchKeyEventParams {
            event_type: event_type.to_string(),
            modifiers: Some(modifiers),
            text: if event_type == "keyUp" {
                None
            } else {
                definition.text.clone()
            },
            unmodified_text: if event_type == "keyUp" {
                None
            } else {
                definition.text.clone()
            },
            key: Some(definition.key.clone()),
            code: if definition.code.is_empty() {
                None
            } else {
                Some(definition.code.clone())
            },
            windows_virtual_key_code: Some(definition.key_code),
            location: Some(definition.location),
            auto_repeat: Some(false),
            is_keypad: Some(definition.location == 3),
            commands,
        };
        debug!(context = %self.context_id, event = %event_type, key = %definition.key,
            "dispatching key event");
        self.session
            .send_command::<_, Value>("Input.dispatchKeyEvent", Some(params))
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(())
    }

    async fn pointer_down(
        &self,
        source_id: &str,
        pointer_type: PointerType,
        button: u32,
    ) -> Result<(), BidiError> {
        let (x, y, buttons, click_count, modifiers) = {
            let mut state = self.state.lock().await;
            let modifiers = state.modifiers();
            let now = self.clock.now_ms();
            let source = state.pointer_source(source_id, pointer_type);
            let click_count = source.register_press(button, now);
            let snapshot = (source.x, source.y, source.buttons_mask(), click_count, modifiers);
            state.cancel_list.push(CancelAction::PointerUp {
                source: source_id.to_string(),
                button,
            });
            snapshot
        };
        self.dispatch_mouse("mousePressed", x, y, button, buttons, click_count, modifiers, pointer_type)
            .await
    }

    async fn pointer_up(
        &self,
        source_id: &str,
        pointer_type: PointerType,
        button: u32,
    ) -> Result<(), BidiError> {
        let (x, y, buttons, click_count, modifiers) = {
            let mut state = self.state.lock().await;
            let modifiers = state.modifiers();
            let source = state.pointer_source(source_id, pointer_type);
            let click_count = source.release_count(button);
            let snapshot = (source.x, source.y, source.buttons_mask(), click_count, modifiers);
            state
                .cancel_list
                .retain(|action| !matches!(action, CancelAction::PointerUp { source, button: b }
                    if source == source_id && *b == button));
            snapshot
        };
        self.dispatch_mouse("mouseReleased", x, y, button, buttons, click_count, modifiers, pointer_type)
            .await
    }

    async fn pointer_move(
        &self,
        source_id: &str,
        pointer_type: PointerType,
        x: f64,
        y: f64,
        origin: &Origin,
    ) -> Result<(), BidiError> {
        let (start_x, start_y, modifiers, buttons) = {
            let mut state = self.state.lock().await;
            let modifiers = state.modifiers();
            let source = state.pointer_source(source_id, pointer_type);
            (source.x, source.y, modifiers, source.buttons_mask())
        };

        let (target_x, target_y) = self.resolve_origin(origin, start_x, start_y, x, y).await?;
        if target_x < 0.0 || target_y < 0.0 {
            return Err(BidiError::new(
                ErrorCode::MoveTargetOutOfBounds,
                format!("pointer target ({target_x}, {target_y}) is outside the viewport"),
            ));
        }

        {
            let mut state = self.state.lock().await;
            let source = state.pointer_source(source_id, pointer_type);
            source.x = target_x;
            source.y = target_y;
        }

        let params = cdp_input::DispatchMouseEventParams {
            event_type: "mouseMoved".to_string(),
            x: target_x,
            y: target_y,
            modifiers: Some(modifiers),
            button: Some("none".to_string()),
            buttons: Some(buttons),
            pointer_type: Some(pointer_type.as_cdp().to_string()),
            ..Default::default()
        };
        self.session
            .send_command::<_, Value>("Input.dispatchMouseEvent", Some(params))
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(())
    }

    async fn scroll(
        &self,
        x: i64,
        y: i64,
        delta_x: i64,
        delta_y: i64,
        origin: &Origin,
    ) -> Result<(), BidiError> {
        if matches!(origin, Origin::Keyword(OriginKeyword::Pointer)) {
            return Err(BidiError::invalid_argument(
                "wheel scroll cannot use the pointer origin",
            ));
        }
        let (target_x, target_y) = self
            .resolve_origin(origin, 0.0, 0.0, x as f64, y as f64)
            .await?;
        let modifiers = self.state.lock().await.modifiers();
        let params = cdp_input::DispatchMouseEventParams {
            event_type: "mouseWheel".to_string(),
            x: target_x,
            y: target_y,
            modifiers: Some(modifiers),
            delta_x: Some(delta_x as f64),
            delta_y: Some(delta_y as f64),
            ..Default::default()
        };
        self.session
            .send_command::<_, Value>("Input.dispatchMouseEvent", Some(params))
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(())
    }

    #[allow(clippy::many_single_char_names)]
    async fn dispatch_mouse(
        &self,
        event_type: &str,
        x: f64,
        y: f64,
        button: u32,
        buttons: u32,
        click_count: u32,
        modifiers: u32,
        pointer_type: PointerType,
    ) -> Result<(), BidiError> {
        let params = cdp_input::DispatchMouseEventParams {
            event_type: event_type.to_string(),
            x,
            y,
            modifiers: Some(modifiers),
            button: Some(button_name(button).to_string()),
            buttons: Some(buttons),
            click_count: Some(click_count),
            pointer_type: Some(pointer_type.as_cdp().to_string()),
            ..Default::default()
        };
        debug!(context = %self.context_id, event = %event_type, button = button,
            click_count = click_count, "dispatching mouse event");
        self.session
            .send_command::<_, Value>("Input.dispatchMouseEvent", Some(params))
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(())
    }

    async fn resolve_origin(
        &self,
        origin: &Origin,
        start_x: f64,
        start_y: f64,
        x: f64,
        y: f64,
    ) -> Result<(f64, f64), BidiError> {
        match origin {
            Origin::Default | Origin::Keyword(OriginKeyword::Viewport) => Ok((x, y)),
            Origin::Keyword(OriginKeyword::Pointer) => Ok((start_x + x, start_y + y)),
            Origin::Element { element, .. } => {
                let (center_x, center_y) = self.element_center(element).await?;
                Ok((center_x + x, center_y + y))
            }
        }
    }

    /// Resolve an element origin to the center of its bounding box.
    async fn element_center(
        &self,
        element: &crosswire_bidi::script::RemoteReference,
    ) -> Result<(f64, f64), BidiError> {
        let shared_id = element
            .shared_id
            .as_deref()
            .ok_or_else(|| BidiError::invalid_argument("element origin requires a sharedId"))?;
        let node = parse_shared_id(shared_id)?;

        let realm = self
            .realms
            .window_realm(&self.context_id, None)
            .await
            .ok_or_else(|| {
                BidiError::new(ErrorCode::NoSuchNode, "no realm to resolve the element in")
            })?;

        let resolved: cdp_dom::ResolveNodeResult = self
            .session
            .send_command(
                "DOM.resolveNode",
                Some(cdp_dom::ResolveNodeParams {
                    backend_node_id: Some(node.backend_node_id),
                    execution_context_id: Some(realm.execution_context_id),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        let object_id = resolved
            .object
            .object_id
            .ok_or_else(|| BidiError::new(ErrorCode::NoSuchNode, "element has no object id"))?;

        let result: cdp_runtime::CallFunctionOnResult = self
            .session
            .send_command(
                "Runtime.callFunctionOn",
                Some(cdp_runtime::CallFunctionOnParams {
                    function_declaration:
                        "function () { const r = this.getBoundingClientRect(); \
                         return { x: r.x + r.width / 2, y: r.y + r.height / 2 }; }"
                            .to_string(),
                    object_id: Some(object_id),
                    arguments: None,
                    execution_context_id: None,
                    return_by_value: Some(true),
                    await_promise: Some(false),
                    user_gesture: None,
                    serialization_options: None,
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        let value = result.result.value.unwrap_or(Value::Null);
        let x = value.get("x").and_then(Value::as_f64).unwrap_or(0.0);
        let y = value.get("y").and_then(Value::as_f64).unwrap_or(0.0);
        Ok((x, y))
    }
}

fn tick_item<'a>(source: &'a SourceActions, tick: usize) -> Option<TickItem<'a>> {
    match source {
        SourceActions::None { id, actions } => {
            actions.get(tick).map(|a| TickItem::None(id, a))
        }
        SourceActions::Key { id, actions } => actions.get(tick).map(|a| TickItem::Key(id, a)),
        SourceActions::Pointer {
            id,
            parameters,
            actions,
        } => actions
            .get(tick)
            .map(|a| TickItem::Pointer(id, parameters.pointer_type, a)),
        SourceActions::Wheel { id, actions } => {
            actions.get(tick).map(|a| TickItem::Wheel(id, a))
        }
    }
}
