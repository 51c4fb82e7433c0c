// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Browser host via `web-sys`.
//
// Requires `wasm32-unknown-unknown`. Every capability lookup reads `window`
// afresh because shells inject their bridge objects at arbitrary times.

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use js_sys::{Function, JSON, Reflect};
use serde_json::Value;
use tether_core::config::BridgeConfig;
use tether_core::error::{Result, TetherError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, MessageEvent, Window};

use crate::host::{
    EnvironmentSignals, FrameChannel, HostEnvironment, InboundListener, StructuredChannel,
    TextChannel,
};

/// Convenience: map a thrown JS value into `TetherError::Host`.
fn js_err(context: &str, e: JsValue) -> TetherError {
    TetherError::Host(format!("{context}: {e:?}"))
}

/// A named global, if it is set to something other than `null`/`undefined`.
fn global(window: &Window, name: &str) -> Option<JsValue> {
    let value = Reflect::get(window, &JsValue::from_str(name)).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn post_message_fn(target: &JsValue) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str("postMessage"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn to_js(value: &Value) -> Result<JsValue> {
    let text = serde_json::to_string(value)?;
    JSON::parse(&text).map_err(|e| js_err("JSON.parse", e))
}

fn from_js(data: JsValue) -> Value {
    if let Some(text) = data.as_string() {
        return Value::String(text);
    }
    JSON::stringify(&data)
        .ok()
        .and_then(|text| serde_json::from_str(&String::from(text)).ok())
        .unwrap_or(Value::Null)
}

/// Object exposing a `postMessage(value)` method.
struct ObjectChannel {
    target: JsValue,
    post: Function,
}

impl ObjectChannel {
    fn lookup(window: &Window, name: &str) -> Option<Self> {
        let target = global(window, name)?;
        let post = post_message_fn(&target)?;
        Some(Self { target, post })
    }
}

impl StructuredChannel for ObjectChannel {
    fn post(&self, message: &Value) -> Result<()> {
        self.post
            .call1(&self.target, &to_js(message)?)
            .map(|_| ())
            .map_err(|e| js_err("native bridge postMessage", e))
    }
}

impl TextChannel for ObjectChannel {
    fn post_text(&self, text: &str) -> Result<()> {
        self.post
            .call1(&self.target, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| js_err("webview postMessage", e))
    }
}

struct ParentWindow(Window);

impl FrameChannel for ParentWindow {
    fn post(&self, message: &Value, target_origin: &str) -> Result<()> {
        self.0
            .post_message(&to_js(message)?, target_origin)
            .map_err(|e| js_err("parent postMessage", e))
    }
}

/// Host backed by the real `window`.
pub struct WebHost {
    config: BridgeConfig,
}

impl WebHost {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl HostEnvironment for WebHost {
    fn signals(&self) -> Option<EnvironmentSignals> {
        let window = web_sys::window()?;
        let global_flag_set = global(&window, &self.config.global_flag)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Some(EnvironmentSignals {
            global_flag_set,
            query: window.location().search().unwrap_or_default(),
            user_agent: window.navigator().user_agent().unwrap_or_default(),
            native_bridge_present: ObjectChannel::lookup(&window, &self.config.native_bridge_object)
                .is_some(),
        })
    }

    fn native_bridge(&self) -> Option<Rc<dyn StructuredChannel>> {
        let window = web_sys::window()?;
        let channel = ObjectChannel::lookup(&window, &self.config.native_bridge_object)?;
        Some(Rc::new(channel))
    }

    fn parent_frame(&self) -> Option<Rc<dyn FrameChannel>> {
        let window = web_sys::window()?;
        let parent = window.parent().ok()??;
        let this: &JsValue = window.as_ref();
        let that: &JsValue = parent.as_ref();
        if this == that {
            return None;
        }
        Some(Rc::new(ParentWindow(parent)))
    }

    fn webview_channel(&self) -> Option<Rc<dyn TextChannel>> {
        let window = web_sys::window()?;
        let channel = ObjectChannel::lookup(&window, &self.config.webview_channel_object)?;
        Some(Rc::new(channel))
    }

    fn listen_inbound(&self, listener: InboundListener) -> Result<()> {
        let window = web_sys::window().ok_or(TetherError::HostUnavailable)?;

        // One listener delivers each native message exactly once. iOS shells
        // post to `window`, Android WebViews to `document`; the same closure
        // sits on both and only handles an event at its own target, so a
        // bubbling `document` event is not seen again on `window`.
        let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            if event.event_phase() != Event::AT_TARGET {
                return;
            }
            listener(from_js(event.data()));
        }) as Box<dyn FnMut(MessageEvent)>);

        let mut targets: Vec<EventTarget> = vec![window.clone().into()];
        if let Some(document) = window.document() {
            targets.push(document.into());
        }
        let registered = targets.iter().try_for_each(|target| {
            target
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
                .map_err(|e| js_err("addEventListener(message)", e))
        });
        // Lives as long as the page.
        closure.forget();
        registered
    }
}
