// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host environment abstraction.
//
// Everything the bridge needs from the page it runs in: the raw detection
// signals, the three outbound capabilities, and a way to receive inbound
// events. Capabilities are looked up on every call because the shell may
// inject its objects after the page has loaded.

use std::rc::Rc;

use serde_json::Value;
use tether_core::error::Result;

/// Raw signals read from the page. Interpretation lives in [`crate::probe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSignals {
    /// The shell pre-set its global boolean flag.
    pub global_flag_set: bool,
    /// Query string of the current location, with or without leading `?`.
    pub query: String,
    /// Device identifier string (the user agent).
    pub user_agent: String,
    /// A native bridge object with a send capability is present.
    pub native_bridge_present: bool,
}

/// Host object accepting a structured message as-is.
pub trait StructuredChannel {
    fn post(&self, message: &Value) -> Result<()>;
}

/// Cross-context messaging to the embedding parent frame.
pub trait FrameChannel {
    fn post(&self, message: &Value, target_origin: &str) -> Result<()>;
}

/// Host object accepting only string payloads.
pub trait TextChannel {
    fn post_text(&self, text: &str) -> Result<()>;
}

/// Callback receiving every raw inbound event payload.
pub type InboundListener = Box<dyn Fn(Value)>;

/// The page the bridge is running in.
pub trait HostEnvironment {
    /// Detection signals, or `None` when there is no windowing environment.
    fn signals(&self) -> Option<EnvironmentSignals>;

    /// Native bridge object, if injected right now.
    fn native_bridge(&self) -> Option<Rc<dyn StructuredChannel>>;

    /// Parent context, only if this page is embedded in a distinct parent.
    fn parent_frame(&self) -> Option<Rc<dyn FrameChannel>>;

    /// String-only WebView channel, if injected right now.
    fn webview_channel(&self) -> Option<Rc<dyn TextChannel>>;

    /// Register the single listener for inbound host events.
    fn listen_inbound(&self, listener: InboundListener) -> Result<()>;
}
