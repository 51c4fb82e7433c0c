// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording host used by the bridge integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tether_bridge::host::{
    EnvironmentSignals, FrameChannel, HostEnvironment, InboundListener, StructuredChannel,
    TextChannel,
};
use tether_core::error::Result;

#[derive(Default)]
pub struct Recorder {
    pub structured: RefCell<Vec<Value>>,
    pub framed: RefCell<Vec<(Value, String)>>,
    pub text: RefCell<Vec<String>>,
}

impl Recorder {
    pub fn total(&self) -> usize {
        self.structured.borrow().len() + self.framed.borrow().len() + self.text.borrow().len()
    }
}

struct Native(Rc<Recorder>);
impl StructuredChannel for Native {
    fn post(&self, message: &Value) -> Result<()> {
        self.0.structured.borrow_mut().push(message.clone());
        Ok(())
    }
}

struct Parent(Rc<Recorder>);
impl FrameChannel for Parent {
    fn post(&self, message: &Value, target_origin: &str) -> Result<()> {
        self.0
            .framed
            .borrow_mut()
            .push((message.clone(), target_origin.to_string()));
        Ok(())
    }
}

struct WebView(Rc<Recorder>);
impl TextChannel for WebView {
    fn post_text(&self, text: &str) -> Result<()> {
        self.0.text.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Host whose capabilities can be switched on and off between sends.
#[derive(Default)]
pub struct FakeHost {
    pub signals: RefCell<Option<EnvironmentSignals>>,
    pub native: Cell<bool>,
    pub parent: Cell<bool>,
    pub webview: Cell<bool>,
    pub recorder: Rc<Recorder>,
    pub listeners: RefCell<Vec<InboundListener>>,
}

impl FakeHost {
    /// A page inside the shell (global flag set) with the given transports.
    pub fn mobile(native: bool, parent: bool, webview: bool) -> Rc<Self> {
        let host = Self::default();
        *host.signals.borrow_mut() = Some(EnvironmentSignals {
            global_flag_set: true,
            user_agent: "Mozilla/5.0 (Linux; Android 14)".into(),
            ..Default::default()
        });
        host.native.set(native);
        host.parent.set(parent);
        host.webview.set(webview);
        Rc::new(host)
    }

    /// A plain browser tab where every transport would be available.
    pub fn desktop() -> Rc<Self> {
        let host = Self::default();
        *host.signals.borrow_mut() = Some(EnvironmentSignals {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
            ..Default::default()
        });
        host.native.set(true);
        host.parent.set(true);
        host.webview.set(true);
        Rc::new(host)
    }

    /// Deliver a raw event through every registered listener.
    pub fn emit(&self, raw: Value) {
        for listener in self.listeners.borrow().iter() {
            listener(raw.clone());
        }
    }
}

impl HostEnvironment for FakeHost {
    fn signals(&self) -> Option<EnvironmentSignals> {
        self.signals.borrow().clone()
    }

    fn native_bridge(&self) -> Option<Rc<dyn StructuredChannel>> {
        self.native
            .get()
            .then(|| Rc::new(Native(Rc::clone(&self.recorder))) as Rc<dyn StructuredChannel>)
    }

    fn parent_frame(&self) -> Option<Rc<dyn FrameChannel>> {
        self.parent
            .get()
            .then(|| Rc::new(Parent(Rc::clone(&self.recorder))) as Rc<dyn FrameChannel>)
    }

    fn webview_channel(&self) -> Option<Rc<dyn TextChannel>> {
        self.webview
            .get()
            .then(|| Rc::new(WebView(Rc::clone(&self.recorder))) as Rc<dyn TextChannel>)
    }

    fn listen_inbound(&self, listener: InboundListener) -> Result<()> {
        self.listeners.borrow_mut().push(listener);
        Ok(())
    }
}
