// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated page for replays: transports log what they receive.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tether_bridge::host::{
    EnvironmentSignals, FrameChannel, HostEnvironment, InboundListener, StructuredChannel,
    TextChannel,
};
use tether_core::error::{Result, TetherError};
use tether_core::types::TransportKind;
use tracing::info;

use crate::script::EnvironmentSpec;

struct Logged(TransportKind);

impl StructuredChannel for Logged {
    fn post(&self, message: &Value) -> Result<()> {
        info!(transport = %self.0, payload = %message, "shell received");
        Ok(())
    }
}

impl FrameChannel for Logged {
    fn post(&self, message: &Value, target_origin: &str) -> Result<()> {
        info!(transport = %self.0, payload = %message, target_origin, "shell received");
        Ok(())
    }
}

impl TextChannel for Logged {
    fn post_text(&self, text: &str) -> Result<()> {
        info!(transport = %self.0, text, "shell received");
        Ok(())
    }
}

pub struct SimulatedHost {
    env: EnvironmentSpec,
    transports: RefCell<Vec<TransportKind>>,
    listener: RefCell<Option<Rc<dyn Fn(Value)>>>,
}

impl SimulatedHost {
    pub fn new(env: EnvironmentSpec) -> Self {
        let transports = RefCell::new(env.transports.clone());
        Self {
            env,
            transports,
            listener: RefCell::new(None),
        }
    }

    pub fn set_transports(&self, transports: Vec<TransportKind>) {
        *self.transports.borrow_mut() = transports;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Hand a raw shell event to the registered listener, as the page would
    /// receive it. Returns `false` when nothing is listening.
    pub fn deliver(&self, raw: Value) -> bool {
        let listener = self.listener.borrow().clone();
        match listener {
            Some(listener) => {
                listener(raw);
                true
            }
            None => false,
        }
    }

    fn has(&self, kind: TransportKind) -> bool {
        self.transports.borrow().contains(&kind)
    }
}

impl HostEnvironment for SimulatedHost {
    fn signals(&self) -> Option<EnvironmentSignals> {
        if self.env.headless {
            return None;
        }
        Some(EnvironmentSignals {
            global_flag_set: self.env.global_flag,
            query: self.env.query.clone(),
            user_agent: self.env.user_agent.clone(),
            native_bridge_present: self.has(TransportKind::NativeBridge),
        })
    }

    fn native_bridge(&self) -> Option<Rc<dyn StructuredChannel>> {
        self.has(TransportKind::NativeBridge)
            .then(|| Rc::new(Logged(TransportKind::NativeBridge)) as Rc<dyn StructuredChannel>)
    }

    fn parent_frame(&self) -> Option<Rc<dyn FrameChannel>> {
        self.has(TransportKind::ParentFrame)
            .then(|| Rc::new(Logged(TransportKind::ParentFrame)) as Rc<dyn FrameChannel>)
    }

    fn webview_channel(&self) -> Option<Rc<dyn TextChannel>> {
        self.has(TransportKind::WebView)
            .then(|| Rc::new(Logged(TransportKind::WebView)) as Rc<dyn TextChannel>)
    }

    fn listen_inbound(&self, listener: InboundListener) -> Result<()> {
        if self.env.headless {
            return Err(TetherError::HostUnavailable);
        }
        let mut slot = self.listener.borrow_mut();
        if slot.is_some() {
            return Err(TetherError::Host("inbound listener already registered".into()));
        }
        *slot = Some(Rc::from(listener));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    #[test]
    fn registered_listener_receives_deliveries() {
        let host = SimulatedHost::new(EnvironmentSpec::default());
        assert!(!host.deliver(json!({ "type": "AUTH_SAVED" })));

        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        host.listen_inbound(Box::new(move |_| h.set(h.get() + 1)))
            .unwrap();
        assert!(host.is_listening());
        assert!(host.deliver(json!({ "type": "AUTH_SAVED" })));
        assert_eq!(hits.get(), 1);

        let second = host.listen_inbound(Box::new(|_| {}));
        assert!(matches!(second, Err(TetherError::Host(_))));
    }

    #[test]
    fn headless_host_refuses_listener() {
        let host = SimulatedHost::new(EnvironmentSpec {
            headless: true,
            ..Default::default()
        });
        let result = host.listen_inbound(Box::new(|_| {}));
        assert!(matches!(result, Err(TetherError::HostUnavailable)));
        assert!(!host.is_listening());
    }
}
