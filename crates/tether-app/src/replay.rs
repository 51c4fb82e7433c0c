// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replay engine: one bridge and one bound recognizer driven step by step.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tether_bridge::MessageBridge;
use tether_core::TetherConfig;
use tether_core::error::Result;
use tether_core::types::DeliveryOutcome;
use tether_gesture::{GestureHandlers, ManualScheduler, TouchSink, TouchSurface, bind};
use tracing::{debug, info, warn};

use crate::host::SimulatedHost;
use crate::script::{Script, Step};

/// Totals reported at the end of a replay.
#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub delivered: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub inbound_dispatched: usize,
    pub inbound_discarded: usize,
    /// Kinds of the inbound messages the page's subscriber received, in order.
    pub received: Vec<String>,
    pub gestures: Vec<String>,
}

/// Surface fed directly by the replay loop.
#[derive(Clone, Default)]
struct ScriptSurface(Rc<RefCell<Option<TouchSink>>>);

impl TouchSurface for ScriptSurface {
    fn listen(&mut self, sink: TouchSink) -> Result<()> {
        *self.0.borrow_mut() = Some(sink);
        Ok(())
    }

    fn unlisten(&mut self) {
        self.0.borrow_mut().take();
    }
}

pub fn run(script: Script, config: &TetherConfig) -> Result<ReplaySummary> {
    let host = Rc::new(SimulatedHost::new(script.environment.clone()));
    let bridge = MessageBridge::new(host.clone(), &config.bridge);
    if let Err(e) = bridge.initialize() {
        warn!(error = %e, "bridge listener not registered; inbound steps will be ignored");
    }
    debug!(listening = host.is_listening(), "simulated page ready");

    let gestures = Rc::new(RefCell::new(Vec::new()));
    let (lp, dt, sw) = (
        Rc::clone(&gestures),
        Rc::clone(&gestures),
        Rc::clone(&gestures),
    );
    let handlers = GestureHandlers::new()
        .on_long_press(move |at| lp.borrow_mut().push(format!("long-press@{},{}", at.x, at.y)))
        .on_double_tap(move |at| dt.borrow_mut().push(format!("double-tap@{},{}", at.x, at.y)))
        .on_swipe(move |direction| sw.borrow_mut().push(format!("swipe-{direction}")));

    let surface = ScriptSurface::default();
    let scheduler = Rc::new(ManualScheduler::new());
    let mut binding = bind(
        Box::new(surface.clone()),
        scheduler.clone(),
        handlers,
        config.gesture.clone(),
    )?;

    let mut summary = ReplaySummary::default();
    let received = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&received);
    let _page = bridge.on_message(move |msg| {
        info!(kind = %msg.kind, data = ?msg.data, "page received");
        log.borrow_mut().push(msg.kind.to_string());
        Ok(())
    });

    for (index, step) in script.steps.into_iter().enumerate() {
        match step {
            Step::Send(message) => match bridge.post_message(&message) {
                DeliveryOutcome::Delivered { .. } => summary.delivered += 1,
                DeliveryOutcome::Skipped { .. } => summary.skipped += 1,
                DeliveryOutcome::Unavailable => summary.unavailable += 1,
                DeliveryOutcome::Failed { .. } => summary.failed += 1,
            },
            Step::Inbound(raw) => {
                let before = received.borrow().len();
                if !host.deliver(raw) {
                    debug!(step = index, "no inbound listener; message lost");
                }
                if received.borrow().len() > before {
                    summary.inbound_dispatched += 1;
                } else {
                    summary.inbound_discarded += 1;
                }
            }
            Step::Touch(event) => {
                let now = scheduler.now().as_millis() as u64;
                if event.timestamp_ms > now {
                    scheduler.advance(Duration::from_millis(event.timestamp_ms - now));
                }
                let sink = surface.0.borrow().clone();
                if let Some(sink) = sink {
                    sink.deliver(&event);
                }
            }
            Step::AdvanceMs(ms) => {
                scheduler.advance(Duration::from_millis(ms));
            }
            Step::SetTransports(transports) => {
                info!(step = index, ?transports, "transports changed");
                host.set_transports(transports);
            }
        }
    }

    binding.teardown();
    summary.received = received.borrow().clone();
    summary.gestures = gestures.borrow().clone();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use tether_core::types::InboundKind;

    use super::*;

    fn replay(json: &str) -> ReplaySummary {
        run(Script::from_json(json).unwrap(), &TetherConfig::default()).unwrap()
    }

    #[test]
    fn sends_follow_transport_availability() {
        let summary = replay(
            r#"{
                "environment": { "global_flag": true, "transports": ["web-view"] },
                "steps": [
                    { "send": { "type": "LOGOUT" } },
                    { "set_transports": [] },
                    { "send": { "type": "LOGOUT" } }
                ]
            }"#,
        );
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.unavailable, 1);
    }

    #[test]
    fn plain_page_skips_sends() {
        let summary = replay(
            r#"{
                "environment": { "user_agent": "Mozilla/5.0", "transports": ["web-view"] },
                "steps": [ { "send": { "type": "GET_DEVICE_INFO" } } ]
            }"#,
        );
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.delivered, 0);
    }

    #[test]
    fn inbound_malformed_is_discarded() {
        let summary = replay(
            r#"{
                "steps": [
                    { "inbound": { "type": "TOKEN", "data": { "token": "t" } } },
                    { "inbound": {} },
                    { "inbound": null }
                ]
            }"#,
        );
        assert_eq!(summary.inbound_dispatched, 1);
        assert_eq!(summary.inbound_discarded, 2);
        assert_eq!(summary.received, vec!["TOKEN"]);
    }

    #[test]
    fn inbound_steps_arrive_through_the_host_listener() {
        let host = Rc::new(SimulatedHost::new(Default::default()));
        let bridge = MessageBridge::new(host.clone(), &TetherConfig::default().bridge);
        assert!(!host.is_listening());
        bridge.initialize().unwrap();
        assert!(host.is_listening());

        let kinds = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&kinds);
        let _sub = bridge.on_message(move |msg| {
            seen.borrow_mut().push(msg.kind);
            Ok(())
        });

        let device_info = serde_json::json!({ "type": "DEVICE_INFO", "data": { "platform": "ios" } });
        assert!(host.deliver(device_info));
        assert!(host.deliver(serde_json::json!(r#"{"type":"AUTH_SAVED"}"#)));
        assert_eq!(
            *kinds.borrow(),
            vec![InboundKind::DeviceInfo, InboundKind::AuthSaved]
        );
    }

    #[test]
    fn headless_page_ignores_inbound() {
        let summary = replay(
            r#"{
                "environment": { "headless": true, "transports": ["native-bridge"] },
                "steps": [
                    { "inbound": { "type": "AUTH_SAVED" } },
                    { "send": { "type": "LOGOUT" } }
                ]
            }"#,
        );
        assert_eq!(summary.inbound_discarded, 1);
        assert!(summary.received.is_empty());
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn touch_steps_produce_gestures() {
        let summary = replay(
            r#"{
                "steps": [
                    { "touch": { "phase": "start", "points": [{ "x": 100, "y": 100 }], "timestamp_ms": 0 } },
                    { "touch": { "phase": "end", "points": [{ "x": 100, "y": 100 }], "timestamp_ms": 600 } },
                    { "touch": { "phase": "start", "points": [{ "x": 0, "y": 0 }], "timestamp_ms": 1000 } },
                    { "touch": { "phase": "end", "points": [{ "x": 0, "y": -80 }], "timestamp_ms": 1100 } }
                ]
            }"#,
        );
        assert_eq!(summary.gestures, vec!["long-press@100,100", "swipe-up"]);
    }

    #[test]
    fn bundled_demo_replays() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts/demo.json");
        let summary = run(Script::load(&path).unwrap(), &TetherConfig::default()).unwrap();
        assert_eq!(summary.delivered, 3);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.inbound_dispatched, 2);
        assert_eq!(summary.received, vec!["DEVICE_INFO", "AUTH_SAVED"]);
        assert_eq!(
            summary.gestures,
            vec!["long-press@100,100", "swipe-right", "double-tap@51,51"]
        );
    }
}
