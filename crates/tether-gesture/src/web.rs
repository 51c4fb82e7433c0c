// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOM touch surface and `setTimeout` scheduler.

#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use tether_core::error::{Result, TetherError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, TouchList};

use crate::scheduler::{Scheduler, TimerId};
use crate::surface::{TouchSink, TouchSurface};
use crate::touch::{TouchEvent, TouchPhase, TouchPoint};

const EVENTS: [(&str, TouchPhase); 3] = [
    ("touchstart", TouchPhase::Start),
    ("touchmove", TouchPhase::Move),
    ("touchend", TouchPhase::End),
];

fn points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(f64::from(t.client_x()), f64::from(t.client_y())))
        .collect()
}

fn convert(phase: TouchPhase, event: &web_sys::TouchEvent) -> TouchEvent {
    let list = match phase {
        TouchPhase::End => event.changed_touches(),
        TouchPhase::Start | TouchPhase::Move => event.touches(),
    };
    TouchEvent {
        phase,
        points: points(&list),
        timestamp_ms: event.time_stamp().max(0.0) as u64,
    }
}

type TouchClosure = Closure<dyn FnMut(web_sys::TouchEvent)>;

/// Any DOM event target emitting touch events.
pub struct WebTouchSurface {
    target: EventTarget,
    listeners: Vec<(&'static str, TouchClosure)>,
}

impl WebTouchSurface {
    pub fn new(target: EventTarget) -> Self {
        Self {
            target,
            listeners: Vec::new(),
        }
    }
}

impl TouchSurface for WebTouchSurface {
    fn listen(&mut self, sink: TouchSink) -> Result<()> {
        for (name, phase) in EVENTS {
            let sink = sink.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::TouchEvent| {
                sink.deliver(&convert(phase, &event));
            }) as Box<dyn FnMut(web_sys::TouchEvent)>);
            self.target
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .map_err(|e| TetherError::Surface(format!("addEventListener({name}): {e:?}")))?;
            self.listeners.push((name, closure));
        }
        Ok(())
    }

    fn unlisten(&mut self) {
        for (name, closure) in self.listeners.drain(..) {
            let _ = self
                .target
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for WebTouchSurface {
    fn drop(&mut self) {
        self.unlisten();
    }
}

/// Timers backed by `window.setTimeout`.
pub struct WebScheduler {
    window: web_sys::Window,
}

impl WebScheduler {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or(TetherError::HostUnavailable)?;
        Ok(Self { window })
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let function = Closure::once_into_js(move || callback());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(function.unchecked_ref(), millis)
        {
            Ok(handle) => TimerId::from_raw(u64::from(handle.unsigned_abs())),
            Err(e) => {
                tracing::warn!(error = ?e, "setTimeout failed; timer will not fire");
                TimerId::from_raw(0)
            }
        }
    }

    fn cancel(&self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.raw()) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
