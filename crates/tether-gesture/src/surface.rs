// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binding a recognizer to a touch surface.

use std::rc::{Rc, Weak};

use tether_core::config::GestureConfig;
use tether_core::error::Result;
use tracing::debug;

use crate::recognizer::{Gesture, GestureHandlers, GestureRecognizer};
use crate::scheduler::Scheduler;
use crate::touch::TouchEvent;

/// Where surface listeners deliver their events.
///
/// Holds the recognizer weakly: events arriving after teardown are dropped.
#[derive(Clone)]
pub struct TouchSink(Weak<GestureRecognizer>);

impl TouchSink {
    pub fn deliver(&self, event: &TouchEvent) -> Option<Gesture> {
        self.0.upgrade().and_then(|r| r.handle(event))
    }
}

/// An interactive element producing contact-start/move/end events.
pub trait TouchSurface {
    /// Install the three contact listeners, all feeding `sink`.
    fn listen(&mut self, sink: TouchSink) -> Result<()>;

    /// Remove the listeners installed by `listen`. Must tolerate repeats.
    fn unlisten(&mut self);
}

/// Live binding between one surface and its recognizer.
///
/// Tearing down (explicitly or on drop) removes the listeners and disarms any
/// pending long-press.
pub struct GestureBinding {
    recognizer: Rc<GestureRecognizer>,
    surface: Option<Box<dyn TouchSurface>>,
}

/// Attach a fresh recognizer to `surface`.
pub fn bind(
    mut surface: Box<dyn TouchSurface>,
    scheduler: Rc<dyn Scheduler>,
    handlers: GestureHandlers,
    config: GestureConfig,
) -> Result<GestureBinding> {
    config.validate()?;
    let recognizer = GestureRecognizer::new(config, handlers, scheduler);
    surface.listen(TouchSink(Rc::downgrade(&recognizer)))?;
    debug!("gesture recognizer bound");
    Ok(GestureBinding {
        recognizer,
        surface: Some(surface),
    })
}

impl GestureBinding {
    pub fn recognizer(&self) -> &Rc<GestureRecognizer> {
        &self.recognizer
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    /// Remove listeners and clear the timer. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.unlisten();
            self.recognizer.reset();
            debug!("gesture recognizer unbound");
        }
    }
}

impl Drop for GestureBinding {
    fn drop(&mut self) {
        self.teardown();
    }
}
