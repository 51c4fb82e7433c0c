// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gesture state machine for one touch surface.
//
// Idle -> Tracking on contact-start. While tracking, the long-press timer may
// fire (LongPressFired, which consumes the sequence) or be disarmed by
// movement. Contact-end disarms the timer and, unless the sequence was
// consumed, classifies it as a swipe, a double-tap, or nothing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tether_core::config::GestureConfig;
use tracing::{debug, info};

use crate::scheduler::{Scheduler, TimerId};
use crate::touch::{SwipeDirection, TouchEvent, TouchPhase, TouchPoint};

/// A recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    LongPress { at: TouchPoint },
    DoubleTap { at: TouchPoint },
    Swipe { direction: SwipeDirection, dx: f64, dy: f64 },
}

type PointHandler = Rc<dyn Fn(TouchPoint)>;
type SwipeHandler = Rc<dyn Fn(SwipeDirection)>;

/// Callbacks for the gestures a surface cares about.
///
/// A gesture without a handler is never armed or classified.
#[derive(Clone, Default)]
pub struct GestureHandlers {
    long_press: Option<PointHandler>,
    double_tap: Option<PointHandler>,
    swipe: Option<SwipeHandler>,
}

impl GestureHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_long_press(mut self, handler: impl Fn(TouchPoint) + 'static) -> Self {
        self.long_press = Some(Rc::new(handler));
        self
    }

    pub fn on_double_tap(mut self, handler: impl Fn(TouchPoint) + 'static) -> Self {
        self.double_tap = Some(Rc::new(handler));
        self
    }

    pub fn on_swipe(mut self, handler: impl Fn(SwipeDirection) + 'static) -> Self {
        self.swipe = Some(Rc::new(handler));
        self
    }
}

/// Coarse state, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    Idle,
    Tracking,
    LongPressFired,
}

#[derive(Debug, Default)]
struct GestureSession {
    start: Option<TouchPoint>,
    long_press_timer: Option<TimerId>,
    long_press_fired: bool,
    /// Bumped on every contact-start so a stale timer cannot fire.
    sequence: u64,
    /// End time of the last tap that could open a double-tap.
    last_tap_ms: Option<u64>,
}

/// Recognizer for a single surface. Always held in an `Rc` so the long-press
/// timer can reach it without keeping it alive.
pub struct GestureRecognizer {
    config: GestureConfig,
    handlers: GestureHandlers,
    scheduler: Rc<dyn Scheduler>,
    session: RefCell<GestureSession>,
    this: Weak<GestureRecognizer>,
}

impl GestureRecognizer {
    pub fn new(
        config: GestureConfig,
        handlers: GestureHandlers,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            config,
            handlers,
            scheduler,
            session: RefCell::new(GestureSession::default()),
            this: this.clone(),
        })
    }

    pub fn state(&self) -> RecognizerState {
        let session = self.session.borrow();
        match (session.start, session.long_press_fired) {
            (None, _) => RecognizerState::Idle,
            (Some(_), true) => RecognizerState::LongPressFired,
            (Some(_), false) => RecognizerState::Tracking,
        }
    }

    /// Whether a long-press timer is currently armed.
    pub fn long_press_armed(&self) -> bool {
        self.session.borrow().long_press_timer.is_some()
    }

    /// Feed one surface event. Returns the gesture it completed, if any,
    /// after the matching handler has run.
    pub fn handle(&self, event: &TouchEvent) -> Option<Gesture> {
        let gesture = match event.phase {
            TouchPhase::Start => {
                self.contact_start(event);
                None
            }
            TouchPhase::Move => {
                self.contact_move(event);
                None
            }
            TouchPhase::End => self.contact_end(event),
        };
        if let Some(gesture) = gesture {
            self.emit(gesture);
        }
        gesture
    }

    /// Drop any in-flight sequence and disarm the timer. The last-tap time
    /// is kept.
    pub fn reset(&self) {
        let mut session = self.session.borrow_mut();
        if let Some(id) = session.long_press_timer.take() {
            self.scheduler.cancel(id);
        }
        session.start = None;
        session.long_press_fired = false;
    }

    fn contact_start(&self, event: &TouchEvent) {
        let Some(point) = event.primary() else {
            return;
        };
        self.reset();
        let sequence = {
            let mut session = self.session.borrow_mut();
            session.sequence = session.sequence.wrapping_add(1);
            session.sequence
        };

        let timer = self.handlers.long_press.as_ref().map(|_| {
            let this = self.this.clone();
            let delay = Duration::from_millis(self.config.long_press_ms);
            self.scheduler.schedule(
                delay,
                Box::new(move || {
                    if let Some(recognizer) = this.upgrade() {
                        recognizer.long_press_elapsed(sequence);
                    }
                }),
            )
        });

        let mut session = self.session.borrow_mut();
        session.start = Some(point);
        session.long_press_timer = timer;
        debug!(x = point.x, y = point.y, armed = timer.is_some(), "contact started");
    }

    fn contact_move(&self, event: &TouchEvent) {
        let Some(point) = event.primary() else {
            return;
        };
        let mut session = self.session.borrow_mut();
        let (Some(start), Some(id)) = (session.start, session.long_press_timer) else {
            return;
        };
        let (dx, dy) = point.delta_from(start);
        let tolerance = self.config.move_tolerance_px;
        if dx.abs() > tolerance || dy.abs() > tolerance {
            session.long_press_timer = None;
            self.scheduler.cancel(id);
            debug!(dx, dy, "movement cancelled long-press");
        }
    }

    fn long_press_elapsed(&self, sequence: u64) {
        let at = {
            let mut session = self.session.borrow_mut();
            if session.sequence != sequence || session.long_press_timer.take().is_none() {
                return;
            }
            let Some(start) = session.start else {
                return;
            };
            session.long_press_fired = true;
            start
        };
        self.emit(Gesture::LongPress { at });
    }

    fn contact_end(&self, event: &TouchEvent) -> Option<Gesture> {
        let mut session = self.session.borrow_mut();
        if let Some(id) = session.long_press_timer.take() {
            self.scheduler.cancel(id);
        }
        let start = session.start.take()?;
        if std::mem::take(&mut session.long_press_fired) {
            debug!("sequence consumed by long-press");
            return None;
        }

        let end = event.primary().unwrap_or(start);
        let (dx, dy) = end.delta_from(start);

        if dx.abs().max(dy.abs()) > self.config.swipe_threshold_px && self.handlers.swipe.is_some()
        {
            return Some(Gesture::Swipe {
                direction: SwipeDirection::classify(dx, dy),
                dx,
                dy,
            });
        }

        let now = event.timestamp_ms;
        let within_window = session
            .last_tap_ms
            .is_some_and(|last| now.saturating_sub(last) < self.config.double_tap_ms);
        if self.handlers.double_tap.is_some() && within_window {
            session.last_tap_ms = None;
            return Some(Gesture::DoubleTap { at: end });
        }
        session.last_tap_ms = Some(now);
        None
    }

    fn emit(&self, gesture: Gesture) {
        info!(?gesture, "gesture recognised");
        match gesture {
            Gesture::LongPress { at } => {
                if let Some(handler) = &self.handlers.long_press {
                    handler(at);
                }
            }
            Gesture::DoubleTap { at } => {
                if let Some(handler) = &self.handlers.double_tap {
                    handler(at);
                }
            }
            Gesture::Swipe { direction, .. } => {
                if let Some(handler) = &self.handlers.swipe {
                    handler(direction);
                }
            }
        }
    }
}

impl Drop for GestureRecognizer {
    fn drop(&mut self) {
        if let Some(id) = self.session.get_mut().long_press_timer.take() {
            self.scheduler.cancel(id);
        }
    }
}
