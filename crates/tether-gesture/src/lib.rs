// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tether — touch gesture recognition.
//
// A recognizer is bound to one surface and turns its contact-start/move/end
// stream into at most one long-press, double-tap or swipe per sequence.

pub mod recognizer;
pub mod scheduler;
pub mod surface;
pub mod touch;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use recognizer::{Gesture, GestureHandlers, GestureRecognizer, RecognizerState};
pub use scheduler::{ManualScheduler, Scheduler, TimerId};
pub use surface::{GestureBinding, TouchSink, TouchSurface, bind};
pub use touch::{SwipeDirection, TouchEvent, TouchPhase, TouchPoint};
