// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw touch input and gesture vocabulary.

use serde::{Deserialize, Serialize};

/// One contact point in surface coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    pub fn delta_from(&self, origin: TouchPoint) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// A contact event as delivered by the surface.
///
/// For `Start`/`Move` the points are the active contacts; for `End` they are
/// the contacts that just lifted. Only the first point is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub points: Vec<TouchPoint>,
    /// Event time in milliseconds on the surface's clock.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    pub fn start(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::single(TouchPhase::Start, x, y, timestamp_ms)
    }

    pub fn moved(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::single(TouchPhase::Move, x, y, timestamp_ms)
    }

    pub fn end(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::single(TouchPhase::End, x, y, timestamp_ms)
    }

    fn single(phase: TouchPhase, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            phase,
            points: vec![TouchPoint::new(x, y)],
            timestamp_ms,
        }
    }

    pub fn primary(&self) -> Option<TouchPoint> {
        self.points.first().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Dominant-axis classification; ties go vertical. `+y` points down.
    pub fn classify(dx: f64, dy: f64) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 { Self::Right } else { Self::Left }
        } else if dy > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(name)
    }
}
