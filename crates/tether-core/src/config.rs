// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge and gesture configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

/// Top-level settings. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    pub bridge: BridgeConfig,
    pub gesture: GestureConfig,
}

impl TetherConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.gesture.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Names of the environment signals the probe looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Global boolean the hosting shell sets before the page loads.
    pub global_flag: String,
    /// Query parameter that forces shell mode when equal to `true`.
    pub query_param: String,
    /// Substring of the user agent that the shell appends.
    pub user_agent_marker: String,
    /// Global object exposing a structured `postMessage`.
    pub native_bridge_object: String,
    /// Global object exposing a string-only `postMessage`.
    pub webview_channel_object: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            global_flag: "__IS_MOBILE_APP__".into(),
            query_param: "mobile".into(),
            user_agent_marker: "TetherShell".into(),
            native_bridge_object: "NativeBridge".into(),
            webview_channel_object: "ReactNativeWebView".into(),
        }
    }
}

/// Timing and distance thresholds for the gesture recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a long-press fires.
    pub long_press_ms: u64,
    /// Movement in either axis that cancels a pending long-press.
    pub move_tolerance_px: f64,
    /// Displacement in the dominant axis that makes a swipe.
    pub swipe_threshold_px: f64,
    /// Maximum gap between two tap ends for a double-tap.
    pub double_tap_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            move_tolerance_px: 10.0,
            swipe_threshold_px: 50.0,
            double_tap_ms: 300,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.long_press_ms == 0 || self.double_tap_ms == 0 {
            return Err(TetherError::Config("gesture durations must be non-zero".into()));
        }
        if self.move_tolerance_px.is_nan() || self.move_tolerance_px < 0.0 {
            return Err(TetherError::Config(
                "move tolerance must be a non-negative number".into(),
            ));
        }
        if self.swipe_threshold_px.is_nan() || self.swipe_threshold_px <= self.move_tolerance_px {
            return Err(TetherError::Config(format!(
                "swipe threshold ({}) must exceed move tolerance ({})",
                self.swipe_threshold_px, self.move_tolerance_px
            )));
        }
        Ok(())
    }
}
