// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replay script format.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tether_core::error::Result;
use tether_core::types::{OutboundMessage, TransportKind};
use tether_gesture::TouchEvent;

/// A recorded session: the simulated page plus the events to replay.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub environment: EnvironmentSpec,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// What the simulated page looks like to the probe.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvironmentSpec {
    /// No windowing environment at all.
    pub headless: bool,
    pub global_flag: bool,
    pub query: String,
    pub user_agent: String,
    /// Transports injected at load time.
    pub transports: Vec<TransportKind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Post an outbound message through the bridge.
    Send(OutboundMessage),
    /// Deliver a raw host event to the bridge listener.
    Inbound(Value),
    /// Deliver a touch event to the bound surface.
    Touch(TouchEvent),
    /// Advance virtual time.
    AdvanceMs(u64),
    /// Replace the set of injected transports.
    SetTransports(Vec<TransportKind>),
}
