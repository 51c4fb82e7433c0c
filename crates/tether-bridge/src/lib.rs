// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Tether — message bridge between an embedded web app and its native shell.
//!
//! The bridge probes the host once, picks one of three delivery mechanisms on
//! every send, and fans inbound shell messages out to subscribers. All host
//! access goes through [`host::HostEnvironment`] so the same logic runs in a
//! WebView (the `web` module) and in headless builds and tests (the `stub`
//! module).

pub mod bridge;
pub mod host;
pub mod probe;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub mod stub;

use std::rc::Rc;

use tether_core::config::BridgeConfig;

pub use bridge::{DispatchReport, MessageBridge, Subscription, SubscriptionId};
pub use host::HostEnvironment;
pub use transport::TransportSelector;

/// Host environment for the current compilation target.
///
/// In the browser this reads `window`; everywhere else it is the headless
/// stub, which makes every bridge behave as "not inside a shell".
pub fn default_host(config: &BridgeConfig) -> Rc<dyn HostEnvironment> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(web::WebHost::new(config))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = config;
        Rc::new(stub::StubHost)
    }
}
