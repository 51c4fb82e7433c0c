// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbound transports and the selector that picks one per send.
//
// The three mechanisms are mutually exclusive and tried in a fixed order;
// the first one whose host capability exists at call time wins. Nothing is
// queued or retried.

use std::rc::Rc;

use tether_core::error::Result;
use tether_core::types::{
    DeliveryOutcome, EnvironmentVerdict, OutboundMessage, SkipReason, TransportKind,
};
use tracing::{debug, info, warn};

use crate::host::HostEnvironment;

/// Target origin for parent-frame broadcasts.
pub const BROADCAST_ORIGIN: &str = "*";

/// One way of delivering a message to the native shell.
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// `Ok(false)` when the capability is absent right now; `Ok(true)` once
    /// the host accepted the message.
    fn try_send(&self, message: &OutboundMessage) -> Result<bool>;
}

/// Structured post to the injected native bridge object.
pub struct NativeBridgeTransport {
    host: Rc<dyn HostEnvironment>,
}

impl Transport for NativeBridgeTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::NativeBridge
    }

    fn try_send(&self, message: &OutboundMessage) -> Result<bool> {
        let Some(channel) = self.host.native_bridge() else {
            return Ok(false);
        };
        channel.post(&message.to_value()?)?;
        Ok(true)
    }
}

/// Broadcast to the parent context when embedded as a child frame.
pub struct ParentFrameTransport {
    host: Rc<dyn HostEnvironment>,
}

impl Transport for ParentFrameTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::ParentFrame
    }

    fn try_send(&self, message: &OutboundMessage) -> Result<bool> {
        let Some(parent) = self.host.parent_frame() else {
            return Ok(false);
        };
        parent.post(&message.to_value()?, BROADCAST_ORIGIN)?;
        Ok(true)
    }
}

/// String-only WebView channel; the message is serialised first.
pub struct WebViewTransport {
    host: Rc<dyn HostEnvironment>,
}

impl Transport for WebViewTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::WebView
    }

    fn try_send(&self, message: &OutboundMessage) -> Result<bool> {
        let Some(channel) = self.host.webview_channel() else {
            return Ok(false);
        };
        channel.post_text(&message.to_json()?)?;
        Ok(true)
    }
}

/// Ordered transport list gated by the environment verdict.
pub struct TransportSelector {
    verdict: EnvironmentVerdict,
    transports: Vec<Box<dyn Transport>>,
}

impl TransportSelector {
    /// The standard priority: native bridge, parent frame, WebView channel.
    pub fn standard(host: Rc<dyn HostEnvironment>, verdict: EnvironmentVerdict) -> Self {
        let transports: Vec<Box<dyn Transport>> = TransportKind::PRIORITY
            .into_iter()
            .map(|kind| transport_for(kind, Rc::clone(&host)))
            .collect();
        Self::with_transports(verdict, transports)
    }

    pub fn with_transports(
        verdict: EnvironmentVerdict,
        transports: Vec<Box<dyn Transport>>,
    ) -> Self {
        Self {
            verdict,
            transports,
        }
    }

    pub fn verdict(&self) -> EnvironmentVerdict {
        self.verdict
    }

    /// Deliver through the first available transport.
    pub fn send(&self, message: &OutboundMessage) -> DeliveryOutcome {
        if !self.verdict.is_mobile_shell {
            debug!(kind = %message.kind(), "not in mobile shell; send skipped");
            return DeliveryOutcome::Skipped {
                reason: SkipReason::NotMobile,
            };
        }

        for transport in &self.transports {
            let kind = transport.kind();
            match transport.try_send(message) {
                Ok(false) => continue,
                Ok(true) => {
                    info!(kind = %message.kind(), transport = %kind, "message delivered");
                    return DeliveryOutcome::Delivered { transport: kind };
                }
                Err(e) => {
                    warn!(kind = %message.kind(), transport = %kind, error = %e, "transport failed");
                    return DeliveryOutcome::Failed {
                        transport: kind,
                        reason: e.to_string(),
                    };
                }
            }
        }

        warn!(kind = %message.kind(), "no transport available; message dropped");
        DeliveryOutcome::Unavailable
    }
}

fn transport_for(kind: TransportKind, host: Rc<dyn HostEnvironment>) -> Box<dyn Transport> {
    match kind {
        TransportKind::NativeBridge => Box::new(NativeBridgeTransport { host }),
        TransportKind::ParentFrame => Box::new(ParentFrameTransport { host }),
        TransportKind::WebView => Box::new(WebViewTransport { host }),
    }
}
