// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where no page or shell exists.
//
// Reports a headless environment and no transports. The real implementation
// lives in the `web` module.

use std::rc::Rc;

use tether_core::error::Result;

use crate::host::{
    EnvironmentSignals, FrameChannel, HostEnvironment, InboundListener, StructuredChannel,
    TextChannel,
};

/// No-op host returned on non-wasm targets.
pub struct StubHost;

impl HostEnvironment for StubHost {
    fn signals(&self) -> Option<EnvironmentSignals> {
        None
    }

    fn native_bridge(&self) -> Option<Rc<dyn StructuredChannel>> {
        None
    }

    fn parent_frame(&self) -> Option<Rc<dyn FrameChannel>> {
        None
    }

    fn webview_channel(&self) -> Option<Rc<dyn TextChannel>> {
        None
    }

    fn listen_inbound(&self, _listener: InboundListener) -> Result<()> {
        tracing::debug!("inbound listener registered on stub host; no events will arrive");
        Ok(())
    }
}
