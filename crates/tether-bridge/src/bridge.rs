// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MessageBridge: typed outbound senders and the inbound subscriber registry.
//
// The bridge is constructed explicitly with its host and handed to whoever
// needs it; `initialize` wires the single inbound listener and is safe to call
// more than once. Everything runs on the page's event loop, so shared state is
// `Rc` + interior mutability and no borrow is held while handlers run.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tether_core::config::BridgeConfig;
use tether_core::error::{Result, TetherError};
use tether_core::types::{
    DeliveryOutcome, EnvironmentVerdict, InboundKind, InboundMessage, OutboundMessage, Platform,
    ToastDuration, UserIdentity,
};
use tracing::{debug, info, warn};

use crate::host::HostEnvironment;
use crate::probe;
use crate::transport::TransportSelector;

/// Subscriber callback. An `Err` is logged and does not stop dispatch.
pub type MessageHandler = Rc<dyn Fn(&InboundMessage) -> Result<()>>;

/// Identity of one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Default)]
struct SubscriberSet {
    next_id: Cell<u64>,
    handlers: RefCell<BTreeMap<SubscriptionId, MessageHandler>>,
}

impl SubscriberSet {
    fn insert(&self, handler: MessageHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.handlers.borrow_mut().insert(id, handler);
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow_mut().remove(&id).is_some()
    }

    fn snapshot(&self) -> Vec<(SubscriptionId, MessageHandler)> {
        self.handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect()
    }

    fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Invoke every handler registered when dispatch starts.
    fn dispatch(&self, message: &InboundMessage) -> DispatchReport {
        let mut report = DispatchReport {
            kind: message.kind,
            invoked: 0,
            failures: Vec::new(),
        };
        for (id, handler) in self.snapshot() {
            report.invoked += 1;
            if let Err(e) = handler(message) {
                warn!(subscription = %id, kind = %message.kind, error = %e, "message handler failed");
                report.failures.push((id, e));
            }
        }
        if report.failures.is_empty() {
            debug!(kind = %message.kind, handlers = report.invoked, "inbound message dispatched");
        } else {
            warn!(
                kind = %message.kind,
                handlers = report.invoked,
                failed = report.failures.len(),
                "inbound message dispatched with handler failures"
            );
        }
        report
    }
}

/// Handle returned by [`MessageBridge::on_message`].
///
/// Dropping it leaves the handler registered; call [`Subscription::unsubscribe`]
/// to remove it.
pub struct Subscription {
    id: SubscriptionId,
    subscribers: Weak<SubscriberSet>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove exactly this handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        self.subscribers
            .upgrade()
            .is_some_and(|set| set.remove(self.id))
    }
}

/// Per-handler results of one inbound dispatch.
#[derive(Debug)]
pub struct DispatchReport {
    pub kind: InboundKind,
    pub invoked: usize,
    pub failures: Vec<(SubscriptionId, TetherError)>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }
}

struct BridgeInner {
    host: Rc<dyn HostEnvironment>,
    selector: TransportSelector,
    subscribers: Rc<SubscriberSet>,
    initialized: Cell<bool>,
}

/// The web side of the shell bridge. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MessageBridge {
    inner: Rc<BridgeInner>,
}

impl MessageBridge {
    /// Probe the host once and build the standard transport chain.
    pub fn new(host: Rc<dyn HostEnvironment>, config: &BridgeConfig) -> Self {
        let verdict = probe::detect(host.as_ref(), config);
        let selector = TransportSelector::standard(Rc::clone(&host), verdict);
        Self::with_selector(host, selector)
    }

    /// Build around a caller-provided selector.
    pub fn with_selector(host: Rc<dyn HostEnvironment>, selector: TransportSelector) -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                host,
                selector,
                subscribers: Rc::new(SubscriberSet::default()),
                initialized: Cell::new(false),
            }),
        }
    }

    /// Register the inbound host listener. Later calls are no-ops.
    pub fn initialize(&self) -> Result<()> {
        if self.inner.initialized.replace(true) {
            return Ok(());
        }
        let subscribers = Rc::downgrade(&self.inner.subscribers);
        let registered = self.inner.host.listen_inbound(Box::new(move |raw| {
            if let Some(set) = subscribers.upgrade() {
                dispatch_raw_to(&set, raw);
            }
        }));
        if let Err(e) = registered {
            self.inner.initialized.set(false);
            return Err(e);
        }
        info!(
            mobile = self.is_mobile_shell(),
            platform = %self.platform(),
            "message bridge initialised"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    pub fn verdict(&self) -> EnvironmentVerdict {
        self.inner.selector.verdict()
    }

    pub fn is_mobile_shell(&self) -> bool {
        self.verdict().is_mobile_shell
    }

    pub fn platform(&self) -> Platform {
        self.verdict().platform
    }

    pub fn is_ios(&self) -> bool {
        self.verdict().is_ios()
    }

    pub fn is_android(&self) -> bool {
        self.verdict().is_android()
    }

    // -- Outbound ------------------------------------------------------------

    /// Best-effort send. The outcome is logged and returned for inspection;
    /// it is never an error.
    pub fn post_message(&self, message: &OutboundMessage) -> DeliveryOutcome {
        self.inner.selector.send(message)
    }

    pub fn save_auth(
        &self,
        token: &str,
        user: &UserIdentity,
        expires_in: Option<u64>,
    ) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::save_auth(token, user, expires_in))
    }

    pub fn logout(&self) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::logout())
    }

    pub fn open_external(&self, url: &str) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::open_external(url))
    }

    pub fn copy_text(&self, text: &str) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::copy_text(text))
    }

    pub fn toggle_fullscreen(&self, enabled: Option<bool>) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::toggle_fullscreen(enabled))
    }

    pub fn show_toast(&self, message: &str, duration: Option<ToastDuration>) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::show_toast(message, duration))
    }

    pub fn token_expired(&self) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::token_expired())
    }

    pub fn get_device_info(&self) -> DeliveryOutcome {
        self.post_message(&OutboundMessage::get_device_info())
    }

    // -- Inbound -------------------------------------------------------------

    /// Subscribe to every valid inbound message.
    pub fn on_message<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InboundMessage) -> Result<()> + 'static,
    {
        let id = self.inner.subscribers.insert(Rc::new(handler));
        debug!(subscription = %id, "message handler registered");
        Subscription {
            id,
            subscribers: Rc::downgrade(&self.inner.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Feed one raw host event through validation and fan-out.
    ///
    /// Returns `None` when the payload was discarded as malformed.
    pub fn dispatch_raw(&self, raw: Value) -> Option<DispatchReport> {
        dispatch_raw_to(&self.inner.subscribers, raw)
    }
}

fn dispatch_raw_to(subscribers: &SubscriberSet, raw: Value) -> Option<DispatchReport> {
    // Some shells deliver the JSON text rather than the object.
    let raw = match raw {
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => {
                debug!("discarding non-JSON inbound string");
                return None;
            }
        },
        other => other,
    };
    let Some(message) = InboundMessage::parse(&raw) else {
        debug!("discarding malformed inbound payload");
        return None;
    };
    Some(subscribers.dispatch(&message))
}
