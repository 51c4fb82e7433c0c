// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Tether bridge: wire messages, environment verdict
// and delivery outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, TetherError};

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Platform family the page is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Web => "web",
        };
        f.write_str(name)
    }
}

/// Result of probing the host environment. Computed once per bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVerdict {
    pub is_mobile_shell: bool,
    pub platform: Platform,
}

impl EnvironmentVerdict {
    /// Verdict for a context without any windowing environment.
    pub const fn headless() -> Self {
        Self {
            is_mobile_shell: false,
            platform: Platform::Web,
        }
    }

    /// `true` when the user agent identified an iPhone, iPad or iPod.
    pub fn is_ios(&self) -> bool {
        self.platform == Platform::Ios
    }

    pub fn is_android(&self) -> bool {
        self.platform == Platform::Android
    }
}

impl Default for EnvironmentVerdict {
    fn default() -> Self {
        Self::headless()
    }
}

// ---------------------------------------------------------------------------
// Outbound (web -> native)
// ---------------------------------------------------------------------------

/// Message kinds the web side may send to the native shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundKind {
    SaveAuth,
    Logout,
    OpenExternal,
    CopyText,
    ToggleFullscreen,
    ShowToast,
    GetDeviceInfo,
    TokenExpired,
}

impl OutboundKind {
    pub const ALL: [OutboundKind; 8] = [
        Self::SaveAuth,
        Self::Logout,
        Self::OpenExternal,
        Self::CopyText,
        Self::ToggleFullscreen,
        Self::ShowToast,
        Self::GetDeviceInfo,
        Self::TokenExpired,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaveAuth => "SAVE_AUTH",
            Self::Logout => "LOGOUT",
            Self::OpenExternal => "OPEN_EXTERNAL",
            Self::CopyText => "COPY_TEXT",
            Self::ToggleFullscreen => "TOGGLE_FULLSCREEN",
            Self::ShowToast => "SHOW_TOAST",
            Self::GetDeviceInfo => "GET_DEVICE_INFO",
            Self::TokenExpired => "TOKEN_EXPIRED",
        }
    }
}

impl std::fmt::Display for OutboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the signed-in user, carried by `SAVE_AUTH` and `TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
}

/// How long a native toast stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastDuration {
    Short,
    Long,
}

/// A message addressed to the native shell. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    kind: OutboundKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl OutboundMessage {
    /// Message without a payload.
    pub fn new(kind: OutboundKind) -> Self {
        Self { kind, data: None }
    }

    /// Message with an arbitrary structured payload.
    pub fn with_data(kind: OutboundKind, data: Value) -> Self {
        Self {
            kind,
            data: Some(data),
        }
    }

    pub fn save_auth(token: &str, user: &UserIdentity, expires_in: Option<u64>) -> Self {
        let mut data = json!({ "token": token, "user": user });
        if let (Some(secs), Some(obj)) = (expires_in, data.as_object_mut()) {
            obj.insert("expiresIn".into(), json!(secs));
        }
        Self::with_data(OutboundKind::SaveAuth, data)
    }

    pub fn logout() -> Self {
        Self::new(OutboundKind::Logout)
    }

    pub fn open_external(url: &str) -> Self {
        Self::with_data(OutboundKind::OpenExternal, json!({ "url": url }))
    }

    pub fn copy_text(text: &str) -> Self {
        Self::with_data(OutboundKind::CopyText, json!({ "text": text }))
    }

    /// `None` asks the shell to flip the current state.
    pub fn toggle_fullscreen(enabled: Option<bool>) -> Self {
        match enabled {
            Some(enabled) => {
                Self::with_data(OutboundKind::ToggleFullscreen, json!({ "enabled": enabled }))
            }
            None => Self::new(OutboundKind::ToggleFullscreen),
        }
    }

    pub fn show_toast(message: &str, duration: Option<ToastDuration>) -> Self {
        let mut data = json!({ "message": message });
        if let (Some(duration), Some(obj)) = (duration, data.as_object_mut()) {
            obj.insert("duration".into(), json!(duration));
        }
        Self::with_data(OutboundKind::ShowToast, data)
    }

    pub fn get_device_info() -> Self {
        Self::new(OutboundKind::GetDeviceInfo)
    }

    pub fn token_expired() -> Self {
        Self::new(OutboundKind::TokenExpired)
    }

    pub fn kind(&self) -> OutboundKind {
        self.kind
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Structured form handed to transports that accept objects.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical string form for transports that only accept text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Inbound (native -> web)
// ---------------------------------------------------------------------------

/// Message kinds the native shell may deliver to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundKind {
    Token,
    DeviceInfo,
    LogoutComplete,
    AuthSaved,
}

impl InboundKind {
    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "TOKEN" => Some(Self::Token),
            "DEVICE_INFO" => Some(Self::DeviceInfo),
            "LOGOUT_COMPLETE" => Some(Self::LogoutComplete),
            "AUTH_SAVED" => Some(Self::AuthSaved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "TOKEN",
            Self::DeviceInfo => "DEVICE_INFO",
            Self::LogoutComplete => "LOGOUT_COMPLETE",
            Self::AuthSaved => "AUTH_SAVED",
        }
    }
}

impl std::fmt::Display for InboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `TOKEN` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Safe-area insets reported by the shell, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeAreaInsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Payload of a `DEVICE_INFO` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub platform: String,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub safe_area_insets: Option<SafeAreaInsets>,
}

/// A validated message from the native shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: InboundKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InboundMessage {
    pub fn new(kind: InboundKind, data: Option<Value>) -> Self {
        Self { kind, data }
    }

    /// Validate a raw host payload.
    ///
    /// Returns `None` unless the value is an object whose `type` is a known,
    /// non-empty inbound kind. A `null` data field counts as absent.
    pub fn parse(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .and_then(InboundKind::from_wire)?;
        let data = obj.get("data").filter(|d| !d.is_null()).cloned();
        Some(Self { kind, data })
    }

    /// Decode the payload of a `TOKEN` message.
    pub fn token(&self) -> Result<TokenPayload> {
        self.decode(InboundKind::Token)
    }

    /// Decode the payload of a `DEVICE_INFO` message.
    pub fn device_info(&self) -> Result<DeviceInfo> {
        self.decode(InboundKind::DeviceInfo)
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, expected: InboundKind) -> Result<T> {
        if self.kind != expected {
            return Err(TetherError::Payload(format!(
                "expected {expected} message, got {}",
                self.kind
            )));
        }
        let data = self
            .data
            .clone()
            .ok_or_else(|| TetherError::Payload(format!("{expected} message has no data")))?;
        Ok(serde_json::from_value(data)?)
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// The closed set of outbound delivery mechanisms, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Host object with a structured-message send method.
    NativeBridge,
    /// Cross-context broadcast to the embedding parent frame.
    ParentFrame,
    /// Host WebView channel that only accepts strings.
    WebView,
}

impl TransportKind {
    pub const PRIORITY: [TransportKind; 3] = [Self::NativeBridge, Self::ParentFrame, Self::WebView];
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NativeBridge => "native-bridge",
            Self::ParentFrame => "parent-frame",
            Self::WebView => "web-view",
        };
        f.write_str(name)
    }
}

/// Why a send was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotMobile,
}

/// What happened to one outbound message. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum DeliveryOutcome {
    Delivered { transport: TransportKind },
    Skipped { reason: SkipReason },
    Unavailable,
    /// The first available transport raised; later ones are not tried.
    Failed { transport: TransportKind, reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_wire_shape() {
        let msg = OutboundMessage::copy_text("hello");
        let value = msg.to_value().unwrap();
        assert_eq!(value, json!({ "type": "COPY_TEXT", "data": { "text": "hello" } }));
    }

    #[test]
    fn outbound_without_data_omits_field() {
        let json = OutboundMessage::logout().to_json().unwrap();
        assert_eq!(json, r#"{"type":"LOGOUT"}"#);
    }

    #[test]
    fn save_auth_carries_identity_and_expiry() {
        let user = UserIdentity {
            id: "42".into(),
            username: "ada".into(),
        };
        let msg = OutboundMessage::save_auth("tok", &user, Some(3600));
        assert_eq!(msg.kind(), OutboundKind::SaveAuth);
        assert_eq!(
            msg.data().cloned().unwrap(),
            json!({ "token": "tok", "user": { "id": "42", "username": "ada" }, "expiresIn": 3600 })
        );

        let no_expiry = OutboundMessage::save_auth("tok", &user, None);
        assert!(no_expiry.data().unwrap().get("expiresIn").is_none());
    }

    #[test]
    fn kind_names_match_serde() {
        for kind in OutboundKind::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, json!(kind.as_str()));
        }
    }

    #[test]
    fn inbound_parse_accepts_known_kinds() {
        let msg = InboundMessage::parse(&json!({ "type": "AUTH_SAVED" })).unwrap();
        assert_eq!(msg.kind, InboundKind::AuthSaved);
        assert!(msg.data.is_none());
    }

    #[test]
    fn inbound_parse_rejects_malformed() {
        for raw in [
            json!({}),
            json!({ "type": "" }),
            json!(null),
            json!("TOKEN"),
            json!({ "type": "SAVE_AUTH" }),
            json!({ "type": 7 }),
        ] {
            assert!(InboundMessage::parse(&raw).is_none(), "accepted {raw}");
        }
    }

    #[test]
    fn token_payload_decodes() {
        let msg = InboundMessage::parse(&json!({
            "type": "TOKEN",
            "data": { "token": "abc", "expiresIn": 60 }
        }))
        .unwrap();
        let payload = msg.token().unwrap();
        assert_eq!(payload.token, "abc");
        assert_eq!(payload.expires_in, Some(60));
        assert!(msg.device_info().is_err());
    }

    #[test]
    fn device_info_payload_decodes() {
        let msg = InboundMessage::parse(&json!({
            "type": "DEVICE_INFO",
            "data": {
                "platform": "ios",
                "osVersion": "17.4",
                "model": "iPhone15,2",
                "safeAreaInsets": { "top": 59.0, "right": 0.0, "bottom": 34.0, "left": 0.0 }
            }
        }))
        .unwrap();
        let info = msg.device_info().unwrap();
        assert_eq!(info.platform, "ios");
        assert_eq!(info.os_version.as_deref(), Some("17.4"));
        assert_eq!(info.app_version, None);
        assert_eq!(info.model.as_deref(), Some("iPhone15,2"));
        assert_eq!(
            info.safe_area_insets,
            Some(SafeAreaInsets {
                top: 59.0,
                right: 0.0,
                bottom: 34.0,
                left: 0.0,
            })
        );
        assert!(msg.token().is_err());
    }

    #[test]
    fn device_info_without_data_is_payload_error() {
        let msg = InboundMessage::new(InboundKind::DeviceInfo, None);
        assert!(matches!(msg.device_info(), Err(TetherError::Payload(_))));
    }

    #[test]
    fn verdict_platform_predicates() {
        let ios = EnvironmentVerdict {
            is_mobile_shell: true,
            platform: Platform::Ios,
        };
        assert!(ios.is_ios() && !ios.is_android());

        let android = EnvironmentVerdict {
            platform: Platform::Android,
            ..ios
        };
        assert!(android.is_android() && !android.is_ios());

        let web = EnvironmentVerdict::headless();
        assert!(!web.is_ios() && !web.is_android());
    }

    #[test]
    fn transport_display_matches_serde() {
        for kind in TransportKind::PRIORITY {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.to_string()));
        }
        assert_eq!(TransportKind::WebView.to_string(), "web-view");
    }

    #[test]
    fn delivery_outcome_serializes_tagged() {
        let outcome = DeliveryOutcome::Delivered {
            transport: TransportKind::WebView,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "outcome": "delivered", "transport": "web-view" })
        );
    }
}
