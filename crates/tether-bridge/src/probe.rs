// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Environment probe: are we inside the native shell, and on which platform?

use percent_encoding::percent_decode_str;
use tether_core::config::BridgeConfig;
use tether_core::types::{EnvironmentVerdict, Platform};
use tracing::debug;

use crate::host::{EnvironmentSignals, HostEnvironment};

const IOS_MARKERS: [&str; 3] = ["iphone", "ipad", "ipod"];
const ANDROID_MARKERS: [&str; 1] = ["android"];

/// Probe the host once. Headless hosts yield [`EnvironmentVerdict::headless`].
pub fn detect(host: &dyn HostEnvironment, config: &BridgeConfig) -> EnvironmentVerdict {
    let Some(signals) = host.signals() else {
        debug!("no windowing environment; assuming plain web");
        return EnvironmentVerdict::headless();
    };
    let verdict = classify(&signals, config);
    debug!(
        mobile = verdict.is_mobile_shell,
        platform = %verdict.platform,
        "environment detected"
    );
    verdict
}

/// Interpret raw signals. Any single shell signal is enough.
pub fn classify(signals: &EnvironmentSignals, config: &BridgeConfig) -> EnvironmentVerdict {
    let is_mobile_shell = signals.global_flag_set
        || query_flag(&signals.query, &config.query_param)
        || signals.native_bridge_present
        || (!config.user_agent_marker.is_empty()
            && signals.user_agent.contains(&config.user_agent_marker));

    EnvironmentVerdict {
        is_mobile_shell,
        platform: platform_from_user_agent(&signals.user_agent),
    }
}

/// Match the user agent case-insensitively: iOS first, then Android.
pub fn platform_from_user_agent(user_agent: &str) -> Platform {
    let lower = user_agent.to_ascii_lowercase();
    if IOS_MARKERS.iter().any(|m| lower.contains(m)) {
        Platform::Ios
    } else if ANDROID_MARKERS.iter().any(|m| lower.contains(m)) {
        Platform::Android
    } else {
        Platform::Web
    }
}

/// `true` when the query string carries `<param>=true`, after percent-decoding
/// both sides of each pair.
fn query_flag(query: &str, param: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| {
            percent_decode_str(key).decode_utf8_lossy() == param
                && percent_decode_str(value).decode_utf8_lossy() == "true"
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(user_agent: &str) -> EnvironmentSignals {
        EnvironmentSignals {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_browser_is_not_shell() {
        let verdict = classify(
            &signals("Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0"),
            &BridgeConfig::default(),
        );
        assert_eq!(verdict, EnvironmentVerdict::headless());
    }

    #[test]
    fn any_signal_marks_shell() {
        let config = BridgeConfig::default();

        let flag = EnvironmentSignals {
            global_flag_set: true,
            ..Default::default()
        };
        assert!(classify(&flag, &config).is_mobile_shell);

        let query = EnvironmentSignals {
            query: "?lang=en&mobile=true".into(),
            ..Default::default()
        };
        assert!(classify(&query, &config).is_mobile_shell);

        let bridge = EnvironmentSignals {
            native_bridge_present: true,
            ..Default::default()
        };
        assert!(classify(&bridge, &config).is_mobile_shell);

        assert!(classify(&signals("Mozilla/5.0 TetherShell/2.1"), &config).is_mobile_shell);
    }

    #[test]
    fn query_value_must_be_true() {
        let config = BridgeConfig::default();
        for query in ["mobile=false", "mobile", "?notmobile=true", "mobile=TRUE"] {
            let s = EnvironmentSignals {
                query: query.into(),
                ..Default::default()
            };
            assert!(!classify(&s, &config).is_mobile_shell, "{query}");
        }
    }

    #[test]
    fn query_pairs_are_percent_decoded() {
        let config = BridgeConfig::default();
        for query in ["?mobil%65=true", "mobile=%74rue", "a=1&%6D%6F%62%69%6C%65=%74%72%75%65"] {
            let s = EnvironmentSignals {
                query: query.into(),
                ..Default::default()
            };
            assert!(classify(&s, &config).is_mobile_shell, "{query}");
        }

        let encoded_false = EnvironmentSignals {
            query: "mobile=%66alse".into(),
            ..Default::default()
        };
        assert!(!classify(&encoded_false, &config).is_mobile_shell);
    }

    #[test]
    fn platform_matching_is_case_insensitive() {
        assert_eq!(
            platform_from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)"),
            Platform::Ios
        );
        assert_eq!(platform_from_user_agent("IPAD OS"), Platform::Ios);
        assert_eq!(
            platform_from_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"),
            Platform::Android
        );
        assert_eq!(platform_from_user_agent("Mozilla/5.0 (Windows NT 10.0)"), Platform::Web);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn headless_host_defaults_to_web() {
        let verdict = detect(&crate::stub::StubHost, &BridgeConfig::default());
        assert!(!verdict.is_mobile_shell);
        assert_eq!(verdict.platform, Platform::Web);
    }
}
