// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Tether.

use thiserror::Error;

/// Top-level error type for all Tether operations.
///
/// None of these ever reach the caller of a send: a transport error becomes
/// `DeliveryOutcome::Failed`. They surface from construction, configuration,
/// payload decoding and host plumbing.
#[derive(Debug, Error)]
pub enum TetherError {
    // -- Wire --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unexpected message payload: {0}")]
    Payload(String),

    // -- Host --
    #[error("host environment error: {0}")]
    Host(String),

    #[error("no windowing environment available")]
    HostUnavailable,

    // -- Subscribers / surfaces --
    #[error("message handler failed: {0}")]
    Handler(String),

    #[error("touch surface error: {0}")]
    Surface(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TetherError>;
