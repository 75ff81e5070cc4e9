// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Loopia webhook solver.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Solver Constants
// ============================================================================

/// Name under which this solver is registered with cert-manager.
///
/// Must be unique within the webhook's group name.
pub const SOLVER_NAME: &str = "loopia";

/// Minimum TTL accepted by Loopia (5 minutes)
pub const LOOPIA_MIN_TTL_SECS: u32 = 300;

/// Record type tag for ACME challenge records
pub const RECORD_TYPE_TXT: &str = "TXT";

/// Priority used for TXT records (unused by the record type)
pub const TXT_RECORD_PRIORITY: u32 = 0;

// ============================================================================
// Loopia API Constants
// ============================================================================

/// Default Loopia XML-RPC endpoint
pub const DEFAULT_LOOPIA_API_URL: &str = "https://api.loopia.se/RPCSERV";

/// Default HTTP timeout for Loopia API calls
pub const DEFAULT_LOOPIA_TIMEOUT_SECS: u64 = 30;

/// Loopia status string for a successful call
pub const LOOPIA_STATUS_OK: &str = "OK";

/// Loopia status string for rejected credentials
pub const LOOPIA_STATUS_AUTH_ERROR: &str = "AUTH_ERROR";

/// Loopia status string for throttled callers
pub const LOOPIA_STATUS_RATE_LIMITED: &str = "RATE_LIMITED";

/// Loopia status string for invalid arguments
pub const LOOPIA_STATUS_BAD_INDATA: &str = "BAD_INDATA";

// ============================================================================
// cert-manager Webhook API Constants
// ============================================================================

/// `apiVersion` of the `ChallengePayload` envelope
pub const WEBHOOK_PAYLOAD_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind of the `ChallengePayload` envelope
pub const KIND_CHALLENGE_PAYLOAD: &str = "ChallengePayload";

/// API version served under the webhook's group name
pub const WEBHOOK_API_VERSION: &str = "v1alpha1";

/// Challenge action that presents a record
pub const ACTION_PRESENT: &str = "Present";

/// Challenge action that cleans up a record
pub const ACTION_CLEAN_UP: &str = "CleanUp";

/// Kubernetes `Status.status` value for failed operations
pub const STATUS_FAILURE: &str = "Failure";

/// HTTP code reported in failure `Status` objects
pub const STATUS_FAILURE_CODE: i32 = 500;

// ============================================================================
// Server Constants
// ============================================================================

/// Default HTTPS port for the webhook API server
pub const DEFAULT_SECURE_PORT: u16 = 8443;

/// Default bind address for the webhook API server
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Worker threads for the Tokio runtime
pub const RUNTIME_WORKER_THREADS: usize = 4;
