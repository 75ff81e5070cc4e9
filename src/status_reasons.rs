// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes `Status` reasons reported to cert-manager on failed challenges.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a
//! `Present` or `CleanUp` call failed. They end up in the `status.reason` field
//! of the `ChallengePayload` response and in the `reason` label of the
//! `errors_total` metric.
//!
//! # Example Response
//!
//! ```yaml
//! response:
//!   uid: 6a1c...
//!   success: false
//!   status:
//!     status: Failure
//!     reason: SecretKeyMissing
//!     message: "no key \"password\" in secret \"cert-manager/loopia-credentials\""
//!     code: 500
//! ```

// ============================================================================
// Payload Reasons
// ============================================================================

/// The `ChallengePayload` envelope carried no `request`.
pub const REASON_INVALID_PAYLOAD: &str = "InvalidPayload";

/// The request `action` was neither `Present` nor `CleanUp`.
pub const REASON_UNSUPPORTED_ACTION: &str = "UnsupportedAction";

/// The solver has not been initialized with a Kubernetes client.
pub const REASON_NOT_INITIALIZED: &str = "SolverNotInitialized";

/// The per-issuer solver configuration could not be decoded.
pub const REASON_CONFIG_INVALID: &str = "ConfigurationInvalid";

// ============================================================================
// Credential Reasons
// ============================================================================

/// A referenced Kubernetes Secret could not be fetched.
///
/// Possible causes:
/// - Secret does not exist in the challenge namespace
/// - The webhook's `ServiceAccount` lacks `get` on secrets
/// - The API server is unreachable
pub const REASON_SECRET_FETCH_FAILED: &str = "SecretFetchFailed";

/// A referenced Secret exists but does not contain the referenced key.
pub const REASON_SECRET_KEY_MISSING: &str = "SecretKeyMissing";

// ============================================================================
// Zone Record Store Reasons
// ============================================================================

/// A client for the zone record store could not be constructed.
pub const REASON_STORE_CLIENT_FAILED: &str = "StoreClientFailed";

/// Listing records at the challenge name failed.
pub const REASON_RECORD_LIST_FAILED: &str = "RecordListFailed";

/// Creating the challenge TXT record failed.
pub const REASON_RECORD_CREATE_FAILED: &str = "RecordCreateFailed";

/// Deleting a matching challenge TXT record failed.
pub const REASON_RECORD_DELETE_FAILED: &str = "RecordDeleteFailed";

/// Removing the emptied challenge subdomain failed.
///
/// This reason is informational: the TXT record itself was already removed,
/// so the challenge is reported as cleaned up.
pub const REASON_SUBDOMAIN_REMOVE_FAILED: &str = "SubdomainRemoveFailed";
