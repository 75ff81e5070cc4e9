// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-issuer solver configuration.
//!
//! cert-manager hands the `issuer.spec.acme.solvers[].dns01.webhook.config`
//! object to the webhook verbatim with every challenge. For Loopia it only
//! references the Kubernetes Secrets holding the API credentials:
//!
//! ```yaml
//! config:
//!   usernameSecretKeyRef:
//!     name: loopia-credentials
//!     key: username
//!   passwordSecretKeyRef:
//!     name: loopia-credentials
//!     key: password
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SolverError;

/// Reference to a single key inside a Kubernetes Secret.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecretKeySelector {
    /// Name of the Secret in the challenge's namespace
    pub name: String,
    /// Key within the Secret's data
    pub key: String,
}

/// Decoded webhook configuration.
///
/// An absent or empty payload decodes to empty references. That is not an
/// error by itself; resolution fails later when the empty refs are looked up.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    pub username_secret_key_ref: SecretKeySelector,
    pub password_secret_key_ref: SecretKeySelector,
}

/// Decode the raw JSON configuration into a [`SolverConfig`].
///
/// # Errors
///
/// Returns [`SolverError::ConfigDecode`] if the payload is present but does
/// not match the expected shape.
pub fn load_config(raw: Option<&Value>) -> Result<SolverConfig, SolverError> {
    // No configuration at all is the base case
    let Some(raw) = raw.filter(|value| !value.is_null()) else {
        return Ok(SolverConfig::default());
    };

    SolverConfig::deserialize(raw).map_err(|e| SolverError::ConfigDecode {
        reason: e.to_string(),
    })
}
