// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential resolution from Kubernetes Secrets.
//!
//! The Loopia API username and password are never part of the issuer
//! configuration. Instead the configuration references one key in a Secret
//! for each half, and the Secrets are read from the challenge's namespace on
//! every call. Nothing is cached: rotating the Secret takes effect with the
//! next challenge.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::config::{SecretKeySelector, SolverConfig};
use crate::errors::SolverError;

/// Username/password pair for the zone record store.
///
/// Lives for the duration of a single `present`/`clean_up` call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read access to namespaced secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the data map of the secret `namespace/name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret does not exist, access is denied, or
    /// the API server cannot be reached.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>>;
}

/// [`SecretStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = secret_api
            .get(name)
            .await
            .context(format!("Failed to get secret {name} in namespace {namespace}"))?;

        // An empty Secret carries no data map at all
        let data = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect();

        Ok(data)
    }
}

/// Resolve the Loopia credentials referenced by `config` in `namespace`.
///
/// The secret store is consulted once per reference, even when both
/// references point at the same Secret.
///
/// # Errors
///
/// Returns [`SolverError::SecretFetch`] if a Secret cannot be fetched and
/// [`SolverError::SecretKeyMissing`] if it lacks the referenced key.
pub async fn resolve_credentials(
    secrets: &dyn SecretStore,
    config: &SolverConfig,
    namespace: &str,
) -> Result<Credential, SolverError> {
    let username = resolve_secret_value(secrets, &config.username_secret_key_ref, namespace).await?;
    let password = resolve_secret_value(secrets, &config.password_secret_key_ref, namespace).await?;

    Ok(Credential { username, password })
}

async fn resolve_secret_value(
    secrets: &dyn SecretStore,
    selector: &SecretKeySelector,
    namespace: &str,
) -> Result<String, SolverError> {
    debug!(
        secret = %selector.name,
        key = %selector.key,
        namespace = %namespace,
        "Loading secret value"
    );

    let qualified_name = format!("{namespace}/{}", selector.name);

    let data = secrets
        .get_secret(namespace, &selector.name)
        .await
        .map_err(|e| SolverError::SecretFetch {
            secret: qualified_name.clone(),
            reason: format!("{e:#}"),
        })?;

    data.get(&selector.key)
        .map(|value| String::from_utf8_lossy(value).into_owned())
        .ok_or_else(|| SolverError::SecretKeyMissing {
            key: selector.key.clone(),
            secret: qualified_name,
        })
}
