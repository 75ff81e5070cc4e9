// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager DNS-01 solver façade.
//!
//! A [`Solver`] is the capability cert-manager's webhook protocol expects from
//! a DNS provider: a stable name, a one-time [`Solver::initialize`], and the
//! two idempotent challenge operations [`Solver::present`] and
//! [`Solver::clean_up`]. Any number of providers can implement it; the
//! webhook server dispatches on [`Solver::name`].
//!
//! [`LoopiaSolver`] keeps no state between challenges beyond its handle to the
//! Kubernetes Secret store. Tolerance of repeated calls comes entirely from
//! the idempotency of [`crate::reconciler`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::load_config;
use crate::constants::SOLVER_NAME;
use crate::credentials::{resolve_credentials, Credential, KubeSecretStore, SecretStore};
use crate::errors::SolverError;
use crate::names::split_challenge_name;
use crate::reconciler::{ensure_absent, ensure_present};
use crate::zone_store::{ZoneRecordStore, ZoneRecordStoreFactory};

/// A DNS-01 challenge as handed over by cert-manager.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Request identifier, echoed back in the response
    #[serde(default)]
    pub uid: String,
    /// `Present` or `CleanUp`
    #[serde(default)]
    pub action: String,
    /// Challenge type, always `dns-01` here
    #[serde(default, rename = "type")]
    pub challenge_type: String,
    /// Name being validated, e.g. `example.com`
    #[serde(default)]
    pub dns_name: String,
    /// Expected TXT record value
    #[serde(default)]
    pub key: String,
    /// Namespace used to look up credential Secrets
    #[serde(default)]
    pub resource_namespace: String,
    /// Challenge host name with trailing dot, e.g. `_acme-challenge.example.com.`
    #[serde(default, rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    /// Zone with trailing dot, e.g. `example.com.`
    #[serde(default)]
    pub resolved_zone: String,
    /// Whether ambient credentials may be used (ignored by this solver)
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Opaque per-issuer solver configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Capability implemented by every DNS provider served by the webhook.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name used to reference this solver from an ACME issuer.
    ///
    /// Must be unique within the webhook's group name.
    fn name(&self) -> &str;

    /// Prepare the solver, once, before any challenge is handled.
    ///
    /// Calling it again replaces the previous client handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes client cannot be built.
    fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError>;

    /// Ensure the challenge TXT record is present.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] describing the failing step.
    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;

    /// Ensure the challenge TXT record is absent.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] describing the failing step.
    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;
}

/// Install ring as the process-level rustls crypto provider.
///
/// Both rustls backends are compiled into the binary, so rustls cannot pick
/// one on its own and panics on the first TLS configuration built without an
/// explicit provider. Calling this more than once is harmless.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Loopia implementation of [`Solver`].
pub struct LoopiaSolver<F> {
    secrets: Option<Arc<dyn SecretStore>>,
    stores: F,
}

impl<F: ZoneRecordStoreFactory> LoopiaSolver<F> {
    /// Create an uninitialized solver building store clients with `stores`.
    #[must_use]
    pub fn new(stores: F) -> Self {
        Self {
            secrets: None,
            stores,
        }
    }

    /// Use `secrets` instead of a Kubernetes-backed secret store.
    #[must_use]
    pub fn with_secret_store(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Shared preamble of `present` and `clean_up`.
    ///
    /// Decodes the configuration, resolves credentials, connects a store
    /// client and splits the challenge name into `(subdomain, domain)`.
    async fn prepare(
        &self,
        challenge: &ChallengeRequest,
    ) -> Result<(Box<dyn ZoneRecordStore>, String, String), SolverError> {
        let secrets = self.secrets.as_deref().ok_or(SolverError::NotInitialized)?;

        let config = load_config(challenge.config.as_ref())?;
        debug!(
            username_secret = %config.username_secret_key_ref.name,
            password_secret = %config.password_secret_key_ref.name,
            "Decoded solver configuration"
        );

        let credential: Credential =
            resolve_credentials(secrets, &config, &challenge.resource_namespace).await?;
        let store = self.stores.connect(&credential)?;

        let (subdomain, domain) =
            split_challenge_name(&challenge.resolved_zone, &challenge.resolved_fqdn);

        Ok((store, subdomain, domain))
    }
}

#[async_trait]
impl<F: ZoneRecordStoreFactory> Solver for LoopiaSolver<F> {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError> {
        debug!("Initializing Kubernetes client for secret access");
        install_crypto_provider();

        let client = kube::Client::try_from(kube_config).map_err(|e| SolverError::KubeClient {
            reason: e.to_string(),
        })?;
        self.secrets = Some(Arc::new(KubeSecretStore::new(client)));

        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        debug!(
            namespace = %challenge.resource_namespace,
            zone = %challenge.resolved_zone,
            fqdn = %challenge.resolved_fqdn,
            "Present called"
        );

        let (store, subdomain, domain) = self.prepare(challenge).await?;
        debug!(subdomain = %subdomain, domain = %domain, "Presenting challenge record");

        ensure_present(store.as_ref(), &domain, &subdomain, &challenge.key).await
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        debug!(
            namespace = %challenge.resource_namespace,
            zone = %challenge.resolved_zone,
            fqdn = %challenge.resolved_fqdn,
            "CleanUp called"
        );

        let (store, subdomain, domain) = self.prepare(challenge).await?;
        debug!(subdomain = %subdomain, domain = %domain, "Cleaning up challenge record");

        ensure_absent(store.as_ref(), &domain, &subdomain, &challenge.key).await
    }
}
