// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for challenge reconciliation.
//!
//! This module provides specialized error types for:
//! - Zone record store operations (listing, creating and deleting records)
//! - Credential resolution from Kubernetes Secrets
//! - Solver configuration decoding
//!
//! Every collaborator failure is wrapped with the operation and the
//! `(domain, subdomain)` pair it concerned. Nothing is retried here; retry is
//! cert-manager's responsibility.

use thiserror::Error;

use crate::status_reasons::{
    REASON_CONFIG_INVALID, REASON_NOT_INITIALIZED, REASON_RECORD_CREATE_FAILED,
    REASON_RECORD_DELETE_FAILED, REASON_RECORD_LIST_FAILED, REASON_SECRET_FETCH_FAILED,
    REASON_SECRET_KEY_MISSING, REASON_STORE_CLIENT_FAILED, REASON_SUBDOMAIN_REMOVE_FAILED,
};

/// Errors returned by a zone record store.
///
/// These errors represent failures when talking to the remote DNS provider
/// (Loopia's XML-RPC API for the production store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The provider rejected the credentials (`AUTH_ERROR`)
    #[error("authentication rejected by zone record store")]
    Unauthorized,

    /// The provider throttled the caller (`RATE_LIMITED`)
    #[error("rate limited by zone record store")]
    RateLimited,

    /// The provider rejected the arguments (`BAD_INDATA`)
    #[error("zone record store rejected the request data")]
    InvalidInput,

    /// Any other non-OK status string returned by the provider
    #[error("zone record store returned status {status}")]
    Rejected {
        /// Raw status string
        status: String,
    },

    /// XML-RPC fault response
    #[error("zone record store fault {code}: {message}")]
    Fault {
        /// Fault code
        code: i64,
        /// Fault description
        message: String,
    },

    /// Network failure or non-success HTTP status
    #[error("zone record store transport error: {reason}")]
    Transport {
        /// Underlying transport error
        reason: String,
    },

    /// The response could not be interpreted
    #[error("malformed zone record store response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response
        reason: String,
    },
}

/// Errors produced while presenting or cleaning up a DNS-01 challenge.
///
/// This is the primary error type returned by the solver façade and the
/// record reconciler.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// `present`/`clean_up` called before `initialize`
    #[error("solver has not been initialized with a Kubernetes client")]
    NotInitialized,

    /// The Kubernetes client could not be built during `initialize`
    #[error("unable to get k8s client: {reason}")]
    KubeClient {
        /// Client construction error
        reason: String,
    },

    /// Malformed solver configuration payload
    #[error("error decoding solver config: {reason}")]
    ConfigDecode {
        /// Decoder error
        reason: String,
    },

    /// A referenced Secret could not be fetched
    #[error("failed to load secret \"{secret}\": {reason}")]
    SecretFetch {
        /// Namespace-qualified secret name (`namespace/name`)
        secret: String,
        /// Underlying error
        reason: String,
    },

    /// A fetched Secret does not contain the referenced key
    #[error("no key \"{key}\" in secret \"{secret}\"")]
    SecretKeyMissing {
        /// The referenced key
        key: String,
        /// Namespace-qualified secret name (`namespace/name`)
        secret: String,
    },

    /// The zone record store client could not be constructed
    #[error("could not initialize zone record store client: {reason}")]
    StoreClient {
        /// Construction error
        reason: String,
    },

    /// Listing records failed
    #[error("unable to get zone records for subdomain '{subdomain}' in '{domain}': {source}")]
    RecordList {
        /// Apex domain
        domain: String,
        /// Challenge subdomain
        subdomain: String,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// Creating the challenge record failed
    #[error("unable to create TXT record for subdomain '{subdomain}' in '{domain}': {source}")]
    RecordCreate {
        /// Apex domain
        domain: String,
        /// Challenge subdomain
        subdomain: String,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// Deleting a matching challenge record failed
    #[error("unable to delete TXT record {record_id} for subdomain '{subdomain}' in '{domain}': {source}")]
    RecordDelete {
        /// Apex domain
        domain: String,
        /// Challenge subdomain
        subdomain: String,
        /// Store-assigned record identifier
        record_id: i64,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// Removing the emptied subdomain failed
    #[error("unable to remove subdomain '{subdomain}' in '{domain}': {source}")]
    SubdomainRemove {
        /// Apex domain
        domain: String,
        /// Challenge subdomain
        subdomain: String,
        /// Store failure
        #[source]
        source: StoreError,
    },
}

impl SolverError {
    /// Returns false for failures that leave the challenge in its goal state.
    ///
    /// Only a failed subdomain removal qualifies: it happens after the TXT
    /// record has already been deleted, and an empty subdomain does not affect
    /// future challenges.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SubdomainRemove { .. })
    }

    /// Returns the Kubernetes status reason for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::NotInitialized | Self::KubeClient { .. } => REASON_NOT_INITIALIZED,
            Self::ConfigDecode { .. } => REASON_CONFIG_INVALID,
            Self::SecretFetch { .. } => REASON_SECRET_FETCH_FAILED,
            Self::SecretKeyMissing { .. } => REASON_SECRET_KEY_MISSING,
            Self::StoreClient { .. } => REASON_STORE_CLIENT_FAILED,
            Self::RecordList { .. } => REASON_RECORD_LIST_FAILED,
            Self::RecordCreate { .. } => REASON_RECORD_CREATE_FAILED,
            Self::RecordDelete { .. } => REASON_RECORD_DELETE_FAILED,
            Self::SubdomainRemove { .. } => REASON_SUBDOMAIN_REMOVE_FAILED,
        }
    }
}
