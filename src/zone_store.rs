// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider-agnostic view of a remote zone's record set.
//!
//! The reconciler only needs four operations from a DNS provider: list the
//! records at a name, add one, remove one by id, and remove the (empty)
//! subdomain. Providers implement [`ZoneRecordStore`]; a
//! [`ZoneRecordStoreFactory`] turns resolved credentials into a store client.

use async_trait::async_trait;

use crate::constants::{LOOPIA_MIN_TTL_SECS, RECORD_TYPE_TXT, TXT_RECORD_PRIORITY};
use crate::credentials::Credential;
use crate::errors::{SolverError, StoreError};

/// A single record as held by the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Provider-assigned identifier, `None` until the record exists remotely
    pub id: Option<i64>,
    /// Record type tag (e.g. `TXT`)
    pub record_type: String,
    /// Record payload
    pub value: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Priority (MX/SRV only, zero otherwise)
    pub priority: u32,
}

impl ZoneRecord {
    /// Build a not-yet-created TXT record carrying `value` at the floor TTL.
    #[must_use]
    pub fn txt(value: impl Into<String>) -> Self {
        Self {
            id: None,
            record_type: RECORD_TYPE_TXT.to_string(),
            value: value.into(),
            ttl: LOOPIA_MIN_TTL_SECS,
            priority: TXT_RECORD_PRIORITY,
        }
    }

    /// Returns true for a TXT record whose value is exactly `key`.
    #[must_use]
    pub fn is_txt_with_value(&self, key: &str) -> bool {
        self.record_type == RECORD_TYPE_TXT && self.value == key
    }
}

/// Record-level access to a DNS provider's zones.
#[async_trait]
pub trait ZoneRecordStore: Send + Sync {
    /// List every record at `subdomain` in `domain`.
    async fn list_records(&self, domain: &str, subdomain: &str)
        -> Result<Vec<ZoneRecord>, StoreError>;

    /// Add `record` at `subdomain` in `domain`, creating the subdomain if needed.
    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<(), StoreError>;

    /// Delete the record with the store-assigned `id`.
    async fn delete_record(&self, domain: &str, subdomain: &str, id: i64)
        -> Result<(), StoreError>;

    /// Delete the subdomain container itself.
    async fn delete_subdomain(&self, domain: &str, subdomain: &str) -> Result<(), StoreError>;
}

/// Builds store clients from resolved credentials.
pub trait ZoneRecordStoreFactory: Send + Sync {
    /// Construct a client authenticated as `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::StoreClient`] if the client cannot be built.
    fn connect(&self, credential: &Credential) -> Result<Box<dyn ZoneRecordStore>, SolverError>;
}
