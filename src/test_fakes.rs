// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory collaborators shared by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::credentials::{Credential, SecretStore};
use crate::errors::{SolverError, StoreError};
use crate::zone_store::{ZoneRecord, ZoneRecordStore, ZoneRecordStoreFactory};

/// Secret store holding a fixed set of secrets and recording every lookup.
#[derive(Default)]
pub struct FakeSecretStore {
    secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
    lookups: Mutex<Vec<(String, String)>>,
}

impl FakeSecretStore {
    pub fn with_secret(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        let data = data
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.as_bytes().to_vec()))
            .collect();
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        self.lookups
            .lock()
            .unwrap()
            .push((namespace.to_string(), name.to_string()));

        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("secrets \"{name}\" not found"))
    }
}

/// A store call, as observed by [`FakeZoneStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    List(String, String),
    Create(String, String, ZoneRecord),
    Delete(String, String, i64),
    DeleteSubdomain(String, String),
}

/// Shared state behind every [`FakeZoneStore`] handed out by a factory.
#[derive(Default)]
pub struct FakeZoneState {
    pub records: BTreeMap<(String, String), Vec<ZoneRecord>>,
    pub calls: Vec<StoreCall>,
    pub next_id: i64,
    pub fail_list: Option<StoreError>,
    pub fail_create: Option<StoreError>,
    /// Fails only the delete of the given record id
    pub fail_delete_id: Option<(i64, StoreError)>,
    pub fail_delete_subdomain: Option<StoreError>,
}

/// In-memory [`ZoneRecordStore`].
#[derive(Clone, Default)]
pub struct FakeZoneStore {
    pub state: Arc<Mutex<FakeZoneState>>,
}

impl FakeZoneStore {
    /// Seed a record at `(domain, subdomain)`, returning its id.
    pub fn seed(&self, domain: &str, subdomain: &str, record_type: &str, value: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state
            .records
            .entry((domain.to_string(), subdomain.to_string()))
            .or_default()
            .push(ZoneRecord {
                id: Some(id),
                record_type: record_type.to_string(),
                value: value.to_string(),
                ttl: 3600,
                priority: 0,
            });
        id
    }

    /// Seed a record the store reports without an id.
    pub fn seed_without_id(&self, domain: &str, subdomain: &str, record_type: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .records
            .entry((domain.to_string(), subdomain.to_string()))
            .or_default()
            .push(ZoneRecord {
                id: None,
                record_type: record_type.to_string(),
                value: value.to_string(),
                ttl: 3600,
                priority: 0,
            });
    }

    pub fn records(&self, domain: &str, subdomain: &str) -> Vec<ZoneRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&(domain.to_string(), subdomain.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_subdomain(&self, domain: &str, subdomain: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .records
            .contains_key(&(domain.to_string(), subdomain.to_string()))
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than listings.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, StoreCall::List(..)))
            .collect()
    }

    pub fn fail_on(&self, configure: impl FnOnce(&mut FakeZoneState)) {
        configure(&mut self.state.lock().unwrap());
    }
}

#[async_trait]
impl ZoneRecordStore for FakeZoneStore {
    async fn list_records(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> Result<Vec<ZoneRecord>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(StoreCall::List(domain.to_string(), subdomain.to_string()));
        if let Some(e) = state.fail_list.clone() {
            return Err(e);
        }

        Ok(state
            .records
            .get(&(domain.to_string(), subdomain.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Create(
            domain.to_string(),
            subdomain.to_string(),
            record.clone(),
        ));
        if let Some(e) = state.fail_create.clone() {
            return Err(e);
        }

        state.next_id += 1;
        let created = ZoneRecord {
            id: Some(state.next_id),
            ..record.clone()
        };
        state
            .records
            .entry((domain.to_string(), subdomain.to_string()))
            .or_default()
            .push(created);
        Ok(())
    }

    async fn delete_record(
        &self,
        domain: &str,
        subdomain: &str,
        id: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(StoreCall::Delete(domain.to_string(), subdomain.to_string(), id));
        if let Some((failing_id, e)) = state.fail_delete_id.clone() {
            if failing_id == id {
                return Err(e);
            }
        }

        if let Some(records) = state
            .records
            .get_mut(&(domain.to_string(), subdomain.to_string()))
        {
            records.retain(|record| record.id != Some(id));
        }
        Ok(())
    }

    async fn delete_subdomain(&self, domain: &str, subdomain: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::DeleteSubdomain(
            domain.to_string(),
            subdomain.to_string(),
        ));
        if let Some(e) = state.fail_delete_subdomain.clone() {
            return Err(e);
        }

        state
            .records
            .remove(&(domain.to_string(), subdomain.to_string()));
        Ok(())
    }
}

/// Factory handing out clones of one [`FakeZoneStore`] and recording the
/// credentials it was asked to connect with.
#[derive(Clone, Default)]
pub struct FakeStoreFactory {
    pub store: FakeZoneStore,
    connections: Arc<Mutex<Vec<Credential>>>,
}

impl FakeStoreFactory {
    pub fn connections(&self) -> Vec<Credential> {
        self.connections.lock().unwrap().clone()
    }
}

impl ZoneRecordStoreFactory for FakeStoreFactory {
    fn connect(&self, credential: &Credential) -> Result<Box<dyn ZoneRecordStore>, SolverError> {
        if credential.username.is_empty() || credential.password.is_empty() {
            return Err(SolverError::StoreClient {
                reason: "username and password must not be empty".to_string(),
            });
        }

        self.connections.lock().unwrap().push(credential.clone());
        Ok(Box::new(self.store.clone()))
    }
}
