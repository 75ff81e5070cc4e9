// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Loopia DNS zone record store.
//!
//! This module binds the provider-agnostic [`ZoneRecordStore`] to Loopia's
//! XML-RPC API. Every call authenticates with the API username and password
//! resolved for the current challenge:
//!
//! - `getZoneRecords(user, pass, domain, subdomain)`
//! - `addZoneRecord(user, pass, domain, subdomain, record)`
//! - `removeZoneRecord(user, pass, domain, subdomain, record_id)`
//! - `removeSubdomain(user, pass, domain, subdomain)`
//!
//! Mutating methods answer with a status string (`OK`, `AUTH_ERROR`,
//! `RATE_LIMITED`, `BAD_INDATA`, ...). `getZoneRecords` answers with an array
//! of record structs, or an array holding a single status string on failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use loopia_webhook::credentials::Credential;
//! use loopia_webhook::loopia::LoopiaClient;
//! use loopia_webhook::zone_store::ZoneRecordStore;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credential = Credential {
//!     username: "user@loopiaapi".to_string(),
//!     password: "secret".to_string(),
//! };
//! let client = LoopiaClient::new(
//!     "https://api.loopia.se/RPCSERV".parse()?,
//!     &credential,
//!     Duration::from_secs(30),
//! )?;
//!
//! let records = client.list_records("example.com", "_acme-challenge").await?;
//! # Ok(())
//! # }
//! ```

pub mod xmlrpc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::constants::{
    LOOPIA_STATUS_AUTH_ERROR, LOOPIA_STATUS_BAD_INDATA, LOOPIA_STATUS_OK,
    LOOPIA_STATUS_RATE_LIMITED,
};
use crate::credentials::Credential;
use crate::errors::{SolverError, StoreError};
use crate::zone_store::{ZoneRecord, ZoneRecordStore, ZoneRecordStoreFactory};
use xmlrpc::Value;

/// Client for Loopia's XML-RPC API.
///
/// Deliberately not `Debug`: it holds the API password.
pub struct LoopiaClient {
    http: HttpClient,
    endpoint: Url,
    username: String,
    password: String,
}

impl LoopiaClient {
    /// Create a client authenticated as `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::StoreClient`] if the username or password is
    /// empty or the HTTP client cannot be built.
    pub fn new(
        endpoint: Url,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self, SolverError> {
        if credential.username.is_empty() || credential.password.is_empty() {
            return Err(SolverError::StoreClient {
                reason: "username and password must not be empty".to_string(),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::StoreClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint,
            username: credential.username.clone(),
            password: credential.password.clone(),
        })
    }

    /// Invoke `method` with the credentials prepended to `params`.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, StoreError> {
        let mut all_params = vec![
            Value::from(self.username.as_str()),
            Value::from(self.password.as_str()),
        ];
        all_params.extend(params);

        debug!(method = %method, endpoint = %self.endpoint, "Loopia API request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(xmlrpc::encode_method_call(method, &all_params))
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Transport {
                reason: format!("HTTP {status} from {}", self.endpoint),
            });
        }

        let body = response.bytes().await.map_err(|e| StoreError::Transport {
            reason: e.to_string(),
        })?;

        xmlrpc::parse_method_response(&body)
    }

    /// Invoke a mutating method that answers with a status string.
    async fn call_for_status(&self, method: &str, params: Vec<Value>) -> Result<(), StoreError> {
        match self.call(method, params).await? {
            Value::String(status) => check_status(&status),
            other => Err(StoreError::MalformedResponse {
                reason: format!("expected status string from {method}, got {other:?}"),
            }),
        }
    }
}

#[async_trait]
impl ZoneRecordStore for LoopiaClient {
    async fn list_records(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> Result<Vec<ZoneRecord>, StoreError> {
        let response = self
            .call("getZoneRecords", vec![domain.into(), subdomain.into()])
            .await?;

        let items = match response {
            Value::Array(items) => items,
            Value::String(status) => {
                check_status(&status)?;
                Vec::new()
            }
            other => {
                return Err(StoreError::MalformedResponse {
                    reason: format!("expected record array, got {other:?}"),
                })
            }
        };

        items.iter().map(record_from_value).collect()
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<(), StoreError> {
        let mut fields = BTreeMap::new();
        fields.insert("type".to_string(), Value::from(record.record_type.as_str()));
        fields.insert("ttl".to_string(), Value::Int(i64::from(record.ttl)));
        fields.insert("priority".to_string(), Value::Int(i64::from(record.priority)));
        fields.insert("rdata".to_string(), Value::from(record.value.as_str()));

        self.call_for_status(
            "addZoneRecord",
            vec![domain.into(), subdomain.into(), Value::Struct(fields)],
        )
        .await
    }

    async fn delete_record(
        &self,
        domain: &str,
        subdomain: &str,
        id: i64,
    ) -> Result<(), StoreError> {
        self.call_for_status(
            "removeZoneRecord",
            vec![domain.into(), subdomain.into(), Value::Int(id)],
        )
        .await
    }

    async fn delete_subdomain(&self, domain: &str, subdomain: &str) -> Result<(), StoreError> {
        self.call_for_status("removeSubdomain", vec![domain.into(), subdomain.into()])
            .await
    }
}

/// Map a Loopia status string to a result.
fn check_status(status: &str) -> Result<(), StoreError> {
    match status {
        LOOPIA_STATUS_OK => Ok(()),
        LOOPIA_STATUS_AUTH_ERROR => Err(StoreError::Unauthorized),
        LOOPIA_STATUS_RATE_LIMITED => Err(StoreError::RateLimited),
        LOOPIA_STATUS_BAD_INDATA => Err(StoreError::InvalidInput),
        other => Err(StoreError::Rejected {
            status: other.to_string(),
        }),
    }
}

/// Convert one `getZoneRecords` array item into a [`ZoneRecord`].
fn record_from_value(value: &Value) -> Result<ZoneRecord, StoreError> {
    let fields = match value {
        Value::Struct(fields) => fields,
        // A lone status string in place of the records reports a failure
        Value::String(status) => {
            return Err(check_status(status).err().unwrap_or_else(|| {
                StoreError::MalformedResponse {
                    reason: "status string in record list".to_string(),
                }
            }))
        }
        other => {
            return Err(StoreError::MalformedResponse {
                reason: format!("expected record struct, got {other:?}"),
            })
        }
    };

    let text = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::MalformedResponse {
                reason: format!("record field '{name}' missing or not a string"),
            })
    };
    let number = |name: &str| fields.get(name).and_then(Value::as_i64).unwrap_or_default();

    Ok(ZoneRecord {
        id: fields.get("record_id").and_then(Value::as_i64),
        record_type: text("type")?,
        value: text("rdata")?,
        ttl: u32::try_from(number("ttl")).unwrap_or_default(),
        priority: u32::try_from(number("priority")).unwrap_or_default(),
    })
}

/// [`ZoneRecordStoreFactory`] producing [`LoopiaClient`]s.
#[derive(Clone, Debug)]
pub struct LoopiaClientFactory {
    endpoint: Url,
    timeout: Duration,
}

impl LoopiaClientFactory {
    #[must_use]
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }
}

impl ZoneRecordStoreFactory for LoopiaClientFactory {
    fn connect(&self, credential: &Credential) -> Result<Box<dyn ZoneRecordStore>, SolverError> {
        let client = LoopiaClient::new(self.endpoint.clone(), credential, self.timeout)?;
        Ok(Box::new(client))
    }
}
