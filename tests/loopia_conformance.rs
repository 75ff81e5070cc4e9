// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Live conformance tests against the Loopia API
//!
//! These tests present and clean up real challenge records in a zone you
//! control at Loopia, and verify the outcome through the same API.
//!
//! Required environment:
//! - `TEST_ZONE_NAME` - zone to test in, e.g. `example.com`
//! - `LOOPIA_USERNAME`, `LOOPIA_PASSWORD` - API credentials
//! - `TEST_STRICT_MODE` - `true` to also check that unrelated challenge
//!   records survive a clean up (optional, defaults to `false`)
//!
//! Run with: cargo test --test loopia_conformance -- --ignored

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use loopia_webhook::{
    constants::{DEFAULT_LOOPIA_API_URL, DEFAULT_LOOPIA_TIMEOUT_SECS},
    credentials::{Credential, SecretStore},
    loopia::{LoopiaClient, LoopiaClientFactory},
    names::split_challenge_name,
    solver::{ChallengeRequest, LoopiaSolver, Solver},
    zone_store::ZoneRecordStore,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const NAMESPACE: &str = "conformance";
const SECRET_NAME: &str = "loopia-credentials";

// ============================================================================
// Helper Functions
// ============================================================================

struct LiveSettings {
    zone: String,
    strict: bool,
    credential: Credential,
}

/// Read the live test settings, or `None` when they are not configured
fn settings_or_skip() -> Option<LiveSettings> {
    let zone = std::env::var("TEST_ZONE_NAME").ok()?;
    let username = std::env::var("LOOPIA_USERNAME").ok()?;
    let password = std::env::var("LOOPIA_PASSWORD").ok()?;
    let strict = std::env::var("TEST_STRICT_MODE")
        .ok()
        .and_then(|value| value.parse::<bool>().ok())
        .unwrap_or(false);

    Some(LiveSettings {
        zone: zone.trim_end_matches('.').to_string(),
        strict,
        credential: Credential { username, password },
    })
}

/// Secret store serving the credentials from the environment
struct EnvSecretStore {
    credential: Credential,
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        if namespace != NAMESPACE || name != SECRET_NAME {
            return Err(anyhow!("secrets \"{name}\" not found"));
        }

        Ok(BTreeMap::from([
            (
                "username".to_string(),
                self.credential.username.as_bytes().to_vec(),
            ),
            (
                "password".to_string(),
                self.credential.password.as_bytes().to_vec(),
            ),
        ]))
    }
}

fn endpoint() -> url::Url {
    url::Url::parse(DEFAULT_LOOPIA_API_URL).unwrap()
}

fn solver(settings: &LiveSettings) -> LoopiaSolver<LoopiaClientFactory> {
    let secrets: Arc<dyn SecretStore> = Arc::new(EnvSecretStore {
        credential: settings.credential.clone(),
    });

    LoopiaSolver::new(LoopiaClientFactory::new(
        endpoint(),
        Duration::from_secs(DEFAULT_LOOPIA_TIMEOUT_SECS),
    ))
    .with_secret_store(secrets)
}

fn challenge(settings: &LiveSettings, action: &str, key: &str) -> ChallengeRequest {
    ChallengeRequest {
        uid: format!("conformance-{key}"),
        action: action.to_string(),
        challenge_type: "dns-01".to_string(),
        dns_name: settings.zone.clone(),
        key: key.to_string(),
        resource_namespace: NAMESPACE.to_string(),
        resolved_fqdn: format!("_acme-challenge.{}.", settings.zone),
        resolved_zone: format!("{}.", settings.zone),
        allow_ambient_credentials: false,
        config: Some(json!({
            "usernameSecretKeyRef": { "name": SECRET_NAME, "key": "username" },
            "passwordSecretKeyRef": { "name": SECRET_NAME, "key": "password" }
        })),
    }
}

/// TXT values currently published at the challenge name
async fn published_values(settings: &LiveSettings, request: &ChallengeRequest) -> Vec<String> {
    let client = LoopiaClient::new(
        endpoint(),
        &settings.credential,
        Duration::from_secs(DEFAULT_LOOPIA_TIMEOUT_SECS),
    )
    .unwrap();
    let (subdomain, domain) = split_challenge_name(&request.resolved_zone, &request.resolved_fqdn);

    client
        .list_records(&domain, &subdomain)
        .await
        .unwrap()
        .into_iter()
        .filter(|record| record.record_type == "TXT")
        .map(|record| record.value)
        .collect()
}

// ============================================================================
// Conformance Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires TEST_ZONE_NAME and Loopia API credentials"]
async fn test_present_and_clean_up_basic() {
    let Some(settings) = settings_or_skip() else {
        eprintln!("⊘ Skipping conformance test: TEST_ZONE_NAME/LOOPIA_USERNAME/LOOPIA_PASSWORD not set");
        return;
    };
    let solver = solver(&settings);
    let present = challenge(&settings, "Present", "conformance-basic-key");
    let clean_up = challenge(&settings, "CleanUp", "conformance-basic-key");

    solver.present(&present).await.unwrap();
    solver.present(&present).await.unwrap();
    let values = published_values(&settings, &present).await;
    assert_eq!(
        values.iter().filter(|v| *v == "conformance-basic-key").count(),
        1,
        "Presenting twice must publish a single record"
    );
    println!("✓ Challenge record published");

    // The subdomain may or may not be removed afterwards; only the record matters
    match solver.clean_up(&clean_up).await {
        Ok(()) => {}
        Err(e) if !e.is_fatal() => eprintln!("⚠ Non-fatal clean up error: {e}"),
        Err(e) => panic!("clean up failed: {e}"),
    }
    let values = published_values(&settings, &present).await;
    assert!(!values.contains(&"conformance-basic-key".to_string()));
    println!("✓ Challenge record removed");
}

#[tokio::test]
#[ignore = "requires TEST_ZONE_NAME and Loopia API credentials"]
async fn test_clean_up_keeps_other_records_in_strict_mode() {
    let Some(settings) = settings_or_skip() else {
        eprintln!("⊘ Skipping conformance test: TEST_ZONE_NAME/LOOPIA_USERNAME/LOOPIA_PASSWORD not set");
        return;
    };
    if !settings.strict {
        eprintln!("⊘ Skipping strict conformance test: TEST_STRICT_MODE is not true");
        return;
    }
    let solver = solver(&settings);
    let first = challenge(&settings, "Present", "conformance-strict-a");
    let second = challenge(&settings, "Present", "conformance-strict-b");

    solver.present(&first).await.unwrap();
    solver.present(&second).await.unwrap();

    solver
        .clean_up(&challenge(&settings, "CleanUp", "conformance-strict-a"))
        .await
        .unwrap();
    let values = published_values(&settings, &first).await;
    assert!(!values.contains(&"conformance-strict-a".to_string()));
    assert!(
        values.contains(&"conformance-strict-b".to_string()),
        "Cleaning up one challenge must not remove another"
    );
    println!("✓ Unrelated challenge record survived clean up");

    match solver
        .clean_up(&challenge(&settings, "CleanUp", "conformance-strict-b"))
        .await
    {
        Ok(()) => {}
        Err(e) if !e.is_fatal() => eprintln!("⚠ Non-fatal clean up error: {e}"),
        Err(e) => panic!("clean up failed: {e}"),
    }
}
