// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager webhook API surface.
//!
//! cert-manager talks to DNS-01 webhooks through the Kubernetes API
//! aggregation layer. For a webhook registered under group `<group>` it sends
//!
//! ```text
//! POST /apis/<group>/v1alpha1/<solver-name>
//! ```
//!
//! with a `ChallengePayload` whose `request` describes the challenge, and
//! expects the same envelope back with a `response` filled in.
//!
//! # Endpoints
//!
//! - `POST /apis/{group}/v1alpha1/{solver}` - present or clean up a challenge
//! - `GET /apis/{group}/v1alpha1` - API discovery (`APIResourceList`)
//! - `GET /healthz`, `GET /readyz` - probes
//! - `GET /metrics` - Prometheus metrics

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::constants::{
    ACTION_CLEAN_UP, ACTION_PRESENT, KIND_CHALLENGE_PAYLOAD, STATUS_FAILURE, STATUS_FAILURE_CODE,
    WEBHOOK_API_VERSION, WEBHOOK_PAYLOAD_API_VERSION,
};
use crate::metrics::{gather_metrics, record_challenge_error, record_challenge_success, record_error};
use crate::solver::{ChallengeRequest, Solver};
use crate::status_reasons::{REASON_INVALID_PAYLOAD, REASON_UNSUPPORTED_ACTION};

/// Envelope exchanged with cert-manager.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

/// Outcome of a challenge operation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// `uid` of the request being answered
    #[serde(default)]
    pub uid: String,
    pub success: bool,
    /// Failure details, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ChallengeResponse {
    fn succeeded(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    fn failed(uid: &str, reason: &str, message: String) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(Status {
                status: Some(STATUS_FAILURE.to_string()),
                reason: Some(reason.to_string()),
                message: Some(message),
                code: Some(STATUS_FAILURE_CODE),
                ..Status::default()
            }),
        }
    }
}

/// Shared state of the webhook router.
#[derive(Clone)]
pub struct WebhookState {
    group_name: String,
    solvers: Arc<BTreeMap<String, Arc<dyn Solver>>>,
}

impl WebhookState {
    /// Serve `solvers` under `group_name`, keyed by [`Solver::name`].
    #[must_use]
    pub fn new(group_name: impl Into<String>, solvers: Vec<Arc<dyn Solver>>) -> Self {
        let solvers = solvers
            .into_iter()
            .map(|solver| (solver.name().to_string(), solver))
            .collect();

        Self {
            group_name: group_name.into(),
            solvers: Arc::new(solvers),
        }
    }

    fn serves(&self, group: &str, version: &str) -> bool {
        group == self.group_name && version == WEBHOOK_API_VERSION
    }
}

/// Build the webhook router.
pub fn build_router(state: WebhookState) -> Router {
    Router::new()
        .route("/healthz", get(probe))
        .route("/readyz", get(probe))
        .route("/metrics", get(metrics))
        .route("/apis/{group}/{version}", get(discover_resources))
        .route("/apis/{group}/{version}/{solver}", post(solve_challenge))
        .with_state(state)
}

/// Serve `router` on `addr` until the future is dropped.
///
/// Speaks HTTPS when a certificate/key pair is given, plain HTTP otherwise.
///
/// # Errors
///
/// Returns an error if the TLS material cannot be loaded or the listener
/// cannot be bound.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    tls: Option<(PathBuf, PathBuf)>,
) -> Result<()> {
    match tls {
        Some((cert_file, key_file)) => {
            let config = RustlsConfig::from_pem_file(&cert_file, &key_file).await?;
            info!(address = %addr, cert = %cert_file.display(), "Serving webhook API over HTTPS");
            axum_server::bind_rustls(addr, config)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            warn!(address = %addr, "No TLS certificate configured, serving webhook API over plain HTTP");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}

/// Dispatch `request` to `solver` and translate the outcome.
pub async fn run_challenge(solver: &dyn Solver, request: &ChallengeRequest) -> ChallengeResponse {
    let start = Instant::now();

    let (operation, result) = match request.action.as_str() {
        ACTION_PRESENT => ("present", solver.present(request).await),
        ACTION_CLEAN_UP => ("cleanup", solver.clean_up(request).await),
        other => {
            warn!(uid = %request.uid, action = %other, "Unsupported challenge action");
            return ChallengeResponse::failed(
                &request.uid,
                REASON_UNSUPPORTED_ACTION,
                format!("unsupported challenge action '{other}'"),
            );
        }
    };

    match result {
        Ok(()) => {
            record_challenge_success(operation, start.elapsed());
            info!(
                uid = %request.uid,
                solver = %solver.name(),
                fqdn = %request.resolved_fqdn,
                operation = %operation,
                "Challenge operation succeeded"
            );
            ChallengeResponse::succeeded(&request.uid)
        }
        Err(e) if !e.is_fatal() => {
            record_error(operation, e.status_reason());
            record_challenge_success(operation, start.elapsed());
            warn!(
                uid = %request.uid,
                fqdn = %request.resolved_fqdn,
                operation = %operation,
                error = %e,
                "Challenge operation completed with a non-fatal error"
            );
            ChallengeResponse::succeeded(&request.uid)
        }
        Err(e) => {
            record_challenge_error(operation, e.status_reason(), start.elapsed());
            error!(
                uid = %request.uid,
                fqdn = %request.resolved_fqdn,
                operation = %operation,
                error = %e,
                "Challenge operation failed"
            );
            ChallengeResponse::failed(&request.uid, e.status_reason(), e.to_string())
        }
    }
}

async fn solve_challenge(
    State(state): State<WebhookState>,
    Path((group, version, solver_name)): Path<(String, String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Result<Json<ChallengePayload>, StatusCode> {
    if !state.serves(&group, &version) {
        return Err(StatusCode::NOT_FOUND);
    }
    let solver = state
        .solvers
        .get(&solver_name)
        .ok_or(StatusCode::NOT_FOUND)?;

    let response = match payload.request {
        Some(request) => run_challenge(solver.as_ref(), &request).await,
        None => ChallengeResponse::failed(
            "",
            REASON_INVALID_PAYLOAD,
            "challenge payload carries no request".to_string(),
        ),
    };

    Ok(Json(ChallengePayload {
        api_version: WEBHOOK_PAYLOAD_API_VERSION.to_string(),
        kind: KIND_CHALLENGE_PAYLOAD.to_string(),
        request: None,
        response: Some(response),
    }))
}

async fn discover_resources(
    State(state): State<WebhookState>,
    Path((group, version)): Path<(String, String)>,
) -> Result<Json<APIResourceList>, StatusCode> {
    if !state.serves(&group, &version) {
        return Err(StatusCode::NOT_FOUND);
    }

    let resources = state
        .solvers
        .keys()
        .map(|name| APIResource {
            name: name.clone(),
            singular_name: name.clone(),
            namespaced: false,
            kind: KIND_CHALLENGE_PAYLOAD.to_string(),
            verbs: vec!["create".to_string()],
            ..APIResource::default()
        })
        .collect();

    Ok(Json(APIResourceList {
        group_version: format!("{group}/{version}"),
        resources,
    }))
}

async fn probe() -> &'static str {
    "ok"
}

async fn metrics() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
