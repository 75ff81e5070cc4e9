// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Loopia Webhook - cert-manager DNS-01 solver for Loopia DNS
//!
//! This crate lets cert-manager complete ACME DNS-01 challenges for zones hosted
//! at Loopia. cert-manager calls the webhook to publish the challenge TXT record
//! (`Present`) and to withdraw it once validation is over (`CleanUp`).
//!
//! ## Overview
//!
//! A challenge flows through four layers:
//!
//! - Credential resolution from two Kubernetes Secret key references
//! - Splitting the challenge FQDN into `(subdomain, domain)` for Loopia
//! - Idempotent reconciliation of the TXT record against the zone
//! - The solver façade cert-manager's webhook protocol dispatches to
//!
//! ## Modules
//!
//! - [`config`] - Per-issuer solver configuration
//! - [`credentials`] - Credential resolution from Kubernetes Secrets
//! - [`names`] - Challenge name splitting
//! - [`zone_store`] - Provider-agnostic zone record store contract
//! - [`loopia`] - Loopia XML-RPC implementation of the store
//! - [`reconciler`] - `ensure_present` / `ensure_absent`
//! - [`solver`] - The [`solver::Solver`] capability and its Loopia implementation
//! - [`webhook`] - cert-manager webhook HTTP surface
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use loopia_webhook::loopia::LoopiaClientFactory;
//! use loopia_webhook::solver::{LoopiaSolver, Solver};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let stores = LoopiaClientFactory::new(
//!     "https://api.loopia.se/RPCSERV".parse()?,
//!     Duration::from_secs(30),
//! );
//! let mut solver = LoopiaSolver::new(stores);
//! solver.initialize(kube::Config::infer().await?)?;
//! assert_eq!(solver.name(), "loopia");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod loopia;
pub mod metrics;
pub mod names;
pub mod reconciler;
pub mod solver;
pub mod status_reasons;
pub mod webhook;
pub mod zone_store;

#[cfg(test)]
mod status_reasons_tests;
#[cfg(test)]
mod test_fakes;
