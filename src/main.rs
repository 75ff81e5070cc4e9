// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use loopia_webhook::{
    constants::{
        DEFAULT_BIND_ADDRESS, DEFAULT_LOOPIA_API_URL, DEFAULT_LOOPIA_TIMEOUT_SECS,
        DEFAULT_SECURE_PORT, RUNTIME_WORKER_THREADS,
    },
    loopia::LoopiaClientFactory,
    solver::{install_crypto_provider, LoopiaSolver, Solver},
    webhook::{build_router, run_server, WebhookState},
};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// cert-manager ACME DNS-01 webhook for Loopia DNS
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API group the webhook is registered under with cert-manager
    #[arg(long, env = "GROUP_NAME", value_parser = NonEmptyStringValueParser::new())]
    group_name: String,

    /// Port to serve the webhook API on
    #[arg(long, env = "SECURE_PORT", default_value_t = DEFAULT_SECURE_PORT)]
    secure_port: u16,

    /// Address to bind the webhook API to
    #[arg(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    bind_address: IpAddr,

    /// PEM certificate served by the webhook API
    #[arg(long, env = "TLS_CERT_FILE", requires = "tls_private_key_file")]
    tls_cert_file: Option<PathBuf>,

    /// PEM private key matching --tls-cert-file
    #[arg(long, env = "TLS_PRIVATE_KEY_FILE", requires = "tls_cert_file")]
    tls_private_key_file: Option<PathBuf>,

    /// Loopia XML-RPC endpoint
    #[arg(long, env = "LOOPIA_API_URL", default_value = DEFAULT_LOOPIA_API_URL)]
    loopia_api_url: Url,

    /// Timeout for a single Loopia API call, in seconds
    #[arg(long, env = "LOOPIA_TIMEOUT_SECS", default_value_t = DEFAULT_LOOPIA_TIMEOUT_SECS)]
    loopia_timeout_secs: u64,
}

impl Args {
    fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.secure_port)
    }

    fn tls_files(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.tls_cert_file, &self.tls_private_key_file) {
            (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    install_crypto_provider();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKER_THREADS)
        .thread_name("loopia-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG (default INFO) and RUST_LOG_FORMAT (json|text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(group_name = %args.group_name, "Starting Loopia DNS-01 webhook");
    debug!(
        loopia_api_url = %args.loopia_api_url,
        loopia_timeout_secs = args.loopia_timeout_secs,
        "Loopia API settings"
    );

    debug!("Inferring Kubernetes client configuration");
    let kube_config = kube::Config::infer()
        .await
        .context("failed to infer Kubernetes client configuration")?;

    let stores = LoopiaClientFactory::new(
        args.loopia_api_url.clone(),
        Duration::from_secs(args.loopia_timeout_secs),
    );
    let mut solver = LoopiaSolver::new(stores);
    solver.initialize(kube_config)?;
    info!(solver = %solver.name(), "Solver initialized");

    let solvers: Vec<Arc<dyn Solver>> = vec![Arc::new(solver)];
    let router = build_router(WebhookState::new(args.group_name.clone(), solvers));

    tokio::select! {
        result = run_server(router, args.listen_addr(), args.tls_files()) => {
            error!("CRITICAL: webhook server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("webhook server exited unexpectedly without error")
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, stopping webhook server");
            Ok(())
        }
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
