//! Serve command - runs the provisioning API
//!
//! The listener starts immediately; the client handshake and host key scan
//! run in the background and `/newuser` waits for both. A failed bootstrap
//! shuts the server down and the command exits with a known error.

mod signal;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::api::{create_router, AppState, BuildInfo};
use crate::config::{AppConfig, Credentials};
use crate::domain::{DomainError, GiteaClient, MirrorTarget, TimeIdGenerator};
use crate::infrastructure::credentials::Ed25519Issuer;
use crate::infrastructure::github::HttpGithubClient;
use crate::infrastructure::keyscan::{HostKeyScanner, SshKeyscan};
use crate::infrastructure::services::{
    spawn_bootstrap, MirrorService, ProbeConfig, ProvisionerConfig, ProvisioningService,
    ProvisioningSettings, Readiness,
};

use self::signal::{wait_for_shutdown, ShutdownReason};
use super::context::Context;
use super::error::CliError;
use super::ServeArgs;

pub async fn run(context: &Context, args: ServeArgs) -> Result<(), CliError> {
    let config = &context.config;

    let contributor = Credentials::contributor()?;
    let client: Arc<dyn GiteaClient> = Arc::new(context.gitea_client(contributor)?);

    let service = build_service(context, Arc::clone(&client))?;
    let scanner = build_scanner(context);

    let readiness = Arc::new(Readiness::new());
    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();
    let bootstrap = spawn_bootstrap(
        client,
        scanner,
        ProbeConfig::client_bootstrap(),
        Arc::clone(&readiness),
        fatal_tx,
    );

    let state = AppState::new(Arc::new(service), readiness, BuildInfo::from_cargo());
    let app = create_router(state);

    let addr = build_socket_addr(config, args.port)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))?;
    info!("Starting provisioning server on {}", addr);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop_rx.wait_for(|stop| *stop).await;
        })
        .into_future();
    tokio::pin!(server);

    let reason = tokio::select! {
        result = &mut server => {
            result.context("server terminated")?;
            return Ok(());
        }
        reason = wait_for_shutdown(&mut fatal_rx) => reason,
    };

    let _ = stop_tx.send(true);
    match tokio::time::timeout(config.server.shutdown_timeout, &mut server).await {
        Ok(result) => result.context("server shutdown failed")?,
        Err(_) => warn!(
            timeout = %humantime::format_duration(config.server.shutdown_timeout),
            "In-flight requests did not drain before the shutdown timeout"
        ),
    }

    for task in bootstrap {
        task.abort();
    }

    match reason {
        ShutdownReason::Signal(name) => {
            info!(signal = name, "Server shutdown complete");
            Ok(())
        }
        ShutdownReason::Fatal(e) => Err(e.into()),
    }
}

/// Provisioning service wired to the configured Gitea and optional mirror
fn build_service(context: &Context, client: Arc<dyn GiteaClient>) -> Result<ProvisioningService, DomainError> {
    let config = &context.config;
    let settings = provisioning_settings(config, &context.hostname);

    let mut service = ProvisioningService::new(
        Arc::clone(&client),
        Arc::new(Ed25519Issuer::new()),
        Arc::new(TimeIdGenerator),
        settings,
    );

    if config.mirror.enabled {
        let github = Credentials::github()?;
        let provider = HttpGithubClient::new(
            &config.mirror.api_url,
            github.username.clone(),
            github.password.clone(),
            config.gitea.timeout,
        )?;
        let target = MirrorTarget {
            host: config.mirror.host.clone(),
            org: config.mirror.org.clone(),
            user: github.username,
            token: github.password,
        };
        info!(host = %target.host, org = %target.org, "Mirroring enabled");
        service = service.with_mirror(MirrorService::new(client, Arc::new(provider), target));
    }

    Ok(service)
}

fn provisioning_settings(config: &AppConfig, hostname: &str) -> ProvisioningSettings {
    let provisioning = &config.provisioning;

    let mut provisioner = ProvisionerConfig::new(
        provisioning
            .email_domain
            .clone()
            .unwrap_or_else(|| hostname.to_string()),
    );
    provisioner.username_prefix = provisioning.username_prefix.clone();
    provisioner.max_attempts = provisioning.max_attempts;
    provisioner.password_bytes = provisioning.password_bytes;

    let mut settings = ProvisioningSettings::new(hostname);
    settings.org = config.gitea.org.clone();
    settings.provisioner = provisioner;
    settings.reap_before_provision = provisioning.reap_before_provision;
    settings.reap_age = config.reaper.age;
    settings.reap_page_size = config.reaper.page_size;
    settings.rollback_on_failure = provisioning.rollback_on_failure;
    settings
}

fn build_scanner(context: &Context) -> Option<Arc<dyn HostKeyScanner>> {
    let keyscan = &context.config.keyscan;
    if !keyscan.enabled {
        return None;
    }

    let host = keyscan.host.clone().unwrap_or_else(|| context.hostname.clone());
    Some(Arc::new(SshKeyscan::new(host)))
}

fn build_socket_addr(config: &AppConfig, port: Option<u16>) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("invalid listen address '{}'", config.server.host))?,
        port.unwrap_or(config.server.port),
    )))
}
