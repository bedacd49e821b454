// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trellis serve` and `trellis config` implementations.
//!
//! Serving runs the full startup sequence: bootstrap the configuration
//! plugin from the environment, assemble the context, verify it against
//! the deployment manifest (if configured), activate in the configured
//! order, and wait for a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trellis_config::ConfigError;
use trellis_core::traits::configuration::ConfigEvent;
use trellis_core::{AnyContext, Deactivate, InitPlugin, LoggingPlugin, PluginKind, TrellisError};
use trellis_plugin::{bootstrap, Context, DeploymentManifest};

use crate::builtin::{self, FileConfigFactory, HostConfig, HostSlots};
use crate::env_init::EnvInit;
use crate::tracing_logger::TracingLogger;

/// Initialize the tracing subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trellis={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Runs the host until SIGINT or SIGTERM.
pub async fn run_serve(config_path: Option<PathBuf>) -> Result<(), TrellisError> {
    let init: Arc<dyn InitPlugin> = Arc::new(EnvInit::from_env());
    let config = bootstrap(init.clone(), &builtin::catalog(config_path)).await?;
    let settings = config.values().host.clone();

    config.subscribe(Arc::new(|event: &ConfigEvent| {
        let ConfigEvent::Loaded { generation } = *event;
        info!(
            generation,
            "configuration changed; host settings apply on next start"
        );
    }));

    let ctx = Context::<HostSlots>::builder(init)
        .with_config(config)
        .with_log(Arc::new(TracingLogger::new()))
        .build()?;

    if let Some(path) = &settings.manifest {
        verify_manifest(&ctx, path)?;
    }

    let shutdown = install_signal_handler()?;
    let order = settings.activation_order();
    let teardown = teardown_order(&ctx, &order);

    if let Err(e) = ctx.activate_in(&order).await {
        error!(error = %e, "startup failed, deactivating");
        if let Err(teardown_err) = ctx.deactivate_in(&teardown).await {
            warn!(error = %teardown_err, "deactivation after failed startup also failed");
        }
        return Err(e);
    }

    if let Some(log) = ctx.log() {
        log.info("trellis host started");
    }
    info!(plugins = ?ctx.kinds(), "trellis host running");

    shutdown.cancelled().await;
    info!("shutting down");

    let timeout = Duration::from_secs(settings.shutdown_timeout_secs);
    tokio::time::timeout(timeout, ctx.deactivate_in(&teardown))
        .await
        .map_err(|_| TrellisError::Timeout { duration: timeout })??;

    info!("shutdown complete");
    Ok(())
}

/// Reverse of `order`, limited to filled slots. Always ends with the
/// configuration and init plugins, which bootstrap activates regardless of
/// `order`.
fn teardown_order(ctx: &dyn AnyContext, order: &[PluginKind]) -> Vec<PluginKind> {
    let mut teardown: Vec<PluginKind> = order
        .iter()
        .rev()
        .copied()
        .filter(|&kind| ctx.plugin(kind).is_some())
        .collect();
    for kind in [PluginKind::Configuration, PluginKind::Init] {
        if !teardown.contains(&kind) && ctx.plugin(kind).is_some() {
            teardown.push(kind);
        }
    }
    teardown
}

fn verify_manifest(ctx: &Context<HostSlots>, path: &std::path::Path) -> Result<(), TrellisError> {
    let manifest = DeploymentManifest::from_path(path)?;
    match manifest.verify(ctx) {
        Ok(()) => {
            info!(manifest = %path.display(), "context matches deployment manifest");
            Ok(())
        }
        Err(discrepancies) => {
            for discrepancy in &discrepancies {
                error!(%discrepancy, "deployment manifest mismatch");
            }
            Err(TrellisError::Config(format!(
                "context does not match {} ({} discrepancies)",
                path.display(),
                discrepancies.len()
            )))
        }
    }
}

/// Bootstraps the configuration plugin and prints the values it loaded.
pub async fn dump_config(config_path: Option<PathBuf>) -> Result<String, TrellisError> {
    let init: Arc<dyn InitPlugin> = Arc::new(EnvInit::from_env());
    let config = bootstrap(init.clone(), &builtin::catalog(config_path)).await?;
    let dumped = config.dump()?;
    config.deactivate(None).await?;
    init.deactivate(None).await?;
    Ok(dumped)
}

/// Validates the configuration files and, if one is configured, the
/// deployment manifest, without starting anything.
pub async fn check_config(config_path: Option<PathBuf>) -> Result<HostConfig, ConfigError> {
    let source = FileConfigFactory::new(config_path).source();
    let config = trellis_config::check(&HostConfig::default(), &source).await?;
    if let Some(path) = &config.host.manifest {
        DeploymentManifest::from_path(path).map_err(|e| ConfigError::Other(e.to_string()))?;
    }
    Ok(config)
}

/// Returns a token cancelled on SIGINT (ctrl-c) or, on unix, SIGTERM.
pub fn install_signal_handler() -> Result<CancellationToken, TrellisError> {
    let token = CancellationToken::new();

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(|e| TrellisError::unavailable("cannot install SIGTERM handler", e))?;

    let cancel = token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = interrupted() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }

        #[cfg(not(unix))]
        {
            interrupted().await;
            info!("received ctrl-c");
        }

        cancel.cancel();
    });

    Ok(token)
}

/// Completes on ctrl-c. Never completes if the handler can't be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use trellis_core::Activate;

    use super::*;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    #[serial]
    async fn check_accepts_a_valid_file() {
        let file = toml_file(
            "[host]\nactivation_order = [\"InitPlugin\", \"ConfigurationPlugin\"]\nshutdown_timeout_secs = 3\n",
        );
        let config = check_config(Some(file.path().to_path_buf())).await.unwrap();
        assert_eq!(config.host.shutdown_timeout_secs, 3);
        assert_eq!(
            config.host.activation_order,
            vec![PluginKind::Init, PluginKind::Configuration]
        );
    }

    #[tokio::test]
    #[serial]
    async fn check_suggests_a_misspelled_key() {
        let file = toml_file("[host]\nshutdown_timeout_sec = 3\n");
        let err = check_config(Some(file.path().to_path_buf()))
            .await
            .unwrap_err();
        match err {
            ConfigError::UnknownKey { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("shutdown_timeout_secs"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn check_reports_a_broken_manifest() {
        let manifest = toml_file("[[plugins]]\napiVersion = \"trellis.dev/v1\"\n");
        let file = toml_file(&format!(
            "[host]\nmanifest = {:?}\n",
            manifest.path().display().to_string()
        ));
        let err = check_config(Some(file.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deployment manifest"), "{err}");
    }

    #[tokio::test]
    #[serial]
    async fn dump_bootstraps_from_the_environment() {
        let file = toml_file("[host]\nshutdown_timeout_secs = 42\n");
        // SAFETY: serialized with every other test touching the environment.
        unsafe { std::env::set_var("TRELLIS_RELOAD_ON_SIGHUP", "no") };
        let dumped = dump_config(Some(file.path().to_path_buf())).await;
        unsafe { std::env::remove_var("TRELLIS_RELOAD_ON_SIGHUP") };

        let value: serde_json::Value = serde_json::from_str(&dumped.unwrap()).unwrap();
        assert_eq!(value["host"]["shutdown_timeout_secs"], 42);
    }

    #[tokio::test]
    #[serial]
    async fn missing_explicit_file_is_not_found() {
        let err = dump_config(Some(PathBuf::from("/nonexistent/trellis.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, TrellisError::NotFound { .. }));
    }

    #[tokio::test]
    async fn manifest_mismatch_fails_verification() {
        let init: Arc<dyn InitPlugin> = Arc::new(EnvInit::from_vars(Vec::new()));
        let ctx = Context::<HostSlots>::builder(init)
            .with_log(Arc::new(TracingLogger::new()))
            .build()
            .unwrap();
        let manifest = toml_file(
            r#"
[[plugins]]
apiVersion = "trellis.dev/v1"
kind = "InitPlugin"
metadata = { name = "env-init", namespace = "trellis", uid = "5F0C6D1E-8F5B-4A63-9A57-2F4C0E7D2B11" }

[[plugins]]
apiVersion = "trellis.dev/v1"
kind = "CachePlugin"
metadata = { name = "redis", namespace = "trellis", uid = "urn:uuid:1234" }
"#,
        );

        let err = verify_manifest(&ctx, manifest.path()).unwrap_err();
        assert!(err.to_string().contains("1 discrepancies"), "{err}");
    }

    #[tokio::test]
    async fn teardown_skips_empty_slots_and_keeps_bootstrap_plugins() {
        let init: Arc<dyn InitPlugin> = Arc::new(EnvInit::from_vars(Vec::new()));
        let logger = Arc::new(TracingLogger::new());
        let ctx = Context::<HostSlots>::builder(init.clone())
            .with_log(logger.clone())
            .build()
            .unwrap();

        let order = [PluginKind::Logging, PluginKind::Cache];
        let teardown = teardown_order(&ctx, &order);
        assert_eq!(teardown, vec![PluginKind::Logging, PluginKind::Init]);

        init.activate(None).await.unwrap();
        ctx.activate_in(&[PluginKind::Logging]).await.unwrap();
        ctx.deactivate_in(&teardown).await.unwrap();
        assert!(init.is_deactivated().await);
        assert!(logger.is_deactivated().await);
    }

    #[test]
    fn empty_activation_order_means_the_default() {
        let settings = builtin::HostSettings::default();
        assert!(settings.activation_order.is_empty());
        assert_eq!(
            settings.activation_order(),
            builtin::DEFAULT_ACTIVATION_ORDER.to_vec()
        );
    }
}
