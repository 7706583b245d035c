//! Command handlers -- one module per subcommand

pub mod audit;
pub mod config;
pub mod list;
pub mod search;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use appwarden_core::config::AppwardenConfig;
use appwarden_inventory::{
    InventoryCollector, InventoryCollectorBuilder, InventoryScannerConfig, InventorySnapshot,
    RegistrySnapshot,
};

use crate::error::CliError;

/// Snapshot path from `--snapshot`, falling back to `inventory.snapshot_path`.
pub(crate) fn snapshot_path(flag: Option<&Path>, config: &AppwardenConfig) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        let configured = config.inventory.snapshot_path.trim();
        (!configured.is_empty()).then(|| PathBuf::from(configured))
    })
}

/// Build a collector over the snapshot backend, or the native registry on Windows.
pub(crate) async fn build_collector(
    scanner_config: InventoryScannerConfig,
    snapshot: Option<PathBuf>,
) -> Result<InventoryCollector, CliError> {
    let builder = InventoryCollectorBuilder::new().config(scanner_config);

    let builder = match snapshot {
        Some(path) => {
            info!(path = %path.display(), "using registry snapshot");
            let loaded = tokio::task::spawn_blocking(move || RegistrySnapshot::load(&path))
                .await
                .map_err(|e| CliError::Command(format!("spawn_blocking failed: {e}")))??;
            builder.snapshot(Arc::new(loaded))
        }
        None => native_backend(builder)?,
    };

    Ok(builder.build()?)
}

#[cfg(windows)]
fn native_backend(
    builder: InventoryCollectorBuilder,
) -> Result<InventoryCollectorBuilder, CliError> {
    debug!("using native registry backend");
    Ok(builder.native())
}

#[cfg(not(windows))]
fn native_backend(
    _builder: InventoryCollectorBuilder,
) -> Result<InventoryCollectorBuilder, CliError> {
    debug!("native registry backend is not built for this platform");
    Err(CliError::NoBackend(
        "the live registry is only readable on Windows; pass --snapshot <file> or set inventory.snapshot_path".to_owned(),
    ))
}

/// Collect the inventory once with the given scanner configuration.
pub(crate) async fn collect(
    scanner_config: InventoryScannerConfig,
    snapshot: Option<PathBuf>,
) -> Result<InventorySnapshot, CliError> {
    let collector = build_collector(scanner_config, snapshot).await?;
    Ok(collector.collect().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_path_flag_wins() {
        let mut config = AppwardenConfig::default();
        config.inventory.snapshot_path = "from-config.json".to_owned();
        let flag = PathBuf::from("from-flag.json");

        assert_eq!(snapshot_path(Some(&flag), &config), Some(flag));
        assert_eq!(
            snapshot_path(None, &config),
            Some(PathBuf::from("from-config.json"))
        );
    }

    #[test]
    fn test_snapshot_path_empty_config() {
        let config = AppwardenConfig::default();
        assert_eq!(snapshot_path(None, &config), None);
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_no_backend_without_snapshot() {
        let err = build_collector(InventoryScannerConfig::default(), None)
            .await
            .err()
            .expect("should fail without a backend");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_missing_snapshot_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let err = build_collector(
            InventoryScannerConfig::default(),
            Some(dir.path().join("absent.json")),
        )
        .await
        .err()
        .expect("should fail on missing snapshot");
        assert!(matches!(err, CliError::Inventory(_)));
    }
}
