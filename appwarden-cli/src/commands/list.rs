//! `appwarden list` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use appwarden_core::config::AppwardenConfig;
use appwarden_inventory::{CollectStats, Entry, InventoryScannerConfig};

use crate::cli::ListArgs;
use crate::commands::{collect, snapshot_path};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, fit};

/// Execute the `list` command.
pub async fn execute(
    args: ListArgs,
    config: &AppwardenConfig,
    snapshot: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut scanner_config = InventoryScannerConfig::from_core(&config.inventory);
    if args.include_packaged {
        scanner_config.include_packaged = true;
    }
    if args.no_filter_system {
        scanner_config.filter_system_components = false;
    }

    let inventory = collect(scanner_config, snapshot_path(snapshot, config)).await?;
    info!(
        scan_id = %inventory.scan_id,
        entries = inventory.entries.len(),
        "inventory listed"
    );

    let report = ListReport::new(inventory.scan_id, inventory.stats, inventory.entries);
    writer.render(&report)
}

#[derive(Serialize)]
pub struct ListReport {
    pub scan_id: String,
    pub stats: CollectStats,
    pub entries: Vec<Entry>,
}

impl ListReport {
    /// Entries are sorted by display name, case-insensitively.
    pub fn new(scan_id: String, stats: CollectStats, mut entries: Vec<Entry>) -> Self {
        entries.sort_by_cached_key(|e| e.display_name.to_lowercase());
        Self {
            scan_id,
            stats,
            entries,
        }
    }
}

impl Render for ListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{:<48} {:<20} {:<30} Source",
            "Name", "Version", "Publisher"
        )?;
        writeln!(w, "{}", "-".repeat(118))?;

        for e in &self.entries {
            writeln!(
                w,
                "{:<48} {:<20} {:<30} {}",
                fit(&e.display_name, 48),
                fit(e.version.as_deref().unwrap_or("-"), 20),
                fit(e.publisher.as_deref().unwrap_or("-"), 30),
                e.source.label().dimmed()
            )?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "{} entries ({} sources scanned, {} skipped, {} system components hidden, {} duplicates merged)",
            self.entries.len().to_string().bold(),
            self.stats.sources_scanned,
            self.stats.sources_failed,
            self.stats.entries_filtered,
            self.stats.duplicates_merged
        )?;
        Ok(())
    }
}
