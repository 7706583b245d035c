//! `appwarden search` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use appwarden_core::config::AppwardenConfig;
use appwarden_inventory::{
    InventoryScannerConfig, MatchEngine, MatchMode, MatchResult, SearchOptions,
};

use crate::cli::{ModeArg, SearchArgs};
use crate::commands::{collect, snapshot_path};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, fit};

/// Execute the `search` command.
pub async fn execute(
    args: SearchArgs,
    config: &AppwardenConfig,
    snapshot: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let options = search_options(&args, config);
    options.validate()?;

    let mut scanner_config = InventoryScannerConfig::from_core(&config.inventory);
    if args.include_packaged {
        scanner_config.include_packaged = true;
    }

    let inventory = collect(scanner_config, snapshot_path(snapshot, config)).await?;
    let results = MatchEngine::new(options).search(&args.patterns, &inventory.entries);
    info!(
        patterns = args.patterns.len(),
        mode = %options.mode,
        matches = results.len(),
        "search completed"
    );

    let report = SearchReport {
        patterns: args.patterns,
        mode: options.mode.as_str(),
        threshold: options.threshold,
        inventory_size: inventory.entries.len(),
        results,
    };
    writer.render(&report)
}

/// Command-line flags override `[search]` settings.
fn search_options(args: &SearchArgs, config: &AppwardenConfig) -> SearchOptions {
    let mut options = SearchOptions::from_core(&config.search);
    if let Some(mode) = args.mode {
        options = options.with_mode(mode.into());
    }
    if let Some(threshold) = args.threshold {
        options = options.with_threshold(threshold);
    }
    if let Some(cap) = args.cap {
        options = options.with_cap(cap);
    }
    options
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fuzzy => MatchMode::Fuzzy,
            ModeArg::Substring => MatchMode::Substring,
        }
    }
}

#[derive(Serialize)]
pub struct SearchReport {
    pub patterns: Vec<String>,
    pub mode: &'static str,
    pub threshold: u8,
    pub inventory_size: usize,
    pub results: Vec<MatchResult>,
}

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Search: {} ({} mode, {} entries)",
            self.patterns.join(", ").bold(),
            self.mode,
            self.inventory_size
        )?;
        writeln!(w)?;

        if self.results.is_empty() {
            writeln!(w, "{}", "No matches.".yellow())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:>5}  {:<44} {:<18} {:<26} Matched",
            "Score", "Name", "Version", "Publisher"
        )?;
        writeln!(w, "{}", "-".repeat(110))?;

        for r in &self.results {
            let score = format!("{:>5}", r.score);
            let score = if r.score == 100 {
                score.green().bold()
            } else {
                score.normal()
            };
            writeln!(
                w,
                "{}  {:<44} {:<18} {:<26} {}",
                score,
                fit(&r.entry.display_name, 44),
                fit(r.entry.version.as_deref().unwrap_or("-"), 18),
                fit(r.entry.publisher.as_deref().unwrap_or("-"), 26),
                r.matched_patterns.join(", ")
            )?;
        }

        writeln!(w)?;
        writeln!(w, "{} match(es)", self.results.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn search_args(argv: &[&str]) -> SearchArgs {
        match Cli::try_parse_from(argv).expect("parse").command {
            Commands::Search(args) => args,
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AppwardenConfig::default();
        config.search.threshold = 55;
        config.search.mode = "substring".to_owned();

        let options = search_options(&search_args(&["appwarden", "search", "x"]), &config);
        assert_eq!(options.mode, MatchMode::Substring);
        assert_eq!(options.threshold, 55);
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppwardenConfig::default();
        let args = search_args(&[
            "appwarden",
            "search",
            "x",
            "--mode",
            "substring",
            "--threshold",
            "90",
            "--cap",
            "3",
        ]);
        let options = search_options(&args, &config);
        assert_eq!(options.mode, MatchMode::Substring);
        assert_eq!(options.threshold, 90);
        assert_eq!(options.cap, 3);
    }

    #[test]
    fn test_empty_report_text() {
        colored::control::set_override(false);
        let report = SearchReport {
            patterns: vec!["zzz".to_owned()],
            mode: "fuzzy",
            threshold: 70,
            inventory_size: 4,
            results: Vec::new(),
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("utf-8");
        assert!(output.contains("Search: zzz (fuzzy mode, 4 entries)"));
        assert!(output.contains("No matches."));
    }
}
