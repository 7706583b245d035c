//! `appwarden audit` command handler
//!
//! Matches the inventory against a restricted-software list. Findings are
//! rendered on a white-to-red gradient by score and the command exits with
//! code 4 when anything is found.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use appwarden_core::config::AppwardenConfig;
use appwarden_inventory::patterns::resolve_pattern_list;
use appwarden_inventory::{
    InventoryScannerConfig, MatchEngine, MatchResult, SearchOptions, discover_pattern_lists,
    load_pattern_list,
};

use crate::cli::AuditArgs;
use crate::commands::{collect, snapshot_path};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, fit};

/// Execute the `audit` command.
pub async fn execute(
    args: AuditArgs,
    config: &AppwardenConfig,
    snapshot: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let lists_dir = PathBuf::from(&config.audit.lists_dir);

    let Some(list) = args.list.filter(|_| !args.lists) else {
        let lists = discover_pattern_lists(&lists_dir)?;
        return writer.render(&AvailableLists {
            dir: lists_dir.display().to_string(),
            lists: lists.iter().map(|p| p.display().to_string()).collect(),
        });
    };

    let list_path = resolve_pattern_list(&lists_dir, &list);
    let patterns = load_pattern_list(&list_path)?;
    if patterns.is_empty() {
        warn!(list = %list_path.display(), "restricted-software list has no patterns");
    }

    let mut options = SearchOptions::from_audit(&config.audit);
    if let Some(threshold) = args.threshold {
        options = options.with_threshold(threshold);
    }
    options.validate()?;

    let mut scanner_config = InventoryScannerConfig::from_core(&config.inventory);
    scanner_config.include_packaged = config.audit.include_packaged;

    let inventory = collect(scanner_config, snapshot_path(snapshot, config)).await?;
    let results = MatchEngine::new(options).search(&patterns, &inventory.entries);
    info!(
        list = %list_path.display(),
        patterns = patterns.len(),
        findings = results.len(),
        "audit completed"
    );

    let report = AuditReport::new(
        list_path.display().to_string(),
        patterns.len(),
        options.threshold,
        inventory.entries.len(),
        results,
    );
    writer.render(&report)?;

    if !report.findings.is_empty() {
        return Err(CliError::RestrictedFound(report.findings.len()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AvailableLists {
    pub dir: String,
    pub lists: Vec<String>,
}

impl Render for AvailableLists {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Restricted-software lists in {}:", self.dir)?;
        if self.lists.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for list in &self.lists {
            writeln!(w, "  {list}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct AuditReport {
    pub list: String,
    pub patterns: usize,
    pub threshold: u8,
    pub inventory_size: usize,
    pub findings: Vec<MatchResult>,
}

impl AuditReport {
    /// Findings are sorted by display name.
    pub fn new(
        list: String,
        patterns: usize,
        threshold: u8,
        inventory_size: usize,
        mut findings: Vec<MatchResult>,
    ) -> Self {
        findings.sort_by_cached_key(|r| r.entry.display_name.to_lowercase());
        Self {
            list,
            patterns,
            threshold,
            inventory_size,
            findings,
        }
    }
}

/// Score color: white at the threshold, pure red at 100.
pub fn score_color(score: u8, threshold: u8) -> (u8, u8, u8) {
    let span = u16::from(100u8.saturating_sub(threshold));
    if span == 0 {
        return (255, 0, 0);
    }
    let above = u16::from(score.saturating_sub(threshold)).min(span);
    let fade = 255 - (above * 255 / span);
    let fade = u8::try_from(fade).unwrap_or(0);
    (255, fade, fade)
}

impl Render for AuditReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Audit: {}", self.list.bold())?;
        writeln!(
            w,
            "{} patterns against {} entries (threshold {})",
            self.patterns, self.inventory_size, self.threshold
        )?;
        writeln!(w)?;

        if self.findings.is_empty() {
            writeln!(w, "{}", "No restricted software found.".green())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:>5}  {:<44} {:<18} {:<26} Matched",
            "Score", "Name", "Version", "Publisher"
        )?;
        writeln!(w, "{}", "-".repeat(110))?;

        for f in &self.findings {
            let (r, g, b) = score_color(f.score, self.threshold);
            let name = format!("{:<44}", fit(&f.entry.display_name, 44));
            writeln!(
                w,
                "{:>5}  {} {:<18} {:<26} {}",
                f.score,
                name.truecolor(r, g, b),
                fit(f.entry.version.as_deref().unwrap_or("-"), 18),
                fit(f.entry.publisher.as_deref().unwrap_or("-"), 26),
                f.matched_patterns.join(", ")
            )?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "{}",
            format!("{} restricted item(s) found", self.findings.len())
                .red()
                .bold()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use appwarden_inventory::{Entry, EntryKind, Scope, SourceKey, View};

    fn result(name: &str, score: u8) -> MatchResult {
        MatchResult {
            entry: Entry {
                kind: EntryKind::Native,
                display_name: name.to_owned(),
                version: None,
                publisher: None,
                install_location: None,
                uninstall_command: None,
                source: SourceKey::registry(Scope::Machine, View::Bits64, name),
                is_system_component: false,
                extra: BTreeMap::new(),
            },
            score,
            matched_patterns: vec![name.to_lowercase()],
        }
    }

    #[test]
    fn test_score_color_gradient() {
        assert_eq!(score_color(81, 81), (255, 255, 255));
        assert_eq!(score_color(100, 81), (255, 0, 0));
        let (_, g, b) = score_color(90, 81);
        assert!(g > 0 && g < 255);
        assert_eq!(g, b);
    }

    #[test]
    fn test_score_color_edges() {
        assert_eq!(score_color(100, 100), (255, 0, 0));
        assert_eq!(score_color(50, 81), (255, 255, 255));
        assert_eq!(score_color(100, 0), (255, 0, 0));
    }

    #[test]
    fn test_findings_sorted_by_name() {
        let report = AuditReport::new(
            "remote.txt".to_owned(),
            2,
            81,
            10,
            vec![result("TeamViewer", 100), result("AnyDesk", 90)],
        );
        let names: Vec<&str> = report
            .findings
            .iter()
            .map(|f| f.entry.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["AnyDesk", "TeamViewer"]);
    }

    #[test]
    fn test_clean_audit_text() {
        colored::control::set_override(false);
        let report = AuditReport::new("remote.txt".to_owned(), 2, 81, 10, Vec::new());
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("utf-8");
        assert!(output.contains("No restricted software found."));
    }

    #[test]
    fn test_available_lists_text() {
        let lists = AvailableLists {
            dir: "ProgramList".to_owned(),
            lists: vec!["ProgramList/remote.txt".to_owned()],
        };
        let mut buffer = Vec::new();
        lists.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("utf-8");
        assert!(output.contains("ProgramList/remote.txt"));
    }
}
