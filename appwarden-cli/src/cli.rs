//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O happen here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// appwarden -- installed software inventory and restricted-software audit.
///
/// Use `appwarden <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "appwarden", version, about, long_about = None)]
pub struct Cli {
    /// Path to the appwarden.toml configuration file (missing file: defaults).
    #[arg(short, long, global = true, default_value = "appwarden.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Read the registry from a JSON snapshot instead of the live system.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Matching mode accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Approximate matching with a 0-100 score.
    Fuzzy,
    /// Case-insensitive containment, score 100.
    Substring,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the canonical installed-software inventory.
    List(ListArgs),

    /// Search the inventory for one or more patterns.
    Search(SearchArgs),

    /// Check the inventory against a restricted-software list.
    Audit(AuditArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- list ----

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Include packaged (store) applications.
    #[arg(long)]
    pub include_packaged: bool,

    /// Keep entries flagged as system components.
    #[arg(long)]
    pub no_filter_system: bool,
}

// ---- search ----

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// One or more search patterns.
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Matching mode (default: `search.mode`).
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Minimum fuzzy score, 0-100 (default: `search.threshold`).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Maximum candidates per pattern (default: `search.cap`).
    #[arg(long)]
    pub cap: Option<usize>,

    /// Include packaged (store) applications.
    #[arg(long)]
    pub include_packaged: bool,
}

// ---- audit ----

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Restricted-software list: a file path or a list name under `audit.lists_dir`.
    #[arg(required_unless_present = "lists")]
    pub list: Option<String>,

    /// Minimum fuzzy score, 0-100 (default: `audit.threshold`).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Show the lists available under `audit.lists_dir` and exit.
    #[arg(long, conflicts_with = "list")]
    pub lists: bool,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, inventory, search, audit).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_list_defaults() {
        let cli = Cli::try_parse_from(["appwarden", "list"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("appwarden.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.snapshot.is_none());
        match cli.command {
            Commands::List(args) => {
                assert!(!args.include_packaged);
                assert!(!args.no_filter_system);
            }
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "appwarden",
            "list",
            "--output",
            "json",
            "--snapshot",
            "reg.json",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.snapshot, Some(PathBuf::from("reg.json")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_parse_search_multiple_patterns() {
        let cli = Cli::try_parse_from([
            "appwarden",
            "search",
            "chrome",
            "firefox",
            "--mode",
            "substring",
            "--cap",
            "5",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.patterns, vec!["chrome", "firefox"]);
                assert_eq!(args.mode, Some(ModeArg::Substring));
                assert_eq!(args.cap, Some(5));
                assert!(args.threshold.is_none());
            }
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_requires_pattern() {
        assert!(Cli::try_parse_from(["appwarden", "search"]).is_err());
    }

    #[test]
    fn test_cli_threshold_out_of_range() {
        let result = Cli::try_parse_from(["appwarden", "search", "x", "--threshold", "101"]);
        assert!(result.is_err(), "threshold above 100 should be rejected");
    }

    #[test]
    fn test_cli_parse_audit_list() {
        let cli = Cli::try_parse_from(["appwarden", "audit", "remote-access", "--threshold", "90"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Audit(args) => {
                assert_eq!(args.list.as_deref(), Some("remote-access"));
                assert_eq!(args.threshold, Some(90));
                assert!(!args.lists);
            }
            _ => panic!("expected Audit command"),
        }
    }

    #[test]
    fn test_cli_audit_requires_list_or_lists_flag() {
        assert!(Cli::try_parse_from(["appwarden", "audit"]).is_err());
        assert!(Cli::try_parse_from(["appwarden", "audit", "--lists"]).is_ok());
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["appwarden", "config", "show", "--section", "search"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => assert_eq!(section.as_deref(), Some("search")),
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_invalid_output_format() {
        let result = Cli::try_parse_from(["appwarden", "list", "--output", "yaml"]);
        assert!(result.is_err());
    }
}
