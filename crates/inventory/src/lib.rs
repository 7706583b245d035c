#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`InventoryScannerError`)
//! - [`config`]: Collector configuration (`InventoryScannerConfig`, builder)
//! - [`types`]: Domain types (`Entry`, `SourceKey`, `Scope`, `View`, `PackageDescriptor`)
//! - [`source`]: Platform access traits and backends (`RegistrySnapshot`, `WindowsRegistry`)
//! - [`resolver`]: Indirect display-name resolution (`NameResolver`)
//! - [`scanner`]: Per-source record enumeration (`SourceScanner`, `SourceSpec`)
//! - [`filter`]: System-component filter
//! - [`dedup`]: Deterministic duplicate reconciliation
//! - [`matcher`]: Ranked multi-pattern search (`MatchEngine`, `SearchOptions`, `MatchResult`)
//! - [`patterns`]: Restricted-software list files
//! - [`collector`]: Orchestrator (`InventoryCollector`, `InventoryCollectorBuilder`)
//!
//! # Architecture
//!
//! ```text
//! RegistryAccess / PackageCatalog / IndirectStringLoader
//!                        |
//!                  SourceScanner (per source, NameResolver)
//!                        |
//!             InventoryCollector (spawn_blocking, skip-and-log)
//!                        |
//!                filter --> dedup --> Vec<Entry>
//!                                         |
//!                 patterns --> MatchEngine --> Vec<MatchResult>
//! ```

pub mod collector;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod patterns;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod types;

// --- Public API Re-exports ---

// Collector (main orchestrator)
pub use collector::{CollectStats, InventoryCollector, InventoryCollectorBuilder, InventorySnapshot};

// Configuration
pub use config::{InventoryScannerConfig, InventoryScannerConfigBuilder};

// Error
pub use error::InventoryScannerError;

// Types
pub use types::{
    Entry, EntryKind, IdentityKey, PackageDescriptor, Scope, SourceKey, SourceOrigin, View,
};

// Sources
pub use source::{
    Hive, IndirectStringLoader, NoIndirectStrings, PackageCatalog, RegistryAccess,
    RegistrySnapshot, UnavailableCatalog,
};
#[cfg(windows)]
pub use source::{ShellIndirectStrings, WindowsRegistry};

// Pipeline stages
pub use dedup::dedup;
pub use filter::{FilterOptions, filter};
pub use resolver::NameResolver;
pub use scanner::{SourceScanner, SourceSpec};

// Matching
pub use matcher::{MatchEngine, MatchMode, MatchResult, SearchOptions, search};
pub use patterns::{discover_pattern_lists, load_pattern_list, parse_pattern_list};
