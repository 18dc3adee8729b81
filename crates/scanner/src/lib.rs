#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScannerError`)
//! - [`config`]: Scanner configuration (`ScannerConfig`)
//! - [`command`]: External command boundary (`CommandRunner`, `SystemCommandRunner`, `ScriptedCommandRunner`)
//! - [`capability`]: Capability detection (`CapabilityKind`, `CapabilityProber`, `ScanPlan`)
//! - [`parser`]: Scan output parsers (`SignalParser` trait, one parser per capability)
//! - [`channel`]: Frequency to channel conversion
//! - [`enrich`]: Distance, risk and position enrichment (`Enricher`, `RiskPolicy`)
//! - [`demo`]: Fixed demo signal source
//! - [`store`]: Latest snapshot and history (`StateStore`)
//! - [`acquisition`]: Acquisition loop (`SignalScanner`, `SignalScannerBuilder`, `Pipeline` impl)
//!
//! # Architecture
//!
//! ```text
//! CapabilityProber --> ScanPlan --> CommandRunner --> SignalParser --> Enricher
//!                                                                        |
//!                                                                   Snapshot
//!                                                                        |
//!                                                  StateStore <-- publish (atomic swap)
//!                                                       |
//!                                                  API readers
//! ```

pub mod acquisition;
pub mod capability;
pub mod channel;
pub mod command;
pub mod config;
pub mod demo;
pub mod enrich;
pub mod error;
pub mod parser;
pub mod store;

// --- Public API Re-exports ---

// Acquisition (main orchestrator)
pub use acquisition::{AcquisitionState, SignalScanner, SignalScannerBuilder};

// Configuration
pub use config::ScannerConfig;

// Error
pub use error::ScannerError;

// Capability detection
pub use capability::{CapabilityKind, CapabilityProber, ProbeOutcome, ProbeReport};

// Command boundary
pub use command::{CommandOutput, CommandRunner, ScriptedCommandRunner, SystemCommandRunner};

// Parsing and enrichment
pub use enrich::{Enricher, RiskPolicy};
pub use parser::{ProvisionalSignal, SignalParser, parser_for};

// State
pub use store::StateStore;
