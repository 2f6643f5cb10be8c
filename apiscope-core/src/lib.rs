//! # apiscope-core
//!
//! Core library for apiscope - an auditor for captured HTTP traffic.
//!
//! This library provides:
//! - Domain types for captured requests and responses
//! - A tolerant loader for line-delimited capture logs
//! - Six analysis passes that describe the API surface in use
//! - Markdown, JSON and console report rendering
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Pipeline
//!
//! Data flows strictly forward and nothing is kept between runs:
//! - **Load:** capture log on disk → requests and responses in log order
//! - **Analyze:** read-only passes → one immutable [`AnalysisReport`]
//! - **Render:** report → markdown tables, raw JSON or a console digest
//!
//! ## Example
//!
//! ```rust,no_run
//! use apiscope_core::{analyze, ingest, report, Config, ReportFormat};
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let log = ingest::load(Path::new("requests.jsonl")).expect("failed to load log");
//! let report = analyze(&log.requests, &log.responses, &config.analysis)
//!     .expect("no requests captured");
//! report::save(&report, Path::new("report"), ReportFormat::Markdown)
//!     .expect("failed to write report");
//! ```

// Re-export commonly used items at the crate root
pub use analysis::{analyze, AnalysisReport};
pub use body::BodyPayload;
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{load, load_with, LoadedLog};
pub use report::{render, save, ReportFormat};
pub use types::*;

// Public modules
pub mod analysis;
pub mod body;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod types;
