//! Lore CLI library.
//!
//! Shared pieces of the `lore` (query) and `lore-index` (build) binaries:
//! configuration and secrets, terminal input, logging setup, output
//! formatting, and the two flows themselves.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;

pub use app::{render_error, render_record, run_build, run_query, QueryOutcome};
pub use config::{AppConfig, Secrets};
pub use error::{CliError, Result};
pub use output::Formatter;
