//! featx CLI library.
//!
//! Configuration loading, logging setup and output formatting for the `featx`
//! binary, plus [`run()`] which wires a configuration into a batch run.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod run;

pub use cli::Cli;
pub use config::Config;
pub use error::{CliError, Result};
pub use logging::{console_level, init_logging};
pub use output::{progress_bar, progress_callback, Formatter};
pub use run::{load_schema, run, run_with_client};
