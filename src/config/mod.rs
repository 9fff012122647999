//! Configuration for Agenda.
//!
//! Two pieces are resolved once at startup and passed to every component:
//!
//! ## Paths
//!
//! [`AppPaths`] holds every file and directory the application touches. The
//! data directory is chosen by (highest to lowest):
//! 1. `--data-dir` flag / `AGENDA_DATA_DIR` environment variable
//! 2. The platform data directory (`~/.local/share/AgendaComp` on Linux)
//! 3. `./AgendaComp_data` when no platform directory is known
//!
//! ## config.kdl - User preferences
//!
//! Located at `<data-dir>/config.kdl`. Contains:
//! - `output-format` - "json" or "human"
//! - `default-priority` - Default task priority (1-3)
//! - `default-category` - Category applied when none is given
//! - `log-level` - Level for the log file
//!
//! Use the [`resolver`] module for precedence resolution against CLI flags.

pub mod paths;
pub mod resolver;
pub mod schema;

pub use paths::{AppPaths, DATA_DIR_ENV, resolve_data_dir};
pub use resolver::{ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config};
pub use schema::{AgendaConfig, OutputFormat};
