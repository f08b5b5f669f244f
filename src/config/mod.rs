// src/config/mod.rs

//! Configuration: the optional `devloop.toml` file plus the CLI flags merged
//! on top of it.
//!
//! - [`model`] holds the serde structs for the TOML file.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.
//! - [`loader`] reads the file from disk.
//! - [`template`] expands `{src}`-style placeholders in tool commands.
//! - [`settings`] merges the file with the `dev` subcommand flags.

pub mod loader;
pub mod model;
pub mod settings;
pub mod template;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, ToolsSection, WatchSection};
pub use settings::DevSettings;
pub use template::{CommandTemplate, TemplateVars};
