// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Lint, build, launch and test an app, restarting it when sources change.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the optional config file (TOML).
    ///
    /// When left at the default and the file does not exist, built-in
    /// defaults are used.
    #[arg(long, global = true, value_name = "PATH", default_value = "devloop.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the stage commands, but don't execute anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build and run the app, optionally linting, testing and watching.
    Dev(DevArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DevArgs {
    /// Source directory.
    #[arg(value_name = "SRC", default_value = "./src")]
    pub src: PathBuf,

    /// Build output directory.
    #[arg(value_name = "BUILD", default_value = "./build")]
    pub build: PathBuf,

    /// Application entry point, relative to the build directory.
    #[arg(short, long, value_name = "PATH", default_value = "index.js")]
    pub main: PathBuf,

    /// Lint code before building.
    #[arg(short, long)]
    pub lint: bool,

    /// Run tests after the app has been launched.
    #[arg(short, long)]
    pub test: bool,

    /// Watch the source directory and rebuild/restart the app on change.
    #[arg(short, long)]
    pub watch: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_defaults_match_documented_layout() {
        let args = CliArgs::try_parse_from(["devloop", "dev"]).unwrap();
        let Command::Dev(dev) = args.command;
        assert_eq!(dev.src, PathBuf::from("./src"));
        assert_eq!(dev.build, PathBuf::from("./build"));
        assert_eq!(dev.main, PathBuf::from("index.js"));
        assert!(!dev.lint && !dev.test && !dev.watch);
        assert_eq!(args.config, "devloop.toml");
    }

    #[test]
    fn dev_accepts_positionals_and_flags() {
        let args = CliArgs::try_parse_from([
            "devloop", "dev", "lib", "dist", "--main", "server.js", "--lint", "-t", "-w",
        ])
        .unwrap();
        let Command::Dev(dev) = args.command;
        assert_eq!(dev.src, PathBuf::from("lib"));
        assert_eq!(dev.build, PathBuf::from("dist"));
        assert_eq!(dev.main, PathBuf::from("server.js"));
        assert!(dev.lint && dev.test && dev.watch);
    }
}
