// src/config/model.rs

use serde::Deserialize;

use crate::types::BusyBehaviour;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// busy_behaviour = "queue"
/// kill_grace_ms = 5000
///
/// [tools]
/// build = "ned-transpile {src} {build} --colors"
///
/// [watch]
/// debounce_ms = 100
/// ignore = ["**/node_modules/**"]
/// ```
///
/// All sections are optional and have defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub tools: ToolsSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        tools: ToolsSection,
        watch: WatchSection,
    ) -> Self {
        Self {
            config,
            tools,
            watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ConfigSection::default(),
            ToolsSection::default(),
            WatchSection::default(),
        )
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"queue"` (default) or `"restart"`.
    #[serde(default)]
    pub busy_behaviour: BusyBehaviour,

    /// How long a killed process may take to exit after SIGTERM before it is
    /// force-killed. `0` kills immediately.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,

    /// Print a divider line before every run after the first one.
    #[serde(default = "default_true")]
    pub divider: bool,
}

fn default_kill_grace_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            busy_behaviour: BusyBehaviour::default(),
            kill_grace_ms: default_kill_grace_ms(),
            divider: true,
        }
    }
}

/// `[tools]` section: command templates for each stage.
///
/// Placeholders: `{src}`, `{build}`, `{main}`, `{entry}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_lint")]
    pub lint: String,

    #[serde(default = "default_build")]
    pub build: String,

    #[serde(default = "default_app")]
    pub app: String,

    #[serde(default = "default_test")]
    pub test: String,
}

fn default_lint() -> String {
    "ned-lint {src} --colors".to_string()
}

fn default_build() -> String {
    "ned-transpile {src} {build} --colors".to_string()
}

fn default_app() -> String {
    "node {entry}".to_string()
}

fn default_test() -> String {
    "ned-test -p {build} --colors".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            lint: default_lint(),
            build: default_build(),
            app: default_app(),
            test: default_test(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Quiet period after the last change before a run is triggered.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Globs (relative to the source directory) that never trigger a run.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_ignore() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: default_ignore(),
        }
    }
}
