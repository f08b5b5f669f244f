use std::fmt;

use serde::Deserialize;

/// Behaviour when a trigger arrives while a pipeline run is still in progress.
///
/// - `Queue`: let the current run settle, then start exactly one follow-up run
///   (default behaviour).
/// - `Restart`: same follow-up run, but the processes of the current run are
///   killed right away so it settles early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusyBehaviour {
    #[default]
    Queue,
    Restart,
}

/// The fixed stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Lint,
    Build,
    App,
    Test,
}

impl StageKind {
    /// Label used to prefix the stage's output lines.
    pub fn label(self) -> &'static str {
        match self {
            StageKind::Lint => "lint",
            StageKind::Build => "transpile",
            StageKind::App => "app",
            StageKind::Test => "test",
        }
    }

    /// Key of the stage's command in the `[tools]` config section.
    pub fn config_key(self) -> &'static str {
        match self {
            StageKind::Lint => "lint",
            StageKind::Build => "build",
            StageKind::App => "app",
            StageKind::Test => "test",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
