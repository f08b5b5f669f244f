// src/pipeline/plan.rs

use crate::config::{CommandTemplate, DevSettings};
use crate::errors::{DevloopError, Result};
use crate::exec::StageCommand;
use crate::types::StageKind;

/// One stage of the pipeline. Stateless; built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub command: StageCommand,
    pub enabled: bool,
}

impl Stage {
    pub fn new(kind: StageKind, command: StageCommand, enabled: bool) -> Self {
        Self {
            kind,
            command,
            enabled,
        }
    }
}

/// The four stages in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub lint: Stage,
    pub build: Stage,
    pub app: Stage,
    pub test: Stage,
}

impl StagePlan {
    /// Resolve the tool templates against the session's directories.
    ///
    /// Build and app are always enabled; lint and test follow the flags.
    pub fn from_settings(settings: &DevSettings) -> Result<Self> {
        let vars = settings.template_vars();
        let tools = &settings.config.tools;

        let resolve = |kind: StageKind, raw: &str| -> Result<StageCommand> {
            let template = CommandTemplate::parse(raw)
                .map_err(|e| DevloopError::ConfigError(format!("[tools].{}: {e}", kind.config_key())))?;
            let (program, args) = template.expand(&vars);
            Ok(StageCommand::new(kind.label(), program, args))
        };

        Ok(Self {
            lint: Stage::new(StageKind::Lint, resolve(StageKind::Lint, &tools.lint)?, settings.lint),
            build: Stage::new(StageKind::Build, resolve(StageKind::Build, &tools.build)?, true),
            app: Stage::new(StageKind::App, resolve(StageKind::App, &tools.app)?, true),
            test: Stage::new(StageKind::Test, resolve(StageKind::Test, &tools.test)?, settings.test),
        })
    }

    pub fn stages(&self) -> [&Stage; 4] {
        [&self.lint, &self.build, &self.app, &self.test]
    }
}
