// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::template::CommandTemplate;
use crate::errors::{DevloopError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DevloopError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.tools, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = [
        ("lint", &cfg.tools.lint),
        ("build", &cfg.tools.build),
        ("app", &cfg.tools.app),
        ("test", &cfg.tools.test),
    ];

    for (name, raw) in tools {
        CommandTemplate::parse(raw)
            .map_err(|e| DevloopError::ConfigError(format!("[tools].{name}: {e}")))?;
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms == 0 {
        return Err(DevloopError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    for pattern in &cfg.watch.ignore {
        Glob::new(pattern).map_err(|e| {
            DevloopError::ConfigError(format!("[watch].ignore: invalid glob '{pattern}': {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConfigFile::try_from(RawConfigFile::default()).is_ok());
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.debounce_ms = 0;
        match ConfigFile::try_from(raw) {
            Err(DevloopError::ConfigError(msg)) => assert!(msg.contains("debounce_ms")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn bad_tool_template_names_the_stage() {
        let mut raw = RawConfigFile::default();
        raw.tools.test = "ned-test {tests}".to_string();
        match ConfigFile::try_from(raw) {
            Err(DevloopError::ConfigError(msg)) => assert!(msg.starts_with("[tools].test")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn invalid_ignore_glob_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.ignore.push("src/[".to_string());
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
