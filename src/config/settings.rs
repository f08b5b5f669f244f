// src/config/settings.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::DevArgs;
use crate::config::model::ConfigFile;
use crate::config::template::TemplateVars;
use crate::types::BusyBehaviour;

/// Everything a `dev` session needs: CLI flags merged with the config file.
///
/// Built once at startup; stage enablement never changes afterwards.
#[derive(Debug, Clone)]
pub struct DevSettings {
    pub src_dir: PathBuf,
    pub build_dir: PathBuf,
    pub main: PathBuf,
    pub lint: bool,
    pub test: bool,
    pub watch: bool,
    pub config: ConfigFile,
}

impl DevSettings {
    pub fn from_args(args: &DevArgs, config: ConfigFile) -> Self {
        Self {
            src_dir: args.src.clone(),
            build_dir: args.build.clone(),
            main: args.main.clone(),
            lint: args.lint,
            test: args.test,
            watch: args.watch,
            config,
        }
    }

    pub fn template_vars(&self) -> TemplateVars {
        TemplateVars::new(&self.src_dir, &self.build_dir, &self.main)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.config.config.kill_grace_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.watch.debounce_ms)
    }

    pub fn busy_behaviour(&self) -> BusyBehaviour {
        self.config.config.busy_behaviour
    }
}
