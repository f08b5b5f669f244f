use std::path::PathBuf;

use devloop::cli::DevArgs;
use devloop::config::{ConfigFile, DevSettings, RawConfigFile};
use devloop::exec::ProcessRegistry;
use devloop::pipeline::{Pipeline, StagePlan};
use devloop::types::BusyBehaviour;

use crate::fake_launcher::FakeLauncher;

/// Builder for `DevSettings` to simplify test setup.
pub struct SettingsBuilder {
    args: DevArgs,
    raw: RawConfigFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            args: DevArgs {
                src: PathBuf::from("./src"),
                build: PathBuf::from("./build"),
                main: PathBuf::from("index.js"),
                lint: false,
                test: false,
                watch: false,
            },
            raw: RawConfigFile::default(),
        }
    }

    pub fn lint(mut self, val: bool) -> Self {
        self.args.lint = val;
        self
    }

    pub fn test(mut self, val: bool) -> Self {
        self.args.test = val;
        self
    }

    pub fn watch(mut self, val: bool) -> Self {
        self.args.watch = val;
        self
    }

    pub fn busy_behaviour(mut self, behaviour: BusyBehaviour) -> Self {
        self.raw.config.busy_behaviour = behaviour;
        self
    }

    pub fn kill_grace_ms(mut self, ms: u64) -> Self {
        self.raw.config.kill_grace_ms = ms;
        self
    }

    pub fn tool(mut self, stage: &str, cmd: &str) -> Self {
        let slot = match stage {
            "lint" => &mut self.raw.tools.lint,
            "build" => &mut self.raw.tools.build,
            "app" => &mut self.raw.tools.app,
            "test" => &mut self.raw.tools.test,
            other => panic!("unknown stage '{other}'"),
        };
        *slot = cmd.to_string();
        self
    }

    pub fn build(self) -> DevSettings {
        let config =
            ConfigFile::try_from(self.raw).expect("Failed to build valid config from builder");
        DevSettings::from_args(&self.args, config)
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline over a fake launcher with the given stage flags.
pub fn fake_pipeline(lint: bool, test: bool, launcher: FakeLauncher) -> Pipeline<FakeLauncher> {
    let settings = SettingsBuilder::new().lint(lint).test(test).build();
    let plan = StagePlan::from_settings(&settings).expect("default tools resolve");
    Pipeline::new(plan, launcher, ProcessRegistry::new())
}
