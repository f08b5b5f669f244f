// src/exec/command.rs

use std::fmt;

/// A fully resolved external command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    /// Label prefixed to every stdout line of the process.
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

impl StageCommand {
    pub fn new(label: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}
