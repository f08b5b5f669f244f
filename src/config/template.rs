// src/config/template.rs

//! Tool command templates such as `ned-transpile {src} {build} --colors`.

use std::path::Path;

/// Placeholders recognised inside a template word.
const PLACEHOLDERS: [&str; 4] = ["{src}", "{build}", "{main}", "{entry}"];

/// Values substituted into a [`CommandTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub src: String,
    pub build: String,
    pub main: String,
    pub entry: String,
}

impl TemplateVars {
    pub fn new(src: &Path, build: &Path, main: &Path) -> Self {
        Self {
            src: src.to_string_lossy().into_owned(),
            build: build.to_string_lossy().into_owned(),
            main: main.to_string_lossy().into_owned(),
            entry: build.join(main).to_string_lossy().into_owned(),
        }
    }
}

/// A tool command split into shell words, first word being the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    words: Vec<String>,
}

impl CommandTemplate {
    /// Split `raw` with shell quoting rules and check the placeholders.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let words = shell_words::split(raw)
            .map_err(|e| format!("cannot split command `{raw}`: {e}"))?;

        if words.is_empty() {
            return Err("command must not be empty".to_string());
        }

        for word in &words {
            if let Some(unknown) = unknown_placeholder(word) {
                return Err(format!(
                    "unknown placeholder `{unknown}` in `{raw}` (expected one of {})",
                    PLACEHOLDERS.join(", ")
                ));
            }
        }

        Ok(Self { words })
    }

    /// Substitute the placeholders and return `(program, args)`.
    pub fn expand(&self, vars: &TemplateVars) -> (String, Vec<String>) {
        let mut expanded = self.words.iter().map(|w| {
            w.replace("{src}", &vars.src)
                .replace("{build}", &vars.build)
                .replace("{main}", &vars.main)
                .replace("{entry}", &vars.entry)
        });

        // `parse` guarantees at least one word.
        let program = expanded.next().unwrap_or_default();
        (program, expanded.collect())
    }
}

/// Return the first `{...}` token in `word` that is not a known placeholder.
fn unknown_placeholder(word: &str) -> Option<&str> {
    let mut rest = word;
    while let Some(start) = rest.find('{') {
        let tail = &rest[start..];
        let end = tail.find('}')?;
        let token = &tail[..=end];
        if !PLACEHOLDERS.contains(&token) {
            return Some(token);
        }
        rest = &tail[end + 1..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars::new(Path::new("./src"), Path::new("./build"), Path::new("index.js"))
    }

    #[test]
    fn expands_all_placeholders() {
        let tpl = CommandTemplate::parse("ned-transpile {src} {build} --colors").unwrap();
        let (program, args) = tpl.expand(&vars());
        assert_eq!(program, "ned-transpile");
        assert_eq!(args, vec!["./src", "./build", "--colors"]);

        let tpl = CommandTemplate::parse("node {entry} --name={main}").unwrap();
        let (_, args) = tpl.expand(&vars());
        assert_eq!(args, vec!["./build/index.js", "--name=index.js"]);
    }

    #[test]
    fn keeps_quoted_words_together() {
        let tpl = CommandTemplate::parse(r#"sh -c "echo {src} done""#).unwrap();
        let (program, args) = tpl.expand(&vars());
        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "echo ./src done"]);
    }

    #[test]
    fn rejects_empty_and_unknown_placeholders() {
        assert!(CommandTemplate::parse("   ").is_err());
        let err = CommandTemplate::parse("tool {dest}").unwrap_err();
        assert!(err.contains("{dest}"), "unexpected message: {err}");
    }
}
