// src/exec/command.rs

use std::fmt;
use std::path::{Path, PathBuf};

/// One external process invocation: program, arguments, working directory.
///
/// Arguments are passed as an opaque vector; nothing here goes through a
/// shell unless the program itself is a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl StageCommand {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Short label for logs, e.g. `mvn versions:set`.
    pub fn label(&self) -> String {
        match self.args.first() {
            Some(first) => format!("{} {}", self.program, first),
            None => self.program.clone(),
        }
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = StageCommand::new("git", "/tmp")
            .arg("clone")
            .args(["--depth", "1"]);
        assert_eq!(cmd.to_string(), "git clone --depth 1");
        assert_eq!(cmd.label(), "git clone");
    }
}
