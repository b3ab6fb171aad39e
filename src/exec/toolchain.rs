// src/exec/toolchain.rs

//! Runtime version selection through SDKMAN.
//!
//! Jobs that pin a Java runtime get their build commands wrapped in
//! `bash -c`, which installs (if needed) and activates the requested
//! version before running the original argument vector.

use crate::exec::command::StageCommand;

const SDKMAN_INIT: &str =
    "export SDKMAN_DIR=\"$HOME/.sdkman\" && source \"$SDKMAN_DIR/bin/sdkman-init.sh\"";

/// Wrap `stage` so it runs under the given SDKMAN Java version.
///
/// Returns the stage untouched when no version is requested.
pub fn with_runtime(stage: StageCommand, runtime_version: Option<&str>) -> StageCommand {
    let Some(version) = runtime_version else {
        return stage;
    };

    let version = shell_quote(version);
    let script = format!(
        "{SDKMAN_INIT} && {{ yes | sdk install java {version} || true; }} && sdk use java {version} && {}",
        shell_join(&stage)
    );

    StageCommand::new("bash", &stage.cwd).arg("-c").arg(script)
}

fn shell_join(stage: &StageCommand) -> String {
    std::iter::once(stage.program.as_str())
        .chain(stage.args.iter().map(String::as_str))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
