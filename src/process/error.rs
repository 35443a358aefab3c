// ABOUTME: Process execution errors with SNAFU context selectors.
// ABOUTME: Distinguishes commands that could not start from commands that exited non-zero.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProcessError {
    #[snafu(display("failed to start `{program}`: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` {}", describe_exit(*code)))]
    Exit { command: String, code: Option<i32> },
}

impl ProcessError {
    /// Exit code of a command that ran and failed. `None` for spawn failures
    /// and for processes killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Exit { code, .. } => *code,
            ProcessError::Spawn { .. } => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}
