use cicd_core::RunOptions;

use crate::command::CommandError;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status was zero
    pub success: bool,
    pub stdout_lines: Vec<String>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            stdout_lines: split_lines(stdout),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: &str) -> Self {
        Self {
            success: false,
            stdout_lines: Vec::new(),
            stderr: stderr.to_owned(),
        }
    }

    /// Turn a non-zero exit into [`CommandError::Failed`].
    ///
    /// `shown` is the command line as it may appear in messages, i.e. with
    /// secrets already redacted.
    pub fn require_success(self, shown: &str) -> Result<Self, CommandError> {
        if self.success {
            Ok(self)
        } else {
            Err(CommandError::Failed {
                command: shown.to_owned(),
                stderr: self.stderr.trim().to_owned(),
            })
        }
    }
}

/// Abstraction over external process execution for testability.
///
/// Production code uses [`RealRunner`], tests use mockall-generated mocks.
/// Implementations report a non-zero exit as `Ok` with `success == false`;
/// `Err` is reserved for commands that could not be started.
#[allow(async_fn_in_trait)]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and capture both streams.
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

/// Real process runner.
pub struct RealRunner;

impl CommandRunner for RealRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        use std::process::Stdio;

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CommandError::NotFound {
                    program: program.to_owned(),
                    source: e,
                },
                _ => CommandError::Spawn {
                    program: program.to_owned(),
                    source: e,
                },
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout_lines: split_lines(&String::from_utf8_lossy(&output.stdout)),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Join a command line for logging.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Run a side-effecting command unless `options.dry_run` is set.
///
/// The command line is always logged with the run mode prefix. Returns
/// `None` when the command was skipped.
pub(crate) async fn run_unless_dry<R: CommandRunner>(
    runner: &R,
    options: RunOptions,
    program: &str,
    args: &[String],
    shown: &str,
) -> Result<Option<CommandOutput>, CommandError> {
    tracing::info!("{} {shown}", options.command_mode());
    if options.dry_run {
        return Ok(None);
    }
    runner.run(program, args).await.map(Some)
}

/// Log captured stream text line by line.
pub(crate) fn log_lines<S: AsRef<str>>(lines: &[S]) {
    for line in lines {
        tracing::info!("{}", line.as_ref());
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(str::to_owned).collect()
}

pub(crate) fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
