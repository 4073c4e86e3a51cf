//! External command execution.
//!
//! Steps describe the command they need as a [`CommandSpec`] and hand it to a
//! [`CommandRunner`]. [`SystemRunner`] spawns real processes; tests substitute
//! a runner that records invocations instead.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory of the child process
    pub cwd: PathBuf,
    /// File fed to the child's standard input
    pub stdin: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Short program name used in messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Shell-like rendering, e.g. `patch -p1 < ../patches/fix.patch`.
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(stdin) = &self.stdin {
            line.push_str(" < ");
            line.push_str(&stdin.display().to_string());
        }
        line
    }

    fn to_command(&self) -> Result<Command, CommandError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        if let Some(path) = &self.stdin {
            let file = File::open(path).map_err(|source| CommandError::Stdin {
                path: path.clone(),
                source,
            })?;
            cmd.stdin(Stdio::from(file));
        }
        Ok(cmd)
    }
}

/// Output of a command whose streams were captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Both streams joined, stdout first.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }
}

/// Error type for external command execution
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The stdin file could not be opened
    Stdin {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The program ran and exited unsuccessfully
    Failed { command: String, code: Option<i32> },
}

impl CommandError {
    pub fn failed(spec: &CommandSpec, code: Option<i32>) -> Self {
        CommandError::Failed {
            command: spec.display(),
            code,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn { program, source } => {
                write!(f, "Failed to start '{}': {}", program, source)
            }
            CommandError::Stdin { path, source } => {
                write!(f, "Failed to open {}: {}", path.display(), source)
            }
            CommandError::Failed {
                command,
                code: Some(code),
            } => write!(f, "'{}' exited with status {}", command, code),
            CommandError::Failed {
                command,
                code: None,
            } => write!(f, "'{}' was terminated by a signal", command),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source, .. } | CommandError::Stdin { source, .. } => Some(source),
            CommandError::Failed { .. } => None,
        }
    }
}

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Runs with inherited standard output and error. Fails on non-zero exit.
    fn run(&self, spec: &CommandSpec) -> Result<(), CommandError>;

    /// Runs with captured output. Only spawn problems are errors; the exit
    /// status is reported in the returned [`CommandOutput`].
    fn run_captured(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runs commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
        let status = spec
            .to_command()?
            .status()
            .map_err(|source| CommandError::Spawn {
                program: spec.program_name(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::failed(spec, status.code()))
        }
    }

    fn run_captured(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let output = spec
            .to_command()?
            .output()
            .map_err(|source| CommandError::Spawn {
                program: spec.program_name(),
                source,
            })?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Relative rendering of `path` against `base`, for readable command lines.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }
    // One level up covers the patches directory seen from inside the tree.
    if let Some(parent) = base.parent()
        && let Ok(stripped) = path.strip_prefix(parent)
    {
        return Path::new("..").join(stripped);
    }
    path.to_path_buf()
}
