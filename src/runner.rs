use anyhow::{Context, Result};
use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

/// How an oracle run ended. Only equality matters to the reducer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    Exited(i32),
    Signaled(i32),
}

impl From<ExitStatus> for Status {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Status::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Status::Signaled(signal);
            }
        }
        Status::Exited(-1)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Exited(code) => write!(f, "exit code {}", code),
            Status::Signaled(signal) => write!(f, "signal {}", signal),
        }
    }
}

/// External failure checker consulted for every candidate file.
///
/// An `Err` means the checker could not be run at all, which is distinct
/// from the checker rejecting the candidate.
pub trait Oracle {
    fn check(&mut self, candidate: &Path) -> Result<Status>;
}

impl<F> Oracle for F
where
    F: FnMut(&Path) -> Result<Status>,
{
    fn check(&mut self, candidate: &Path) -> Result<Status> {
        self(candidate)
    }
}

/// Runs `<program> <candidate>` and waits for it to finish. Standard
/// streams of the checker are discarded.
pub struct CommandOracle {
    program: PathBuf,
}

impl CommandOracle {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Oracle for CommandOracle {
    fn check(&mut self, candidate: &Path) -> Result<Status> {
        let status = Command::new(&self.program)
            .arg(candidate)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("can not run '{}'", self.program.display()))?;
        Ok(status.into())
    }
}
