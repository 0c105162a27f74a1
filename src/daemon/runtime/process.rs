use std::fs;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use daemonize::{Daemonize, Error as DaemonizeError};
use snafu::prelude::*;
use sysinfo::{Pid, System};

/// Keeps the daemon single-instance and optionally detaches it from the
/// terminal. Both modes leave a PID file behind.
#[derive(Debug)]
pub struct ProcessController {
    process_name: String,
    pid_file: PathBuf,
    daemonize: bool,
}

impl ProcessController {
    pub fn new(process_name: String, pid_file: PathBuf, daemonize: bool) -> Self {
        Self {
            process_name,
            pid_file,
            daemonize,
        }
    }

    /// Refuse to start next to a live instance, then daemonize or just
    /// record the current PID.
    ///
    /// # Errors
    ///
    /// This function will return an error if another instance is running or
    /// the process could not be prepared.
    pub fn start(self) -> Result<(), ControlProcessError> {
        Self::detect_instance(&System::new_all(), &self.pid_file, &self.process_name)?;

        if !self.daemonize {
            let pid = sysinfo::get_current_pid().map_err(|message| ControlProcessError::GetPid {
                message: message.to_owned(),
            })?;
            return Self::write_pid(&self.pid_file, pid);
        }

        Daemonize::new()
            .pid_file(&self.pid_file)
            .start()
            .context(DaemonizeSnafu)
    }

    /// Remove the PID file written by [`ProcessController::start`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists but could not be
    /// removed.
    pub fn release<P: AsRef<Path>>(pid_file: P) -> Result<(), ControlProcessError> {
        match fs::remove_file(pid_file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(FileSystemSnafu {
                message: "Could not remove PID file",
            }),
        }
    }

    /// Check whether the PID file points to a live process named
    /// `process_name`.
    ///
    /// # Errors
    ///
    /// This function will return [`ControlProcessError::MultipleProcesses`] if
    /// such a process exists, or other errors if the PID file is unreadable.
    pub fn detect_instance<P: AsRef<Path>>(
        system: &System,
        pid_file: P,
        process_name: &str,
    ) -> Result<(), ControlProcessError> {
        let Some(pid) = Self::read_pid(pid_file.as_ref())? else {
            return Ok(());
        };

        let alive = system
            .process(pid)
            .is_some_and(|proc| same_process_name(&proc.name().to_string_lossy(), process_name));
        ensure!(!alive, MultipleProcessesSnafu);
        Ok(())
    }

    fn read_pid(pid_file: &Path) -> Result<Option<Pid>, ControlProcessError> {
        let content = match fs::read_to_string(pid_file) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(FileSystemSnafu {
                    message: "Could not read PID file",
                })
            }
        };

        let pid = content.trim().parse::<Pid>().ok().context(InvalidPidFileSnafu)?;
        Ok(Some(pid))
    }

    fn write_pid(pid_file: &Path, pid: Pid) -> Result<(), ControlProcessError> {
        fs::write(pid_file, format!("{pid}\n")).context(FileSystemSnafu {
            message: "Could not write PID",
        })
    }
}

/// Kernel process names are cut at 15 bytes, so a name of that length only
/// has to be a prefix of the expected one.
fn same_process_name(actual: &str, expected: &str) -> bool {
    const TASK_COMM_LEN: usize = 15;
    actual == expected
        || actual.contains(expected)
        || (actual.len() >= TASK_COMM_LEN && expected.starts_with(actual))
}

#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ControlProcessError {
    #[snafu(display("File system error: {message}"))]
    FileSystem {
        message: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not start multiple daemon processes"))]
    MultipleProcesses,
    #[snafu(display("Could not ensure process uniqueness with invalid PID file"))]
    InvalidPidFile,
    #[snafu(display("Failed to get PID: {message}"))]
    GetPid { message: String },
    #[snafu(display("Could not daemonize the process"))]
    Daemonize { source: DaemonizeError },
}
