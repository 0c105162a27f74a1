use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Directory(PathBuf),
    Permission(PathBuf, u32),
    StaleFile(PathBuf),
}

impl Step {
    fn apply(&self) -> Result<(), SetupEnvironmentError> {
        match self {
            Self::Directory(dir) => fs::create_dir_all(dir).context(CreateDirectorySnafu { dir }),
            Self::Permission(path, mode) => set_mode(path, *mode),
            Self::StaleFile(path) => match fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Removed stale file");
                    Ok(())
                }
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err).context(RemoveStaleFileSnafu { path }),
            },
        }
    }
}

fn set_mode(path: &Path, mode: u32) -> Result<(), SetupEnvironmentError> {
    let context = SetPermissionSnafu { path, permission: mode };
    let mut permissions = fs::metadata(path).context(context)?.permissions();
    if permissions.mode() & 0o7777 == mode {
        return Ok(());
    }

    permissions.set_mode(mode);
    fs::set_permissions(path, permissions).context(context)
}

/// Runtime directory preparation. Registered steps run in order on
/// [`Environment::setup`].
#[derive(Debug, Default)]
pub struct Environment {
    steps: Vec<Step>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `directory` and its parents when missing.
    pub fn register_directory<P: AsRef<Path>>(&mut self, directory: P) {
        self.steps.push(Step::Directory(directory.as_ref().into()));
    }

    /// Force the permission bits of `path` to `permission`.
    pub fn register_permission<P: AsRef<Path>>(&mut self, path: P, permission: u32) {
        self.steps
            .push(Step::Permission(path.as_ref().into(), permission));
    }

    /// Remove a file a previous run left behind, such as a socket.
    pub fn register_stale_file<P: AsRef<Path>>(&mut self, path: P) {
        self.steps.push(Step::StaleFile(path.as_ref().into()));
    }

    /// Apply every registered step, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// This function will return an error if any system error occurs.
    pub fn setup(self) -> Result<(), SetupEnvironmentError> {
        self.steps.iter().try_for_each(Step::apply)
    }
}

/// An error for setting up the running environment.
#[derive(Debug, Snafu, Clone)]
pub enum SetupEnvironmentError {
    #[snafu(display("Could not create directory {}", dir.display()))]
    CreateDirectory {
        dir: PathBuf,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not set {}'s permission to {permission}", path.display()))]
    SetPermission {
        path: PathBuf,
        permission: u32,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not remove stale file {}", path.display()))]
    RemoveStaleFile {
        path: PathBuf,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
