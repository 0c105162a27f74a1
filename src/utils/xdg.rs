use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;
use xdg::{BaseDirectories, BaseDirectoriesError};

/// Application-scoped view of the XDG base directories.
#[derive(Debug, Clone)]
pub struct Xdg {
    base: BaseDirectories,
}

impl Xdg {
    /// Scope every lookup to the `prefix` subdirectory.
    ///
    /// # Errors
    ///
    /// This function will return an error if the XDG environment is unusable,
    /// such as when `HOME` is unset.
    pub fn new<P: AsRef<Path>>(prefix: P) -> Result<Self, XdgError> {
        BaseDirectories::with_prefix(prefix)
            .map(|base| Self { base })
            .context(InitSnafu)
    }

    /// Path of `file` under the `kind` directory. Nothing is created.
    ///
    /// # Errors
    ///
    /// Fails for [`XdgBaseKind::Runtime`] when `XDG_RUNTIME_DIR` is unset or
    /// unsafe.
    pub fn resolve<P: AsRef<Path>>(&self, kind: XdgBaseKind, file: P) -> Result<PathBuf, XdgError> {
        let path = match kind {
            XdgBaseKind::Config => Ok(self.base.get_config_file(file)),
            XdgBaseKind::Runtime => self.base.get_runtime_file(file),
        };
        path.context(FileSystemSnafu { kind })
    }

    /// Like [`Xdg::resolve`], but creates the missing parent directories.
    ///
    /// # Errors
    ///
    /// This function will return an error if the directories cannot be made.
    pub fn resolve_create<P: AsRef<Path>>(
        &self,
        kind: XdgBaseKind,
        file: P,
    ) -> Result<PathBuf, XdgError> {
        let path = match kind {
            XdgBaseKind::Config => self.base.place_config_file(file),
            XdgBaseKind::Runtime => self.base.place_runtime_file(file),
        };
        path.context(FileSystemSnafu { kind })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdgBaseKind {
    Config,
    Runtime,
}

impl XdgBaseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "configuration",
            Self::Runtime => "runtime",
        }
    }
}

impl Display for XdgBaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Snafu, Clone)]
pub enum XdgError {
    #[snafu(display("Could not read XDG environment"))]
    Init {
        #[snafu(source(from(BaseDirectoriesError, Arc::new)))]
        source: Arc<BaseDirectoriesError>,
    },
    #[snafu(display("XDG {kind} directory is not usable"))]
    FileSystem {
        kind: XdgBaseKind,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
