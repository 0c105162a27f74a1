use std::fs::{self, File};
use std::io::{Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

pub const DEFAULT_CONTENT: &str = r#"
# This configuration file is generated automatically. Feel free to do some
# modification.

# The `duration` section specifies the length of each phase in seconds.
[duration]
pomodoro = 1500
break = 300

# The `title` section controls the status title. `refresh` is the number of
# seconds between two refreshes while a phase is running. Set `file` to mirror
# the title text into a file that a status bar can poll.
[title]
refresh = 10
# file = "/path/to/title/file"

# The `web` section enables the static file server.
# [web]
# address = "127.0.0.1:8080"
# root = "/path/to/site"

# The `runtime` section specifies the paths to some runtime files. Leave
# them empty to use default settings. Currently environment variables is not
# supported.
# [runtime]
# socket = "/path/to/unix/socket"
# pid = "/path/to/pid/file"
"#;

/// Read the whole configuration file. If it is missing and `create_new` is
/// set, [`DEFAULT_CONTENT`] is written to it first.
///
/// # Errors
///
/// This function will return an error if the file is missing and may not be
/// created, or any file system operation fails.
pub fn read_content(path: &Path, create_new: bool) -> Result<String, ReadContentError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            ensure!(create_new, NotFoundSnafu { path });
            write_template(path)
        }
        Err(err) => Err(err).context(FileSystemSnafu {
            path,
            action: "read",
        }),
    }
}

fn write_template(path: &Path) -> Result<String, ReadContentError> {
    let mut file = match File::options().write(true).create_new(true).open(path) {
        Ok(file) => file,
        // Someone else created it in between; use theirs.
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return fs::read_to_string(path).context(FileSystemSnafu {
                path,
                action: "read",
            });
        }
        Err(err) => {
            return Err(err).context(FileSystemSnafu {
                path,
                action: "create",
            })
        }
    };

    file.write_all(DEFAULT_CONTENT.as_bytes())
        .context(FileSystemSnafu {
            path,
            action: "write",
        })?;
    tracing::info!(path = %path.display(), "Created default configuration");

    Ok(DEFAULT_CONTENT.to_owned())
}

/// An error type for reading content from the configuration file.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ReadContentError {
    #[snafu(display("Configuration file {} does not exist", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("Could not {action} configuration file {}", path.display()))]
    FileSystem {
        path: PathBuf,
        action: &'static str,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
