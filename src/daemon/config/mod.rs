mod content;
mod reader;

use std::path::Path;

pub use content::{Configuration, DurationSection, RuntimeSection, TitleSection, WebSection};
pub use reader::ReadContentError;

use snafu::prelude::*;
use toml::de::Error as DeError;

use crate::utils::xdg::{Xdg, XdgBaseKind, XdgError};

/// File name of the configuration inside the XDG configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Why the configuration could not be loaded.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum LoadConfigurationError {
    #[snafu(display("Could not locate the configuration directory"))]
    XdgConfig { source: XdgError },
    #[snafu(display("Could not read the configuration file"))]
    Read { source: ReadContentError },
    #[snafu(display("Configuration file is not valid"))]
    Parse { source: DeError },
}

/// Load and parse the TOML file at `path`. With `create_new`, a missing file
/// is first written from the default template.
///
/// # Errors
///
/// This function will return an error if the file cannot be read or does not
/// describe a valid [`Configuration`].
pub fn load<P: AsRef<Path>>(
    path: P,
    create_new: bool,
) -> Result<Configuration, LoadConfigurationError> {
    let content = reader::read_content(path.as_ref(), create_new).context(ReadSnafu)?;
    toml::from_str(&content).context(ParseSnafu)
}

/// Load a file the user named explicitly. It is never created.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_path<P: AsRef<Path>>(path: P) -> Result<Configuration, LoadConfigurationError> {
    load(path, false)
}

/// Load `$XDG_CONFIG_HOME/<app_name>/config.toml`, creating it on first run.
///
/// # Errors
///
/// Fails like [`load`], or when the XDG directories are unusable.
pub fn load_with_xdg(app_name: &str) -> Result<Configuration, LoadConfigurationError> {
    let path = Xdg::new(app_name)
        .and_then(|xdg| xdg.resolve_create(XdgBaseKind::Config, CONFIG_FILE))
        .context(XdgConfigSnafu)?;
    load(path, true)
}
