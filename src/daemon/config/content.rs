use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    pub duration: DurationSection,
    #[serde(default)]
    pub title: TitleSection,
    pub web: Option<WebSection>,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Phase lengths in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct DurationSection {
    pub pomodoro: u64,
    #[serde(rename = "break")]
    pub break_: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleSection {
    #[serde(default = "TitleSection::default_refresh")]
    pub refresh: u64,
    pub file: Option<PathBuf>,
}

impl TitleSection {
    fn default_refresh() -> u64 {
        10
    }
}

impl Default for TitleSection {
    fn default() -> Self {
        Self {
            refresh: Self::default_refresh(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    pub address: SocketAddr,
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSection {
    pub socket: Option<PathBuf>,
    pub pid: Option<PathBuf>,
}
