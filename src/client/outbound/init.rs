use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use sysinfo::System;
use tokio::process::Command;
use tracing::Level;

use crate::daemon::runtime::{ControlProcessError, ProcessController};
use crate::domain::client::outbound::{InitDaemonError, InitPort};

/// An [`InitPort`] implementation which spawns the daemon executable and
/// waits until it has daemonized itself.
#[derive(Debug)]
pub struct InitService {
    executable: Option<PathBuf>,
    pid_file: PathBuf,
    daemon_name: String,
    config: Option<PathBuf>,
    socket: Option<PathBuf>,
    verbosity: Level,
}

impl InitService {
    pub fn new(
        executable: Option<PathBuf>,
        pid_file: PathBuf,
        daemon_name: String,
        config: Option<PathBuf>,
        socket: Option<PathBuf>,
        verbosity: Level,
    ) -> Self {
        Self {
            executable,
            pid_file,
            daemon_name,
            config,
            socket,
            verbosity,
        }
    }

    fn detect_instance(&self) -> Result<(), InitDaemonError> {
        let system = System::new_all();
        match ProcessController::detect_instance(&system, &self.pid_file, &self.daemon_name) {
            Ok(()) => Ok(()),
            Err(ControlProcessError::MultipleProcesses) => Err(InitDaemonError::AlreadyRunning),
            Err(err) => Err(InitDaemonError::Unknown {
                message: "Could not detect daemon".to_owned(),
                source: Some(err.into()),
            }),
        }
    }

    fn program(&self) -> OsString {
        match &self.executable {
            Some(executable) => executable.clone().into_os_string(),
            None => OsString::from(&self.daemon_name),
        }
    }

    fn arguments(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--verbosity".into(),
            self.verbosity.to_string().into(),
            "--daemonize".into(),
        ];

        if let Some(path) = self.config.as_ref() {
            args.push("--config".into());
            args.push(path.clone().into_os_string());
        }

        if let Some(path) = self.socket.as_ref() {
            args.push("--socket".into());
            args.push(path.clone().into_os_string());
        }

        args
    }
}

#[async_trait::async_trait]
impl InitPort for InitService {
    async fn init(&self) -> Result<(), InitDaemonError> {
        self.detect_instance()?;

        let mut command = Command::new(self.program());
        command
            .args(self.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|err| InitDaemonError::Unknown {
            message: "Could not spawn daemon process".to_owned(),
            source: Some(err.into()),
        })?;

        let status = child.wait().await.map_err(|err| InitDaemonError::Unknown {
            message: "Could not get daemon status".to_owned(),
            source: Some(err.into()),
        })?;

        if !status.success() {
            Err(InitDaemonError::Unknown {
                message: format!("Daemon exited abnormally with {status}"),
                source: None,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn service(tmp: &TempDir, executable: Option<PathBuf>, config: Option<PathBuf>) -> InitService {
        InitService::new(
            executable,
            tmp.child("daemon.pid").to_path_buf(),
            "tomato-tray-daemon".to_owned(),
            config,
            Some(PathBuf::from("/run/tomato.socket")),
            Level::DEBUG,
        )
    }

    #[test]
    fn init_service_command_line() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp, None, Some(PathBuf::from("/etc/tomato.toml")));
        assert_eq!(service.program(), OsString::from("tomato-tray-daemon"));
        assert_eq!(
            service.arguments(),
            vec![
                OsString::from("--verbosity"),
                OsString::from("DEBUG"),
                OsString::from("--daemonize"),
                OsString::from("--config"),
                OsString::from("/etc/tomato.toml"),
                OsString::from("--socket"),
                OsString::from("/run/tomato.socket"),
            ],
        );
    }

    #[test]
    fn init_service_custom_executable() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp, Some(PathBuf::from("/opt/bin/daemon")), None);
        assert_eq!(service.program(), OsString::from("/opt/bin/daemon"));
        assert_eq!(service.arguments().len(), 5);
    }

    #[tokio::test]
    async fn init_service_error_spawn() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.child("no-such-daemon").to_path_buf();
        let service = service(&tmp, Some(missing), None);
        assert!(matches!(
            service.init().await,
            Err(InitDaemonError::Unknown { .. })
        ));
    }
}
