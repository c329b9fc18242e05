//! OS service probing and control through the host's service manager.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;

use clap::ValueEnum;
use log::{debug, info};
use regex::Regex;
use strum_macros::{Display, EnumString};
use tokio::process::Command;

use crate::error_handling::ServiceError;

static SERVICE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("service name pattern is valid"));

/// Actions accepted by [`ServiceProbe::control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Status,
}

/// Rejects service names that could smuggle arguments into the command line.
///
/// Names are word characters and dashes, and may not start with a dash.
pub fn validate_service_name(name: &str) -> Result<(), ServiceError> {
    if SERVICE_NAME.is_match(name) && !name.starts_with('-') {
        Ok(())
    } else {
        Err(ServiceError::InvalidServiceName(name.to_string()))
    }
}

/// Asks the host whether a service runs and drives start/stop/restart.
///
/// Implementations are expected to validate `name` themselves.
pub trait ServiceProbe: Send + Sync {
    /// Returns whether `name` is currently running.
    fn is_running(&self, name: &str) -> impl Future<Output = Result<bool, ServiceError>> + Send;

    /// Runs `action` on `name` and returns whether the command succeeded.
    fn control(
        &self,
        name: &str,
        action: ServiceAction,
    ) -> impl Future<Output = Result<bool, ServiceError>> + Send;
}

/// Shells out to `systemctl`, or to `service` where systemd is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl SystemProbe {
    fn has_systemctl() -> bool {
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| is_file(&dir.join("systemctl")))
            })
            .unwrap_or(false)
    }

    fn command_for(name: &str, action: ServiceAction) -> Command {
        let mut cmd;
        if Self::has_systemctl() {
            cmd = Command::new("systemctl");
            match action {
                ServiceAction::Status => cmd.args(["is-active", "--quiet", name]),
                other => cmd.args([other.to_string().as_str(), name]),
            };
        } else {
            cmd = Command::new("service");
            cmd.args([name, action.to_string().as_str()]);
        }
        cmd
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

impl ServiceProbe for SystemProbe {
    async fn is_running(&self, name: &str) -> Result<bool, ServiceError> {
        validate_service_name(name)?;
        let status = Self::command_for(name, ServiceAction::Status)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        debug!("Service {name} probe exited with {status}");
        Ok(status.success())
    }

    async fn control(&self, name: &str, action: ServiceAction) -> Result<bool, ServiceError> {
        validate_service_name(name)?;
        let mut cmd = Self::command_for(name, action);
        info!("Executing: {:?}", cmd.as_std());
        let status = cmd.status().await?;
        Ok(status.success())
    }
}
