//! Persisting service probe results in the `Services` table.

use std::str::FromStr;

use log::info;
use serde::Serialize;
use sqlx::{Connection, Row};
use strum_macros::{Display, EnumString};

use crate::config::{MAX_SERVICE_NAME_LENGTH, SERVICES_TABLE};
use crate::error_handling::{DatabaseError, ServiceError};
use crate::services::probe::{validate_service_name, ServiceAction, ServiceProbe};
use crate::storage::RetryGuard;

/// Stored running state of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
pub enum ServiceState {
    Running,
    #[strum(serialize = "Not Running")]
    #[serde(rename = "Not Running")]
    NotRunning,
}

impl ServiceState {
    /// A service that is not running needs a restart.
    pub fn needs_restart(self) -> bool {
        self == ServiceState::NotRunning
    }
}

/// One row of the `Services` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub status: ServiceState,
    pub needs_restart: bool,
}

/// Normalizes a service name to its stored key: upper-case, at most
/// `MAX_SERVICE_NAME_LENGTH` characters.
pub fn storage_key(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .take(MAX_SERVICE_NAME_LENGTH)
        .collect()
}

/// Records service status rows; probing is delegated to `P`.
#[derive(Debug, Clone)]
pub struct ServiceStatusRecorder<P> {
    guard: RetryGuard,
    probe: P,
}

impl<P: ServiceProbe> ServiceStatusRecorder<P> {
    pub fn new(guard: RetryGuard, probe: P) -> Self {
        Self { guard, probe }
    }

    /// Replaces the row for `name` with the given status.
    ///
    /// The delete and the insert commit together, so a name never has two
    /// rows and never disappears half-way.
    pub async fn record(
        &self,
        name: &str,
        status: ServiceState,
        needs_restart: bool,
    ) -> Result<(), DatabaseError> {
        let key = storage_key(name);
        let status_text = status.to_string();
        let restart_flag = if needs_restart { "Y" } else { "N" };

        self.guard
            .run("record service status", |conn| {
                let delete_sql = format!("DELETE FROM \"{SERVICES_TABLE}\" WHERE Name = ?");
                let insert_sql = format!(
                    "INSERT INTO \"{SERVICES_TABLE}\" (Name, Status, Restart) VALUES (?, ?, ?)"
                );
                let (key, status_text) = (key.clone(), status_text.clone());
                Box::pin(async move {
                    let mut tx = conn.begin().await?;
                    sqlx::query(&delete_sql)
                        .bind(&key)
                        .execute(&mut *tx)
                        .await?;
                    sqlx::query(&insert_sql)
                        .bind(&key)
                        .bind(&status_text)
                        .bind(restart_flag)
                        .execute(&mut *tx)
                        .await?;
                    tx.commit().await?;
                    Ok(())
                })
            })
            .await?;

        info!("Service {key}: {status_text}");
        Ok(())
    }

    /// Probes `name` and records the result.
    pub async fn check(&self, name: &str) -> Result<ServiceState, ServiceError> {
        validate_service_name(name)?;
        let state = if self.probe.is_running(name).await? {
            ServiceState::Running
        } else {
            ServiceState::NotRunning
        };
        self.record(name, state, state.needs_restart()).await?;
        Ok(state)
    }

    /// All recorded services, ordered by name.
    pub async fn list(&self) -> Result<Vec<ServiceStatus>, DatabaseError> {
        self.guard
            .run("list services", |conn| {
                let sql = format!(
                    "SELECT Name, Status, Restart FROM \"{SERVICES_TABLE}\" ORDER BY Name"
                );
                Box::pin(async move {
                    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
                    let mut services = Vec::with_capacity(rows.len());
                    for row in &rows {
                        let status: String = row.try_get("Status")?;
                        let status = ServiceState::from_str(&status)
                            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                        let restart: String = row.try_get("Restart")?;
                        services.push(ServiceStatus {
                            name: row.try_get("Name")?,
                            status,
                            needs_restart: restart == "Y",
                        });
                    }
                    Ok(services)
                })
            })
            .await
    }

    /// Runs `action` on `name`. Nothing is written to the database.
    pub async fn control(&self, name: &str, action: ServiceAction) -> Result<bool, ServiceError> {
        validate_service_name(name)?;
        self.probe.control(name, action).await
    }
}
