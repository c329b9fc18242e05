//! Service status bookkeeping.
//!
//! - `probe`: asking the host service manager, behind the `ServiceProbe` trait
//! - `recorder`: storing probe results in the `Services` table

mod probe;
mod recorder;

pub use probe::{validate_service_name, ServiceAction, ServiceProbe, SystemProbe};
pub use recorder::{storage_key, ServiceState, ServiceStatus, ServiceStatusRecorder};
