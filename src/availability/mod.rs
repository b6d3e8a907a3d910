pub mod handlers;
pub mod monitor;

pub use monitor::{
    AvailabilityMonitor, BackendStatus, HttpProber, MonitorHandle, ProbeError, Prober,
    StatusSnapshot,
};
