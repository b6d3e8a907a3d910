use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use utoipa::ToSchema;

use crate::telemetry::AVAILABILITY_PROBES;

/// Liveness of the discovery backend as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    /// No probe has completed yet
    Checking,
    Online,
    Offline,
}

impl BackendStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendStatus::Checking => "checking",
            BackendStatus::Online => "online",
            BackendStatus::Offline => "offline",
        }
    }
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),
}

/// One liveness check against the backend
#[async_trait]
pub trait Prober: Send + Sync {
    /// `Ok` as soon as the backend answered at all, whatever the status code
    async fn probe(&self) -> Result<(), ProbeError>;
}

/// `GET <base>/`
pub struct HttpProber {
    client: Client,
    url: String,
}

impl HttpProber {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> Result<(), ProbeError> {
        let response = self.client.get(&self.url).send().await?;
        tracing::trace!(status = %response.status(), "Backend answered probe");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub status: BackendStatus,
    /// Completion time of the last probe; absent while checking
    pub last_checked: Option<DateTime<Utc>>,
    pub backend_url: String,
}

/// Periodically probes the backend and publishes a tri-state status.
///
/// The status lives only in this instance. Subscribers are woken on status
/// transitions, not on every probe.
pub struct AvailabilityMonitor {
    prober: Arc<dyn Prober>,
    probe_timeout: Duration,
    state: watch::Sender<StatusSnapshot>,
}

impl AvailabilityMonitor {
    pub fn new(prober: Arc<dyn Prober>, backend_url: &str, probe_timeout: Duration) -> Self {
        let (state, _) = watch::channel(StatusSnapshot {
            status: BackendStatus::Checking,
            last_checked: None,
            backend_url: backend_url.to_string(),
        });
        Self {
            prober,
            probe_timeout,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.state.subscribe()
    }

    pub fn status(&self) -> BackendStatus {
        self.state.borrow().status
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.state.borrow().clone()
    }

    /// Run one probe and record its result. Failures only ever become `Offline`.
    pub async fn probe_once(&self) -> BackendStatus {
        let outcome = match tokio::time::timeout(self.probe_timeout, self.prober.probe()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.probe_timeout)),
        };

        let status = match outcome {
            Ok(()) => BackendStatus::Online,
            Err(e) => {
                tracing::debug!(error = %e, "Availability probe failed");
                BackendStatus::Offline
            }
        };
        metrics::counter!(AVAILABILITY_PROBES, "result" => status.as_str()).increment(1);

        self.record(status);
        status
    }

    /// Out-of-cycle probe requested by the user. Leaves the schedule alone.
    pub async fn recheck(&self) -> StatusSnapshot {
        self.probe_once().await;
        self.snapshot()
    }

    fn record(&self, status: BackendStatus) {
        let now = Utc::now();
        self.state.send_if_modified(|snapshot| {
            let previous = snapshot.status;
            snapshot.last_checked = Some(now);
            snapshot.status = status;
            if previous != status {
                tracing::info!(
                    from = previous.as_str(),
                    to = status.as_str(),
                    backend = %snapshot.backend_url,
                    "Backend status changed"
                );
                true
            } else {
                false
            }
        });
    }

    /// Probe now and then every `period` until the returned handle is dropped.
    ///
    /// Ticks do not wait for each other; a slow probe may finish after a newer one.
    pub fn spawn(self: &Arc<Self>, period: Duration) -> MonitorHandle {
        let monitor = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Dropped with this task, which aborts any probe still running
            let mut in_flight = JoinSet::new();

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let monitor = Arc::clone(&monitor);
                        in_flight.spawn(async move {
                            monitor.probe_once().await;
                        });
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
        });

        tracing::debug!(period_secs = period.as_secs_f64(), "Availability monitor started");
        MonitorHandle { task: Some(task) }
    }
}

/// Owns the monitor's periodic timer. Dropping it stops probing.
pub struct MonitorHandle {
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop probing and wait until the timer task is gone
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            tracing::debug!("Availability monitor stopped");
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
