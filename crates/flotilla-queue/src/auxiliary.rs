//! Optional auxiliary service pause/resume coordination.
//!
//! A memory-heavy companion service (an editor add-on, a build server)
//! can be paused for the duration of a batch so the host has headroom for
//! firmware compilation. Coordination is best-effort: it never gates item
//! transitions and a pause or resume failure never fails the batch.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Reported install/run state of the auxiliary service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryStatus {
    /// Whether the service is installed on the host at all.
    pub installed: bool,
    /// Whether the service is currently running.
    pub running: bool,
    /// Human-readable service name, when known.
    pub name: Option<String>,
}

/// Capability to pause and resume the auxiliary service.
#[async_trait::async_trait]
pub trait AuxiliaryService: Send + Sync {
    /// Current install/run state of the service.
    async fn status(&self) -> anyhow::Result<AuxiliaryStatus>;

    /// Stop the service. Reporting "already stopped" is success.
    async fn pause(&self) -> anyhow::Result<()>;

    /// Start the service again. Reporting "already running" is success.
    async fn resume(&self) -> anyhow::Result<()>;
}

/// Pause the service ahead of a batch.
///
/// Returns whether this call actually paused it, which makes resuming the
/// caller's responsibility. A service that is not confirmed running is
/// left alone.
pub(crate) async fn pause_for_batch(service: &dyn AuxiliaryService) -> bool {
    let status = match service.status().await {
        Ok(status) => status,
        Err(err) => {
            warn!(error = %err, "auxiliary service status unavailable, skipping pause");
            return false;
        }
    };

    if !(status.installed && status.running) {
        info!("auxiliary service not running, nothing to pause");
        return false;
    }

    let name = status.name.as_deref().unwrap_or("auxiliary service");
    match service.pause().await {
        Ok(()) => {
            info!(service = name, "paused auxiliary service for the batch");
            true
        }
        Err(err) => {
            warn!(service = name, error = %err, "failed to pause auxiliary service");
            false
        }
    }
}

/// Resume the service after a batch that paused it.
pub(crate) async fn resume_for_batch(service: &dyn AuxiliaryService) {
    match service.resume().await {
        Ok(()) => info!("resumed auxiliary service after the batch"),
        Err(err) => warn!(error = %err, "failed to resume auxiliary service"),
    }
}
