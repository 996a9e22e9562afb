//! Queue tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QueueError, QueueResult};

/// Configuration for the update queue.
///
/// The defaults suit OTA updates of small embedded devices, where a flash
/// plus reboot normally completes within a minute or two but a compile on
/// the host side can stretch the whole cycle to several minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Hard per-item deadline. An update with no terminal signal by this
    /// point resolves as failed.
    pub update_timeout: Duration,
    /// How long a device may stay unreachable mid-update before it is
    /// declared lost. A normal OTA reboot drops the device for ~30s, so
    /// this carries a generous margin.
    pub offline_grace: Duration,
    /// Pause after the trigger accepts, before the first poll.
    pub settle_delay: Duration,
    /// Poll cadence while the device reports flashing progress.
    pub poll_interval: Duration,
    /// Slower poll cadence while the device is offline or has not started.
    pub idle_poll_interval: Duration,
    /// Pause between two consecutive items.
    pub inter_item_delay: Duration,
    /// Pause after the auxiliary service stops, letting the host reclaim
    /// its memory before the first update begins.
    pub auxiliary_settle: Duration,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            update_timeout: Duration::from_secs(600),
            offline_grace: Duration::from_secs(120),
            settle_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
            idle_poll_interval: Duration::from_secs(10),
            inter_item_delay: Duration::from_secs(1),
            auxiliary_settle: Duration::from_secs(5),
            event_capacity: 64,
        }
    }
}

impl QueueConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfiguration`] if any value is out of
    /// range.
    pub fn validate(&self) -> QueueResult<()> {
        if self.update_timeout.is_zero() {
            return Err(QueueError::invalid_configuration(
                "update_timeout must be greater than 0",
            ));
        }
        if self.offline_grace.is_zero() {
            return Err(QueueError::invalid_configuration(
                "offline_grace must be greater than 0",
            ));
        }
        if self.offline_grace >= self.update_timeout {
            return Err(QueueError::invalid_configuration(
                "offline_grace must be shorter than update_timeout",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(QueueError::invalid_configuration(
                "poll_interval must be greater than 0",
            ));
        }
        if self.idle_poll_interval.is_zero() {
            return Err(QueueError::invalid_configuration(
                "idle_poll_interval must be greater than 0",
            ));
        }
        if self.event_capacity == 0 {
            return Err(QueueError::invalid_configuration(
                "event_capacity must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> QueueConfigBuilder {
        QueueConfigBuilder::default()
    }
}

/// Builder for [`QueueConfig`].
#[derive(Debug, Default)]
pub struct QueueConfigBuilder {
    config: QueueConfig,
}

impl QueueConfigBuilder {
    /// Set the hard per-item deadline.
    #[must_use]
    pub fn update_timeout(mut self, timeout: Duration) -> Self {
        self.config.update_timeout = timeout;
        self
    }

    /// Set the mid-update offline grace window.
    #[must_use]
    pub fn offline_grace(mut self, grace: Duration) -> Self {
        self.config.offline_grace = grace;
        self
    }

    /// Set the post-trigger settle delay.
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Set the fast poll cadence.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the slow poll cadence.
    #[must_use]
    pub fn idle_poll_interval(mut self, interval: Duration) -> Self {
        self.config.idle_poll_interval = interval;
        self
    }

    /// Set the pause between consecutive items.
    #[must_use]
    pub fn inter_item_delay(mut self, delay: Duration) -> Self {
        self.config.inter_item_delay = delay;
        self
    }

    /// Set the pause after stopping the auxiliary service.
    #[must_use]
    pub fn auxiliary_settle(mut self, delay: Duration) -> Self {
        self.config.auxiliary_settle = delay;
        self
    }

    /// Set the broadcast event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> QueueResult<QueueConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
