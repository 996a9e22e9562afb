//! The update queue manager and its sequential processing loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::auxiliary::{self, AuxiliaryService};
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::item::{ItemStatus, QueueItem};
use crate::monitor::{self, WaitVerdict};
use crate::snapshot::{QueueEvent, QueueSnapshot, StatusSummary};
use crate::trigger::UpdateTrigger;

/// Sequential firmware update queue for a fleet of devices.
///
/// The queue owns its batch state exclusively: the processing loop is the
/// only mutator of item contents, and external callers only ever receive
/// cloned snapshots. Cloning the queue handle is cheap; every clone
/// addresses the same underlying batch.
///
/// A failure on one device never blocks the others, and a hung device is
/// bounded by the per-item deadline, so the batch always terminates.
#[derive(Clone)]
pub struct UpdateQueue {
    inner: Arc<Inner>,
}

struct Inner {
    config: QueueConfig,
    trigger: Arc<dyn UpdateTrigger>,
    auxiliary: Option<Arc<dyn AuxiliaryService>>,
    items: RwLock<Vec<QueueItem>>,
    running: AtomicBool,
    cancel_requested: AtomicBool,
    events: broadcast::Sender<QueueEvent>,
}

impl UpdateQueue {
    /// Create a queue over the given device update capability.
    ///
    /// `auxiliary` is the optional companion service paused around
    /// batches started with `pause_auxiliary`; without it the flag is
    /// ignored.
    #[must_use]
    pub fn new(
        trigger: Arc<dyn UpdateTrigger>,
        auxiliary: Option<Arc<dyn AuxiliaryService>>,
        config: QueueConfig,
    ) -> Self {
        // The broadcast channel rejects a zero capacity.
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                trigger,
                auxiliary,
                items: RwLock::new(Vec::new()),
                running: AtomicBool::new(false),
                cancel_requested: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Whether a batch is currently being processed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Start a new batch over `target_ids`, processed strictly in the
    /// given order.
    ///
    /// Display names are resolved once, best-effort, before processing
    /// begins; duplicates are enqueued and processed independently. With
    /// `pause_auxiliary` set, the configured auxiliary service is paused
    /// before any device work and resumed after the batch ends, whatever
    /// the outcome. Returns as soon as the background task is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AlreadyRunning`] if a batch is active; the
    /// active batch is left untouched.
    pub async fn start(&self, target_ids: Vec<String>, pause_auxiliary: bool) -> QueueResult<()> {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(QueueError::AlreadyRunning);
        }

        // The gate is ours from here on; nothing else mutates the batch.
        self.inner.cancel_requested.store(false, Ordering::Release);
        self.inner.items.write().clear();

        let mut items = Vec::with_capacity(target_ids.len());
        for target_id in target_ids {
            let display_name = self
                .inner
                .trigger
                .display_name(&target_id)
                .await
                .unwrap_or_else(|| target_id.clone());
            items.push(QueueItem::new(target_id, display_name));
        }

        info!(
            devices = items.len(),
            pause_auxiliary, "starting update batch"
        );
        *self.inner.items.write() = items;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(run_batch(inner, pause_auxiliary));
        Ok(())
    }

    /// Current snapshot of the batch. Never blocks on the processing
    /// loop.
    #[must_use]
    pub fn status(&self) -> QueueSnapshot {
        snapshot_of(&self.inner)
    }

    /// Request cancellation of the running batch. Idempotent; no effect
    /// when nothing is running.
    ///
    /// The in-flight item is allowed to reach its own terminal outcome;
    /// cancellation only prevents further items from starting. Items
    /// still queued when the loop observes the request end up
    /// [`ItemStatus::Cancelled`].
    pub fn cancel(&self) {
        if self.inner.running.load(Ordering::Acquire) {
            self.inner.cancel_requested.store(true, Ordering::Release);
            info!("cancellation requested for the running update batch");
        }
    }

    /// Clear the results of the last batch.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::StillRunning`] while a batch is active.
    pub fn clear(&self) -> QueueResult<()> {
        if self.inner.running.load(Ordering::Acquire) {
            return Err(QueueError::StillRunning);
        }
        self.inner.items.write().clear();
        Ok(())
    }

    /// Subscribe to progress and completion events.
    ///
    /// Events are best-effort: a slow subscriber may observe lagged
    /// receives, and `status()` remains the source of truth.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }
}

/// Drive one batch to completion. Runs as its own task; the `running`
/// gate guarantees at most one instance per queue.
async fn run_batch(inner: Arc<Inner>, pause_auxiliary: bool) {
    let paused = match inner.auxiliary.as_deref() {
        Some(service) if pause_auxiliary => auxiliary::pause_for_batch(service).await,
        _ => false,
    };
    if paused {
        // Give the host a moment to reclaim the service's memory.
        tokio::time::sleep(inner.config.auxiliary_settle).await;
    }

    let total = inner.items.read().len();
    for index in 0..total {
        if inner.cancel_requested.load(Ordering::Acquire) {
            break;
        }

        process_item(&inner, index).await;
        publish(&inner, QueueEvent::Progress(snapshot_of(&inner)));

        if index + 1 < total && !inner.cancel_requested.load(Ordering::Acquire) {
            tokio::time::sleep(inner.config.inter_item_delay).await;
        }
    }

    // Anything still queued sat behind a cancellation point.
    drain_cancelled(&inner);

    // Resume is unconditional for a batch that paused the service:
    // normal completion, cancellation and failures all land here.
    if paused {
        if let Some(service) = inner.auxiliary.as_deref() {
            auxiliary::resume_for_batch(service).await;
        }
    }

    inner.running.store(false, Ordering::Release);
    let snapshot = snapshot_of(&inner);
    info!(
        success = snapshot.summary.success,
        failed = snapshot.summary.failed,
        skipped = snapshot.summary.skipped,
        cancelled = snapshot.summary.cancelled,
        "update batch finished"
    );
    publish(&inner, QueueEvent::Finished(snapshot));
}

/// Take one item from `Queued` to a terminal status.
async fn process_item(inner: &Inner, index: usize) {
    let Some(target_id) = inner
        .items
        .read()
        .get(index)
        .map(|item| item.target_id.clone())
    else {
        return;
    };

    with_item(inner, index, QueueItem::begin);
    info!(device = %target_id, position = index, "updating device");

    // A device already known unreachable is skipped, not failed.
    if !inner.trigger.device_state(&target_id).await.is_reachable() {
        warn!(device = %target_id, "device unreachable at dispatch, skipping");
        with_item(inner, index, |item| {
            item.resolve(ItemStatus::Skipped, None);
        });
        return;
    }

    if let Err(err) = inner.trigger.trigger_update(&target_id).await {
        error!(device = %target_id, error = %err, "update rejected");
        with_item(inner, index, |item| {
            item.resolve(ItemStatus::Failed, Some(format!("{err:#}")));
        });
        return;
    }

    // Fast updates can already be settled by the time the trigger
    // returns.
    if inner.trigger.device_state(&target_id).await.is_up_to_date() {
        info!(device = %target_id, "device updated");
        with_item(inner, index, |item| {
            item.resolve(ItemStatus::Success, None);
        });
        return;
    }

    match monitor::await_outcome(inner.trigger.as_ref(), &target_id, &inner.config).await {
        WaitVerdict::Success => {
            info!(device = %target_id, "device updated");
            with_item(inner, index, |item| {
                item.resolve(ItemStatus::Success, None);
            });
        }
        WaitVerdict::Failed(failure) => {
            error!(device = %target_id, %failure, "device update failed");
            with_item(inner, index, |item| {
                item.resolve(ItemStatus::Failed, Some(failure.to_string()));
            });
        }
    }
}

/// Mark every still-queued item cancelled.
fn drain_cancelled(inner: &Inner) {
    let mut items = inner.items.write();
    let mut drained = 0usize;
    for item in items.iter_mut() {
        if item.status == ItemStatus::Queued {
            item.resolve(ItemStatus::Cancelled, None);
            drained += 1;
        }
    }
    drop(items);
    if drained > 0 {
        info!(drained, "cancelled remaining queued items");
    }
}

/// Apply a mutation to one item under a short write lock.
fn with_item(inner: &Inner, index: usize, apply: impl FnOnce(&mut QueueItem)) {
    let mut items = inner.items.write();
    if let Some(item) = items.get_mut(index) {
        apply(item);
    }
}

fn snapshot_of(inner: &Inner) -> QueueSnapshot {
    let items = inner.items.read().clone();
    QueueSnapshot {
        is_running: inner.running.load(Ordering::Acquire),
        summary: StatusSummary::of(&items),
        items,
    }
}

/// Publish an event; nobody listening is fine.
fn publish(inner: &Inner, event: QueueEvent) {
    let _ = inner.events.send(event);
}
