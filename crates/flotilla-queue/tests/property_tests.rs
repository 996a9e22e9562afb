//! Property-based tests for the update queue

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use flotilla_queue::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedOutcome {
    Succeeds,
    Rejected,
}

fn arb_outcomes() -> impl Strategy<Value = Vec<ScriptedOutcome>> {
    prop::collection::vec(
        prop_oneof![
            Just(ScriptedOutcome::Succeeds),
            Just(ScriptedOutcome::Rejected),
        ],
        1..8,
    )
}

fn arb_statuses() -> impl Strategy<Value = Vec<ItemStatus>> {
    prop::collection::vec(
        prop_oneof![
            Just(ItemStatus::Queued),
            Just(ItemStatus::Running),
            Just(ItemStatus::Success),
            Just(ItemStatus::Failed),
            Just(ItemStatus::Skipped),
            Just(ItemStatus::Cancelled),
        ],
        0..40,
    )
}

/// Fleet whose devices resolve instantly, scripted per target.
struct ScriptFleet {
    outcomes: HashMap<String, ScriptedOutcome>,
}

#[async_trait::async_trait]
impl UpdateTrigger for ScriptFleet {
    async fn trigger_update(&self, target_id: &str) -> anyhow::Result<()> {
        match self.outcomes.get(target_id) {
            Some(ScriptedOutcome::Succeeds) => Ok(()),
            Some(ScriptedOutcome::Rejected) => anyhow::bail!("scripted rejection"),
            None => anyhow::bail!("unknown device: {target_id}"),
        }
    }

    async fn device_state(&self, _target_id: &str) -> DeviceState {
        // Always settled, so accepted updates resolve on the fast path.
        DeviceState::Online {
            update_pending: false,
            in_progress: false,
        }
    }

    async fn display_name(&self, _target_id: &str) -> Option<String> {
        None
    }
}

fn fast_config() -> QueueConfig {
    QueueConfig {
        update_timeout: Duration::from_millis(50),
        offline_grace: Duration::from_millis(10),
        settle_delay: Duration::from_millis(1),
        poll_interval: Duration::from_millis(1),
        idle_poll_interval: Duration::from_millis(1),
        inter_item_delay: Duration::ZERO,
        auxiliary_settle: Duration::ZERO,
        event_capacity: 64,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_summary_counts_match_manual_tally(statuses in arb_statuses()) {
        let items: Vec<QueueItem> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut item = QueueItem::new(format!("dev-{i}"), format!("Device {i}"));
                item.status = *status;
                item
            })
            .collect();

        let summary = StatusSummary::of(&items);
        let count = |wanted: ItemStatus| statuses.iter().filter(|s| **s == wanted).count();

        prop_assert_eq!(summary.queued, count(ItemStatus::Queued));
        prop_assert_eq!(summary.running, count(ItemStatus::Running));
        prop_assert_eq!(summary.success, count(ItemStatus::Success));
        prop_assert_eq!(summary.failed, count(ItemStatus::Failed));
        prop_assert_eq!(summary.skipped, count(ItemStatus::Skipped));
        prop_assert_eq!(summary.cancelled, count(ItemStatus::Cancelled));
        prop_assert_eq!(summary.total(), statuses.len());
    }

    #[test]
    fn prop_batch_preserves_order_and_maps_outcomes(outcomes in arb_outcomes()) {
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            TestCaseError::fail(format!("failed to create runtime: {e}"))
        })?;

        rt.block_on(async {
            let targets: Vec<String> = (0..outcomes.len()).map(|i| format!("dev-{i}")).collect();
            let fleet = Arc::new(ScriptFleet {
                outcomes: targets
                    .iter()
                    .cloned()
                    .zip(outcomes.iter().copied())
                    .collect(),
            });
            let queue = UpdateQueue::new(fleet, None, fast_config());

            queue
                .start(targets.clone(), false)
                .await
                .map_err(|e| TestCaseError::fail(format!("start failed: {e}")))?;
            while queue.is_running() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }

            let snapshot = queue.status();
            prop_assert_eq!(snapshot.items.len(), outcomes.len());
            prop_assert_eq!(snapshot.summary.running, 0);
            prop_assert_eq!(snapshot.summary.queued, 0);

            for ((item, target), outcome) in
                snapshot.items.iter().zip(&targets).zip(&outcomes)
            {
                // Order is exactly the submission order.
                prop_assert_eq!(&item.target_id, target);
                let wanted = match outcome {
                    ScriptedOutcome::Succeeds => ItemStatus::Success,
                    ScriptedOutcome::Rejected => ItemStatus::Failed,
                };
                prop_assert_eq!(item.status, wanted);
                prop_assert_eq!(item.status == ItemStatus::Failed, item.error_detail.is_some());
                prop_assert!(item.finished_at.is_some());
            }

            Ok(())
        })?;
    }
}
