//! Maintenance: rewrite contiguous orders for lists whose positions drifted.

use super::{
    error::{TaskOrderError, TaskOrderResult},
    ordering::{Access, TaskOrderService},
};
use crate::task::{
    domain::{ListId, ListVersion, TaskId, TaskSummary},
    ports::{ListRepository, TaskRepository},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Sequence a repair rebuilds the order from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RepairStrategy {
    /// Keep the stored order, closing gaps and breaking ties by creation
    /// time.
    #[default]
    CurrentOrder,
    /// Discard the stored order and sort strictly by creation time.
    CreationTime,
}

/// Outcome of repairing one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairReport {
    /// Repaired list.
    pub list_id: ListId,
    /// Number of tasks in the list.
    pub task_count: usize,
    /// Number of tasks whose order was rewritten.
    pub repositioned: usize,
    /// List version after the repair.
    pub version: ListVersion,
}

impl RepairReport {
    /// Returns whether the repair wrote anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.repositioned > 0
    }
}

impl<L, R, C> TaskOrderService<L, R, C>
where
    L: ListRepository,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Rewrites a contiguous `0..n` order for one list.
    ///
    /// Runs without a caller and skips the ownership check. A list that is
    /// already contiguous in the requested sequence is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskOrderError::ListNotFound`] when the list is gone
    /// and the commit errors of [`Self::reorder`].
    #[instrument(skip(self), fields(list_id = %list_id))]
    pub async fn repair_order(
        &self,
        list_id: ListId,
        strategy: RepairStrategy,
    ) -> TaskOrderResult<RepairReport> {
        let created = match strategy {
            RepairStrategy::CurrentOrder => HashMap::new(),
            RepairStrategy::CreationTime => self.creation_times(list_id).await?,
        };

        let outcome = self
            .commit_sequence(list_id, Access::Maintenance, None, |current| {
                Ok(rebuild_sequence(current, strategy, &created))
            })
            .await?;

        let report = RepairReport {
            list_id,
            task_count: outcome.snapshot.len(),
            repositioned: outcome.repositioned,
            version: outcome.snapshot.version,
        };
        if report.changed() {
            info!(
                repositioned = report.repositioned,
                tasks = report.task_count,
                "list order repaired"
            );
        }
        Ok(report)
    }

    /// Repairs every list in the store, one after another.
    ///
    /// Lists deleted while the run is in progress are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first other failure.
    pub async fn repair_all(&self, strategy: RepairStrategy) -> TaskOrderResult<Vec<RepairReport>> {
        let list_ids = self.list_ids().await?;
        let mut reports = Vec::with_capacity(list_ids.len());
        for list_id in list_ids {
            match self.repair_order(list_id, strategy).await {
                Ok(report) => reports.push(report),
                Err(TaskOrderError::ListNotFound(_)) => {
                    warn!(%list_id, "list deleted during repair, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(reports)
    }

    async fn creation_times(
        &self,
        list_id: ListId,
    ) -> TaskOrderResult<HashMap<TaskId, DateTime<Utc>>> {
        let tasks = self.tasks_of(list_id).await?;
        Ok(tasks
            .iter()
            .map(|task| (task.id(), task.created_at()))
            .collect())
    }
}

/// Orders `current` for a repair.
///
/// `current` already arrives sorted by stored order, creation time and id,
/// so the current-order strategy keeps it as is and the creation-time sort
/// breaks ties by it. Tasks missing from `created` (appended after the
/// lookup) sort last.
fn rebuild_sequence(
    current: &[TaskSummary],
    strategy: RepairStrategy,
    created: &HashMap<TaskId, DateTime<Utc>>,
) -> Vec<TaskId> {
    let mut ids: Vec<TaskId> = current.iter().map(|summary| summary.id).collect();
    if strategy == RepairStrategy::CreationTime {
        ids.sort_by_key(|id| (created.get(id).is_none(), created.get(id).copied()));
    }
    ids
}
