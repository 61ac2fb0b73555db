//! Completion progress of a list view.

use crate::task::domain::Task;

/// Counts shown in a list header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Number of tasks.
    pub total: usize,
    /// Number of completed tasks.
    pub completed: usize,
    /// Rounded completion percentage, `0` for an empty list.
    pub percent: u8,
}

impl ProgressSummary {
    /// Summarizes `tasks`.
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed()).count();
        Self {
            total,
            completed,
            percent: rounded_percent(completed, total),
        }
    }

    /// Number of tasks still open.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Header text such as `"1 task remaining"`.
    #[must_use]
    pub fn remaining_label(&self) -> String {
        let remaining = self.remaining();
        let noun = if remaining == 1 { "task" } else { "tasks" };
        format!("{remaining} {noun} remaining")
    }
}

/// `round(100 * part / whole)` in integer arithmetic, half away from zero.
fn rounded_percent(part: usize, whole: usize) -> u8 {
    let numerator = part.saturating_mul(200).saturating_add(whole);
    let denominator = whole.saturating_mul(2);
    numerator
        .checked_div(denominator)
        .and_then(|value| u8::try_from(value.min(100)).ok())
        .unwrap_or(0)
}
