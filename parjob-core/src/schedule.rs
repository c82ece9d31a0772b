//! How many tasks a pipeline is split into, and how many input items each owns.

use serde::{Deserialize, Serialize};
use std::ops;

use crate::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SchedulingDecision {
	pub number_of_tasks: usize,
	pub values_per_task: usize,
	pub total_items: usize,
}

impl SchedulingDecision {
	/// The half-open range of input items owned by task `task_index`. The last task may own
	/// fewer than `values_per_task`.
	pub fn task_range(&self, task_index: usize) -> ops::Range<usize> {
		let start = task_index
			.saturating_mul(self.values_per_task)
			.min(self.total_items);
		let end = start
			.saturating_add(self.values_per_task)
			.min(self.total_items);
		start..end
	}
}

/// Caller overrides of the default split.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SchedulingOptions {
	pub max_values_per_task: Option<usize>,
	/// Applied after the maximum, to avoid dispatching tasks too small to be worth it.
	pub min_values_per_task: Option<usize>,
}

/// Splits `total_items` as evenly as possible across `pool_capacity` workers, or into tasks
/// of at most `max_values_per_task` items.
pub fn schedule(
	total_items: usize, pool_capacity: usize, max_values_per_task: Option<usize>,
) -> Result<SchedulingDecision> {
	schedule_with(
		total_items,
		pool_capacity,
		&SchedulingOptions {
			max_values_per_task,
			min_values_per_task: None,
		},
	)
}

pub fn schedule_with(
	total_items: usize, pool_capacity: usize, options: &SchedulingOptions,
) -> Result<SchedulingDecision> {
	if pool_capacity == 0 {
		return Err(Error::InvalidPoolConfiguration(String::from(
			"a pool needs at least one worker",
		)));
	}
	let even = div_ceil(total_items, pool_capacity);
	let mut values_per_task = options.max_values_per_task.unwrap_or(even).min(total_items);
	if let Some(min) = options.min_values_per_task {
		values_per_task = values_per_task.max(min.min(total_items));
	}
	let values_per_task = values_per_task.max(1);
	let number_of_tasks = div_ceil(total_items, values_per_task);
	Ok(SchedulingDecision {
		number_of_tasks,
		values_per_task,
		total_items,
	})
}

// `total_items` may be as large as `usize::MAX`
fn div_ceil(n: usize, d: usize) -> usize {
	n / d + usize::from(n % d != 0)
}
