use derive_new::new;
use std::collections::BTreeMap;

use crate::Value;

/// Read-only state shared by every generator and iteratee invoked within one task.
///
/// Built once at the start of a job and dropped at its end; tasks never share one.
#[derive(Clone, PartialEq, Debug, Default, new)]
pub struct TaskEnvironment {
	task_index: usize,
	values_per_task: usize,
	user: BTreeMap<String, Value>,
}

impl TaskEnvironment {
	pub fn task_index(&self) -> usize {
		self.task_index
	}

	pub fn values_per_task(&self) -> usize {
		self.values_per_task
	}

	/// Looks up an entry of the user environment.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.user.get(key)
	}

	pub fn user(&self) -> &BTreeMap<String, Value> {
		&self.user
	}

	/// The whole environment as a map, with `taskIndex` and `valuesPerTask` alongside the
	/// user entries.
	pub fn to_value(&self) -> Value {
		let mut entries = self.user.clone();
		let _ = entries.insert(String::from("taskIndex"), Value::from(self.task_index));
		let _ = entries.insert(
			String::from("valuesPerTask"),
			Value::from(self.values_per_task),
		);
		Value::Map(entries)
	}
}
