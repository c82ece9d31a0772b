use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use thiserror::Error;

use parjob_core::{schedule::SchedulingOptions, FunctionLookupTable};

use crate::pool::ThreadPool;

const WORKERS: &str = "PARJOB_WORKERS";
const MAX_VALUES_PER_TASK: &str = "PARJOB_MAX_VALUES_PER_TASK";
const MIN_VALUES_PER_TASK: &str = "PARJOB_MIN_VALUES_PER_TASK";

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum ConfigError {
	#[error("{var} must be a positive integer, got {value:?}")]
	Invalid { var: &'static str, value: String },
	#[error("{var} is not valid unicode")]
	NotUnicode { var: &'static str },
}

/// How pipelines are split and how many workers run them.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Config {
	pub workers: usize,
	pub max_values_per_task: Option<usize>,
	pub min_values_per_task: Option<usize>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			workers: num_cpus::get(),
			max_values_per_task: None,
			min_values_per_task: None,
		}
	}
}

impl Config {
	/// The defaults, overridden by `PARJOB_WORKERS`, `PARJOB_MAX_VALUES_PER_TASK` and
	/// `PARJOB_MIN_VALUES_PER_TASK` where set.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_vars(env::var)
	}

	fn from_vars<F>(var: F) -> Result<Self, ConfigError>
	where
		F: Fn(&'static str) -> Result<String, VarError>,
	{
		let read = |name: &'static str| -> Result<Option<usize>, ConfigError> {
			match var(name) {
				Ok(value) => match value.trim().parse::<usize>() {
					Ok(n) if n > 0 => Ok(Some(n)),
					_ => Err(ConfigError::Invalid { var: name, value }),
				},
				Err(VarError::NotPresent) => Ok(None),
				Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var: name }),
			}
		};
		let mut config = Self::default();
		if let Some(workers) = read(WORKERS)? {
			config.workers = workers;
		}
		config.max_values_per_task = read(MAX_VALUES_PER_TASK)?;
		config.min_values_per_task = read(MIN_VALUES_PER_TASK)?;
		Ok(config)
	}

	pub fn scheduling_options(&self) -> SchedulingOptions {
		SchedulingOptions {
			max_values_per_task: self.max_values_per_task,
			min_values_per_task: self.min_values_per_task,
		}
	}

	pub fn thread_pool<R>(&self, registry: R) -> parjob_core::Result<ThreadPool>
	where
		R: Fn() -> FunctionLookupTable + Send + Sync + 'static,
	{
		ThreadPool::new(Some(self.workers), registry)
	}
}
