//! Data-parallel pipelines executed by a pool of workers.
//!
//! A pipeline is described as plain data with
//! [`PipelineDescriptor`](parjob_core::job::PipelineDescriptor): a generator followed by
//! map, filter and reduce stages, each naming caller logic by the id it was registered
//! under in a [`FunctionLookupTable`]. An [`Orchestrator`] splits it into tasks, hands each
//! to a worker of a [`ThreadPool`] (or a [`LocalPool`]), and merges the per-task results in
//! task order.
//!
//! ```
//! use parjob::prelude::*;
//!
//! fn registry() -> FunctionLookupTable {
//! 	let mut table = FunctionLookupTable::with_builtins();
//! 	let _ = table.register("double", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
//! 		Ok(Value::I64(args[0].as_i64()? * 2))
//! 	});
//! 	table
//! }
//!
//! # futures::executor::block_on(async {
//! let pool = ThreadPool::new(Some(4), registry).unwrap();
//! let pipeline = PipelineDescriptor::range(Bounds::int(0, 10, 1).unwrap())
//! 	.map(FunctionCallDescriptor::function("double"));
//! let values = Orchestrator::new(pool, registry()).run(&pipeline).await.unwrap();
//! assert_eq!(values, (0..10).map(|x| Value::I64(x * 2)).collect::<Vec<_>>());
//! # });
//! ```

#![warn(
	trivial_numeric_casts,
	unused_import_braces,
	unused_qualifications,
	unused_results,
	unreachable_pub,
	clippy::pedantic
)]
#![allow(
	clippy::module_name_repetitions,
	clippy::must_use_candidate,
	clippy::missing_errors_doc
)]
#![deny(unsafe_code)]

mod config;
mod orchestrator;
pub mod pool;

pub use parjob_core::{
	execute_job, execute_message, iter, job, schedule, schedule::SchedulingOptions, BoxError, Error, ErrorKind, FunctionCallDescriptor, FunctionId, FunctionLookupTable, JobFailure, Panicked, Result, SchedulingDecision, StaticFunction, TaskEnvironment, Value, WorkerError, WorkerPool
};

pub use self::{
	config::{Config, ConfigError}, orchestrator::{Orchestrator, PipelineError, PipelineHandle}, pool::{LocalPool, ThreadPool}
};

pub mod prelude {
	pub use super::{
		BoxError, Config, FunctionCallDescriptor, FunctionLookupTable, LocalPool, Orchestrator, PipelineError, SchedulingOptions, TaskEnvironment, ThreadPool, Value
	};
	pub use parjob_core::{
		iter::Bounds, job::{Generator, PipelineDescriptor}
	};
}
