//! The core of parjob.
//!
//! A pipeline is a generator followed by a chain of operations. The orchestrator splits it
//! into one [`JobDefinition`](job::JobDefinition) per task using [`schedule`]; each job
//! crosses to a worker as plain data, where [`execute_job`] rebuilds the pipeline out of
//! [`FastIterator`](iter::FastIterator)s by resolving every
//! [`FunctionCallDescriptor`] against that process's
//! [`FunctionLookupTable`](function::FunctionLookupTable), and drains it.
//!
//! The worker pools and the orchestrator that drive this live in the `parjob` crate.

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
	clippy::missing_errors_doc,
	clippy::needless_pass_by_value,
	clippy::wildcard_imports
)]
#![deny(unsafe_code)]

mod builtins;
mod environment;
mod error;
pub mod executor;
pub mod function;
pub mod iter;
pub mod job;
pub mod pool;
pub mod schedule;
pub mod util;

pub use parjob_types::{FunctionCallDescriptor, FunctionId, StaticFunction, Value};

pub use self::{
	environment::TaskEnvironment, error::{BoxError, Error, ErrorKind, JobFailure, Result}, executor::{execute_job, execute_message, task_environment}, function::FunctionLookupTable, pool::WorkerPool, schedule::{schedule, SchedulingDecision}, util::{Panicked, WorkerError}
};
