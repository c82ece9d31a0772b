use futures::{
	future::{self, BoxFuture}, stream::FuturesOrdered, FutureExt, StreamExt
};
use pin_project::pin_project;
use std::{
	future::Future, pin::Pin, sync::Arc, task::{Context, Poll}
};
use thiserror::Error;
use tracing::*;

use parjob_core::{
	function::Callable, job::{build_job_definitions, JobResponse, PipelineDescriptor}, pool::WorkerPool, schedule::{schedule_with, SchedulingOptions}, task_environment, Error, FunctionLookupTable, JobFailure, TaskEnvironment, Value, WorkerError
};

/// Why a pipeline produced no result.
#[derive(Error, Debug)]
pub enum PipelineError {
	#[error("could not schedule pipeline: {0}")]
	Schedule(#[source] Error),
	/// The task with the lowest index among those that failed.
	#[error("task {task_index} failed: {failure}")]
	Task {
		task_index: usize,
		failure: JobFailure,
	},
	#[error("worker panicked running task {task_index}: {message}")]
	WorkerPanicked { task_index: usize, message: String },
	#[error("worker running task {task_index} disconnected")]
	Disconnected { task_index: usize },
	#[error("malformed message: {0}")]
	Codec(String),
	/// Merging the results of a terminal `reduce` failed.
	#[error("could not combine task results: {0}")]
	Combine(#[source] Error),
	#[error("pipeline cancelled")]
	Cancelled,
}

type Merged = Result<Vec<Value>, PipelineError>;

/// Splits pipelines into tasks, dispatches them to a [`WorkerPool`] and merges the results.
///
/// The orchestrator keeps its own [`FunctionLookupTable`], registered like the workers'
/// ones, to combine the results of a terminal `reduce`.
#[derive(Clone, Debug)]
pub struct Orchestrator<P> {
	pool: P,
	table: Arc<FunctionLookupTable>,
	options: SchedulingOptions,
}

impl<P> Orchestrator<P>
where
	P: WorkerPool,
{
	pub fn new(pool: P, table: FunctionLookupTable) -> Self {
		Self {
			pool,
			table: Arc::new(table),
			options: SchedulingOptions::default(),
		}
	}

	pub fn with_options(mut self, options: SchedulingOptions) -> Self {
		self.options = options;
		self
	}

	pub fn pool(&self) -> &P {
		&self.pool
	}

	/// Schedules `pipeline` over the pool's workers and dispatches every task.
	///
	/// The handle resolves to the concatenation of the tasks' results in ascending task
	/// index, or to the error of the lowest-indexed task that failed. If the pipeline ends
	/// in a `reduce`, the tasks' results are instead folded in task order with its combiner
	/// into a single value. A pipeline over no items dispatches nothing and resolves to
	/// `[]`, or to `[seed]` if it ends in a `reduce`.
	#[instrument(name = "Orchestrator::run", skip(self, pipeline), fields(items = pipeline.len()))]
	pub fn run(&self, pipeline: &PipelineDescriptor) -> PipelineHandle {
		let decision = match schedule_with(pipeline.len(), self.pool.workers(), &self.options) {
			Ok(decision) => decision,
			Err(error) => return PipelineHandle::ready(Err(PipelineError::Schedule(error))),
		};
		if decision.number_of_tasks == 0 {
			let values = pipeline.terminal_seed().cloned().into_iter().collect();
			return PipelineHandle::ready(Ok(values));
		}
		let combiner = match self.combiner(pipeline, decision.values_per_task) {
			Ok(combiner) => combiner,
			Err(error) => return PipelineHandle::ready(Err(PipelineError::Combine(error))),
		};
		let definitions = match build_job_definitions(pipeline, decision) {
			Ok(definitions) => definitions,
			Err(error) => return PipelineHandle::ready(Err(PipelineError::Schedule(error))),
		};
		debug!(
			tasks = decision.number_of_tasks,
			values_per_task = decision.values_per_task,
			"dispatching"
		);

		let messages = definitions
			.into_iter()
			.map(|definition| Ok((definition.task_index, definition.to_bytes()?)))
			.collect::<Result<Vec<_>, Error>>();
		let messages = match messages {
			Ok(messages) => messages,
			Err(error) => return PipelineHandle::ready(Err(PipelineError::Codec(error.to_string()))),
		};
		let tasks = messages
			.into_iter()
			.map(|(task_index, message)| {
				let response = self.pool.spawn(message);
				async move { (task_index, response.await) }.boxed()
			})
			.collect::<FuturesOrdered<_>>();
		let span = info_span!("pipeline", tasks = decision.number_of_tasks);
		PipelineHandle::new(merge(tasks, combiner).instrument(span).boxed())
	}

	fn combiner(
		&self, pipeline: &PipelineDescriptor, values_per_task: usize,
	) -> Result<Option<(Callable, TaskEnvironment)>, Error> {
		let descriptor = match pipeline.terminal_combiner() {
			Some(descriptor) => descriptor,
			None => return Ok(None),
		};
		let combiner = self.table.resolve(descriptor)?;
		let env = task_environment(
			pipeline.environment.as_ref(),
			0,
			values_per_task,
			&self.table,
		)?;
		Ok(Some((combiner, env)))
	}
}

async fn merge(
	mut tasks: FuturesOrdered<BoxFuture<'static, (usize, Result<Vec<u8>, WorkerError>)>>,
	combiner: Option<(Callable, TaskEnvironment)>,
) -> Merged {
	let mut values = Vec::new();
	while let Some((task_index, response)) = tasks.next().await {
		let response = response.map_err(|error| match error {
			WorkerError::Panicked(panic) => PipelineError::WorkerPanicked {
				task_index,
				message: panic.message().to_owned(),
			},
			WorkerError::Codec(message) => PipelineError::Codec(message),
			WorkerError::Disconnected => PipelineError::Disconnected { task_index },
		})?;
		match JobResponse::from_bytes(&response).map_err(|e| PipelineError::Codec(e.to_string()))? {
			JobResponse::Ok {
				values: task_values,
				..
			} => {
				trace!(task_index, values = task_values.len(), "task complete");
				values.extend(task_values);
			}
			JobResponse::Err { failure, .. } => {
				// dropping `tasks` withdraws whatever hasn't started
				return Err(PipelineError::Task {
					task_index,
					failure,
				});
			}
		}
	}
	match combiner {
		Some((combiner, env)) => {
			let mut values = values.into_iter();
			let first = match values.next() {
				Some(first) => first,
				None => return Ok(Vec::new()),
			};
			let combined = values
				.try_fold(first, |acc, value| combiner.call(&[acc, value], &env))
				.map_err(PipelineError::Combine)?;
			trace!(combiner = combiner.id(), "combined task results");
			Ok(vec![combined])
		}
		None => Ok(values),
	}
}

/// A pipeline in flight. Resolves once every task has responded.
///
/// A [`ThreadPool`](crate::ThreadPool) queues tasks when the handle is first polled; a
/// [`LocalPool`](crate::LocalPool) has already run them by the time `run` returns.
/// Dropping the handle, or calling [`cancel`](Self::cancel), withdraws the tasks no worker
/// has started. Tasks already running complete and their results are discarded.
#[pin_project]
pub struct PipelineHandle {
	#[pin]
	inner: Option<BoxFuture<'static, Merged>>,
}

impl PipelineHandle {
	fn new(inner: BoxFuture<'static, Merged>) -> Self {
		Self { inner: Some(inner) }
	}

	fn ready(result: Merged) -> Self {
		Self::new(future::ready(result).boxed())
	}

	pub fn cancel(&mut self) {
		if self.inner.take().is_some() {
			debug!("pipeline cancelled");
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.is_none()
	}
}

impl Future for PipelineHandle {
	type Output = Merged;

	fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
		match self.project().inner.as_pin_mut() {
			Some(inner) => inner.poll(cx),
			None => Poll::Ready(Err(PipelineError::Cancelled)),
		}
	}
}
