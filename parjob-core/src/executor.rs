//! The worker side: rebuilding a task's pipeline and draining it.

use std::{collections::BTreeMap, sync::Arc};
use tracing::{instrument, *};

use crate::{
	iter::FastIterator, job::{EnvironmentSource, JobDefinition, JobResponse}, Error, FunctionLookupTable, JobFailure, Result, TaskEnvironment, Value
};

/// Runs one task to completion.
///
/// Any error while resolving a descriptor or raised by caller code ends the task; there is
/// no retry and no partial result.
#[instrument(
	name = "execute_job",
	skip(definition, table),
	fields(task_index = definition.task_index, operations = definition.operations.len())
)]
pub fn execute_job(definition: &JobDefinition, table: &FunctionLookupTable) -> Result<Vec<Value>> {
	let env = Arc::new(task_environment(
		definition.environment.as_ref(),
		definition.task_index,
		definition.values_per_task,
		table,
	)?);

	let generator = table.resolve(&definition.generator)?;
	trace!(generator = %definition.generator, "building generator");
	let mut iterator = generator.generate(&env, table)?;

	for operation in &definition.operations {
		let iterator_fn = table.resolve(&operation.iterator_fn)?;
		let iteratee = table.resolve(&operation.iteratee)?;
		trace!(operation = iterator_fn.id(), iteratee = iteratee.id(), "applying operation");
		iterator = iterator_fn.apply(iterator, iteratee, &env)?;
	}

	let values = iterator.drain()?;
	debug!(values = values.len(), "task complete");
	Ok(values)
}

/// Builds the environment of task `task_index`, calling the environment function if there
/// is one.
pub fn task_environment(
	source: Option<&EnvironmentSource>, task_index: usize, values_per_task: usize,
	table: &FunctionLookupTable,
) -> Result<TaskEnvironment> {
	let user = match source {
		None => BTreeMap::new(),
		Some(EnvironmentSource::Data(data)) => data.clone(),
		Some(EnvironmentSource::Call(descriptor)) => {
			// the environment function only sees the task's position
			let base = TaskEnvironment::new(task_index, values_per_task, BTreeMap::new());
			match table.resolve(descriptor)?.call(&[], &base)? {
				Value::Map(user) => user,
				other => {
					return Err(Error::invalid_arguments(
						descriptor.id(),
						format!(
							"an environment must be a map, got {}",
							other.type_name()
						),
					))
				}
			}
		}
	};
	Ok(TaskEnvironment::new(task_index, values_per_task, user))
}

/// The message loop body of a worker: decodes a [`JobDefinition`], runs it and encodes the
/// [`JobResponse`].
///
/// Task failures are reported inside the response. This only fails if the response itself
/// cannot be encoded.
pub fn execute_message(message: &[u8], table: &FunctionLookupTable) -> Result<Vec<u8>> {
	let response = match JobDefinition::from_bytes(message) {
		Ok(definition) => match execute_job(&definition, table) {
			Ok(values) => JobResponse::Ok {
				task_index: definition.task_index,
				values,
			},
			Err(error) => {
				warn!(task_index = definition.task_index, %error, "task failed");
				JobResponse::Err {
					task_index: Some(definition.task_index),
					failure: JobFailure::from(error),
				}
			}
		},
		Err(error) => {
			warn!(%error, "could not decode job definition");
			JobResponse::Err {
				task_index: None,
				failure: JobFailure::from(error),
			}
		}
	};
	response.to_bytes()
}
