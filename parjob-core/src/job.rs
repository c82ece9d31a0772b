//! The serializable description of a pipeline, and of the share of it one task runs.

use derive_new::new;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, ops};

use crate::{
	iter::Bounds, schedule::SchedulingDecision, Error, FunctionCallDescriptor, JobFailure, Result, StaticFunction, Value
};

/// Where a task's user environment comes from.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum EnvironmentSource {
	/// Called with no inputs on the worker; must return a map.
	Call(FunctionCallDescriptor),
	Data(BTreeMap<String, Value>),
}

/// One stage of a pipeline: which combinator to apply, and the caller's per-item function.
#[derive(Clone, PartialEq, Debug, new, Serialize, Deserialize)]
pub struct OperationDescriptor {
	pub iterator_fn: FunctionCallDescriptor,
	pub iteratee: FunctionCallDescriptor,
}

/// Everything a worker needs to run one task.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct JobDefinition {
	pub generator: FunctionCallDescriptor,
	pub operations: Vec<OperationDescriptor>,
	pub environment: Option<EnvironmentSource>,
	pub task_index: usize,
	pub values_per_task: usize,
}

impl JobDefinition {
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(bincode::serialize(self)?)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(bincode::deserialize(bytes)?)
	}
}

/// What a worker sends back for each [`JobDefinition`] it receives: the task's full ordered
/// result or the error that stopped it, never part of a result.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum JobResponse {
	Ok {
		task_index: usize,
		values: Vec<Value>,
	},
	Err {
		/// `None` if the definition itself could not be decoded.
		task_index: Option<usize>,
		failure: JobFailure,
	},
}

impl JobResponse {
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(bincode::serialize(self)?)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(bincode::deserialize(bytes)?)
	}
}

/// The source of a pipeline's items.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Generator {
	Range(Bounds),
	/// Calls `iteratee` with each index in `0..times`.
	Times {
		times: usize,
		iteratee: FunctionCallDescriptor,
	},
	FromArray(Vec<Value>),
	/// A caller generator that yields `len` items in total. Every task calls it with its own
	/// environment and it must return a list of that task's share, i.e. the items at
	/// `task_index * values_per_task ..` up to `values_per_task` of them.
	Call {
		function: FunctionCallDescriptor,
		len: usize,
	},
}

impl Generator {
	pub fn len(&self) -> usize {
		match self {
			Self::Range(bounds) => bounds.len(),
			Self::Times { times, .. } => *times,
			Self::FromArray(values) => values.len(),
			Self::Call { len, .. } => *len,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The generator call producing the items at positions `range`.
	///
	/// Fails if a position can't be represented on the wire.
	pub fn slice(&self, range: ops::Range<usize>) -> Result<FunctionCallDescriptor> {
		Ok(match self {
			Self::Range(bounds) => {
				FunctionCallDescriptor::static_call(StaticFunction::Range, bounds.window_values(range)?)
			}
			Self::Times { times, iteratee } => {
				let position = |index: usize| {
					i64::try_from(index.min(*times)).map(Value::I64).map_err(|_| {
						Error::invalid_arguments(
							"times",
							format!("position {} is too large to split at", index),
						)
					})
				};
				FunctionCallDescriptor::static_call(
					StaticFunction::Times,
					vec![
						position(range.start)?,
						position(range.end)?,
						Value::from(iteratee.clone()),
					],
				)
			}
			Self::FromArray(values) => {
				let end = range.end.min(values.len());
				let start = range.start.min(end);
				FunctionCallDescriptor::static_call(
					StaticFunction::ToIterator,
					vec![Value::List(values[start..end].to_vec())],
				)
			}
			Self::Call { function, .. } => function.clone(),
		})
	}
}

/// A whole pipeline as the caller assembled it: a generator, then operations applied in
/// order, with an optional user environment.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PipelineDescriptor {
	pub generator: Generator,
	pub operations: Vec<OperationDescriptor>,
	pub environment: Option<EnvironmentSource>,
}

impl PipelineDescriptor {
	pub fn new(generator: Generator) -> Self {
		Self {
			generator,
			operations: Vec::new(),
			environment: None,
		}
	}

	pub fn range(bounds: Bounds) -> Self {
		Self::new(Generator::Range(bounds))
	}

	pub fn times(times: usize, iteratee: FunctionCallDescriptor) -> Self {
		Self::new(Generator::Times { times, iteratee })
	}

	pub fn from_array<V: Into<Value>>(values: Vec<V>) -> Self {
		Self::new(Generator::FromArray(
			values.into_iter().map(Into::into).collect(),
		))
	}

	/// Appends an arbitrary operation, for combinators registered beyond the builtin ones.
	pub fn then(mut self, iterator_fn: FunctionCallDescriptor, iteratee: FunctionCallDescriptor) -> Self {
		self.operations
			.push(OperationDescriptor::new(iterator_fn, iteratee));
		self
	}

	pub fn map(self, iteratee: FunctionCallDescriptor) -> Self {
		self.then(
			FunctionCallDescriptor::static_call(StaticFunction::Map, Vec::new()),
			iteratee,
		)
	}

	pub fn filter(self, predicate: FunctionCallDescriptor) -> Self {
		self.then(
			FunctionCallDescriptor::static_call(StaticFunction::Filter, Vec::new()),
			predicate,
		)
	}

	/// Folds every item into one value with `accumulator`, starting from `seed`.
	///
	/// Each task folds its own items from `seed`, and the per-task results are then folded
	/// together in task order with `accumulator` again, so `seed` should be its identity.
	pub fn reduce(self, seed: impl Into<Value>, accumulator: FunctionCallDescriptor) -> Self {
		self.then(
			FunctionCallDescriptor::static_call(StaticFunction::Reduce, vec![seed.into()]),
			accumulator,
		)
	}

	/// Like [`reduce`](Self::reduce), merging the per-task results with `combiner`
	/// instead, for folds whose accumulator and result differ in kind.
	pub fn reduce_with(
		self, seed: impl Into<Value>, accumulator: FunctionCallDescriptor,
		combiner: FunctionCallDescriptor,
	) -> Self {
		self.then(
			FunctionCallDescriptor::static_call(
				StaticFunction::Reduce,
				vec![seed.into(), Value::from(combiner)],
			),
			accumulator,
		)
	}

	pub fn environment(mut self, environment: BTreeMap<String, Value>) -> Self {
		self.environment = Some(EnvironmentSource::Data(environment));
		self
	}

	pub fn environment_call(mut self, function: FunctionCallDescriptor) -> Self {
		self.environment = Some(EnvironmentSource::Call(function));
		self
	}

	pub fn len(&self) -> usize {
		self.generator.len()
	}

	pub fn is_empty(&self) -> bool {
		self.generator.is_empty()
	}

	/// The seed of the final operation, if it is a `reduce`: the result of running the
	/// pipeline over no items at all.
	pub fn terminal_seed(&self) -> Option<&Value> {
		self.terminal_reduce()?.first()
	}

	/// How the per-task results are merged, if the final operation is a `reduce`: its
	/// combiner, or else its accumulator.
	pub fn terminal_combiner(&self) -> Option<&FunctionCallDescriptor> {
		let args = self.terminal_reduce()?;
		match args.get(1) {
			Some(Value::Function(combiner)) => Some(&**combiner),
			_ => self.operations.last().map(|operation| &operation.iteratee),
		}
	}

	fn terminal_reduce(&self) -> Option<&[Value]> {
		match &self.operations.last()?.iterator_fn {
			FunctionCallDescriptor::Static {
				id: StaticFunction::Reduce,
				args,
			} => Some(args),
			_ => None,
		}
	}
}

/// One [`JobDefinition`] per task of `decision`, each owning its slice of the generator.
pub fn build_job_definitions(
	pipeline: &PipelineDescriptor, decision: SchedulingDecision,
) -> Result<Vec<JobDefinition>> {
	(0..decision.number_of_tasks)
		.map(|task_index| {
			Ok(JobDefinition {
				generator: pipeline
					.generator
					.slice(decision.task_range(task_index))?,
				operations: pipeline.operations.clone(),
				environment: pipeline.environment.clone(),
				task_index,
				values_per_task: decision.values_per_task,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schedule::schedule;

	#[test]
	fn one_definition_per_task() {
		let pipeline = PipelineDescriptor::from_array((0..37).collect::<Vec<i64>>())
			.map(FunctionCallDescriptor::function("double"));
		let decision = schedule(pipeline.len(), 4, None).unwrap();
		let definitions = build_job_definitions(&pipeline, decision).unwrap();
		assert_eq!(definitions.len(), 4);
		let mut items = Vec::new();
		for (i, definition) in definitions.iter().enumerate() {
			assert_eq!(definition.task_index, i);
			assert_eq!(definition.values_per_task, 10);
			assert_eq!(definition.operations, pipeline.operations);
			match definition.generator.args() {
				[Value::List(values)] => items.extend(values.iter().cloned()),
				args => panic!("unexpected generator args {:?}", args),
			}
		}
		assert_eq!(items, (0..37).map(Value::I64).collect::<Vec<_>>());
	}

	#[test]
	fn times_slices() {
		let generator = Generator::Times {
			times: 7,
			iteratee: FunctionCallDescriptor::function("f"),
		};
		let slice = generator.slice(5..10).unwrap();
		assert_eq!(slice.args()[..2], [Value::I64(5), Value::I64(7)]);
		assert_eq!(
			slice.args()[2].as_function().unwrap(),
			&FunctionCallDescriptor::function("f")
		);
	}

	#[test]
	fn terminal_seed() {
		let pipeline = PipelineDescriptor::from_array(Vec::<i64>::new());
		assert_eq!(pipeline.terminal_seed(), None);
		let pipeline = pipeline.reduce(0, FunctionCallDescriptor::function("add"));
		assert_eq!(pipeline.terminal_seed(), Some(&Value::I64(0)));
		assert_eq!(
			pipeline.terminal_combiner(),
			Some(&FunctionCallDescriptor::function("add"))
		);
		let pipeline = pipeline.map(FunctionCallDescriptor::function("double"));
		assert_eq!(pipeline.terminal_seed(), None);
		assert_eq!(pipeline.terminal_combiner(), None);

		let pipeline = PipelineDescriptor::from_array(vec![1, 2]).reduce_with(
			0,
			FunctionCallDescriptor::function("count"),
			FunctionCallDescriptor::function("add"),
		);
		assert_eq!(pipeline.terminal_seed(), Some(&Value::I64(0)));
		assert_eq!(
			pipeline.terminal_combiner(),
			Some(&FunctionCallDescriptor::function("add"))
		);
	}

	#[test]
	fn unsplittable_range() {
		let pipeline = PipelineDescriptor::range(Bounds::float(0.0, 1e300, 1.0).unwrap());
		let decision = schedule(pipeline.len(), 4, None).unwrap();
		assert_eq!(decision.number_of_tasks, 4);
		assert!(matches!(
			build_job_definitions(&pipeline, decision),
			Err(Error::InvalidArguments { .. })
		));
	}

	#[test]
	fn wire() {
		let pipeline = PipelineDescriptor::range(Bounds::int(0, 10, 1).unwrap())
			.filter(FunctionCallDescriptor::call("even", vec![Value::I64(2)]))
			.environment_call(FunctionCallDescriptor::function("env"));
		let definition = build_job_definitions(&pipeline, schedule(10, 1, None).unwrap())
			.unwrap()
			.remove(0);
		let bytes = definition.to_bytes().unwrap();
		assert_eq!(JobDefinition::from_bytes(&bytes).unwrap(), definition);
		assert!(JobDefinition::from_bytes(&bytes[..bytes.len() / 2]).is_err());
		// also representable as json, for transports that want text
		let json = serde_json::to_string(&definition).unwrap();
		assert_eq!(serde_json::from_str::<JobDefinition>(&json).unwrap(), definition);
	}
}
