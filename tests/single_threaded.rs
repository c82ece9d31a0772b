use futures::{
	future::{self, BoxFuture}, FutureExt
};

use parjob::{prelude::*, ErrorKind, StaticFunction, WorkerError, WorkerPool};

fn registry() -> FunctionLookupTable {
	let mut table = FunctionLookupTable::with_builtins();
	let _ = table
		.register("double", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
			Ok(Value::I64(args[0].as_i64()? * 2))
		})
		.register("even", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
			Ok(Value::Bool(args[0].as_i64()? % 2 == 0))
		})
		.register("add", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
			Ok(Value::I64(args[0].as_i64()? + args[1].as_i64()?))
		})
		.register("count", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
			Ok(Value::I64(args[0].as_i64()? + 1))
		});
	table
}

fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
	values.into_iter().map(Value::I64).collect()
}

#[test]
fn single_threaded() {
	let orchestrator = Orchestrator::new(LocalPool::new(registry()), registry());

	let pipeline = PipelineDescriptor::range(Bounds::int(0, 10, 1).unwrap())
		.map(FunctionCallDescriptor::function("double"));
	let values = orchestrator.run(&pipeline).now_or_never().unwrap().unwrap();
	assert_eq!(values, ints(vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]));

	let pipeline = PipelineDescriptor::from_array(vec![1, 2, 3, 4, 5])
		.filter(FunctionCallDescriptor::function("even"))
		.reduce(0, FunctionCallDescriptor::function("add"));
	let values = orchestrator.run(&pipeline).now_or_never().unwrap().unwrap();
	assert_eq!(values, ints(vec![6]));
}

#[test]
fn empty_pipelines() {
	let orchestrator = Orchestrator::new(LocalPool::new(registry()), registry());

	let pipeline = PipelineDescriptor::from_array(Vec::<i64>::new())
		.map(FunctionCallDescriptor::function("double"));
	assert_eq!(
		orchestrator.run(&pipeline).now_or_never().unwrap().unwrap(),
		Vec::<Value>::new()
	);

	let pipeline = PipelineDescriptor::range(Bounds::int(5, 0, 1).unwrap())
		.reduce(42, FunctionCallDescriptor::function("add"));
	assert_eq!(
		orchestrator.run(&pipeline).now_or_never().unwrap().unwrap(),
		ints(vec![42])
	);
}

#[test]
fn unknown_static_function() {
	// a worker that knows only the caller's functions, not the builtins
	let mut table = FunctionLookupTable::new();
	let _ = table.register("double", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
		Ok(Value::I64(args[0].as_i64()? * 2))
	});
	let orchestrator = Orchestrator::new(LocalPool::new(table), FunctionLookupTable::new());
	let pipeline = PipelineDescriptor::from_array(vec![1, 2, 3])
		.map(FunctionCallDescriptor::function("double"));
	match orchestrator.run(&pipeline).now_or_never().unwrap() {
		Err(PipelineError::Task {
			task_index: 0,
			failure,
		}) => {
			assert_eq!(failure.kind, ErrorKind::UnknownStaticFunction);
			assert!(failure.message.contains(StaticFunction::ToIterator.id()));
		}
		other => panic!("unexpected {:?}", other),
	}
}

fn split(max_values_per_task: usize) -> Orchestrator<LocalPool> {
	Orchestrator::new(LocalPool::new(registry()), registry()).with_options(SchedulingOptions {
		max_values_per_task: Some(max_values_per_task),
		min_values_per_task: None,
	})
}

#[test]
fn reduce_is_independent_of_split() {
	let pipeline = PipelineDescriptor::from_array((1..=37).collect::<Vec<i64>>())
		.reduce(0, FunctionCallDescriptor::function("add"));
	for max in vec![37, 10, 4, 1] {
		assert_eq!(
			split(max).run(&pipeline).now_or_never().unwrap().unwrap(),
			ints(vec![703]),
			"at most {} per task",
			max
		);
	}

	// counting needs a different combiner than accumulator
	let pipeline = PipelineDescriptor::from_array((1..=10).collect::<Vec<i64>>()).reduce_with(
		0,
		FunctionCallDescriptor::function("count"),
		FunctionCallDescriptor::function("add"),
	);
	assert_eq!(
		split(3).run(&pipeline).now_or_never().unwrap().unwrap(),
		ints(vec![10])
	);

	let pipeline = PipelineDescriptor::from_array(vec![1, 2]).reduce(
		0,
		FunctionCallDescriptor::function("missing"),
	);
	assert!(matches!(
		split(1).run(&pipeline).now_or_never().unwrap(),
		Err(PipelineError::Combine(_))
	));
}

#[test]
fn float_range_is_independent_of_split() {
	let ranges = vec![
		(0.1, 7.3, 0.3),
		(0.0, 1.0, 0.1),
		(-2.5, 9.9, 0.7),
		(1.1, 20.2, 0.35),
	];
	for (start, end, step) in ranges {
		let pipeline = PipelineDescriptor::range(Bounds::float(start, end, step).unwrap());
		let whole = split(usize::MAX).run(&pipeline).now_or_never().unwrap().unwrap();
		let pieces = split(7).run(&pipeline).now_or_never().unwrap().unwrap();
		assert_eq!(pieces, whole, "{}..{} by {}", start, end, step);
	}
}

#[test]
fn huge_range() {
	let pipeline = PipelineDescriptor::range(Bounds::float(0.0, 1e300, 1.0).unwrap());
	match split(usize::MAX).run(&pipeline).now_or_never().unwrap() {
		Err(PipelineError::Schedule(error)) => assert_eq!(error.kind(), ErrorKind::InvalidArguments),
		other => panic!("unexpected {:?}", other),
	}
}

#[derive(Clone)]
struct NoWorkers;

impl WorkerPool for NoWorkers {
	fn workers(&self) -> usize {
		0
	}
	fn spawn(&self, _message: Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, WorkerError>> {
		future::ready(Err(WorkerError::Disconnected)).boxed()
	}
}

#[test]
fn invalid_pool() {
	let pipeline = PipelineDescriptor::from_array(vec![1]);
	match Orchestrator::new(NoWorkers, registry()).run(&pipeline).now_or_never().unwrap() {
		Err(PipelineError::Schedule(error)) => assert_eq!(error.kind(), ErrorKind::InvalidPoolConfiguration),
		other => panic!("unexpected {:?}", other),
	}
}
