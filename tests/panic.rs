use parjob::prelude::*;

fn registry() -> FunctionLookupTable {
	let mut table = FunctionLookupTable::with_builtins();
	let _ = table.register("boom", |args: &[Value], _: &TaskEnvironment| -> Result<Value, BoxError> {
		if args[0] == Value::I64(500) {
			panic!("boom");
		}
		Ok(Value::Null)
	});
	table
}

async fn run<P: parjob::WorkerPool>(pool: P) {
	let orchestrator = Orchestrator::new(pool, registry()).with_options(SchedulingOptions {
		max_values_per_task: Some(100),
		min_values_per_task: None,
	});
	let pipeline = PipelineDescriptor::range(Bounds::int(0, 1_000, 1).unwrap())
		.map(FunctionCallDescriptor::function("boom"));

	match orchestrator.run(&pipeline).await {
		Err(PipelineError::WorkerPanicked {
			task_index,
			message,
		}) => {
			assert_eq!(task_index, 5);
			assert_eq!(message, "boom");
		}
		other => panic!("unexpected {:?}", other),
	}

	// the worker that panicked keeps serving
	let pipeline = PipelineDescriptor::range(Bounds::int(0, 500, 1).unwrap())
		.map(FunctionCallDescriptor::function("boom"));
	let values = orchestrator.run(&pipeline).await.unwrap();
	assert_eq!(values.len(), 500);
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(miri, ignore)]
async fn panic() {
	run(LocalPool::new(registry())).await;
	run(ThreadPool::new(Some(2), registry).unwrap()).await;
}
