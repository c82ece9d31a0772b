use async_channel::{unbounded, Receiver, Sender};
use derive_new::new;
use futures::channel::oneshot;
use pin_project::pin_project;
use std::{
	future::Future, panic::{self, AssertUnwindSafe, RefUnwindSafe, UnwindSafe}, pin::Pin, sync::Arc, task::{Context, Poll}, thread
};
use tracing::*;

use parjob_core::{execute_message, Error, FunctionLookupTable, Panicked, Result, WorkerError};

type Response = std::result::Result<Vec<u8>, WorkerError>;
type Request = (Vec<u8>, oneshot::Sender<Response>);

#[derive(Debug)]
struct ThreadPoolInner {
	workers: usize,
	sender: Option<Sender<Request>>,
	threads: Vec<thread::JoinHandle<()>>,
}

/// A fixed number of worker threads, each with its own [`FunctionLookupTable`].
///
/// Jobs queue in submission order and each idle worker takes the next one, running it to
/// completion before taking another.
#[derive(Debug)]
pub struct ThreadPool(Arc<ThreadPoolInner>);
impl ThreadPool {
	/// Spawns `workers` threads, defaulting to one per logical core. Each calls `registry`
	/// once at startup to build the table it executes jobs against, so every worker resolves
	/// descriptors identically without sharing memory with the others.
	pub fn new<R>(workers: Option<usize>, registry: R) -> Result<Self>
	where
		R: Fn() -> FunctionLookupTable + Send + Sync + 'static,
	{
		let workers = workers.unwrap_or_else(num_cpus::get);
		if workers == 0 {
			return Err(Error::InvalidPoolConfiguration(String::from(
				"a pool needs at least one worker",
			)));
		}
		let registry = Arc::new(registry);
		let (sender, receiver) = unbounded::<Request>();
		let threads = (0..workers)
			.map(|i| {
				let receiver = receiver.clone();
				let registry = registry.clone();
				thread::Builder::new()
					.name(format!("parjob-worker-{}", i))
					.spawn(move || worker(i, &receiver, &*registry))
					.map_err(|e| {
						Error::InvalidPoolConfiguration(format!("could not spawn worker thread: {}", e))
					})
			})
			.collect::<Result<Vec<_>>>()?;
		debug!(workers, "thread pool started");
		Ok(Self(Arc::new(ThreadPoolInner {
			workers,
			sender: Some(sender),
			threads,
		})))
	}

	pub fn workers(&self) -> usize {
		self.0.workers
	}

	/// Queues an encoded job. Dropping the returned future before a worker has taken the job
	/// withdraws it; a job already running completes and its response is discarded.
	pub fn spawn(&self, message: Vec<u8>) -> JoinGuard<impl Future<Output = Response> + Send> {
		let sender = self.0.sender.clone();
		JoinGuard::new(async move {
			let sender = sender.ok_or(WorkerError::Disconnected)?;
			let (response_sender, response) = oneshot::channel();
			sender
				.send((message, response_sender))
				.await
				.map_err(|_| WorkerError::Disconnected)?;
			drop(sender);
			response.await.map_err(|_| WorkerError::Disconnected)?
		})
	}
}

fn worker<R>(i: usize, receiver: &Receiver<Request>, registry: &R)
where
	R: Fn() -> FunctionLookupTable,
{
	let table = registry();
	trace!(worker = i, ?table, "worker ready");
	while let Ok((message, response)) = futures::executor::block_on(receiver.recv()) {
		if response.is_canceled() {
			trace!(worker = i, "skipping withdrawn job");
			continue;
		}
		let ret = panic::catch_unwind(AssertUnwindSafe(|| execute_message(&message, &table)));
		let ret = match ret {
			Ok(Ok(bytes)) => Ok(bytes),
			Ok(Err(error)) => Err(WorkerError::Codec(error.to_string())),
			Err(panic) => {
				let panic = Panicked::from(panic);
				warn!(worker = i, %panic, "job panicked");
				Err(WorkerError::Panicked(panic))
			}
		};
		let _ = response.send(ret);
	}
	trace!(worker = i, "worker stopped");
}

impl Drop for ThreadPoolInner {
	fn drop(&mut self) {
		// workers drain what is already queued, then exit
		if let Some(sender) = self.sender.take() {
			let _ = sender.close();
		}
		for thread in self.threads.drain(..) {
			let _ = thread.join();
		}
	}
}

impl Clone for ThreadPool {
	/// Cloning a pool will create a new handle to the pool.
	/// The behavior is similar to [Arc](https://doc.rust-lang.org/stable/std/sync/struct.Arc.html).
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl UnwindSafe for ThreadPool {}
impl RefUnwindSafe for ThreadPool {}

#[pin_project]
#[derive(new)]
pub struct JoinGuard<F>(#[pin] F);
impl<F> Future for JoinGuard<F>
where
	F: Future,
{
	type Output = F::Output;

	#[inline(always)]
	fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
		self.project().0.poll(cx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::future::join_all;
	use parjob_core::{
		job::{JobDefinition, JobResponse}, BoxError, FunctionCallDescriptor, StaticFunction, TaskEnvironment, Value
	};
	use std::sync::atomic::{AtomicUsize, Ordering};

	static CALLS: AtomicUsize = AtomicUsize::new(0);

	fn registry() -> FunctionLookupTable {
		let mut table = FunctionLookupTable::with_builtins();
		let _ = table.register("count", |args: &[Value], _: &TaskEnvironment| -> std::result::Result<Value, BoxError> {
			let _ = CALLS.fetch_add(1, Ordering::Relaxed);
			Ok(args[0].clone())
		});
		table
	}

	fn job(task_index: usize, values: Vec<Value>) -> Vec<u8> {
		JobDefinition {
			generator: FunctionCallDescriptor::static_call(StaticFunction::ToIterator, vec![Value::List(values)]),
			operations: vec![parjob_core::job::OperationDescriptor::new(
				FunctionCallDescriptor::static_call(StaticFunction::Map, vec![]),
				FunctionCallDescriptor::function("count"),
			)],
			environment: None,
			task_index,
			values_per_task: 1,
		}
		.to_bytes()
		.unwrap()
	}

	#[test]
	fn many_jobs() {
		const TASKS: usize = 200;
		let pool = ThreadPool::new(Some(4), registry).unwrap();
		assert_eq!(pool.workers(), 4);
		let responses = futures::executor::block_on(join_all(
			(0..TASKS).map(|i| pool.spawn(job(i, vec![Value::from(i)]))),
		));
		for (i, response) in responses.into_iter().enumerate() {
			assert_eq!(
				JobResponse::from_bytes(&response.unwrap()).unwrap(),
				JobResponse::Ok {
					task_index: i,
					values: vec![Value::from(i)],
				}
			);
		}
		assert!(CALLS.load(Ordering::Relaxed) >= TASKS);
	}

	#[test]
	fn zero_workers() {
		assert!(matches!(
			ThreadPool::new(Some(0), registry),
			Err(Error::InvalidPoolConfiguration(_))
		));
	}
}
