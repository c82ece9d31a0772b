//! The seam between the orchestrator and whatever runs tasks.
//!
//! A pool only ever moves bytes: an encoded [`JobDefinition`](crate::job::JobDefinition) in,
//! an encoded [`JobResponse`](crate::job::JobResponse) out. That keeps threads and processes
//! interchangeable behind it.

use futures::future::BoxFuture;
use std::panic::{RefUnwindSafe, UnwindSafe};

use crate::util::WorkerError;

pub trait WorkerPool: Clone + Send + Sync + RefUnwindSafe + UnwindSafe + Unpin {
	/// How many tasks can run at once.
	fn workers(&self) -> usize;

	/// Queues `message` for the next idle worker. Dropping the returned future before a worker
	/// has picked the message up withdraws it.
	fn spawn(&self, message: Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, WorkerError>>;
}

impl<P: ?Sized> WorkerPool for &P
where
	P: WorkerPool,
{
	fn workers(&self) -> usize {
		(*self).workers()
	}
	fn spawn(&self, message: Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, WorkerError>> {
		(*self).spawn(message)
	}
}
