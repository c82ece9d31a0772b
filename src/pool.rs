//! Pools of workers that run encoded jobs.

mod local;
mod thread;

use futures::future::{BoxFuture, FutureExt};

pub use self::{
	local::LocalPool, thread::{JoinGuard, ThreadPool}
};

use parjob_core::{pool::WorkerPool, WorkerError};

impl WorkerPool for ThreadPool {
	fn workers(&self) -> usize {
		ThreadPool::workers(self)
	}
	fn spawn(&self, message: Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, WorkerError>> {
		ThreadPool::spawn(self, message).boxed()
	}
}

impl WorkerPool for LocalPool {
	fn workers(&self) -> usize {
		1
	}
	fn spawn(&self, message: Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, WorkerError>> {
		LocalPool::spawn(self, message).boxed()
	}
}
