use futures::future;
use std::{
	panic::{self, RefUnwindSafe, UnwindSafe}, sync::Arc
};
use tracing::*;

use parjob_core::{execute_message, FunctionLookupTable, Panicked, WorkerError};

/// Runs every job on the calling thread, one at a time, against its own lookup table.
///
/// Messages still go through the wire codec, so a pipeline that works here works on a
/// [`ThreadPool`](super::ThreadPool).
#[derive(Clone, Debug)]
pub struct LocalPool {
	table: Arc<FunctionLookupTable>,
}
impl LocalPool {
	pub fn new(table: FunctionLookupTable) -> Self {
		Self {
			table: Arc::new(table),
		}
	}
	pub fn spawn(&self, message: Vec<u8>) -> future::Ready<Result<Vec<u8>, WorkerError>> {
		let table = &*self.table;
		let ret = panic::catch_unwind(panic::AssertUnwindSafe(|| {
			execute_message(&message, table)
		}));
		let ret = match ret {
			Ok(Ok(response)) => Ok(response),
			Ok(Err(error)) => Err(WorkerError::Codec(error.to_string())),
			Err(panic) => {
				let panic = Panicked::from(panic);
				warn!(%panic, "job panicked");
				Err(WorkerError::Panicked(panic))
			}
		};
		future::ready(ret)
	}
}

impl UnwindSafe for LocalPool {}
impl RefUnwindSafe for LocalPool {}
