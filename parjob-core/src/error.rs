use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StaticFunction;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while scheduling, reconstructing or running a job.
#[derive(Error, Debug)]
pub enum Error {
	/// `next()` was called on an iterator whose `has_next()` is false.
	#[error("next() called on an exhausted iterator")]
	ExhaustedIterator,

	/// The iterator's producing computation already failed and reported its error.
	#[error("iterator used after its computation failed")]
	IteratorFailed,

	/// The orchestrator and this worker disagree on the set of static functions.
	#[error("no implementation registered for static function `{0}`")]
	UnknownStaticFunction(StaticFunction),

	#[error("cannot reconstruct function `{id}`: {reason}")]
	FunctionReconstruction { id: String, reason: String },

	#[error("invalid arguments to `{function}`: {reason}")]
	InvalidArguments { function: String, reason: String },

	#[error("invalid pool configuration: {0}")]
	InvalidPoolConfiguration(String),

	/// Raised by caller code inside a generator or iteratee.
	#[error("`{function}` failed: {source}")]
	TaskExecution {
		function: String,
		#[source]
		source: BoxError,
	},

	#[error("malformed message: {0}")]
	Codec(#[from] bincode::Error),
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::ExhaustedIterator => ErrorKind::ExhaustedIterator,
			Self::IteratorFailed => ErrorKind::IteratorFailed,
			Self::UnknownStaticFunction(_) => ErrorKind::UnknownStaticFunction,
			Self::FunctionReconstruction { .. } => ErrorKind::FunctionReconstruction,
			Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
			Self::InvalidPoolConfiguration(_) => ErrorKind::InvalidPoolConfiguration,
			Self::TaskExecution { .. } => ErrorKind::TaskExecution,
			Self::Codec(_) => ErrorKind::Codec,
		}
	}

	pub(crate) fn invalid_arguments(function: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidArguments {
			function: function.into(),
			reason: reason.into(),
		}
	}

	pub(crate) fn reconstruction(id: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::FunctionReconstruction {
			id: id.into(),
			reason: reason.into(),
		}
	}
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ErrorKind {
	ExhaustedIterator,
	IteratorFailed,
	UnknownStaticFunction,
	FunctionReconstruction,
	InvalidArguments,
	InvalidPoolConfiguration,
	TaskExecution,
	Codec,
}

/// The form an [`Error`] takes once it has crossed back from a worker.
///
/// The underlying cause cannot cross a process boundary, so it is flattened into its
/// display chain.
#[derive(Error, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct JobFailure {
	pub kind: ErrorKind,
	pub message: String,
}

impl From<&Error> for JobFailure {
	fn from(error: &Error) -> Self {
		let mut message = error.to_string();
		let mut parent = message.clone();
		let mut source = std::error::Error::source(error);
		while let Some(cause) = source {
			let cause_message = cause.to_string();
			// errors that end their own message with their source's would otherwise repeat it
			let embedded =
				parent == cause_message || parent.ends_with(&format!(": {}", cause_message));
			if !embedded {
				message.push_str(": ");
				message.push_str(&cause_message);
			}
			parent = cause_message;
			source = cause.source();
		}
		Self {
			kind: error.kind(),
			message,
		}
	}
}

impl From<Error> for JobFailure {
	fn from(error: Error) -> Self {
		Self::from(&error)
	}
}
