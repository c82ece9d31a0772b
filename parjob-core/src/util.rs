use serde::{Deserialize, Serialize};
use std::{
	any::Any, fmt::{self, Debug, Display}
};
use thiserror::Error;

/// The payload of a panic, recovered as text so that it can cross back from a worker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panicked(String);
impl Panicked {
	pub fn message(&self) -> &str {
		&self.0
	}
}
impl From<Box<dyn Any + Send>> for Panicked {
	fn from(e: Box<dyn Any + Send>) -> Self {
		Self(
			e.downcast::<String>()
				.map(|x| *x)
				.or_else(|e| e.downcast::<&str>().map(|x| (*x).to_owned()))
				.unwrap_or_else(|_| String::from("Box<Any>")),
		)
	}
}
impl std::error::Error for Panicked {}
impl Display for Panicked {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}
impl Debug for Panicked {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Debug::fmt(&self.0, f)
	}
}

/// Why a pool couldn't return a worker's response.
#[derive(Error, Clone, PartialEq, Debug)]
pub enum WorkerError {
	#[error("worker panicked: {0}")]
	Panicked(Panicked),
	#[error("worker could not encode its response: {0}")]
	Codec(String),
	/// The worker went away, or the pool was shut down, before responding.
	#[error("worker disconnected")]
	Disconnected,
}

impl From<Panicked> for WorkerError {
	fn from(panic: Panicked) -> Self {
		Self::Panicked(panic)
	}
}
