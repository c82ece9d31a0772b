//! Types that cross the boundary between an orchestrator and its workers.
//!
//! Everything here is plain data: a [`Value`] is what flows through a pipeline, and a
//! [`FunctionCallDescriptor`] names a function known to every process together with the
//! values it was bound to. Nothing in this crate can hold a live function reference.

#![warn(
	trivial_numeric_casts,
	unused_import_braces,
	unused_qualifications,
	unused_results,
	unreachable_pub,
	clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]
#![deny(unsafe_code)]

mod descriptor;
mod value;

use std::{
	error::Error, fmt::{self, Display}
};

pub use self::{
	descriptor::{FunctionCallDescriptor, FunctionId, ParseStaticFunctionError, StaticFunction}, value::Value
};

/// Returned when a [`Value`] is asked for a type it does not hold.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DowncastError {
	pub from: &'static str,
	pub to: &'static str,
}
impl Error for DowncastError {}
impl Display for DowncastError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "could not downcast \"{}\" to \"{}\"", self.from, self.to)
	}
}
