use serde::{Deserialize, Serialize};
use std::{
	error::Error, fmt::{self, Display}, str::FromStr
};

use crate::Value;

/// The well-known operation implementations every process registers at startup.
///
/// These ids are stable across the orchestrator and every worker; a descriptor naming one
/// of them never ships anything but the id and its bound arguments.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum StaticFunction {
	#[serde(rename = "range")]
	Range,
	#[serde(rename = "times")]
	Times,
	#[serde(rename = "toIterator")]
	ToIterator,
	#[serde(rename = "map")]
	Map,
	#[serde(rename = "filter")]
	Filter,
	#[serde(rename = "reduce")]
	Reduce,
	#[serde(rename = "identity")]
	Identity,
}

impl StaticFunction {
	pub const ALL: [Self; 7] = [
		Self::Range,
		Self::Times,
		Self::ToIterator,
		Self::Map,
		Self::Filter,
		Self::Reduce,
		Self::Identity,
	];

	pub fn id(self) -> &'static str {
		match self {
			Self::Range => "range",
			Self::Times => "times",
			Self::ToIterator => "toIterator",
			Self::Map => "map",
			Self::Filter => "filter",
			Self::Reduce => "reduce",
			Self::Identity => "identity",
		}
	}
}

impl Display for StaticFunction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.id())
	}
}

impl FromStr for StaticFunction {
	type Err = ParseStaticFunctionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|function| function.id() == s)
			.ok_or(ParseStaticFunctionError(()))
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseStaticFunctionError(());
impl Error for ParseStaticFunctionError {}
impl Display for ParseStaticFunctionError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("not the id of a static function")
	}
}

/// The id a caller-defined function is registered under.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for FunctionId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl From<&str> for FunctionId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}
impl From<String> for FunctionId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// A serializable description of "invoke function F with these bound arguments".
///
/// `args` are values, never references; they are passed to the function ahead of any
/// arguments supplied at the call site, in declaration order.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum FunctionCallDescriptor {
	/// One of the fixed operations, identified by its stable id.
	Static { id: StaticFunction, args: Vec<Value> },
	/// A caller function, registered under the same id in every process.
	Dynamic { id: FunctionId, args: Vec<Value> },
}

impl FunctionCallDescriptor {
	/// Describes a call to `id`. Ids naming a [`StaticFunction`] are described by reference
	/// to the static implementation; anything else is assumed to be a registered caller
	/// function.
	pub fn call<I, A>(id: &str, args: I) -> Self
	where
		I: IntoIterator<Item = A>,
		A: Into<Value>,
	{
		let args = args.into_iter().map(Into::into).collect();
		match id.parse::<StaticFunction>() {
			Ok(id) => Self::Static { id, args },
			Err(_) => Self::Dynamic {
				id: FunctionId::new(id),
				args,
			},
		}
	}

	pub fn static_call(id: StaticFunction, args: Vec<Value>) -> Self {
		Self::Static { id, args }
	}

	pub fn dynamic(id: impl Into<FunctionId>, args: Vec<Value>) -> Self {
		Self::Dynamic {
			id: id.into(),
			args,
		}
	}

	/// Shorthand for a dynamic call with no bound arguments.
	pub fn function(id: impl Into<FunctionId>) -> Self {
		Self::dynamic(id, Vec::new())
	}

	pub fn id(&self) -> &str {
		match self {
			Self::Static { id, .. } => id.id(),
			Self::Dynamic { id, .. } => id.as_str(),
		}
	}

	pub fn args(&self) -> &[Value] {
		match self {
			Self::Static { args, .. } | Self::Dynamic { args, .. } => args,
		}
	}

	pub fn is_static(&self) -> bool {
		matches!(self, Self::Static { .. })
	}
}

impl Display for FunctionCallDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}(", self.id())?;
		for (i, arg) in self.args().iter().enumerate() {
			if i != 0 {
				f.write_str(", ")?;
			}
			Display::fmt(arg, f)?;
		}
		f.write_str(")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn call_picks_static_ids() {
		let call = FunctionCallDescriptor::call("range", vec![0, 10, 1]);
		assert_eq!(
			call,
			FunctionCallDescriptor::static_call(
				StaticFunction::Range,
				vec![Value::I64(0), Value::I64(10), Value::I64(1)]
			)
		);
		let call = FunctionCallDescriptor::call("double", Vec::<Value>::new());
		assert!(!call.is_static());
		assert_eq!(call.id(), "double");
		assert_eq!(call.to_string(), "double()");
	}

	#[test]
	fn static_ids_are_stable() {
		for function in &StaticFunction::ALL {
			assert_eq!(function.id().parse::<StaticFunction>(), Ok(*function));
			assert_eq!(
				serde_json::to_string(function).unwrap(),
				format!("{:?}", function.id())
			);
		}
		assert!("toiterator".parse::<StaticFunction>().is_err());
	}

	#[test]
	fn wire() {
		let call = FunctionCallDescriptor::static_call(
			StaticFunction::Times,
			vec![
				Value::I64(0),
				Value::I64(4),
				FunctionCallDescriptor::dynamic("square", vec![Value::F64(0.5)]).into(),
			],
		);
		let bytes = bincode::serialize(&call).unwrap();
		assert_eq!(bincode::deserialize::<FunctionCallDescriptor>(&bytes).unwrap(), call);
		assert_eq!(call.to_string(), "times(0, 4, square(0.5))");
	}
}
