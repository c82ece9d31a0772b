use serde::{Deserialize, Serialize};
use std::{
	collections::BTreeMap, fmt::{self, Display}
};

use crate::{DowncastError, FunctionCallDescriptor};

/// Represents any value that can be shipped to or returned from a worker.
///
/// Items flowing through a pipeline, the arguments bound into a
/// [`FunctionCallDescriptor`], task environments and results are all `Value`s.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Value {
	/// Absence of a value.
	Null,
	/// Boolean value (`true`, `false`).
	Bool(bool),
	/// Signed 64-bit integer.
	I64(i64),
	/// IEEE 64-bit floating point value.
	F64(f64),
	/// UTF-8 encoded character string.
	String(String),
	/// Ordered sequence of values.
	List(Vec<Value>),
	/// String-keyed map of values.
	Map(BTreeMap<String, Value>),
	/// A nested function call, resolved against the lookup table of whichever process
	/// receives it.
	Function(Box<FunctionCallDescriptor>),
}

impl Value {
	/// The name of this variant, as used in downcast errors.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::I64(_) => "i64",
			Self::F64(_) => "f64",
			Self::String(_) => "string",
			Self::List(_) => "list",
			Self::Map(_) => "map",
			Self::Function(_) => "function",
		}
	}

	fn downcast_error(&self, to: &'static str) -> DowncastError {
		DowncastError {
			from: self.type_name(),
			to,
		}
	}

	/// Returns true if the `Value` is Null. Returns false otherwise.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// If the `Value` is a Bool, return it. Returns Err otherwise.
	pub fn as_bool(&self) -> Result<bool, DowncastError> {
		if let Self::Bool(ret) = self {
			Ok(*ret)
		} else {
			Err(self.downcast_error("bool"))
		}
	}

	/// Returns true if the `Value` is an I64. Returns false otherwise.
	pub fn is_i64(&self) -> bool {
		matches!(self, Self::I64(_))
	}

	/// If the `Value` is an I64, return it. Returns Err otherwise.
	pub fn as_i64(&self) -> Result<i64, DowncastError> {
		if let Self::I64(ret) = self {
			Ok(*ret)
		} else {
			Err(self.downcast_error("i64"))
		}
	}

	/// Returns true if the `Value` is an I64 or an F64.
	pub fn is_number(&self) -> bool {
		matches!(self, Self::I64(_) | Self::F64(_))
	}

	/// If the `Value` is numeric, return it as an `f64`. Returns Err otherwise.
	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(&self) -> Result<f64, DowncastError> {
		match self {
			Self::F64(ret) => Ok(*ret),
			Self::I64(ret) => Ok(*ret as f64),
			_ => Err(self.downcast_error("f64")),
		}
	}

	/// If the `Value` is a String, return a reference to it. Returns Err otherwise.
	pub fn as_str(&self) -> Result<&str, DowncastError> {
		if let Self::String(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("string"))
		}
	}

	/// If the `Value` is a List, return a reference to it. Returns Err otherwise.
	pub fn as_list(&self) -> Result<&[Value], DowncastError> {
		if let Self::List(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("list"))
		}
	}

	/// If the `Value` is a List, return it. Returns Err otherwise.
	pub fn into_list(self) -> Result<Vec<Value>, DowncastError> {
		if let Self::List(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("list"))
		}
	}

	/// If the `Value` is a Map, return a reference to it. Returns Err otherwise.
	pub fn as_map(&self) -> Result<&BTreeMap<String, Value>, DowncastError> {
		if let Self::Map(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("map"))
		}
	}

	/// If the `Value` is a Map, return it. Returns Err otherwise.
	pub fn into_map(self) -> Result<BTreeMap<String, Value>, DowncastError> {
		if let Self::Map(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("map"))
		}
	}

	/// If the `Value` is a nested function call, return a reference to it. Returns Err
	/// otherwise.
	pub fn as_function(&self) -> Result<&FunctionCallDescriptor, DowncastError> {
		if let Self::Function(ret) = self {
			Ok(ret)
		} else {
			Err(self.downcast_error("function"))
		}
	}
}

impl Default for Value {
	fn default() -> Self {
		Self::Null
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(value) => Display::fmt(value, f),
			Self::I64(value) => Display::fmt(value, f),
			Self::F64(value) => Display::fmt(value, f),
			Self::String(value) => write!(f, "{:?}", value),
			Self::List(values) => {
				f.write_str("[")?;
				for (i, value) in values.iter().enumerate() {
					if i != 0 {
						f.write_str(", ")?;
					}
					Display::fmt(value, f)?;
				}
				f.write_str("]")
			}
			Self::Map(entries) => {
				f.write_str("{")?;
				for (i, (key, value)) in entries.iter().enumerate() {
					if i != 0 {
						f.write_str(", ")?;
					}
					write!(f, "{:?}: {}", key, value)?;
				}
				f.write_str("}")
			}
			Self::Function(call) => Display::fmt(call, f),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::I64(value)
	}
}
impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::I64(value.into())
	}
}
impl From<usize> for Value {
	#[allow(clippy::cast_possible_wrap)]
	fn from(value: usize) -> Self {
		Self::I64(value as i64)
	}
}
impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::F64(value)
	}
}
impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl<T> From<Vec<T>> for Value
where
	T: Into<Value>,
{
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}
impl From<BTreeMap<String, Value>> for Value {
	fn from(entries: BTreeMap<String, Value>) -> Self {
		Self::Map(entries)
	}
}
impl From<FunctionCallDescriptor> for Value {
	fn from(call: FunctionCallDescriptor) -> Self {
		Self::Function(Box::new(call))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn downcast() {
		assert_eq!(Value::from(3).as_i64(), Ok(3));
		assert_eq!(Value::from(3).as_f64(), Ok(3.0));
		assert_eq!(
			Value::from("x").as_i64(),
			Err(DowncastError {
				from: "string",
				to: "i64"
			})
		);
		assert!(Value::Null.as_map().is_err());
		assert_eq!(
			Value::from(vec![1, 2]).into_list().unwrap(),
			vec![Value::I64(1), Value::I64(2)]
		);
	}

	#[test]
	fn display() {
		let mut map = BTreeMap::new();
		let _ = map.insert(String::from("a"), Value::from(vec![1.5, 2.0]));
		let _ = map.insert(String::from("b"), Value::from("s"));
		assert_eq!(Value::Map(map).to_string(), r#"{"a": [1.5, 2], "b": "s"}"#);
	}
}
