use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, ops};

use super::FastIterator;
use crate::{Error, Result, Value};

/// `start..end` in increments of `step`, integral or floating point.
///
/// Integral bounds produce [`Value::I64`]s; if any bound is floating point every value is
/// a [`Value::F64`].
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Bounds {
	Int { start: i64, end: i64, step: i64 },
	Float { start: f64, end: f64, step: f64 },
}

impl Bounds {
	pub fn int(start: i64, end: i64, step: i64) -> Result<Self> {
		if step == 0 {
			return Err(Error::invalid_arguments("range", "step must not be zero"));
		}
		Ok(Self::Int { start, end, step })
	}

	pub fn float(start: f64, end: f64, step: f64) -> Result<Self> {
		if step == 0.0 || !step.is_finite() || !start.is_finite() || !end.is_finite() {
			return Err(Error::invalid_arguments(
				"range",
				"bounds must be finite and step must not be zero",
			));
		}
		Ok(Self::Float { start, end, step })
	}

	/// Reads `[start, end, step]`.
	pub fn from_values(args: &[Value]) -> Result<Self> {
		match args {
			[Value::I64(start), Value::I64(end), Value::I64(step)] => Self::int(*start, *end, *step),
			[start, end, step] => {
				let number = |value: &Value| {
					value
						.as_f64()
						.map_err(|e| Error::invalid_arguments("range", e.to_string()))
				};
				Self::float(number(start)?, number(end)?, number(step)?)
			}
			_ => Err(Error::invalid_arguments(
				"range",
				format!("expected [start, end, step], got {} arguments", args.len()),
			)),
		}
	}

	pub fn to_values(self) -> Vec<Value> {
		match self {
			Self::Int { start, end, step } => vec![start.into(), end.into(), step.into()],
			Self::Float { start, end, step } => vec![start.into(), end.into(), step.into()],
		}
	}

	/// `[start, end, step, lo, hi]`: the arguments of a range generator yielding only the
	/// values at positions `window`.
	pub fn window_values(self, window: ops::Range<usize>) -> Result<Vec<Value>> {
		let position = |index: usize| {
			i64::try_from(index).map(Value::I64).map_err(|_| {
				Error::invalid_arguments(
					"range",
					format!("position {} is too large to split the range at", index),
				)
			})
		};
		let mut values = self.to_values();
		values.push(position(window.start)?);
		values.push(position(window.end)?);
		Ok(values)
	}

	/// `ceil((end - start) / step)`, or 0 if that is negative. Saturates at `usize::MAX`.
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	pub fn len(self) -> usize {
		match self {
			Self::Int { start, end, step } => {
				let (start, end, step) = (i128::from(start), i128::from(end), i128::from(step));
				let span = if step > 0 { end - start } else { start - end };
				if span <= 0 {
					0
				} else {
					let step = step.abs();
					usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
				}
			}
			Self::Float { start, end, step } => ((end - start) / step).ceil().max(0.0) as usize,
		}
	}

	pub fn is_empty(self) -> bool {
		self.len() == 0
	}

	/// The `index`th value of the range, always computed from `start` so that it doesn't
	/// depend on how the range was split.
	#[allow(clippy::cast_precision_loss)]
	pub fn nth(self, index: usize) -> Result<Value> {
		match self {
			Self::Int { start, step, .. } => i128::try_from(index)
				.ok()
				.and_then(|i| i.checked_mul(i128::from(step)))
				.and_then(|offset| offset.checked_add(i128::from(start)))
				.and_then(|value| i64::try_from(value).ok())
				.map(Value::I64)
				.ok_or_else(|| {
					Error::invalid_arguments(
						"range",
						format!("position {} is outside the range of an i64", index),
					)
				}),
			Self::Float { start, step, .. } => Ok(Value::F64(start + index as f64 * step)),
		}
	}
}

/// Iterates a [`Bounds`], or a window of its positions. Purely arithmetic; holds no values.
#[derive(Clone, Debug)]
pub struct Range {
	bounds: Bounds,
	index: usize,
	end: usize,
}

impl Range {
	pub fn new(bounds: Bounds) -> Self {
		Self::window(bounds, 0..usize::MAX)
	}

	/// Only the values at positions `window` of `bounds`, clamped to its length.
	pub fn window(bounds: Bounds, window: ops::Range<usize>) -> Self {
		let end = window.end.min(bounds.len());
		Self {
			bounds,
			index: window.start.min(end),
			end,
		}
	}

	/// Reads `[start, end, step]`, or `[start, end, step, lo, hi]` for the window `lo..hi`.
	pub fn from_values(args: &[Value]) -> Result<Self> {
		if let [_, _, _, lo, hi] = args {
			let position = |value: &Value| {
				value
					.as_i64()
					.ok()
					.and_then(|position| usize::try_from(position).ok())
					.ok_or_else(|| {
						Error::invalid_arguments("range", format!("expected a position, got {}", value))
					})
			};
			let window = position(lo)?..position(hi)?;
			return Ok(Self::window(Bounds::from_values(&args[..3])?, window));
		}
		Ok(Self::new(Bounds::from_values(args)?))
	}

	pub fn len(&self) -> usize {
		self.end - self.index
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl FastIterator for Range {
	type Item = Value;

	fn has_next(&mut self) -> Result<bool> {
		Ok(self.index < self.end)
	}

	fn next(&mut self) -> Result<Value> {
		if self.index >= self.end {
			return Err(Error::ExhaustedIterator);
		}
		let value = self.bounds.nth(self.index)?;
		self.index += 1;
		Ok(value)
	}
}
