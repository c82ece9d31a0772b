use super::{ComputeNext, FastIterator, Lazy};
use crate::Result;

/// Invokes `f(index)` for each index in `start..end`, one call per advance.
///
/// Nothing is computed ahead of the consumer: stopping early means fewer invocations.
pub struct Times<F, T>
where
	F: FnMut(i64) -> Result<T>,
{
	inner: Lazy<TimesNext<F>>,
	marker: std::marker::PhantomData<fn() -> T>,
}

struct TimesNext<F> {
	index: i64,
	end: i64,
	f: F,
}

impl<F, T> ComputeNext for TimesNext<F>
where
	F: FnMut(i64) -> Result<T>,
{
	type Item = T;

	fn compute_next(&mut self) -> Result<Option<T>> {
		if self.index >= self.end {
			return Ok(None);
		}
		let index = self.index;
		self.index += 1;
		(self.f)(index).map(Some)
	}
}

impl<F, T> Times<F, T>
where
	F: FnMut(i64) -> Result<T>,
{
	pub fn new(start: i64, end: i64, f: F) -> Self {
		Self {
			inner: Lazy::new(TimesNext {
				index: start,
				end,
				f,
			}),
			marker: std::marker::PhantomData,
		}
	}
}

impl<F, T> FastIterator for Times<F, T>
where
	F: FnMut(i64) -> Result<T>,
{
	type Item = T;

	#[inline(always)]
	fn has_next(&mut self) -> Result<bool> {
		self.inner.has_next()
	}
	#[inline(always)]
	fn next(&mut self) -> Result<T> {
		self.inner.next()
	}
}
