use super::{ComputeNext, FastIterator, Lazy};
use crate::Result;

/// Left-folds the whole of the preceding iterator into one value, seeded with `seed`, and
/// yields just that value.
///
/// This terminates a pipeline; it is an iterator only so that it composes like the rest.
/// The fold runs on the first pull.
pub struct Reduce<I, F, B>
where
	I: FastIterator,
	F: FnMut(B, I::Item) -> Result<B>,
{
	inner: Lazy<ReduceNext<I, F, B>>,
}

struct ReduceNext<I, F, B> {
	seed: Option<B>,
	i: I,
	f: F,
}

impl<I, F, B> ComputeNext for ReduceNext<I, F, B>
where
	I: FastIterator,
	F: FnMut(B, I::Item) -> Result<B>,
{
	type Item = B;

	fn compute_next(&mut self) -> Result<Option<B>> {
		let mut acc = match self.seed.take() {
			Some(seed) => seed,
			None => return Ok(None),
		};
		while self.i.has_next()? {
			acc = (self.f)(acc, self.i.next()?)?;
		}
		Ok(Some(acc))
	}
}

impl<I, F, B> Reduce<I, F, B>
where
	I: FastIterator,
	F: FnMut(B, I::Item) -> Result<B>,
{
	pub fn new(seed: B, i: I, f: F) -> Self {
		Self {
			inner: Lazy::new(ReduceNext {
				seed: Some(seed),
				i,
				f,
			}),
		}
	}
}

impl<I, F, B> FastIterator for Reduce<I, F, B>
where
	I: FastIterator,
	F: FnMut(B, I::Item) -> Result<B>,
{
	type Item = B;

	#[inline(always)]
	fn has_next(&mut self) -> Result<bool> {
		self.inner.has_next()
	}
	#[inline(always)]
	fn next(&mut self) -> Result<B> {
		self.inner.next()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::iter::FromArray;

	#[test]
	fn empty_yields_seed() {
		let mut reduce = Reduce::new(42, FromArray::new(Vec::<i32>::new()), |a, b| Ok(a + b));
		assert_eq!(reduce.drain().unwrap(), vec![42]);
		assert!(!reduce.has_next().unwrap());
	}

	#[test]
	fn left_fold_in_order() {
		let mut reduce = Reduce::new(
			String::from("s"),
			FromArray::new(vec!["a", "b", "c"]),
			|acc: String, x| Ok(format!("({}{})", acc, x)),
		);
		assert!(reduce.has_next().unwrap());
		assert_eq!(reduce.next().unwrap(), "(((sa)b)c)");
		assert!(!reduce.has_next().unwrap());
	}
}
