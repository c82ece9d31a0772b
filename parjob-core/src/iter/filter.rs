use super::{ComputeNext, FastIterator, Lazy};
use crate::Result;

/// Yields the items of the preceding iterator for which `f` holds.
pub struct Filter<I, F>
where
	I: FastIterator,
	F: FnMut(&I::Item) -> Result<bool>,
{
	inner: Lazy<FilterNext<I, F>>,
}

struct FilterNext<I, F> {
	i: I,
	f: F,
}

impl<I, F> ComputeNext for FilterNext<I, F>
where
	I: FastIterator,
	F: FnMut(&I::Item) -> Result<bool>,
{
	type Item = I::Item;

	fn compute_next(&mut self) -> Result<Option<I::Item>> {
		while self.i.has_next()? {
			let item = self.i.next()?;
			if (self.f)(&item)? {
				return Ok(Some(item));
			}
		}
		Ok(None)
	}
}

impl<I, F> Filter<I, F>
where
	I: FastIterator,
	F: FnMut(&I::Item) -> Result<bool>,
{
	pub fn new(i: I, f: F) -> Self {
		Self {
			inner: Lazy::new(FilterNext { i, f }),
		}
	}
}

impl<I, F> FastIterator for Filter<I, F>
where
	I: FastIterator,
	F: FnMut(&I::Item) -> Result<bool>,
{
	type Item = I::Item;

	#[inline(always)]
	fn has_next(&mut self) -> Result<bool> {
		self.inner.has_next()
	}
	#[inline(always)]
	fn next(&mut self) -> Result<I::Item> {
		self.inner.next()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::iter::FromArray;
	use rand::{rngs::SmallRng, Rng, SeedableRng};

	#[test]
	fn matches_std() {
		let mut rng = SmallRng::seed_from_u64(2);
		for len in 0..50 {
			let xs: Vec<i64> = (0..len).map(|_| rng.gen_range(-1000, 1000)).collect();
			let modulus = rng.gen_range(1, 5);
			let p = |x: &i64| x.rem_euclid(modulus) == 0;
			let filtered = Filter::new(FromArray::new(xs.clone()), |x| Ok(p(x)))
				.drain()
				.unwrap();
			assert_eq!(filtered, xs.into_iter().filter(p).collect::<Vec<_>>());
		}
	}

	#[test]
	fn has_next_does_not_consume() {
		let mut filter = Filter::new(FromArray::new(vec![1, 2, 3, 4, 5, 6]), |x: &i32| {
			Ok(x % 3 == 0)
		});
		assert!(filter.has_next().unwrap());
		assert!(filter.has_next().unwrap());
		assert_eq!(filter.next().unwrap(), 3);
		assert_eq!(filter.next().unwrap(), 6);
		assert!(!filter.has_next().unwrap());
	}
}
