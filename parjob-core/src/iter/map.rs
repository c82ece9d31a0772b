use super::{ComputeNext, FastIterator, Lazy};
use crate::Result;

/// Applies `f` to each item of the preceding iterator, one call per advance.
pub struct Map<I, F, B>
where
	I: FastIterator,
	F: FnMut(I::Item) -> Result<B>,
{
	inner: Lazy<MapNext<I, F>>,
	marker: std::marker::PhantomData<fn() -> B>,
}

struct MapNext<I, F> {
	i: I,
	f: F,
}

impl<I, F, B> ComputeNext for MapNext<I, F>
where
	I: FastIterator,
	F: FnMut(I::Item) -> Result<B>,
{
	type Item = B;

	fn compute_next(&mut self) -> Result<Option<B>> {
		if !self.i.has_next()? {
			return Ok(None);
		}
		let item = self.i.next()?;
		(self.f)(item).map(Some)
	}
}

impl<I, F, B> Map<I, F, B>
where
	I: FastIterator,
	F: FnMut(I::Item) -> Result<B>,
{
	pub fn new(i: I, f: F) -> Self {
		Self {
			inner: Lazy::new(MapNext { i, f }),
			marker: std::marker::PhantomData,
		}
	}
}

impl<I, F, B> FastIterator for Map<I, F, B>
where
	I: FastIterator,
	F: FnMut(I::Item) -> Result<B>,
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
	use crate::{iter::FromArray, Error};
	use rand::{rngs::SmallRng, Rng, SeedableRng};

	#[test]
	fn matches_std() {
		let mut rng = SmallRng::seed_from_u64(1);
		for len in 0..50 {
			let xs: Vec<i64> = (0..len).map(|_| rng.gen_range(-1000, 1000)).collect();
			let f = |x: i64| x * 3 - 7;
			let mapped = Map::new(FromArray::new(xs.clone()), |x| Ok(f(x)))
				.drain()
				.unwrap();
			assert_eq!(mapped, xs.into_iter().map(f).collect::<Vec<_>>());
		}
	}

	#[test]
	fn error_stops_the_pipeline() {
		let mut seen = 0;
		let mut map = Map::new(FromArray::new(vec![1, 2, 3]), |x| {
			seen += 1;
			if x == 2 {
				Err(Error::invalid_arguments("test", "two"))
			} else {
				Ok(x)
			}
		});
		assert_eq!(map.next().unwrap(), 1);
		assert!(matches!(map.has_next(), Err(Error::InvalidArguments { .. })));
		assert!(matches!(map.next(), Err(Error::IteratorFailed)));
		drop(map);
		assert_eq!(seen, 2);
	}
}
