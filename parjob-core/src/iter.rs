//! Pull-based iterators that both the orchestrator and the workers build pipelines from.
//!
//! Unlike [`Iterator`], advancing a [`FastIterator`] is fallible: most values are computed
//! lazily by caller code, and whatever that code raises must reach whoever is pulling.

mod filter;
mod from_array;
mod map;
mod range;
mod reduce;
mod times;

use std::mem;

use crate::{Error, Result, Value};

pub use self::{
	filter::*, from_array::*, map::*, range::*, reduce::*, times::*
};

pub type BoxIterator = Box<dyn FastIterator<Item = Value>>;

/// A stateful, single-pass sequence.
///
/// `has_next` is idempotent: calling it repeatedly without an intervening `next` gives the
/// same answer and never consumes anything. `next` fails with
/// [`Error::ExhaustedIterator`] if `has_next` would return false.
pub trait FastIterator {
	type Item;

	fn has_next(&mut self) -> Result<bool>;
	fn next(&mut self) -> Result<Self::Item>;

	/// Pulls every remaining item.
	fn drain(&mut self) -> Result<Vec<Self::Item>> {
		let mut items = Vec::new();
		while self.has_next()? {
			items.push(self.next()?);
		}
		Ok(items)
	}

	fn boxed(self) -> BoxIterator
	where
		Self: FastIterator<Item = Value> + Sized + 'static,
	{
		Box::new(self)
	}
}

impl<I: ?Sized> FastIterator for Box<I>
where
	I: FastIterator,
{
	type Item = I::Item;

	#[inline(always)]
	fn has_next(&mut self) -> Result<bool> {
		(**self).has_next()
	}
	#[inline(always)]
	fn next(&mut self) -> Result<Self::Item> {
		(**self).next()
	}
}

/// The computation behind a lazily evaluated iterator: produce the next item, or `None`
/// once the sequence has ended.
pub trait ComputeNext {
	type Item;

	fn compute_next(&mut self) -> Result<Option<Self::Item>>;
}

#[derive(Debug)]
enum State<T> {
	NotReady,
	Ready(T),
	Done,
	Failed,
}

/// Drives a [`ComputeNext`] through `NotReady -> Ready | Done | Failed`, holding at most one
/// item of lookahead.
#[derive(Debug)]
pub struct Lazy<C: ComputeNext> {
	compute: C,
	state: State<C::Item>,
}

impl<C: ComputeNext> Lazy<C> {
	pub fn new(compute: C) -> Self {
		Self {
			compute,
			state: State::NotReady,
		}
	}
}

impl<C: ComputeNext> FastIterator for Lazy<C> {
	type Item = C::Item;

	fn has_next(&mut self) -> Result<bool> {
		match self.state {
			State::Ready(_) => Ok(true),
			State::Done => Ok(false),
			State::Failed => Err(Error::IteratorFailed),
			State::NotReady => match self.compute.compute_next() {
				Ok(Some(item)) => {
					self.state = State::Ready(item);
					Ok(true)
				}
				Ok(None) => {
					self.state = State::Done;
					Ok(false)
				}
				Err(err) => {
					self.state = State::Failed;
					Err(err)
				}
			},
		}
	}

	fn next(&mut self) -> Result<Self::Item> {
		if !self.has_next()? {
			return Err(Error::ExhaustedIterator);
		}
		match mem::replace(&mut self.state, State::NotReady) {
			State::Ready(item) => Ok(item),
			state => {
				self.state = state;
				Err(Error::ExhaustedIterator)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Countdown(u32);
	impl ComputeNext for Countdown {
		type Item = u32;
		fn compute_next(&mut self) -> Result<Option<u32>> {
			match self.0 {
				0 => Ok(None),
				13 => Err(Error::invalid_arguments("countdown", "unlucky")),
				n => {
					self.0 -= 1;
					Ok(Some(n))
				}
			}
		}
	}

	#[test]
	fn has_next_is_idempotent() {
		let mut iter = Lazy::new(Countdown(2));
		assert!(iter.has_next().unwrap());
		assert!(iter.has_next().unwrap());
		assert_eq!(iter.next().unwrap(), 2);
		assert!(iter.has_next().unwrap());
		assert_eq!(iter.next().unwrap(), 1);
		assert!(!iter.has_next().unwrap());
		assert!(!iter.has_next().unwrap());
		assert!(matches!(iter.next(), Err(Error::ExhaustedIterator)));
	}

	#[test]
	fn failure_is_reported() {
		let mut iter = Lazy::new(Countdown(13));
		assert!(matches!(
			iter.has_next(),
			Err(Error::InvalidArguments { .. })
		));
		assert!(matches!(iter.has_next(), Err(Error::IteratorFailed)));
		assert!(matches!(iter.next(), Err(Error::IteratorFailed)));
	}

	#[test]
	fn drain_boxed() {
		let mut iter: Box<dyn FastIterator<Item = u32>> = Box::new(Lazy::new(Countdown(3)));
		assert_eq!(iter.drain().unwrap(), vec![3, 2, 1]);
		assert_eq!(iter.drain().unwrap(), Vec::<u32>::new());
	}
}
