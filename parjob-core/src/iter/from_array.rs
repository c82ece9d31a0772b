use std::vec;

use super::FastIterator;
use crate::{Error, Result};

/// Wraps a finite ordered sequence as a pipeline source.
#[derive(Clone, Debug)]
pub struct FromArray<T> {
	items: vec::IntoIter<T>,
}

impl<T> FromArray<T> {
	pub fn new(items: Vec<T>) -> Self {
		Self {
			items: items.into_iter(),
		}
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.len() == 0
	}
}

impl<T> FastIterator for FromArray<T> {
	type Item = T;

	fn has_next(&mut self) -> Result<bool> {
		Ok(self.items.len() != 0)
	}

	fn next(&mut self) -> Result<T> {
		self.items.next().ok_or(Error::ExhaustedIterator)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preserves_order() {
		let mut iter = FromArray::new(vec!['a', 'b']);
		assert_eq!(iter.len(), 2);
		assert_eq!(iter.next().unwrap(), 'a');
		assert_eq!(iter.next().unwrap(), 'b');
		assert!(iter.is_empty());
		assert!(matches!(iter.next(), Err(Error::ExhaustedIterator)));
	}
}
