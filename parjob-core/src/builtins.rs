//! The implementations behind each [`StaticFunction`].

use std::sync::Arc;

use crate::{
	function::{Callable, FunctionLookupTable, StaticImplementation}, iter::{BoxIterator, FastIterator, Filter, FromArray, Map, Range, Reduce, Times}, BoxError, Error, Result, StaticFunction, TaskEnvironment, Value
};

pub(crate) fn register(table: &mut FunctionLookupTable) {
	for &id in &StaticFunction::ALL {
		let implementation = match id {
			StaticFunction::Range => StaticImplementation::Generator(range),
			StaticFunction::Times => StaticImplementation::Generator(times),
			StaticFunction::ToIterator => StaticImplementation::Generator(to_iterator),
			StaticFunction::Map => StaticImplementation::Combinator(map),
			StaticFunction::Filter => StaticImplementation::Combinator(filter),
			StaticFunction::Reduce => StaticImplementation::Combinator(reduce),
			StaticFunction::Identity => StaticImplementation::Function(Arc::new(identity)),
		};
		table.register_static(id, implementation);
	}
}

/// `[start, end, step]`, optionally followed by the window `[lo, hi]` of positions to yield.
fn range(args: &[Value], _env: &Arc<TaskEnvironment>, _table: &FunctionLookupTable) -> Result<BoxIterator> {
	Ok(Range::from_values(args)?.boxed())
}

/// `[start, end, iteratee]`, where `iteratee` is a nested descriptor called with each index.
fn times(args: &[Value], env: &Arc<TaskEnvironment>, table: &FunctionLookupTable) -> Result<BoxIterator> {
	let (start, end, iteratee) = match args {
		[Value::I64(start), Value::I64(end), Value::Function(iteratee)] => (*start, *end, iteratee),
		_ => {
			return Err(Error::invalid_arguments(
				"times",
				"expected [start, end, iteratee]",
			))
		}
	};
	let iteratee = table.resolve(iteratee)?;
	let env = env.clone();
	Ok(Times::new(start, end, move |index| iteratee.call(&[Value::I64(index)], &env)).boxed())
}

/// `[values]`
fn to_iterator(args: &[Value], _env: &Arc<TaskEnvironment>, _table: &FunctionLookupTable) -> Result<BoxIterator> {
	match args {
		[Value::List(values)] => Ok(FromArray::new(values.clone()).boxed()),
		_ => Err(Error::invalid_arguments("toIterator", "expected [values]")),
	}
}

fn map(
	_args: &[Value], preceding: BoxIterator, iteratee: Callable, env: &Arc<TaskEnvironment>,
) -> Result<BoxIterator> {
	let env = env.clone();
	Ok(Map::new(preceding, move |item| iteratee.call(&[item], &env)).boxed())
}

fn filter(
	_args: &[Value], preceding: BoxIterator, predicate: Callable, env: &Arc<TaskEnvironment>,
) -> Result<BoxIterator> {
	let env = env.clone();
	Ok(Filter::new(preceding, move |item: &Value| {
		match predicate.call(std::slice::from_ref(item), &env)? {
			Value::Bool(keep) => Ok(keep),
			other => Err(Error::invalid_arguments(
				"filter",
				format!(
					"predicate `{}` returned {}, expected a bool",
					predicate.id(),
					other.type_name()
				),
			)),
		}
	})
	.boxed())
}

/// `[seed]` or `[seed, combiner]`. The combiner merges the results of several tasks and
/// is applied by whoever collects them, not here.
fn reduce(
	args: &[Value], preceding: BoxIterator, iteratee: Callable, env: &Arc<TaskEnvironment>,
) -> Result<BoxIterator> {
	let seed = match args {
		[seed] | [seed, Value::Function(_)] => seed.clone(),
		_ => {
			return Err(Error::invalid_arguments(
				"reduce",
				"expected [seed] or [seed, combiner]",
			))
		}
	};
	let env = env.clone();
	Ok(Reduce::new(seed, preceding, move |acc, item| iteratee.call(&[acc, item], &env)).boxed())
}

#[allow(clippy::unnecessary_wraps)]
fn identity(args: &[Value], _env: &TaskEnvironment) -> Result<Value, BoxError> {
	Ok(args.first().cloned().unwrap_or_default())
}
