//! Resolving [`FunctionCallDescriptor`]s back into something invocable.
//!
//! Every process builds one [`FunctionLookupTable`] at startup, registering the same static
//! implementations and the same caller functions under the same ids, and then passes it by
//! reference to every job it executes. Descriptors only ever carry ids and plain
//! [`Value`]s, so the table is what gives them behaviour on the far side.

use std::{
	collections::{hash_map::Entry, HashMap}, fmt, sync::Arc
};

use crate::{
	iter::{BoxIterator, FastIterator, FromArray}, BoxError, Error, FunctionCallDescriptor, FunctionId, Result, StaticFunction, TaskEnvironment, Value
};

/// Produces the initial iterator of a task from the generator's bound arguments.
pub type GeneratorFn =
	fn(args: &[Value], env: &Arc<TaskEnvironment>, table: &FunctionLookupTable) -> Result<BoxIterator>;

/// Wraps `preceding` in a new iterator that applies `iteratee`, e.g. `map`.
pub type CombinatorFn = fn(
	args: &[Value],
	preceding: BoxIterator,
	iteratee: Callable,
	env: &Arc<TaskEnvironment>,
) -> Result<BoxIterator>;

/// Caller logic that can be named in a descriptor.
///
/// `args` holds the descriptor's bound arguments, in declaration order, followed by the
/// inputs of this particular invocation (the item for `map`, the accumulator and item for
/// `reduce`, and so on).
pub trait Function: Send + Sync {
	fn call(&self, args: &[Value], env: &TaskEnvironment) -> Result<Value, BoxError>;

	/// The number of bound arguments this function expects, if fixed.
	fn arity(&self) -> Option<usize> {
		None
	}
}

impl<F> Function for F
where
	F: Fn(&[Value], &TaskEnvironment) -> Result<Value, BoxError> + Send + Sync,
{
	#[inline(always)]
	fn call(&self, args: &[Value], env: &TaskEnvironment) -> Result<Value, BoxError> {
		self(args, env)
	}
}

struct WithArity<F>(F, usize);
impl<F> Function for WithArity<F>
where
	F: Function,
{
	fn call(&self, args: &[Value], env: &TaskEnvironment) -> Result<Value, BoxError> {
		self.0.call(args, env)
	}
	fn arity(&self) -> Option<usize> {
		Some(self.1)
	}
}

/// What a [`StaticFunction`] id resolves to.
#[derive(Clone)]
pub enum StaticImplementation {
	Generator(GeneratorFn),
	Combinator(CombinatorFn),
	Function(Arc<dyn Function>),
}

impl fmt::Debug for StaticImplementation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Generator(_) => "Generator",
			Self::Combinator(_) => "Combinator",
			Self::Function(_) => "Function",
		})
	}
}

/// A descriptor resolved against a [`FunctionLookupTable`]: an implementation together with
/// the arguments the descriptor bound to it.
#[derive(Clone, Debug)]
pub struct Callable {
	id: String,
	args: Vec<Value>,
	implementation: StaticImplementation,
}

impl Callable {
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn bound_args(&self) -> &[Value] {
		&self.args
	}

	/// Builds the first iterator of a pipeline.
	///
	/// A plain function may act as a generator by returning a list, which it should compute
	/// from [`TaskEnvironment::task_index`] and [`TaskEnvironment::values_per_task`].
	pub fn generate(&self, env: &Arc<TaskEnvironment>, table: &FunctionLookupTable) -> Result<BoxIterator> {
		match &self.implementation {
			StaticImplementation::Generator(generate) => generate(&self.args, env, table),
			StaticImplementation::Function(_) => match self.call(&[], env)? {
				Value::List(values) => Ok(FromArray::new(values).boxed()),
				other => Err(Error::invalid_arguments(
					self.id.clone(),
					format!(
						"a generator must return a list, got {}",
						other.type_name()
					),
				)),
			},
			StaticImplementation::Combinator(_) => Err(self.misused("a generator")),
		}
	}

	/// Applies this combinator to `preceding`.
	pub fn apply(
		&self, preceding: BoxIterator, iteratee: Callable, env: &Arc<TaskEnvironment>,
	) -> Result<BoxIterator> {
		match &self.implementation {
			StaticImplementation::Combinator(apply) => apply(&self.args, preceding, iteratee, env),
			_ => Err(self.misused("an operation")),
		}
	}

	/// Invokes this function with its bound arguments followed by `inputs`.
	///
	/// Whatever the function raises is wrapped in [`Error::TaskExecution`].
	pub fn call(&self, inputs: &[Value], env: &TaskEnvironment) -> Result<Value> {
		let function = match &self.implementation {
			StaticImplementation::Function(function) => function,
			_ => return Err(self.misused("a function")),
		};
		let result = if self.args.is_empty() {
			function.call(inputs, env)
		} else {
			let mut args = Vec::with_capacity(self.args.len() + inputs.len());
			args.extend_from_slice(&self.args);
			args.extend_from_slice(inputs);
			function.call(&args, env)
		};
		result.map_err(|source| Error::TaskExecution {
			function: self.id.clone(),
			source,
		})
	}

	fn misused(&self, role: &str) -> Error {
		Error::reconstruction(self.id.clone(), format!("cannot be used as {}", role))
	}
}

/// The per-process registry of invocable implementations.
///
/// Grows during startup and never shrinks. Registration takes `&mut self`, so once the
/// table is shared by reference with the executor it is fixed.
#[derive(Clone, Default)]
pub struct FunctionLookupTable {
	statics: HashMap<StaticFunction, StaticImplementation>,
	functions: HashMap<FunctionId, Arc<dyn Function>>,
}

impl FunctionLookupTable {
	/// An empty table, with not even the builtin operations registered.
	pub fn new() -> Self {
		Self::default()
	}

	/// A table with every [`StaticFunction`] registered.
	pub fn with_builtins() -> Self {
		let mut table = Self::new();
		crate::builtins::register(&mut table);
		table
	}

	/// Registers the implementation of a well-known operation, replacing any previous one.
	pub fn register_static(&mut self, id: StaticFunction, implementation: StaticImplementation) {
		let _ = self.statics.insert(id, implementation);
	}

	/// Registers caller logic under `id`.
	///
	/// # Panics
	///
	/// Panics if `id` is already registered, as that would make the same descriptor mean
	/// different things in different processes.
	pub fn register<F>(&mut self, id: impl Into<FunctionId>, function: F) -> &mut Self
	where
		F: Function + 'static,
	{
		match self.functions.entry(id.into()) {
			Entry::Occupied(entry) => panic!("function `{}` registered twice", entry.key()),
			Entry::Vacant(entry) => {
				let _ = entry.insert(Arc::new(function));
			}
		}
		self
	}

	/// Like [`register`](Self::register), additionally checking at reconstruction time that
	/// descriptors bind exactly `arity` arguments.
	pub fn register_with_arity<F>(&mut self, id: impl Into<FunctionId>, arity: usize, function: F) -> &mut Self
	where
		F: Function + 'static,
	{
		self.register(id, WithArity(function, arity))
	}

	pub fn contains(&self, id: &FunctionId) -> bool {
		self.functions.contains_key(id)
	}

	/// Resolves a [`FunctionCallDescriptor::Dynamic`] into a callable bound to its arguments.
	pub fn register_dynamic(&self, descriptor: &FunctionCallDescriptor) -> Result<Callable> {
		let (id, args) = match descriptor {
			FunctionCallDescriptor::Dynamic { id, args } => (id, args),
			FunctionCallDescriptor::Static { id, .. } => {
				return Err(Error::reconstruction(
					id.to_string(),
					"expected a dynamic function",
				))
			}
		};
		let function = self
			.functions
			.get(id)
			.ok_or_else(|| Error::reconstruction(id.as_str(), "no function registered under this id"))?;
		if let Some(arity) = function.arity() {
			if arity != args.len() {
				return Err(Error::reconstruction(
					id.as_str(),
					format!("expected {} bound arguments, got {}", arity, args.len()),
				));
			}
		}
		Ok(Callable {
			id: id.to_string(),
			args: args.clone(),
			implementation: StaticImplementation::Function(function.clone()),
		})
	}

	/// Resolves any descriptor.
	pub fn resolve(&self, descriptor: &FunctionCallDescriptor) -> Result<Callable> {
		match descriptor {
			FunctionCallDescriptor::Static { id, args } => {
				let implementation = self
					.statics
					.get(id)
					.ok_or(Error::UnknownStaticFunction(*id))?;
				Ok(Callable {
					id: id.to_string(),
					args: args.clone(),
					implementation: implementation.clone(),
				})
			}
			FunctionCallDescriptor::Dynamic { .. } => self.register_dynamic(descriptor),
		}
	}
}

impl fmt::Debug for FunctionLookupTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut functions = self.functions.keys().collect::<Vec<_>>();
		functions.sort();
		f.debug_struct("FunctionLookupTable")
			.field("statics", &self.statics.len())
			.field("functions", &functions)
			.finish()
	}
}
