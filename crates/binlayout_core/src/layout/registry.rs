use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::layout::def::{FieldType, TypeDef};
use crate::layout::options::{FieldOptions, default_options};
use crate::layout::schema::{StructDescriptor, compile_struct};
use crate::layout::{LayoutError, Result};

type CompileSlot = Arc<OnceLock<Result<Arc<StructDescriptor>>>>;

/// Type definitions by name plus their compiled schemas.
///
/// Each type is compiled at most once; concurrent first uses of the same
/// type block on one compilation and observe the same result, success or
/// failure.
pub struct Registry {
	types: RwLock<HashMap<Box<str>, Arc<TypeDef>>>,
	compiled: Mutex<HashMap<Box<str>, CompileSlot>>,
	defaults: Option<FieldOptions>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	/// Empty registry compiling against the process-wide defaults.
	pub fn new() -> Self {
		Self {
			types: RwLock::new(HashMap::new()),
			compiled: Mutex::new(HashMap::new()),
			defaults: None,
		}
	}

	/// Empty registry compiling against `defaults` instead of the process-wide ones.
	pub fn with_defaults(defaults: FieldOptions) -> Self {
		Self {
			defaults: Some(defaults),
			..Self::new()
		}
	}

	/// Process-wide registry used by the typed entry points.
	pub fn global() -> &'static Registry {
		static GLOBAL: OnceLock<Registry> = OnceLock::new();
		GLOBAL.get_or_init(Registry::new)
	}

	/// Add a type definition.
	///
	/// Registering an identical definition again is a no-op.
	pub fn register(&self, def: TypeDef) -> Result<()> {
		let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
		if let Some(existing) = types.get(&def.name) {
			if existing.same_layout(&def) {
				return Ok(());
			}
			return Err(LayoutError::DuplicateType {
				type_name: def.name.to_string(),
			});
		}
		types.insert(def.name.clone(), Arc::new(def));
		Ok(())
	}

	/// Whether `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.types.read().unwrap_or_else(PoisonError::into_inner).contains_key(name)
	}

	/// Registered definition for `name`.
	pub fn type_def(&self, name: &str) -> Option<Arc<TypeDef>> {
		self.types.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
	}

	/// Registered type names, sorted.
	pub fn type_names(&self) -> Vec<Box<str>> {
		let mut names: Vec<Box<str>> = self.types.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
		names.sort();
		names
	}

	/// Compiled schema for `name`, compiling on first use.
	pub fn compile(&self, name: &str) -> Result<Arc<StructDescriptor>> {
		let def = self.type_def(name).ok_or_else(|| LayoutError::UnknownType {
			path: name.to_owned(),
			type_name: name.to_owned(),
		})?;

		let slot = {
			let mut compiled = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
			compiled.entry(def.name.clone()).or_default().clone()
		};

		slot.get_or_init(|| self.compile_uncached(&def)).clone()
	}

	fn compile_uncached(&self, def: &TypeDef) -> Result<Arc<StructDescriptor>> {
		let defaults = self.defaults.clone().unwrap_or_else(default_options);

		let result = self
			.check_acyclic(def, def.name.as_ref(), &mut vec![def.name.clone()], &mut HashSet::new())
			.and_then(|()| {
				let mut child = |name: &str, field_path: &str| self.compile(name).map_err(|err| err.nested_under(field_path));
				compile_struct(def, &defaults, &mut child)
			})
			.map(Arc::new);

		match &result {
			Ok(schema) => debug!(type_name = %def.name, fields = schema.fields.len(), "compiled layout"),
			Err(err) => debug!(type_name = %def.name, error = %err, "layout compile failed; caching failure"),
		}
		result
	}

	/// Reject record types that reach themselves through nested fields.
	///
	/// `done` holds types whose whole subtree is already known to be acyclic.
	fn check_acyclic(&self, def: &TypeDef, path: &str, stack: &mut Vec<Box<str>>, done: &mut HashSet<Box<str>>) -> Result<()> {
		for field in &def.fields {
			let Some(target) = struct_target(&field.ty) else {
				continue;
			};
			let field_path = format!("{path}.{}", field.name);
			if stack.iter().any(|name| name.as_ref() == target) {
				return Err(LayoutError::RecursiveLayout {
					path: field_path,
					type_name: target.to_owned(),
				});
			}
			if done.contains(target) {
				continue;
			}
			let Some(child) = self.type_def(target) else {
				continue;
			};
			stack.push(child.name.clone());
			self.check_acyclic(&child, &field_path, stack, done)?;
			stack.pop();
			done.insert(child.name.clone());
		}
		Ok(())
	}
}

fn struct_target(ty: &FieldType) -> Option<&str> {
	match ty {
		FieldType::Struct(name) => Some(name),
		FieldType::Seq(inner) | FieldType::Optional(inner) => struct_target(inner),
		_ => None,
	}
}

#[cfg(test)]
mod tests;
