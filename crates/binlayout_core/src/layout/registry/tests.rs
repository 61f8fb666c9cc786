use std::sync::{Arc, Barrier};

use super::Registry;
use crate::layout::def::{FieldDef, FieldType, IntKind, TypeDef};
use crate::layout::options::{FieldOptions, StringType};
use crate::layout::{LayoutError, ValueKind};

fn header() -> TypeDef {
	TypeDef::new("Header")
		.field(FieldDef::new("magic", FieldType::String).tag("len=4"))
		.field(FieldDef::new("count", FieldType::Int(IntKind::U16)))
}

fn archive() -> TypeDef {
	TypeDef::new("Archive")
		.field(FieldDef::new("header", FieldType::record("Header")))
		.field(FieldDef::new("sizes", FieldType::seq(FieldType::Int(IntKind::U32))).tag("len=2"))
}

#[test]
fn nested_types_compile_once_and_are_shared() {
	let registry = Registry::new();
	registry.register(header()).expect("register header");
	registry.register(archive()).expect("register archive");

	let outer = registry.compile("Archive").expect("archive compiles");
	let inner = registry.compile("Header").expect("header compiles");
	let child = outer.fields[0].child.as_ref().expect("struct field has child");
	assert!(Arc::ptr_eq(child, &inner));
	assert!(Arc::ptr_eq(&outer, &registry.compile("Archive").expect("cached")));
	assert_eq!(outer.fields[1].kind, ValueKind::Seq(Box::new(ValueKind::Int(IntKind::U32))));
}

#[test]
fn unknown_root_type_is_reported() {
	let registry = Registry::new();
	let err = registry.compile("Nope").expect_err("not registered");
	assert!(matches!(err, LayoutError::UnknownType { ref type_name, .. } if type_name == "Nope"));
}

#[test]
fn unknown_nested_type_fails_the_outer_type() {
	let registry = Registry::new();
	registry.register(archive()).expect("register archive");
	let err = registry.compile("Archive").expect_err("header missing");
	assert_eq!(err.path(), Some("Archive.header"));
}

#[test]
fn nested_errors_are_rooted_at_the_outer_field() {
	let registry = Registry::new();
	registry
		.register(TypeDef::new("Header").field(FieldDef::new("magic", FieldType::String)))
		.expect("register header");
	registry.register(archive()).expect("register archive");

	let err = registry.compile("Archive").expect_err("header has no length");
	assert!(matches!(err, LayoutError::MissingLength { ref path } if path == "Archive.header.magic"));

	let inner = registry.compile("Header").expect_err("cached failure");
	assert_eq!(inner.path(), Some("Header.magic"));
}

#[test]
fn direct_recursion_is_rejected() {
	let registry = Registry::new();
	registry
		.register(TypeDef::new("Node").field(FieldDef::new("next", FieldType::optional(FieldType::record("Node")))))
		.expect("register");
	let err = registry.compile("Node").expect_err("recursive");
	assert!(matches!(err, LayoutError::RecursiveLayout { ref path, ref type_name } if path == "Node.next" && type_name == "Node"));
}

#[test]
fn mutual_recursion_is_rejected_from_either_side() {
	let registry = Registry::new();
	registry
		.register(TypeDef::new("A").field(FieldDef::new("b", FieldType::record("B"))))
		.expect("register a");
	registry
		.register(TypeDef::new("B").field(FieldDef::new("items", FieldType::seq(FieldType::record("A"))).tag("len=1")))
		.expect("register b");

	let err = registry.compile("A").expect_err("recursive");
	assert!(matches!(err, LayoutError::RecursiveLayout { ref path, .. } if path == "A.b.items"));
	assert!(matches!(registry.compile("B"), Err(LayoutError::RecursiveLayout { .. })));
}

#[test]
fn compile_failures_are_cached() {
	let registry = Registry::new();
	registry
		.register(TypeDef::new("Bad").field(FieldDef::new("a", FieldType::Bool).tag("mask=1")))
		.expect("register");
	let first = registry.compile("Bad").expect_err("bad mask");
	let second = registry.compile("Bad").expect_err("still bad");
	assert_eq!(first, second);
}

#[test]
fn conflicting_registration_is_rejected() {
	let registry = Registry::new();
	registry.register(header()).expect("register");
	registry.register(header()).expect("identical re-register is a no-op");
	let err = registry
		.register(TypeDef::new("Header").field(FieldDef::new("x", FieldType::Bool)))
		.expect_err("conflict");
	assert!(matches!(err, LayoutError::DuplicateType { .. }));
	assert_eq!(registry.type_names(), vec![Box::<str>::from("Header")]);
}

#[test]
fn explicit_defaults_are_threaded_through_compilation() {
	let registry = Registry::with_defaults(FieldOptions {
		string_type: StringType::Null,
		..FieldOptions::BASELINE
	});
	registry
		.register(TypeDef::new("Name").field(FieldDef::new("name", FieldType::String)))
		.expect("register");
	let schema = registry.compile("Name").expect("null strings need no length");
	assert_eq!(schema.fields[0].options.string_type, StringType::Null);
}

#[test]
fn concurrent_first_compiles_share_one_schema() {
	let registry = Registry::new();
	registry.register(header()).expect("register header");
	registry.register(archive()).expect("register archive");

	let barrier = Barrier::new(4);
	let schemas: Vec<_> = std::thread::scope(|scope| {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				scope.spawn(|| {
					barrier.wait();
					registry.compile("Archive").expect("compiles")
				})
			})
			.collect();
		handles.into_iter().map(|handle| handle.join().expect("thread joins")).collect()
	});

	for schema in &schemas[1..] {
		assert!(Arc::ptr_eq(schema, &schemas[0]));
	}
}

#[test]
fn shared_nested_types_are_checked_once() {
	let registry = Registry::new();
	let depth = 40;
	for level in 0..depth {
		let next = FieldType::record(format!("Level{}", level + 1));
		registry
			.register(
				TypeDef::new(format!("Level{level}"))
					.field(FieldDef::new("left", next.clone()))
					.field(FieldDef::new("right", next)),
			)
			.expect("register level");
	}
	registry
		.register(TypeDef::new(format!("Level{depth}")).field(FieldDef::new("leaf", FieldType::Int(IntKind::U8))))
		.expect("register leaf");

	let schema = registry.compile("Level0").expect("diamond compiles");
	assert_eq!(schema.fields.len(), 2);
}
