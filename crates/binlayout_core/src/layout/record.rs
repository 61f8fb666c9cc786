use crate::layout::codec::CodecOptions;
use crate::layout::decode::decode_root;
use crate::layout::def::TypeDef;
use crate::layout::encode::encode_root;
use crate::layout::registry::Registry;
use crate::layout::{Result, StructValue};

/// Rust type with a declared binary layout.
///
/// Implementors describe their fields once through [`Layout::type_def`] and
/// convert to and from the dynamic [`StructValue`] model.
pub trait Layout: Sized {
	/// Registry name; must equal `type_def().name`.
	const TYPE_NAME: &'static str;

	/// Field declarations for this type.
	fn type_def() -> TypeDef;

	/// Register record types this one embeds.
	fn register_nested(_registry: &Registry) -> Result<()> {
		Ok(())
	}

	/// Convert to the dynamic record model.
	fn to_record(&self) -> StructValue;

	/// Build from a decoded record.
	fn from_record(record: StructValue) -> Result<Self>;
}

impl Registry {
	/// Register `T` and the types it embeds, once.
	pub fn register_layout<T: Layout>(&self) -> Result<()> {
		if self.contains(T::TYPE_NAME) {
			return Ok(());
		}
		T::register_nested(self)?;
		self.register(T::type_def())
	}

	/// Decode one record of the registered type `name` from the start of `bytes`.
	pub fn decode_value(&self, name: &str, bytes: &[u8], opt: &CodecOptions) -> Result<StructValue> {
		let schema = self.compile(name)?;
		decode_root(&schema, bytes, opt)
	}

	/// Encode `value` using the layout registered under its type name.
	pub fn encode_value(&self, value: &StructValue, opt: &CodecOptions) -> Result<Vec<u8>> {
		let schema = self.compile(&value.type_name)?;
		encode_root(&schema, value, opt)
	}
}

/// Decode a `T` from `bytes` with the global registry and default options.
pub fn decode<T: Layout>(bytes: &[u8]) -> Result<T> {
	decode_with(Registry::global(), bytes, &CodecOptions::default())
}

/// Encode `value` with the global registry and default options.
pub fn encode<T: Layout>(value: &T) -> Result<Vec<u8>> {
	encode_with(Registry::global(), value, &CodecOptions::default())
}

/// Decode a `T` with an explicit registry and options.
pub fn decode_with<T: Layout>(registry: &Registry, bytes: &[u8], opt: &CodecOptions) -> Result<T> {
	registry.register_layout::<T>()?;
	let record = registry.decode_value(T::TYPE_NAME, bytes, opt)?;
	T::from_record(record)
}

/// Encode `value` with an explicit registry and options.
pub fn encode_with<T: Layout>(registry: &Registry, value: &T, opt: &CodecOptions) -> Result<Vec<u8>> {
	registry.register_layout::<T>()?;
	registry.encode_value(&value.to_record(), opt)
}
