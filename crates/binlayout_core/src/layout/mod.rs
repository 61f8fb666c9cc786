mod bytes;
mod codec;
mod decode;
mod def;
mod encode;
mod error;
mod options;
mod record;
mod registry;
mod schema;
mod tag;
mod value;

/// Byte cursors used by the engine and by custom codecs.
pub use bytes::{Endianness, Reader, Writer};
/// Runtime codec switches.
pub use codec::CodecOptions;
/// Declared record types and the self-serialization hook.
pub use def::{CustomCodec, FieldDef, FieldType, FloatKind, IntKind, TypeDef};
/// Error and result aliases.
pub use error::{LayoutError, Result, TagValueKind};
/// Resolved per-field options and the process-wide defaults.
pub use options::{FieldOptions, StringType, default_options, set_default_options};
/// Typed layout trait and entry points.
pub use record::{Layout, decode, decode_with, encode, encode_with};
/// Type registry and compile cache.
pub use registry::Registry;
/// Compiled schema types.
pub use schema::{FieldDescriptor, Length, Position, StructDescriptor, ValueKind};
/// Layout tag parser.
pub use tag::{Tag, TagResult, TagValue, parse_tag_value};
/// Runtime value model.
pub use value::{FieldValue, FromValue, StructValue, Value};
