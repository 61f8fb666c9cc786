//! Declarative binary layouts: tag-driven field options, compiled record schemas, and a codec engine.

/// Layout tags, schema compilation, registry, and encode/decode.
pub mod layout;
