use crate::layout::{LayoutError, Result};

/// Byte order for multi-byte integers, floats and length prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
	/// Most significant byte first.
	#[default]
	Big,
	/// Least significant byte first.
	Little,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Big => "big",
			Self::Little => "little",
		}
	}
}

/// Bounded, seekable cursor over an immutable byte slice.
pub struct Reader<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	/// Create a reader at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Total stream length.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether the stream is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to absolute position `pos`; the end of the stream is a valid target.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(eof(self.bytes.len(), pos - self.bytes.len(), 0));
		}
		self.pos = pos;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(eof(self.pos, n, self.remaining()));
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a `width`-byte unsigned integer (1..=8) and widen to `u64`.
	pub fn read_uint(&mut self, width: usize, endianness: Endianness) -> Result<u64> {
		debug_assert!((1..=8).contains(&width));
		let raw = self.read_exact(width)?;
		let mut buf = [0_u8; 8];
		Ok(match endianness {
			Endianness::Big => {
				buf[8 - width..].copy_from_slice(raw);
				u64::from_be_bytes(buf)
			}
			Endianness::Little => {
				buf[..width].copy_from_slice(raw);
				u64::from_le_bytes(buf)
			}
		})
	}

	/// Read a zero-terminated byte string without the terminator.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = &self.bytes[self.pos..];
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			return Err(eof(self.pos, rem.len() + 1, rem.len()));
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}
}

/// Growable, seekable byte sink.
///
/// Writing past the current end zero-fills the gap.
#[derive(Debug, Default)]
pub struct Writer {
	bytes: Vec<u8>,
	pos: usize,
}

impl Writer {
	/// Create an empty writer at position 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Bytes written so far, including zero-filled gaps.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Move to absolute position `pos`, possibly past the end.
	pub fn seek(&mut self, pos: usize) {
		self.pos = pos;
	}

	/// Write `data` at the current position and advance.
	pub fn write_all(&mut self, data: &[u8]) {
		let end = self.pos + data.len();
		if self.bytes.len() < end {
			self.bytes.resize(end, 0);
		}
		self.bytes[self.pos..end].copy_from_slice(data);
		self.pos = end;
	}

	/// Write one byte.
	pub fn write_u8(&mut self, value: u8) {
		self.write_all(&[value]);
	}

	/// Write `n` copies of `byte`.
	pub fn write_fill(&mut self, byte: u8, n: usize) {
		let end = self.pos + n;
		if self.bytes.len() < end {
			self.bytes.resize(end, 0);
		}
		self.bytes[self.pos..end].fill(byte);
		self.pos = end;
	}

	/// Write the low `width` bytes (1..=8) of `value`.
	pub fn write_uint(&mut self, width: usize, value: u64, endianness: Endianness) {
		debug_assert!((1..=8).contains(&width));
		match endianness {
			Endianness::Big => {
				let buf = value.to_be_bytes();
				self.write_all(&buf[8 - width..]);
			}
			Endianness::Little => {
				let buf = value.to_le_bytes();
				self.write_all(&buf[..width]);
			}
		}
	}

	/// Advance to `end`, zero-filling only bytes past the current length.
	pub fn pad_to(&mut self, end: usize) {
		if self.bytes.len() < end {
			self.bytes.resize(end, 0);
		}
		self.pos = end;
	}

	/// View the written bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Consume the writer and return its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}
}

fn eof(at: usize, need: usize, rem: usize) -> LayoutError {
	LayoutError::UnexpectedEndOfStream {
		path: String::new(),
		at,
		need,
		rem,
	}
}

#[cfg(test)]
mod tests;
