use super::{Endianness, Reader, Writer};
use crate::layout::LayoutError;

#[test]
fn reads_widths_in_both_byte_orders() {
	let data = [0x12, 0x34, 0x56];
	let mut reader = Reader::new(&data);
	assert_eq!(reader.read_uint(2, Endianness::Big).expect("read"), 0x1234);
	reader.seek(0).expect("seek");
	assert_eq!(reader.read_uint(2, Endianness::Little).expect("read"), 0x3412);
	assert_eq!(reader.read_uint(1, Endianness::Big).expect("read"), 0x56);
	assert_eq!(reader.remaining(), 0);
}

#[test]
fn short_read_reports_position_and_need() {
	let mut reader = Reader::new(&[1, 2]);
	reader.seek(1).expect("seek");
	let err = reader.read_exact(4).expect_err("too short");
	assert!(matches!(err, LayoutError::UnexpectedEndOfStream { at: 1, need: 4, rem: 1, .. }));
}

#[test]
fn seek_to_end_is_allowed_but_not_past_it() {
	let mut reader = Reader::new(&[1, 2]);
	reader.seek(2).expect("end is a valid target");
	assert!(reader.seek(3).is_err());
}

#[test]
fn cstring_consumes_terminator() {
	let mut reader = Reader::new(b"hello\0world");
	assert_eq!(reader.read_cstring_bytes().expect("cstring"), b"hello");
	assert_eq!(reader.pos(), 6);
	assert!(reader.read_cstring_bytes().is_err(), "no terminator after world");
}

#[test]
fn writer_zero_fills_gaps() {
	let mut writer = Writer::new();
	writer.seek(3);
	writer.write_uint(2, 0xABCD, Endianness::Big);
	assert_eq!(writer.as_bytes(), &[0, 0, 0, 0xAB, 0xCD]);
	writer.seek(0);
	writer.write_u8(7);
	assert_eq!(writer.pos(), 1);
	assert_eq!(writer.into_bytes(), vec![7, 0, 0, 0xAB, 0xCD]);
}

#[test]
fn pad_to_keeps_existing_bytes() {
	let mut writer = Writer::new();
	writer.write_all(&[1, 2, 3, 4]);
	writer.seek(1);
	writer.pad_to(6);
	assert_eq!(writer.as_bytes(), &[1, 2, 3, 4, 0, 0]);
	assert_eq!(writer.pos(), 6);
}

#[test]
fn little_endian_write_truncates_to_width() {
	let mut writer = Writer::new();
	writer.write_uint(3, 0x0102_0304, Endianness::Little);
	assert_eq!(writer.as_bytes(), &[0x04, 0x03, 0x02]);
}
