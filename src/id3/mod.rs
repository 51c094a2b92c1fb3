//! ID3 specific items
//!
//! Only the pieces of ID3 this crate needs to coexist with other tags are
//! here: the full ID3v1 model, and just enough of ID3v2 to locate and size a
//! tag at the head of a file. ID3v2 frames are never decoded.

pub mod v1;
pub mod v2;

use crate::error::Result;
use crate::io::read_header_window;
use v2::Id3v2Header;

use std::io::{Read, Seek, SeekFrom};

// The locators never mutate the file, and leave the stream position
// unspecified.

/// Searches the head of the file for an ID3v2 tag
///
/// Returns the tag's offset and complete size (header, frames, and footer
/// when the footer flag is set). The signature is searched for within the
/// first kilobyte rather than only at offset zero, since some writers pad
/// before the tag.
///
/// # Errors
///
/// * `reader` fails a seek or read
pub fn find_id3v2<R>(reader: &mut R) -> Result<Option<(u64, u64)>>
where
	R: Read + Seek,
{
	let buffer = read_header_window(reader, 1024)?;

	if buffer.len() < Id3v2Header::SIZE {
		return Ok(None);
	}

	for offset in 0..=buffer.len() - Id3v2Header::SIZE {
		if &buffer[offset..offset + 3] != b"ID3" {
			continue;
		}

		if let Some(header) = Id3v2Header::parse(&buffer[offset..offset + Id3v2Header::SIZE]) {
			return Ok(Some((
				offset as u64,
				u64::from(header.complete_tag_size()),
			)));
		}
	}

	Ok(None)
}

/// Checks the last 128 bytes of the file for an ID3v1 tag
///
/// # Errors
///
/// * `reader` fails a seek or read
pub fn find_id3v1<R>(reader: &mut R) -> Result<Option<u64>>
where
	R: Read + Seek,
{
	let len = reader.seek(SeekFrom::End(0))?;

	if len < 128 {
		return Ok(None);
	}

	reader.seek(SeekFrom::Start(len - 128))?;

	let mut id3v1_header = [0; 3];
	reader.read_exact(&mut id3v1_header)?;

	if &id3v1_header == b"TAG" {
		Ok(Some(len - 128))
	} else {
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::{find_id3v1, find_id3v2};

	use std::io::Cursor;

	fn synch_size(size: u32) -> [u8; 4] {
		[
			((size >> 21) & 0x7F) as u8,
			((size >> 14) & 0x7F) as u8,
			((size >> 7) & 0x7F) as u8,
			(size & 0x7F) as u8,
		]
	}

	#[test]
	fn id3v2_at_start() {
		let mut file = vec![b'I', b'D', b'3', 4, 0, 0];
		file.extend_from_slice(&synch_size(1000));
		file.resize(2048, 0xAA);

		let found = find_id3v2(&mut Cursor::new(file)).unwrap();

		assert_eq!(found, Some((0, 1010)));
	}

	#[test]
	fn id3v2_footer_counted() {
		let mut file = vec![b'I', b'D', b'3', 4, 0, 0x10];
		file.extend_from_slice(&synch_size(256));
		file.resize(2048, 0);

		let found = find_id3v2(&mut Cursor::new(file)).unwrap();

		assert_eq!(found, Some((0, 276)));
	}

	#[test]
	fn id3v2_after_padding() {
		let mut file = vec![0_u8; 5];
		file.extend_from_slice(&[b'I', b'D', b'3', 3, 0, 0]);
		file.extend_from_slice(&synch_size(64));
		file.resize(512, 0);

		let found = find_id3v2(&mut Cursor::new(file)).unwrap();

		assert_eq!(found, Some((5, 74)));
	}

	#[test]
	fn id3v2_rejects_invalid_size_bytes() {
		// 0x80 in a size byte is not synchsafe
		let mut file = vec![b'I', b'D', b'3', 4, 0, 0, 0x80, 0, 0, 0];
		file.resize(512, 0);

		assert_eq!(find_id3v2(&mut Cursor::new(file)).unwrap(), None);
	}

	#[test]
	fn id3v1_tail_probe() {
		let mut file = vec![0_u8; 1000];
		let tag_start = file.len();
		file.extend_from_slice(b"TAG");
		file.resize(tag_start + 128, 0);

		assert_eq!(
			find_id3v1(&mut Cursor::new(file)).unwrap(),
			Some(tag_start as u64)
		);

		assert_eq!(find_id3v1(&mut Cursor::new(vec![0_u8; 127])).unwrap(), None);
		assert_eq!(find_id3v1(&mut Cursor::new(vec![0_u8; 500])).unwrap(), None);
	}
}
