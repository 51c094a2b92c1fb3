mod ape_tag;
mod item;
mod read;

pub use ape_tag::ApeTag;
pub use item::{ApeItem, ItemValue};

use crate::error::Result;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

pub(crate) const APE_PREAMBLE: &[u8; 8] = b"APETAGEX";

const HAS_HEADER: u32 = 1 << 31;
const HAS_FOOTER: u32 = 1 << 30;
const IS_HEADER: u32 = 1 << 29;

// An APE tag ends (and, with a v2 header, begins) with a 32 byte block:
// preamble, version, the size of the items plus one block, the item count,
// flags, and 8 reserved bytes.
#[derive(Copy, Clone)]
pub(crate) struct ApeTagFooter {
	pub(crate) version: u32,
	pub(crate) size: u32,
	pub(crate) item_count: u32,
	pub(crate) has_header: bool,
}

impl ApeTagFooter {
	pub(crate) const SIZE: u64 = 32;

	pub(crate) fn parse(data: &[u8; 32]) -> Option<Self> {
		if &data[..8] != APE_PREAMBLE {
			return None;
		}

		let fields = &mut &data[8..];

		// The reads cannot fail, the input is fixed size
		let version = fields.read_u32::<LittleEndian>().ok()?;
		let size = fields.read_u32::<LittleEndian>().ok()?;
		let item_count = fields.read_u32::<LittleEndian>().ok()?;
		let flags = fields.read_u32::<LittleEndian>().ok()?;

		// The size field covers the items and this block, never less
		if size < Self::SIZE as u32 {
			return None;
		}

		Some(Self {
			version,
			size,
			item_count,
			has_header: flags & HAS_HEADER != 0,
		})
	}

	pub(crate) fn complete_tag_size(&self) -> u32 {
		if self.has_header {
			self.size + Self::SIZE as u32
		} else {
			self.size
		}
	}
}

// Where an APE tag was found on disk
#[derive(Copy, Clone)]
pub(crate) struct ApeTagLocation {
	pub(crate) location: u64,
	pub(crate) size: u64,
	pub(crate) item_count: u32,
	pub(crate) has_header: bool,
}

/// Probes the file tail for an APE tag footer
///
/// `id3v1` bounds the probe when an ID3v1 tag follows the APE tag; otherwise
/// the file length is used. The returned location is the first byte of the
/// tag, including its header when the footer indicates one is present.
pub(crate) fn find_ape<R>(reader: &mut R, id3v1: Option<u64>) -> Result<Option<ApeTagLocation>>
where
	R: Read + Seek,
{
	let file_len = reader.seek(SeekFrom::End(0))?;
	let probe_end = id3v1.unwrap_or(file_len);

	if probe_end < ApeTagFooter::SIZE {
		return Ok(None);
	}

	reader.seek(SeekFrom::Start(probe_end - ApeTagFooter::SIZE))?;

	let mut block = [0; 32];
	reader.read_exact(&mut block)?;

	if let Some(footer) = ApeTagFooter::parse(&block) {
		let size = u64::from(footer.complete_tag_size());

		if size <= probe_end {
			log::debug!(
				"APE: found a v{} tag of {} bytes at the file tail",
				footer.version / 1000,
				size
			);

			return Ok(Some(ApeTagLocation {
				location: probe_end - size,
				size,
				item_count: footer.item_count,
				has_header: footer.has_header,
			}));
		}
	}

	Ok(None)
}

/// Reads the tag at a location previously returned by [`find_ape`]
pub(crate) fn read_ape_tag<R>(reader: &mut R, location: &ApeTagLocation) -> Result<ApeTag>
where
	R: Read + Seek,
{
	let items_start = if location.has_header {
		location.location + ApeTagFooter::SIZE
	} else {
		location.location
	};

	reader.seek(SeekFrom::Start(items_start))?;

	read::read_ape_items(reader, location.item_count)
}

#[cfg(test)]
mod tests {
	use super::{find_ape, read_ape_tag, ApeTag, ItemValue};
	use crate::tag::TagBlock;

	use std::io::Cursor;

	fn tag_with_items() -> ApeTag {
		let mut tag = ApeTag::default();

		tag.insert_text("Title", "Foo title");
		tag.insert_text("Artist", "Bar artist");

		tag
	}

	#[test]
	fn find_at_file_tail() {
		let tag = tag_with_items();
		let rendered = tag.render();

		let mut file = vec![0xAB_u8; 999];
		file.extend_from_slice(&rendered);

		let mut reader = Cursor::new(file);
		let location = find_ape(&mut reader, None).unwrap().unwrap();

		assert_eq!(location.location, 999);
		assert_eq!(location.size, rendered.len() as u64);
		assert_eq!(location.item_count, 2);
		assert!(location.has_header);

		let reparsed = read_ape_tag(&mut reader, &location).unwrap();

		assert_eq!(
			reparsed.get("TITLE").map(super::ApeItem::value),
			Some(&ItemValue::Text(String::from("Foo title")))
		);
	}

	#[test]
	fn find_bounded_by_id3v1() {
		let tag = tag_with_items();
		let rendered = tag.render();
		let tag_len = rendered.len() as u64;

		let mut file = vec![0xAB_u8; 500];
		file.extend_from_slice(&rendered);
		file.extend_from_slice(&[0_u8; 128]);

		let id3v1_location = 500 + tag_len;

		let mut reader = Cursor::new(file);
		let location = find_ape(&mut reader, Some(id3v1_location)).unwrap().unwrap();

		assert_eq!(location.location, 500);

		// An unbounded probe lands on the 128 bytes of padding and misses
		assert!(find_ape(&mut reader, None).unwrap().is_none());
	}

	#[test]
	fn rejects_implausible_size() {
		let tag = tag_with_items();
		let rendered = tag.render();

		// Keep only the footer; the claimed size now exceeds the file
		let footer = &rendered[rendered.len() - 32..];

		let mut reader = Cursor::new(footer.to_vec());

		assert!(find_ape(&mut reader, None).unwrap().is_none());
	}
}
