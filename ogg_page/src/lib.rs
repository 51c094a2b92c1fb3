mod crc;
mod error;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub use crc::crc32;
pub use error::{PageError, Result};

/// The maximum number of lacing values a single page can describe
pub const MAX_SEGMENTS: usize = 255;
/// The maximum amount of content a single page can carry
pub const MAX_CONTENT: usize = 65025;

const CONTINUED_PACKET: u8 = 0x01;
const FIRST_PAGE_OF_STREAM: u8 = 0x02;
const LAST_PAGE_OF_STREAM: u8 = 0x04;

/// The fixed prefix and lacing table of an OGG page
///
/// A page describes the sizes of the packets *beginning* inside of it through
/// a table of "lacing values". Each lacing value contributes up to 255 bytes
/// to the current packet, and a value below 255 terminates it. A packet whose
/// final lacing value lands exactly on the end of the table continues on the
/// next page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageHeader {
	packet_sizes: Vec<u32>,
	first_packet_continued: bool,
	last_packet_completed: bool,
	first_page_of_stream: bool,
	last_page_of_stream: bool,
	granular_position: i64,
	serial: u32,
	sequence: i32,
	header_size: u32,
	data_size: u32,
}

impl PageHeader {
	/// Creates a header for a page yet to be written
	///
	/// `first_page_of_stream` is not taken here; on render it is derived from
	/// `sequence == 0`, and that derivation is also used for the stored field.
	pub fn new(
		packet_sizes: Vec<u32>,
		first_packet_continued: bool,
		last_packet_completed: bool,
		last_page_of_stream: bool,
		granular_position: i64,
		serial: u32,
		sequence: i32,
	) -> Self {
		let mut header = Self {
			packet_sizes,
			first_packet_continued,
			last_packet_completed,
			first_page_of_stream: sequence == 0,
			last_page_of_stream,
			granular_position,
			serial,
			sequence,
			header_size: 0,
			data_size: 0,
		};

		header.data_size = header.packet_sizes.iter().sum();
		header.header_size = 27 + header.lacing_values().len() as u32;
		header
	}

	/// Attempts to read a page header at `offset`
	///
	/// # Errors
	///
	/// * The capture pattern is not `OggS` ([`PageError::MissingMagic`])
	/// * The stream structure version is nonzero ([`PageError::InvalidVersion`])
	/// * The segment count is zero ([`PageError::BadSegmentCount`])
	/// * Not enough data is left in the reader
	pub fn read<R>(reader: &mut R, offset: u64) -> Result<Self>
	where
		R: Read + Seek,
	{
		reader.seek(SeekFrom::Start(offset))?;

		let mut prefix = [0; 27];
		reader.read_exact(&mut prefix)?;

		if &prefix[..4] != b"OggS" {
			return Err(PageError::MissingMagic);
		}

		if prefix[4] != 0 {
			return Err(PageError::InvalidVersion);
		}

		let flags = prefix[5];

		let fields = &mut &prefix[6..];

		let granular_position = fields.read_i64::<LittleEndian>()?;
		let serial = fields.read_u32::<LittleEndian>()?;
		let sequence = fields.read_u32::<LittleEndian>()? as i32;

		// The checksum is verified by the layer above, if at all
		let _checksum = fields.read_u32::<LittleEndian>()?;

		let segment_count = prefix[26];

		if segment_count < 1 {
			return Err(PageError::BadSegmentCount);
		}

		let mut lacing = vec![0; segment_count as usize];
		reader.read_exact(&mut lacing)?;

		let mut packet_sizes = Vec::new();
		let mut data_size = 0_u32;
		let mut running = 0_u32;

		for &value in &lacing {
			running += u32::from(value);
			data_size += u32::from(value);

			if value < 255 {
				packet_sizes.push(running);
				running = 0;
			}
		}

		// A packet still open after the last lacing value continues on the
		// next page
		let last_packet_completed = if running > 0 {
			packet_sizes.push(running);
			false
		} else {
			true
		};

		Ok(Self {
			packet_sizes,
			first_packet_continued: flags & CONTINUED_PACKET != 0,
			last_packet_completed,
			first_page_of_stream: flags & FIRST_PAGE_OF_STREAM != 0,
			last_page_of_stream: flags & LAST_PAGE_OF_STREAM != 0,
			granular_position,
			serial,
			sequence,
			header_size: 27 + u32::from(segment_count),
			data_size,
		})
	}

	/// Renders the 27 byte prefix and the lacing table
	///
	/// The checksum field is left zeroed; it covers the page content as well
	/// and is filled in by [`Page::render`].
	///
	/// # Errors
	///
	/// * The packet sizes require more than 255 lacing values
	///   ([`PageError::TooManySegments`])
	pub fn render(&self) -> Result<Vec<u8>> {
		let lacing = self.lacing_values();

		if lacing.len() > MAX_SEGMENTS {
			return Err(PageError::TooManySegments);
		}

		let mut data = Vec::with_capacity(27 + lacing.len());

		data.extend_from_slice(b"OggS");

		// Stream structure version
		data.push(0);

		let mut flags = 0_u8;

		if self.first_packet_continued {
			flags |= CONTINUED_PACKET;
		}

		// Written from the sequence number rather than the stored flag, so
		// single page streams stay marked as the first page
		if self.sequence == 0 {
			flags |= FIRST_PAGE_OF_STREAM;
		}

		if self.last_page_of_stream {
			flags |= LAST_PAGE_OF_STREAM;
		}

		data.push(flags);

		data.write_i64::<LittleEndian>(self.granular_position)?;
		data.write_u32::<LittleEndian>(self.serial)?;
		data.write_u32::<LittleEndian>(self.sequence as u32)?;
		data.write_u32::<LittleEndian>(0)?;

		data.push(lacing.len() as u8);
		data.extend_from_slice(&lacing);

		Ok(data)
	}

	/// Encodes the packet sizes into lacing values
	///
	/// A final packet that is not completed runs up to the page end in 255s
	/// and omits its terminating value.
	pub fn lacing_values(&self) -> Vec<u8> {
		let mut values = Vec::new();

		let mut sizes = self.packet_sizes.iter().peekable();

		while let Some(&size) = sizes.next() {
			values.resize(values.len() + (size / 255) as usize, 0xFF);

			if sizes.peek().is_some() || self.last_packet_completed {
				values.push((size % 255) as u8);
			}
		}

		values
	}

	/// The sizes of the packets beginning in this page
	pub fn packet_sizes(&self) -> &[u32] {
		&self.packet_sizes
	}

	/// Whether the first packet is a continuation from the previous page
	pub fn first_packet_continued(&self) -> bool {
		self.first_packet_continued
	}

	/// Whether the last packet ends inside this page
	pub fn last_packet_completed(&self) -> bool {
		self.last_packet_completed
	}

	/// Whether the flag byte marked this page as the first of its stream
	pub fn first_page_of_stream(&self) -> bool {
		self.first_page_of_stream
	}

	/// Whether this page is the last of its stream
	pub fn last_page_of_stream(&self) -> bool {
		self.last_page_of_stream
	}

	/// The absolute granular position, a codec defined timestamp
	pub fn granular_position(&self) -> i64 {
		self.granular_position
	}

	/// The stream serial number
	pub fn serial(&self) -> u32 {
		self.serial
	}

	/// The page sequence number (-1 when never set)
	pub fn sequence(&self) -> i32 {
		self.sequence
	}

	/// The size of the prefix plus the lacing table
	pub fn header_size(&self) -> u32 {
		self.header_size
	}

	/// The size of the content described by the lacing table
	pub fn data_size(&self) -> u32 {
		self.data_size
	}
}

/// A page header coupled with its content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
	header: PageHeader,
	content: Vec<u8>,
	start: u64,
}

impl Page {
	/// Creates a page yet to be written
	pub fn new(header: PageHeader, content: Vec<u8>) -> Self {
		Self {
			header,
			content,
			start: 0,
		}
	}

	/// Attempts to read a full page at `offset`
	///
	/// # Errors
	///
	/// See [`PageHeader::read`]
	pub fn read<R>(reader: &mut R, offset: u64) -> Result<Self>
	where
		R: Read + Seek,
	{
		let header = PageHeader::read(reader, offset)?;

		let mut content = vec![0; header.data_size() as usize];
		reader.read_exact(&mut content)?;

		Ok(Self {
			header,
			content,
			start: offset,
		})
	}

	/// Renders the page with its checksum filled in
	///
	/// # Errors
	///
	/// See [`PageHeader::render`]
	pub fn render(&self) -> Result<Vec<u8>> {
		let mut bytes = self.header.render()?;
		bytes.extend_from_slice(&self.content);

		let checksum = crc::crc32(&bytes);
		bytes[22..26].copy_from_slice(&checksum.to_le_bytes());

		Ok(bytes)
	}

	/// The page header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// The page content
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// Consumes the page, returning its content
	pub fn into_content(self) -> Vec<u8> {
		self.content
	}

	/// The offset the page was read from
	pub fn start(&self) -> u64 {
		self.start
	}

	/// The offset just past the page
	pub fn end(&self) -> u64 {
		self.start + u64::from(self.header.header_size()) + u64::from(self.header.data_size())
	}
}

#[cfg(test)]
mod tests {
	use super::{Page, PageHeader};

	use std::io::Cursor;

	#[test]
	fn parse_header() {
		let mut bytes = vec![b'O', b'g', b'g', b'S', 0, 0x06];
		bytes.extend_from_slice(&0_i64.to_le_bytes());
		bytes.extend_from_slice(&0x1234_5678_u32.to_le_bytes());
		bytes.extend_from_slice(&3_u32.to_le_bytes());
		bytes.extend_from_slice(&[0, 0, 0, 0]);
		bytes.extend_from_slice(&[2, 0xFF, 0x10]);

		let header = PageHeader::read(&mut Cursor::new(bytes), 0).unwrap();

		assert_eq!(header.packet_sizes(), &[271]);
		assert!(!header.first_packet_continued());
		assert!(header.first_page_of_stream());
		assert!(header.last_page_of_stream());
		assert!(header.last_packet_completed());
		assert_eq!(header.serial(), 0x1234_5678);
		assert_eq!(header.sequence(), 3);
		assert_eq!(header.header_size(), 29);
		assert_eq!(header.data_size(), 271);
	}

	#[test]
	fn reject_bad_magic() {
		let bytes = vec![b'O', b'g', b'g', b'Z', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

		assert!(PageHeader::read(&mut Cursor::new(bytes), 0).is_err());
	}

	#[test]
	fn lacing_continued_packet() {
		let header = PageHeader::new(vec![510], false, false, false, 0, 1, 1);

		assert_eq!(header.lacing_values(), vec![0xFF, 0xFF]);
	}

	#[test]
	fn lacing_law() {
		let cases: [(&[u32], bool); 6] = [
			(&[271], true),
			(&[510], false),
			(&[255], true),
			(&[0], true),
			(&[100, 255, 30], true),
			(&[100, 510], false),
		];

		for (sizes, completed) in cases {
			let header = PageHeader::new(sizes.to_vec(), false, completed, false, 0, 7, 1);
			let lacing = header.lacing_values();

			let mut decoded = Vec::new();
			let mut running = 0_u32;

			for &value in &lacing {
				running += u32::from(value);

				if value < 255 {
					decoded.push(running);
					running = 0;
				}
			}

			let decoded_completed = if running > 0 {
				decoded.push(running);
				false
			} else {
				true
			};

			assert_eq!(decoded, sizes, "lacing {:?}", sizes);
			assert_eq!(decoded_completed, completed, "completion {:?}", sizes);
		}
	}

	#[test]
	fn header_roundtrip() {
		let header = PageHeader::new(vec![12, 300, 255], true, true, true, 92_874, 0xDEAD_BEEF, 0);
		let rendered = header.render().unwrap();

		let reparsed = PageHeader::read(&mut Cursor::new(rendered), 0).unwrap();

		assert_eq!(reparsed.packet_sizes(), header.packet_sizes());
		assert_eq!(
			reparsed.first_packet_continued(),
			header.first_packet_continued()
		);
		assert_eq!(
			reparsed.last_packet_completed(),
			header.last_packet_completed()
		);
		assert_eq!(reparsed.last_page_of_stream(), header.last_page_of_stream());
		assert_eq!(reparsed.first_page_of_stream(), header.first_page_of_stream());
		assert_eq!(reparsed.granular_position(), header.granular_position());
		assert_eq!(reparsed.serial(), header.serial());
		assert_eq!(reparsed.sequence(), header.sequence());
	}

	#[test]
	fn page_checksum_covers_content() {
		let header = PageHeader::new(vec![4], false, true, false, 0, 42, 1);
		let page = Page::new(header, vec![1, 2, 3, 4]);

		let rendered = page.render().unwrap();

		let mut zeroed = rendered.clone();
		zeroed[22..26].copy_from_slice(&[0, 0, 0, 0]);

		let stored = u32::from_le_bytes([rendered[22], rendered[23], rendered[24], rendered[25]]);

		assert_eq!(stored, super::crc32(&zeroed));
	}
}
