use crate::error::{Result, TagError};

use std::io::{Read, Seek};

use ogg_page::Page;

// Keeps a runaway continuation chain from ballooning the packet buffers
const MAX_METADATA: usize = 125_829_120;

// Everything the coordinators need to know about the head of an OGG stream:
// the identification packet, and the page group holding the comment packet
// along with its byte span, so a save can splice exactly that range.
pub(crate) struct OggMetadata {
	pub(crate) serial: u32,
	pub(crate) first_granule: i64,
	pub(crate) ident_packet: Vec<u8>,

	// The packets beginning in the comment page group; the comment packet
	// itself is first, codec setup packets (Vorbis) follow
	pub(crate) group_packets: Vec<Vec<u8>>,
	pub(crate) group_start: u64,
	pub(crate) group_end: u64,
	pub(crate) group_page_count: u32,
	pub(crate) first_sequence: i32,
}

pub(crate) fn read_metadata<R>(reader: &mut R) -> Result<OggMetadata>
where
	R: Read + Seek,
{
	let first_page = Page::read(reader, 0)?;
	let header = first_page.header();

	// The identification packet must be alone on the first page
	if header.packet_sizes().len() != 1 || !header.last_packet_completed() {
		return Err(TagError::Ogg(
			"Identification header does not fit the first page",
		));
	}

	let serial = header.serial();
	let first_granule = header.granular_position();
	let group_start = first_page.end();
	let first_sequence = header.sequence() + 1;

	// Collect pages until one completes its last packet; that page closes
	// the group holding the comment packet
	let mut pages = Vec::new();
	let mut offset = group_start;
	let mut collected = 0_usize;

	loop {
		let page = Page::read(reader, offset)?;

		if page.header().serial() != serial {
			return Err(TagError::Ogg("Stream is interleaved with another serial"));
		}

		collected += page.content().len();

		if collected > MAX_METADATA {
			return Err(TagError::TooMuchData);
		}

		let completed = page.header().last_packet_completed();

		offset = page.end();
		pages.push(page);

		if completed {
			break;
		}
	}

	let group_end = offset;
	let group_page_count = pages.len() as u32;

	// Reassemble the packets described by the group's lacing tables
	let mut group_packets: Vec<Vec<u8>> = Vec::new();
	let mut open_packet = false;

	for page in &pages {
		let header = page.header();

		if header.first_packet_continued() != open_packet {
			return Err(TagError::Ogg("Page continuation flags are inconsistent"));
		}

		let mut content_offset = 0_usize;

		for (index, &size) in header.packet_sizes().iter().enumerate() {
			let chunk = &page.content()[content_offset..content_offset + size as usize];
			content_offset += size as usize;

			if index == 0 && header.first_packet_continued() {
				// Grown across a page boundary; checked consistent above
				if let Some(last) = group_packets.last_mut() {
					last.extend_from_slice(chunk);
				}
			} else {
				group_packets.push(chunk.to_vec());
			}
		}

		open_packet = !header.last_packet_completed();
	}

	Ok(OggMetadata {
		serial,
		first_granule,
		ident_packet: first_page.into_content(),
		group_packets,
		group_start,
		group_end,
		group_page_count,
		first_sequence,
	})
}
