//! OPUS/Vorbis/Speex specific items
//!
//! ## File notes
//!
//! The only supported tag format is the Vorbis comment, carried by all
//! three codecs as their second logical packet. Saving splices the page
//! group holding that packet and leaves the audio pages alone; their
//! sequence numbers are rewritten in place only when the group's page count
//! changes.
pub(crate) mod constants;
pub(crate) mod read;
/// Vorbis comment tag types.
pub mod tag;
/// Vorbis codec specifics.
pub mod vorbis;
pub(crate) mod write;

/// Opus codec specifics.
pub mod opus;
/// Speex codec specifics.
pub mod speex;

pub use tag::XiphComment;

use crate::error::{Result, TagError};

use std::io::{Read, Seek};

use ogg_page::PageHeader;

pub(crate) fn verify_signature(packet: &[u8], sig: &[u8]) -> Result<()> {
	if packet.len() < sig.len() || &packet[..sig.len()] != sig {
		return Err(TagError::Ogg("File missing magic signature"));
	}

	Ok(())
}

// Walks the whole stream; content is skipped, only headers are read.
pub(crate) fn find_last_page<R>(reader: &mut R) -> Result<PageHeader>
where
	R: Read + Seek,
{
	let mut offset = 0_u64;
	let mut last_page = None;

	while let Ok(header) = PageHeader::read(reader, offset) {
		offset += u64::from(header.header_size()) + u64::from(header.data_size());
		last_page = Some(header);
	}

	last_page.ok_or(TagError::Ogg("File contains no pages"))
}
