mod properties;

pub use properties::VorbisProperties;

use super::constants::{VORBIS_COMMENT_HEAD, VORBIS_IDENT_HEAD};
use super::read::OggMetadata;
use super::tag::XiphComment;
use crate::error::{Result, TagError};
use crate::io::{find_pattern, read_header_window, MediaStream};
use crate::tag::{PropertyMap, TagBlock};

use std::io::{Read, Seek};

/// Whether `reader` looks like an OGG Vorbis file
///
/// An OGG Vorbis file has the IDs `OggS` and `\x01vorbis` somewhere in its
/// first kilobyte.
///
/// # Errors
///
/// * `reader` fails a seek or read
pub fn is_supported<R>(reader: &mut R) -> Result<bool>
where
	R: Read + Seek,
{
	let buffer = read_header_window(reader, 1024)?;

	Ok(find_pattern(&buffer, b"OggS").is_some()
		&& find_pattern(&buffer, VORBIS_IDENT_HEAD).is_some())
}

/// An OGG Vorbis file
pub struct VorbisFile<F> {
	pub(crate) file: F,
	pub(crate) read_only: bool,
	pub(crate) metadata: OggMetadata,
	pub(crate) comment: XiphComment,
	pub(crate) properties: VorbisProperties,
}

impl<F: MediaStream> VorbisFile<F> {
	/// Reads a Vorbis file from `file`, which the returned handle then owns
	///
	/// # Errors
	///
	/// * The identification or comment header is missing or malformed
	/// * `file` fails a seek or read
	pub fn read_from(mut file: F, read_properties: bool) -> Result<Self> {
		let metadata = super::read::read_metadata(&mut file)?;

		super::verify_signature(&metadata.ident_packet, VORBIS_IDENT_HEAD)
			.map_err(|_| TagError::Vorbis("Invalid Vorbis identification header"))?;

		let comment_packet = metadata
			.group_packets
			.first()
			.ok_or(TagError::Vorbis("File has no comment packet"))?;

		super::verify_signature(comment_packet, VORBIS_COMMENT_HEAD)
			.map_err(|_| TagError::Vorbis("Could not find the Vorbis comment header"))?;

		let comment = XiphComment::parse(&comment_packet[VORBIS_COMMENT_HEAD.len()..])?;

		let properties = if read_properties {
			properties::read_properties(&mut file, &metadata)?
		} else {
			VorbisProperties::default()
		};

		Ok(Self {
			file,
			read_only: false,
			metadata,
			comment,
			properties,
		})
	}

	/// Marks the handle read only; subsequent saves fail cleanly
	pub fn set_read_only(&mut self) {
		self.read_only = true;
	}

	/// Consumes the handle, returning the owned stream
	pub fn into_inner(self) -> F {
		self.file
	}

	/// The file's audio properties
	pub fn properties(&self) -> &VorbisProperties {
		&self.properties
	}

	/// The file's Vorbis comments
	pub fn tag(&self) -> &XiphComment {
		&self.comment
	}

	/// The file's Vorbis comments, mutably
	pub fn tag_mut(&mut self) -> &mut XiphComment {
		&mut self.comment
	}

	/// The tag's properties
	pub fn tag_properties(&self) -> PropertyMap {
		self.comment.properties()
	}

	/// Stores `properties` in the comment, returning the rejected remainder
	pub fn set_tag_properties(&mut self, properties: PropertyMap) -> PropertyMap {
		self.comment.set_properties(properties)
	}

	/// Writes the comment packet back to the stream
	///
	/// The comment page group is re-rendered and spliced over its old byte
	/// range; audio pages keep their bytes.
	///
	/// # Errors
	///
	/// * The handle is marked read only
	/// * The underlying stream fails a write or truncate
	pub fn save(&mut self) -> Result<()> {
		if self.read_only {
			log::warn!("Vorbis: save() called on a read only file");
			return Err(TagError::ReadOnly);
		}

		let mut packet = VORBIS_COMMENT_HEAD.to_vec();
		packet.extend_from_slice(&self.comment.render(true));

		super::write::replace_comment_packet(&mut self.file, &mut self.metadata, packet)
	}
}
