//! MPEG specific items
//!
//! ## File notes
//!
//! An MPEG file may carry an `ID3v2` tag at its head; its location and size
//! are tracked so the audio stream and tail tags stay consistent, but the
//! frames themselves are never decoded. `APEv1/2` and `ID3v1` tags at the
//! tail are fully supported.
mod header;
mod properties;
mod read;
mod write;

pub use header::{ChannelMode, Layer, MpegVersion, XingHeader};
pub use properties::MpegProperties;

use crate::ape::tag::ApeTag;
use crate::ape::{APE_INDEX, ID3V1_INDEX};
use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::id3::v2::Id3v2Header;
use crate::io::{find_pattern, read_header_window, MediaStream};
use crate::tag::{PropertyMap, TagEntry, TagKinds, TagUnion};

use std::io::{Read, Seek};

use header::verify_frame_sync;

/// An MPEG file
///
/// Layout on disk, from offset 0: an optional ID3v2 tag, the audio frames,
/// an optional APE tag, and an optional trailing ID3v1 tag.
pub struct MpegFile<F> {
	pub(crate) file: F,
	pub(crate) read_only: bool,

	pub(crate) ape_location: Option<u64>,
	pub(crate) ape_size: u64,

	pub(crate) id3v1_location: Option<u64>,

	pub(crate) id3v2_location: Option<u64>,
	pub(crate) id3v2_size: u64,

	pub(crate) tags: TagUnion<2>,
	pub(crate) properties: MpegProperties,
}

/// Whether `reader` looks like an MPEG file
///
/// Either an ID3v2 tag or a sync-valid frame header must appear in the
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

	if find_pattern(&buffer, b"ID3")
		.map_or(false, |offset| Id3v2Header::parse(&buffer[offset..]).is_some())
	{
		return Ok(true);
	}

	for window in buffer.windows(4) {
		if verify_frame_sync([window[0], window[1]]) {
			let raw = u32::from_be_bytes([window[0], window[1], window[2], window[3]]);

			if header::FrameHeader::parse(raw).is_ok() {
				return Ok(true);
			}
		}
	}

	Ok(false)
}

impl<F: MediaStream> MpegFile<F> {
	/// Reads an MPEG file from `file`, which the returned handle then owns
	///
	/// When `read_properties` is false the audio properties are zeroed and
	/// the frames are never scanned.
	///
	/// # Errors
	///
	/// * An embedded tag is malformed
	/// * `file` fails a seek or read
	pub fn read_from(file: F, read_properties: bool) -> Result<Self> {
		read::read_from(file, read_properties)
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
	pub fn properties(&self) -> &MpegProperties {
		&self.properties
	}

	/// Returns the APE tag, if one exists in the slot table
	pub fn ape_tag(&self) -> Option<&ApeTag> {
		match self.tags.get(APE_INDEX) {
			Some(TagEntry::Ape(tag)) => Some(tag),
			_ => None,
		}
	}

	/// Returns the APE tag mutably, creating an empty one when `create` is
	/// set and the slot is vacant
	pub fn ape_tag_mut(&mut self, create: bool) -> Option<&mut ApeTag> {
		if create {
			self.tags
				.entry_or_insert_with(APE_INDEX, || TagEntry::Ape(ApeTag::default()));
		}

		match self.tags.get_mut(APE_INDEX) {
			Some(TagEntry::Ape(tag)) => Some(tag),
			_ => None,
		}
	}

	/// Returns the ID3v1 tag, if one exists in the slot table
	pub fn id3v1_tag(&self) -> Option<&Id3v1Tag> {
		match self.tags.get(ID3V1_INDEX) {
			Some(TagEntry::Id3v1(tag)) => Some(tag),
			_ => None,
		}
	}

	/// Returns the ID3v1 tag mutably, creating an empty one when `create`
	/// is set and the slot is vacant
	pub fn id3v1_tag_mut(&mut self, create: bool) -> Option<&mut Id3v1Tag> {
		if create {
			self.tags
				.entry_or_insert_with(ID3V1_INDEX, || TagEntry::Id3v1(Id3v1Tag::default()));
		}

		match self.tags.get_mut(ID3V1_INDEX) {
			Some(TagEntry::Id3v1(tag)) => Some(tag),
			_ => None,
		}
	}

	/// Whether an APE tag is currently present on disk
	pub fn has_ape_tag(&self) -> bool {
		self.ape_location.is_some()
	}

	/// Whether an ID3v1 tag is currently present on disk
	pub fn has_id3v1_tag(&self) -> bool {
		self.id3v1_location.is_some()
	}

	/// Whether an ID3v2 tag is currently present on disk
	pub fn has_id3v2_tag(&self) -> bool {
		self.id3v2_location.is_some()
	}

	/// The merged properties of every tag; on conflicting keys the APE tag
	/// wins
	pub fn tag_properties(&self) -> PropertyMap {
		self.tags.properties()
	}

	/// Stores `properties` in the ID3v1 tag (when present) and the APE tag
	/// (force-created), returning the pairs no tag could hold
	pub fn set_tag_properties(&mut self, properties: PropertyMap) -> PropertyMap {
		if let Some(id3v1) = self.id3v1_tag_mut(false) {
			crate::tag::TagBlock::set_properties(id3v1, properties.clone());
		}

		match self.ape_tag_mut(true) {
			Some(ape) => crate::tag::TagBlock::set_properties(ape, properties),
			None => properties,
		}
	}

	/// Forwards `keys` to every tag in the slot table for removal
	pub fn remove_unsupported_properties(&mut self, keys: &[String]) {
		self.tags.remove_unsupported(keys);
	}

	/// Empties the selected tail tag slots
	///
	/// The on-disk blocks are removed by the next [`save`](MpegFile::save).
	/// Stripping the ID3v2 head block is immediate, see
	/// [`strip_id3v2`](MpegFile::strip_id3v2).
	pub fn strip(&mut self, kinds: TagKinds) {
		if kinds.contains(TagKinds::ID3V1) {
			self.tags.set(ID3V1_INDEX, None);
		}

		if kinds.contains(TagKinds::APE) {
			self.tags.set(APE_INDEX, None);
		}
	}

	/// Removes the ID3v2 block at the head of the file, shifting the audio
	/// stream and any tail tags forward
	///
	/// # Errors
	///
	/// * The handle is marked read only
	/// * The underlying stream fails a write or truncate
	pub fn strip_id3v2(&mut self) -> Result<()> {
		write::strip_id3v2(self)
	}

	/// Writes every pending tail tag edit back to the stream
	///
	/// Follows the same ordering as the APE family: ID3v1 first, then the
	/// APE block with the ID3v1 offset shifted by the size delta. The audio
	/// frames are never rewritten.
	///
	/// # Errors
	///
	/// * The handle is marked read only ([`TagError::ReadOnly`](crate::TagError::ReadOnly))
	/// * The underlying stream fails a write or truncate; the file state is
	///   undefined afterwards
	pub fn save(&mut self) -> Result<()> {
		write::save(self)
	}
}
