//! APE specific items
//!
//! ## File notes
//!
//! It is possible for an `APE` file to contain an `ID3v2` tag. For the sake
//! of data preservation its location and size are tracked, but it is never
//! decoded or written. The only tags allowed by spec are `APEv1/2` and
//! `ID3v1`.
mod properties;
mod read;
/// APE tag types (`APEv1`/`APEv2`).
pub mod tag;
pub(crate) mod write;

pub use properties::ApeProperties;
pub use tag::{ApeItem, ApeTag, ItemValue};

use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::io::{find_pattern, read_header_window, MediaStream};
use crate::tag::{PropertyMap, TagEntry, TagKinds, TagUnion};

use std::io::{Read, Seek};

// Slot indices are part of the contract: property merges prefer the APE tag
// over ID3v1.
pub(crate) const APE_INDEX: usize = 0;
pub(crate) const ID3V1_INDEX: usize = 1;

/// An APE file
///
/// The handle owns its stream; dropping the file closes it. Layout on disk,
/// from offset 0: an optional ID3v2 tag, the audio stream, an optional APE
/// tag, and an optional trailing ID3v1 tag.
pub struct ApeFile<F> {
	pub(crate) file: F,
	pub(crate) read_only: bool,

	pub(crate) ape_location: Option<u64>,
	pub(crate) ape_size: u64,

	pub(crate) id3v1_location: Option<u64>,

	pub(crate) id3v2_location: Option<u64>,
	pub(crate) id3v2_size: u64,

	pub(crate) tags: TagUnion<2>,
	pub(crate) properties: ApeProperties,
}

/// Whether `reader` looks like an APE file
///
/// An APE file has the ID `MAC ` somewhere in its first kilobyte; an ID3v2
/// tag may precede it.
///
/// # Errors
///
/// * `reader` fails a seek or read
pub fn is_supported<R>(reader: &mut R) -> Result<bool>
where
	R: Read + Seek,
{
	let buffer = read_header_window(reader, 1024)?;

	Ok(find_pattern(&buffer, b"MAC ").is_some())
}

impl<F: MediaStream> ApeFile<F> {
	/// Reads an APE file from `file`, which the returned handle then owns
	///
	/// When `read_properties` is false the audio properties are zeroed and
	/// the stream header is never touched.
	///
	/// # Errors
	///
	/// * An embedded tag is malformed
	/// * `read_properties` is set and the MAC stream header is missing or
	///   malformed
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
	pub fn properties(&self) -> &ApeProperties {
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

	/// Empties the selected tag slots
	///
	/// The on-disk blocks are removed by the next [`save`](ApeFile::save).
	pub fn strip(&mut self, kinds: TagKinds) {
		if kinds.contains(TagKinds::ID3V1) {
			self.tags.set(ID3V1_INDEX, None);
		}

		if kinds.contains(TagKinds::APE) {
			self.tags.set(APE_INDEX, None);
		}

		// Keep an (empty) APE tag reachable whenever no ID3v1 tag remains
		if self.tags.get(ID3V1_INDEX).is_none() {
			let _ = self.ape_tag_mut(true);
		}
	}

	/// Writes every pending tag edit back to the stream
	///
	/// Tags are updated tail-first: ID3v1 is rewritten or truncated at its
	/// known position, then the APE block is spliced in place and the ID3v1
	/// offset shifted by the size delta. The audio payload is never
	/// rewritten.
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
