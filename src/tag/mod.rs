//! Format agnostic tag plumbing
//!
//! Container families that allow several tag blocks in one file keep them in
//! a fixed-slot [`TagUnion`](self); the slot order is part of the contract,
//! since merged property lookups are priority ordered (lowest slot wins).

use crate::ape::tag::ApeTag;
use crate::id3::v1::Id3v1Tag;

use std::collections::BTreeMap;
use std::ops::BitOr;

/// The normalized tag representation
///
/// Keys are uppercase, and each key maps to one or more values.
pub type PropertyMap = BTreeMap<String, Vec<String>>;

/// Operations every concrete tag block supports
pub trait TagBlock {
	/// Serializes the tag to its on-disk representation
	fn render(&self) -> Vec<u8>;
	/// Whether the tag holds no data worth persisting
	fn is_empty(&self) -> bool;
	/// Exports the tag as a [`PropertyMap`]
	fn properties(&self) -> PropertyMap;
	/// Imports `properties`, returning the pairs the format could not store
	fn set_properties(&mut self, properties: PropertyMap) -> PropertyMap;
	/// Removes every item matching one of `keys`
	fn remove_unsupported(&mut self, keys: &[String]);
}

/// A selection of tag kinds, used when stripping
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagKinds(u8);

impl TagKinds {
	/// An APEv1/v2 tag
	pub const APE: TagKinds = TagKinds(1);
	/// An ID3v1 tag
	pub const ID3V1: TagKinds = TagKinds(1 << 1);
	/// An ID3v2 tag
	pub const ID3V2: TagKinds = TagKinds(1 << 2);
	/// Every tag kind
	pub const ALL: TagKinds = TagKinds(u8::MAX);

	/// Whether `other` is part of this selection
	pub fn contains(self, other: TagKinds) -> bool {
		self.0 & other.0 == other.0
	}
}

impl BitOr for TagKinds {
	type Output = TagKinds;

	fn bitor(self, rhs: Self) -> Self::Output {
		TagKinds(self.0 | rhs.0)
	}
}

// The concrete blocks a union slot can own. OGG files hold their XiphComment
// directly, so it never appears here.
pub(crate) enum TagEntry {
	Ape(ApeTag),
	Id3v1(Id3v1Tag),
}

impl TagEntry {
	pub(crate) fn block(&self) -> &dyn TagBlock {
		match self {
			TagEntry::Ape(tag) => tag,
			TagEntry::Id3v1(tag) => tag,
		}
	}

	pub(crate) fn block_mut(&mut self) -> &mut dyn TagBlock {
		match self {
			TagEntry::Ape(tag) => tag,
			TagEntry::Id3v1(tag) => tag,
		}
	}
}

// A fixed-length, slot-indexed tag table. Created with its file, dropped with
// its file; slots may be reassigned in between.
pub(crate) struct TagUnion<const N: usize> {
	slots: [Option<TagEntry>; N],
}

impl<const N: usize> TagUnion<N> {
	pub(crate) fn new() -> Self {
		Self {
			slots: std::array::from_fn(|_| None),
		}
	}

	pub(crate) fn get(&self, index: usize) -> Option<&TagEntry> {
		self.slots[index].as_ref()
	}

	pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TagEntry> {
		self.slots[index].as_mut()
	}

	pub(crate) fn set(&mut self, index: usize, entry: Option<TagEntry>) {
		self.slots[index] = entry;
	}

	pub(crate) fn entry_or_insert_with<F>(&mut self, index: usize, default: F) -> &mut TagEntry
	where
		F: FnOnce() -> TagEntry,
	{
		self.slots[index].get_or_insert_with(default)
	}

	// Merge all non-empty slots; on a key conflict the lower-indexed slot
	// (the primary tag) wins.
	pub(crate) fn properties(&self) -> PropertyMap {
		let mut merged = PropertyMap::new();

		for entry in self.slots.iter().flatten() {
			for (key, values) in entry.block().properties() {
				merged.entry(key).or_insert(values);
			}
		}

		merged
	}

	pub(crate) fn remove_unsupported(&mut self, keys: &[String]) {
		for entry in self.slots.iter_mut().flatten() {
			entry.block_mut().remove_unsupported(keys);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{TagEntry, TagUnion};
	use crate::ape::tag::ApeTag;
	use crate::id3::v1::Id3v1Tag;

	#[test]
	fn merge_priority() {
		let mut union = TagUnion::<2>::new();

		let mut ape = ApeTag::default();
		ape.insert_text("Title", "Primary title");

		let id3v1 = Id3v1Tag {
			title: Some(String::from("Secondary title")),
			artist: Some(String::from("Only artist")),
			..Id3v1Tag::default()
		};

		union.set(0, Some(TagEntry::Ape(ape)));
		union.set(1, Some(TagEntry::Id3v1(id3v1)));

		let merged = union.properties();

		assert_eq!(
			merged.get("TITLE"),
			Some(&vec![String::from("Primary title")])
		);
		assert_eq!(
			merged.get("ARTIST"),
			Some(&vec![String::from("Only artist")])
		);
	}

	#[test]
	fn slots_reassignable() {
		let mut union = TagUnion::<2>::new();

		assert!(union.get(0).is_none());

		union.entry_or_insert_with(0, || TagEntry::Ape(ApeTag::default()));
		assert!(union.get(0).is_some());

		union.set(0, None);
		assert!(union.get(0).is_none());
	}
}
