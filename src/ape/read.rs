use super::tag::{find_ape, read_ape_tag};
use super::{ApeFile, ApeProperties, APE_INDEX, ID3V1_INDEX};
use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::id3::{find_id3v1, find_id3v2};
use crate::io::MediaStream;
use crate::tag::{TagEntry, TagUnion};

use std::io::SeekFrom;

pub(super) fn read_from<F>(mut file: F, read_properties: bool) -> Result<ApeFile<F>>
where
	F: MediaStream,
{
	// Look for an ID3v2 tag at the head; only its bounds matter here
	let mut id3v2_location = None;
	let mut id3v2_size = 0;

	if let Some((location, size)) = find_id3v2(&mut file)? {
		id3v2_location = Some(location);
		id3v2_size = size;
	}

	let mut tags = TagUnion::new();

	// Look for an ID3v1 tag

	let id3v1_location = find_id3v1(&mut file)?;

	if let Some(location) = id3v1_location {
		file.seek(SeekFrom::Start(location))?;

		let mut block = [0; 128];
		file.read_exact(&mut block)?;

		tags.set(ID3V1_INDEX, Some(TagEntry::Id3v1(Id3v1Tag::parse(block))));
	}

	// Look for an APE tag, bounded by the ID3v1 tag when present

	let mut ape_location = None;
	let mut ape_size = 0;

	if let Some(found) = find_ape(&mut file, id3v1_location)? {
		let tag = read_ape_tag(&mut file, &found)?;

		tags.set(APE_INDEX, Some(TagEntry::Ape(tag)));

		ape_location = Some(found.location);
		ape_size = found.size;
	}

	// With no ID3v1 tag, an (empty) APE tag is always made reachable
	if id3v1_location.is_none() && tags.get(APE_INDEX).is_none() {
		tags.set(
			APE_INDEX,
			Some(TagEntry::Ape(super::tag::ApeTag::default())),
		);
	}

	// The audio stream runs from the end of the ID3v2 tag to the first
	// trailing tag block
	let properties = if read_properties {
		let file_length = file.len()?;

		let mut stream_length = match (ape_location, id3v1_location) {
			(Some(location), _) => location,
			(None, Some(location)) => location,
			(None, None) => file_length,
		};

		let stream_start = match id3v2_location {
			Some(location) => location + id3v2_size,
			None => 0,
		};

		stream_length -= stream_start;

		super::properties::read_properties(&mut file, stream_start, stream_length, file_length)?
	} else {
		ApeProperties::default()
	};

	Ok(ApeFile {
		file,
		read_only: false,
		ape_location,
		ape_size,
		id3v1_location,
		id3v2_location,
		id3v2_size,
		tags,
		properties,
	})
}
