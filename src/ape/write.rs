use super::{ApeFile, APE_INDEX, ID3V1_INDEX};
use crate::error::{Result, TagError};
use crate::io::{replace_block, MediaStream};
use crate::tag::TagUnion;

use std::io::SeekFrom;

pub(super) fn save<F>(ape: &mut ApeFile<F>) -> Result<()>
where
	F: MediaStream,
{
	if ape.read_only {
		log::warn!("APE: save() called on a read only file");
		return Err(TagError::ReadOnly);
	}

	save_tail_tags(
		&mut ape.file,
		&ape.tags,
		&mut ape.ape_location,
		&mut ape.ape_size,
		&mut ape.id3v1_location,
	)
}

// The shared tail algorithm for families carrying [audio][APE][ID3v1].
//
// The ordering here is load bearing. ID3v1 is settled first because its
// position depends only on the file length (or its prior position). The APE
// block then anchors against either that position or the file end, and its
// size delta shifts the recorded ID3v1 offset. An ID3v2 tag lives at the
// head and is unaffected by tail edits.
pub(crate) fn save_tail_tags<F>(
	file: &mut F,
	tags: &TagUnion<2>,
	ape_location: &mut Option<u64>,
	ape_size: &mut u64,
	id3v1_location: &mut Option<u64>,
) -> Result<()>
where
	F: MediaStream,
{
	// Update the ID3v1 tag

	let id3v1_render = match tags.get(ID3V1_INDEX) {
		Some(entry) if !entry.block().is_empty() => Some(entry.block().render()),
		_ => None,
	};

	if let Some(data) = id3v1_render {
		// Update the old tag or create a new one at the file end

		let location = match *id3v1_location {
			Some(location) => location,
			None => {
				let end = file.len()?;
				*id3v1_location = Some(end);

				end
			},
		};

		file.seek(SeekFrom::Start(location))?;
		file.write_all(&data)?;
	} else if let Some(location) = id3v1_location.take() {
		// The tag is gone or empty; drop the old block

		file.truncate(location)?;
	}

	// Update the APE tag

	let ape_render = match tags.get(APE_INDEX) {
		Some(entry) if !entry.block().is_empty() => Some(entry.block().render()),
		_ => None,
	};

	if let Some(data) = ape_render {
		let location = match *ape_location {
			Some(location) => location,
			None => {
				// A fresh tag goes right before ID3v1, or at the file end
				let location = match *id3v1_location {
					Some(id3v1) => id3v1,
					None => file.len()?,
				};
				*ape_location = Some(location);

				location
			},
		};

		replace_block(file, location, *ape_size, &data)?;

		if let Some(id3v1) = *id3v1_location {
			let delta = data.len() as i64 - *ape_size as i64;
			*id3v1_location = Some((id3v1 as i64 + delta) as u64);
		}

		*ape_size = data.len() as u64;
	} else if let Some(location) = ape_location.take() {
		replace_block(file, location, *ape_size, &[])?;

		if let Some(id3v1) = *id3v1_location {
			*id3v1_location = Some(id3v1 - *ape_size);
		}

		*ape_size = 0;
	}

	log::debug!(
		"Tail tags saved; APE at {:?} ({} B), ID3v1 at {:?}",
		ape_location,
		ape_size,
		id3v1_location
	);

	Ok(())
}
