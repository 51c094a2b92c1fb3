use super::MpegFile;
use crate::ape::write::save_tail_tags;
use crate::error::{Result, TagError};
use crate::io::{replace_block, MediaStream};

pub(super) fn save<F>(mpeg: &mut MpegFile<F>) -> Result<()>
where
	F: MediaStream,
{
	if mpeg.read_only {
		log::warn!("MPEG: save() called on a read only file");
		return Err(TagError::ReadOnly);
	}

	// The tail layout matches the APE family exactly, so the same ordering
	// applies; the ID3v2 block at the head is preserved untouched.
	save_tail_tags(
		&mut mpeg.file,
		&mpeg.tags,
		&mut mpeg.ape_location,
		&mut mpeg.ape_size,
		&mut mpeg.id3v1_location,
	)
}

// Removing the head block shifts everything behind it, so the recorded tail
// offsets move left by its size.
pub(super) fn strip_id3v2<F>(mpeg: &mut MpegFile<F>) -> Result<()>
where
	F: MediaStream,
{
	if mpeg.read_only {
		log::warn!("MPEG: strip_id3v2() called on a read only file");
		return Err(TagError::ReadOnly);
	}

	if let Some(location) = mpeg.id3v2_location.take() {
		let size = mpeg.id3v2_size;

		replace_block(&mut mpeg.file, location, size, &[])?;

		if let Some(ape) = mpeg.ape_location {
			mpeg.ape_location = Some(ape - size);
		}

		if let Some(id3v1) = mpeg.id3v1_location {
			mpeg.id3v1_location = Some(id3v1 - size);
		}

		mpeg.id3v2_size = 0;
	}

	Ok(())
}
