use super::header::{verify_frame_sync, FrameHeader};
use super::{MpegFile, MpegProperties};
use crate::ape::tag::{find_ape, read_ape_tag};
use crate::ape::{APE_INDEX, ID3V1_INDEX};
use crate::error::Result;
use crate::id3::v1::Id3v1Tag;
use crate::id3::{find_id3v1, find_id3v2};
use crate::io::MediaStream;
use crate::tag::{TagEntry, TagUnion};

use std::io::{Read, Seek, SeekFrom};

const SCAN_CHUNK: u64 = 8192;

pub(super) fn read_from<F>(mut file: F, read_properties: bool) -> Result<MpegFile<F>>
where
	F: MediaStream,
{
	// Head: an optional ID3v2 tag, tracked but never decoded

	let mut id3v2_location = None;
	let mut id3v2_size = 0;

	if let Some((location, size)) = find_id3v2(&mut file)? {
		id3v2_location = Some(location);
		id3v2_size = size;
	}

	// Tail: ID3v1, then an APE tag bounded by it

	let mut tags = TagUnion::new();

	let id3v1_location = find_id3v1(&mut file)?;

	if let Some(location) = id3v1_location {
		file.seek(SeekFrom::Start(location))?;

		let mut block = [0; 128];
		file.read_exact(&mut block)?;

		tags.set(ID3V1_INDEX, Some(TagEntry::Id3v1(Id3v1Tag::parse(block))));
	}

	let mut ape_location = None;
	let mut ape_size = 0;

	if let Some(found) = find_ape(&mut file, id3v1_location)? {
		let tag = read_ape_tag(&mut file, &found)?;

		tags.set(APE_INDEX, Some(TagEntry::Ape(tag)));

		ape_location = Some(found.location);
		ape_size = found.size;
	}

	let properties = if read_properties {
		let file_length = file.len()?;

		let stream_end = match (ape_location, id3v1_location) {
			(Some(location), _) => location,
			(None, Some(location)) => location,
			(None, None) => file_length,
		};

		let stream_start = match id3v2_location {
			Some(location) => location + id3v2_size,
			None => 0,
		};

		let first_frame = first_frame_offset(&mut file, stream_start, stream_end)?;

		let last_frame = match first_frame {
			Some(_) => last_frame_offset(&mut file, stream_start, stream_end)?,
			None => None,
		};

		super::properties::read_properties(&mut file, first_frame, last_frame)?
	} else {
		MpegProperties::default()
	};

	Ok(MpegFile {
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

// Forward scan for the first sync pattern that parses as a frame header.
pub(super) fn first_frame_offset<R>(
	reader: &mut R,
	stream_start: u64,
	stream_end: u64,
) -> Result<Option<(FrameHeader, u64)>>
where
	R: Read + Seek,
{
	let mut offset = stream_start;
	let mut buffer = vec![0; SCAN_CHUNK as usize];

	while offset + 4 <= stream_end {
		let want = (stream_end - offset).min(SCAN_CHUNK) as usize;

		reader.seek(SeekFrom::Start(offset))?;
		reader.read_exact(&mut buffer[..want])?;

		for i in 0..=want - 4 {
			if !verify_frame_sync([buffer[i], buffer[i + 1]]) {
				continue;
			}

			let raw = u32::from_be_bytes([
				buffer[i],
				buffer[i + 1],
				buffer[i + 2],
				buffer[i + 3],
			]);

			if let Ok(header) = FrameHeader::parse(raw) {
				return Ok(Some((header, offset + i as u64)));
			}
		}

		// Overlap so a header straddling the chunk edge is still seen
		offset += (want - 3) as u64;
	}

	Ok(None)
}

// Backward scan from the tag-free tail for the last valid frame header.
pub(super) fn last_frame_offset<R>(
	reader: &mut R,
	stream_start: u64,
	stream_end: u64,
) -> Result<Option<(FrameHeader, u64)>>
where
	R: Read + Seek,
{
	let mut chunk_end = stream_end;
	let mut buffer = vec![0; (SCAN_CHUNK + 3) as usize];

	while chunk_end > stream_start {
		let chunk_start = chunk_end.saturating_sub(SCAN_CHUNK).max(stream_start);

		// Read past the chunk edge so straddling headers are seen
		let want = ((chunk_end - chunk_start).min(SCAN_CHUNK)
			+ (stream_end - chunk_end).min(3)) as usize;

		reader.seek(SeekFrom::Start(chunk_start))?;
		reader.read_exact(&mut buffer[..want])?;

		if want >= 4 {
			for i in (0..=want - 4).rev() {
				if !verify_frame_sync([buffer[i], buffer[i + 1]]) {
					continue;
				}

				let raw = u32::from_be_bytes([
					buffer[i],
					buffer[i + 1],
					buffer[i + 2],
					buffer[i + 3],
				]);

				if let Ok(header) = FrameHeader::parse(raw) {
					return Ok(Some((header, chunk_start + i as u64)));
				}
			}
		}

		chunk_end = chunk_start;
	}

	Ok(None)
}
