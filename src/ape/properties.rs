use crate::error::{Result, TagError};
use crate::io::MediaStream;

use std::io::SeekFrom;
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

/// An APE file's audio properties
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ApeProperties {
	version: u16,
	duration: Duration,
	overall_bitrate: u32,
	audio_bitrate: u32,
	sample_rate: u32,
	channels: u8,
}

impl ApeProperties {
	/// Duration
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Overall bitrate (kbps)
	pub fn overall_bitrate(&self) -> u32 {
		self.overall_bitrate
	}

	/// Audio bitrate (kbps)
	pub fn bitrate(&self) -> u32 {
		self.audio_bitrate
	}

	/// Sample rate (Hz)
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// APE version, e.g. 3990 for 3.99
	pub fn version(&self) -> u16 {
		self.version
	}
}

// The MAC stream header sits at the start of the audio region. Versions
// since 3.98 lead with a descriptor, older ones go straight into the header.
pub(super) fn read_properties<F>(
	file: &mut F,
	stream_start: u64,
	stream_length: u64,
	file_length: u64,
) -> Result<ApeProperties>
where
	F: MediaStream,
{
	file.seek(SeekFrom::Start(stream_start))?;

	let mut magic = [0; 4];
	std::io::Read::read_exact(file, &mut magic)
		.map_err(|_| TagError::Ape("Not enough data left in reader to read MAC header"))?;

	if &magic != b"MAC " {
		return Err(TagError::Ape("Invalid MAC header magic"));
	}

	let version = file
		.read_u16::<LittleEndian>()
		.map_err(|_| TagError::Ape("Unable to read version"))?;

	let (blocks_per_frame, final_frame_blocks, total_frames, channels, sample_rate) =
		if version >= 3980 {
			read_layout_gt_3980(file)?
		} else {
			read_layout_lt_3980(file, version)?
		};

	if total_frames == 0 {
		return Err(TagError::Ape("File contains no frames"));
	}

	if !(1..=32).contains(&channels) {
		return Err(TagError::Ape(
			"File has an invalid channel count (must be between 1 and 32 inclusive)",
		));
	}

	// Samples across all frames but the last, plus the final partial frame
	let mut total_samples = u64::from(final_frame_blocks);

	if total_frames > 1 {
		total_samples += u64::from(blocks_per_frame) * u64::from(total_frames - 1);
	}

	let (duration, overall_bitrate, audio_bitrate) = if sample_rate > 0 {
		let length = (total_samples * 1000) / u64::from(sample_rate);

		if length > 0 {
			(
				Duration::from_millis(length),
				((file_length * 8) / length) as u32,
				((stream_length * 8) / length) as u32,
			)
		} else {
			(Duration::ZERO, 0, 0)
		}
	} else {
		(Duration::ZERO, 0, 0)
	};

	Ok(ApeProperties {
		version,
		duration,
		overall_bitrate,
		audio_bitrate,
		sample_rate,
		channels: channels as u8,
	})
}

fn read_layout_gt_3980<F>(file: &mut F) -> Result<(u32, u32, u32, u16, u32)>
where
	F: MediaStream,
{
	// Descriptor, after the magic and version:
	// padding (2), descriptor length (4), header length (4), seek table
	// length (4), wav header length (4), audio data length (4 + 4 high),
	// terminating data length (4), file MD5 (16)
	let _padding = file.read_u16::<LittleEndian>()?;

	let descriptor_length = file
		.read_u32::<LittleEndian>()
		.map_err(|_| TagError::Ape("Not enough data left in reader to finish file descriptor"))?;

	file.seek(SeekFrom::Current(40))?;

	// The descriptor is 52 bytes; anything extra is unknown and skipped
	if descriptor_length > 52 {
		file.seek(SeekFrom::Current(i64::from(descriptor_length - 52)))?;
	}

	// Header: compression type (2), format flags (2), blocks per frame (4),
	// final frame blocks (4), total frames (4), bits per sample (2),
	// channels (2), sample rate (4)
	let _compression_type = file.read_u16::<LittleEndian>()?;
	let _format_flags = file.read_u16::<LittleEndian>()?;

	let blocks_per_frame = file.read_u32::<LittleEndian>()?;
	let final_frame_blocks = file.read_u32::<LittleEndian>()?;
	let total_frames = file.read_u32::<LittleEndian>()?;

	let _bits_per_sample = file.read_u16::<LittleEndian>()?;

	let channels = file.read_u16::<LittleEndian>()?;
	let sample_rate = file
		.read_u32::<LittleEndian>()
		.map_err(|_| TagError::Ape("Not enough data left in reader to finish MAC header"))?;

	Ok((
		blocks_per_frame,
		final_frame_blocks,
		total_frames,
		channels,
		sample_rate,
	))
}

fn read_layout_lt_3980<F>(file: &mut F, version: u16) -> Result<(u32, u32, u32, u16, u32)>
where
	F: MediaStream,
{
	// Old style header: compression level (2), format flags (2),
	// channels (2), sample rate (4), wav header length (4), wav tail
	// length (4), total frames (4), final frame blocks (4)
	let compression_level = file
		.read_u16::<LittleEndian>()
		.map_err(|_| TagError::Ape("Not enough data left in reader to finish MAC header"))?;

	let _format_flags = file.read_u16::<LittleEndian>()?;

	let blocks_per_frame = match version {
		_ if version >= 3950 => 73728 * 4,
		_ if version >= 3900 || (version >= 3800 && compression_level >= 4000) => 73728,
		_ => 9216,
	};

	let channels = file.read_u16::<LittleEndian>()?;
	let sample_rate = file.read_u32::<LittleEndian>()?;

	file.seek(SeekFrom::Current(8))?;

	let total_frames = file.read_u32::<LittleEndian>()?;
	let final_frame_blocks = file
		.read_u32::<LittleEndian>()
		.map_err(|_| TagError::Ape("Not enough data left in reader to finish MAC header"))?;

	Ok((
		blocks_per_frame,
		final_frame_blocks,
		total_frames,
		channels,
		sample_rate,
	))
}
