use crate::error::{Result, TagError};
use crate::io::Length;
use crate::ogg::read::OggMetadata;

use std::io::{Read, Seek};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

/// An OGG Vorbis file's audio properties
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct VorbisProperties {
	duration: Duration,
	overall_bitrate: u32,
	audio_bitrate: u32,
	sample_rate: u32,
	channels: u8,
	version: u32,
	bitrate_maximum: i32,
	bitrate_nominal: i32,
	bitrate_minimum: i32,
}

impl VorbisProperties {
	/// Duration
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Overall bitrate (kbps)
	pub fn overall_bitrate(&self) -> u32 {
		self.overall_bitrate
	}

	/// Audio bitrate (kbps)
	pub fn audio_bitrate(&self) -> u32 {
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

	/// Vorbis version
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Maximum bitrate
	pub fn bitrate_max(&self) -> i32 {
		self.bitrate_maximum
	}

	/// Nominal bitrate
	pub fn bitrate_nominal(&self) -> i32 {
		self.bitrate_nominal
	}

	/// Minimum bitrate
	pub fn bitrate_min(&self) -> i32 {
		self.bitrate_minimum
	}
}

pub(super) fn read_properties<F>(file: &mut F, metadata: &OggMetadata) -> Result<VorbisProperties>
where
	F: Read + Seek + Length,
{
	// Skip the identification signature
	let ident = &mut &metadata.ident_packet[7..];

	let version = ident.read_u32::<LittleEndian>()?;

	let channels = ident.read_u8()?;
	let sample_rate = ident.read_u32::<LittleEndian>()?;

	let bitrate_maximum = ident.read_i32::<LittleEndian>()?;
	let bitrate_nominal = ident.read_i32::<LittleEndian>()?;
	let bitrate_minimum = ident.read_i32::<LittleEndian>()?;

	if sample_rate == 0 {
		return Err(TagError::Vorbis("File has a sample rate of 0"));
	}

	let last_page = crate::ogg::find_last_page(file)?;
	let last_granule = last_page.granular_position();

	let file_length = file.len()?;

	let frame_count = (last_granule as u64).checked_sub(metadata.first_granule as u64);

	match frame_count {
		Some(frame_count) if frame_count > 0 => {
			let length = frame_count * 1000 / u64::from(sample_rate);

			let overall_bitrate = ((file_length * 8) / length) as u32;
			let audio_bitrate = (bitrate_nominal as u64 / 1000) as u32;

			Ok(VorbisProperties {
				duration: Duration::from_millis(length),
				overall_bitrate,
				audio_bitrate,
				sample_rate,
				channels,
				version,
				bitrate_maximum,
				bitrate_nominal,
				bitrate_minimum,
			})
		},
		_ => Err(TagError::Vorbis("File contains incorrect PCM values")),
	}
}
