use crate::error::{Result, TagError};
use crate::io::Length;
use crate::ogg::read::OggMetadata;

use std::io::{Read, Seek};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

/// An Opus file's audio properties
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OpusProperties {
	duration: Duration,
	overall_bitrate: u32,
	audio_bitrate: u32,
	channels: u8,
	version: u8,
	input_sample_rate: u32,
}

impl OpusProperties {
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

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Opus version
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Input sample rate
	///
	/// Opus decodes at 48 kHz regardless; this is the rate the encoder saw.
	pub fn input_sample_rate(&self) -> u32 {
		self.input_sample_rate
	}
}

pub(super) fn read_properties<F>(file: &mut F, metadata: &OggMetadata) -> Result<OpusProperties>
where
	F: Read + Seek + Length,
{
	// Skip the identification signature
	let ident = &mut &metadata.ident_packet[8..];

	let version = ident.read_u8()?;
	let channels = ident.read_u8()?;
	let pre_skip = ident.read_u16::<LittleEndian>()?;
	let input_sample_rate = ident.read_u32::<LittleEndian>()?;

	let file_length = file.len()?;

	// Every byte past the metadata page group belongs to audio pages
	let audio_size = file_length - metadata.group_end;

	let last_page = crate::ogg::find_last_page(file)?;
	let last_granule = last_page.granular_position();

	// The granule position counts 48 kHz samples; the pre-skip samples are
	// decoder priming and are not played
	let frame_count =
		(last_granule as u64).checked_sub(metadata.first_granule as u64 + u64::from(pre_skip));

	match frame_count {
		Some(frame_count) if frame_count > 0 => {
			let length = frame_count * 1000 / 48000;

			let overall_bitrate = ((file_length * 8) / length) as u32;
			let audio_bitrate = (audio_size * 8 / length) as u32;

			Ok(OpusProperties {
				duration: Duration::from_millis(length),
				overall_bitrate,
				audio_bitrate,
				channels,
				version,
				input_sample_rate,
			})
		},
		_ => Err(TagError::Opus("File contains incorrect PCM values")),
	}
}
