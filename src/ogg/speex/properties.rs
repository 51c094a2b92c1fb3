use crate::error::{Result, TagError};
use crate::io::Length;
use crate::ogg::read::OggMetadata;

use std::io::{Read, Seek};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

/// A Speex file's audio properties
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SpeexProperties {
	duration: Duration,
	overall_bitrate: u32,
	audio_bitrate: u32,
	sample_rate: u32,
	channels: u8,
	version: u32,
	vbr: bool,
}

impl SpeexProperties {
	/// Duration
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Overall bitrate (kbps)
	pub fn overall_bitrate(&self) -> u32 {
		self.overall_bitrate
	}

	/// Nominal bitrate as read from the Speex header (kbps)
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

	/// The Speex version id, currently 0 as specified by the spec
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Whether the stream is variable bitrate
	pub fn vbr(&self) -> bool {
		self.vbr
	}
}

// The identification header, after its 8 byte signature: a 20 byte version
// string, the version id, the header size, the sample rate, the mode and
// its bitstream version, the channel count, the nominal bitrate, the frame
// size, and the vbr flag.
pub(super) fn read_properties<F>(file: &mut F, metadata: &OggMetadata) -> Result<SpeexProperties>
where
	F: Read + Seek + Length,
{
	if metadata.ident_packet.len() < 64 {
		return Err(TagError::Speex("Identification header is too short"));
	}

	let ident = &mut &metadata.ident_packet[28..];

	let version = ident.read_u32::<LittleEndian>()?;

	let _header_size = ident.read_u32::<LittleEndian>()?;

	let sample_rate = ident.read_u32::<LittleEndian>()?;

	let _mode = ident.read_u32::<LittleEndian>()?;
	let _mode_bitstream_version = ident.read_u32::<LittleEndian>()?;

	let channels = ident.read_u32::<LittleEndian>()?;
	let bitrate_nominal = ident.read_i32::<LittleEndian>()?;

	let _frame_size = ident.read_u32::<LittleEndian>()?;

	let vbr = ident.read_u32::<LittleEndian>()? == 1;

	if sample_rate == 0 {
		return Err(TagError::Speex("File has a sample rate of 0"));
	}

	let file_length = file.len()?;

	let last_page = crate::ogg::find_last_page(file)?;
	let last_granule = last_page.granular_position();

	let frame_count = (last_granule as u64).checked_sub(metadata.first_granule as u64);

	match frame_count {
		Some(frame_count) if frame_count > 0 => {
			let length = frame_count * 1000 / u64::from(sample_rate);

			let overall_bitrate = ((file_length * 8) / length) as u32;
			let audio_bitrate = if bitrate_nominal > 0 {
				(bitrate_nominal / 1000) as u32
			} else {
				0
			};

			Ok(SpeexProperties {
				duration: Duration::from_millis(length),
				overall_bitrate,
				audio_bitrate,
				sample_rate,
				channels: channels as u8,
				version,
				vbr,
			})
		},
		_ => Err(TagError::Speex("File contains incorrect PCM values")),
	}
}
