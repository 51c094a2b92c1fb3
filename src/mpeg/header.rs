use crate::error::{Result, TagError};

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

// Bitrates in kbps, indexed by [version][layer][bitrate index]
const BITRATES: [[[u32; 16]; 3]; 2] = [
	[
		[
			0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0,
		],
		[
			0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0,
		],
		[
			0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
		],
	],
	[
		[
			0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0,
		],
		[0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
		[0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
	],
];

// Sample rates in Hz, indexed by [version][sample rate index]
const SAMPLE_RATES: [[u32; 3]; 3] = [
	[44100, 48000, 32000],
	[22050, 24000, 16000],
	[11025, 12000, 8000],
];

// Samples per frame, indexed by [layer][version index]
const SAMPLES: [[u16; 2]; 3] = [[384, 384], [1152, 1152], [1152, 576]];

// Side information size, indexed by [version index][channel mode]
const SIDE_INFORMATION_SIZES: [[u32; 4]; 2] = [[32, 32, 32, 17], [17, 17, 17, 9]];

// Padding slot size per layer
const PADDING_SIZES: [u8; 3] = [4, 1, 1];

pub(crate) fn verify_frame_sync(frame_sync: [u8; 2]) -> bool {
	frame_sync[0] == 0xFF && frame_sync[1] >> 5 == 0b111
}

/// MPEG Audio version
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
#[allow(missing_docs)]
pub enum MpegVersion {
	#[default]
	V1,
	V2,
	V2_5,
}

/// MPEG layer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum Layer {
	Layer1 = 1,
	Layer2 = 2,
	#[default]
	Layer3 = 3,
}

/// Channel mode
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[allow(missing_docs)]
pub enum ChannelMode {
	#[default]
	Stereo = 0,
	JointStereo = 1,
	DualChannel = 2,
	SingleChannel = 3,
}

#[derive(Copy, Clone)]
pub(crate) struct FrameHeader {
	pub sample_rate: u32,
	pub channels: u8,
	pub len: u32,
	pub data_start: u32,
	pub samples: u16,
	pub bitrate: u32,
	pub version: MpegVersion,
	pub layer: Layer,
	pub channel_mode: ChannelMode,
	pub protection_enabled: bool,
	pub is_copyrighted: bool,
	pub is_original: bool,
}

impl FrameHeader {
	pub(crate) fn parse(header: u32) -> Result<Self> {
		let version = match (header >> 19) & 0b11 {
			0 => MpegVersion::V2_5,
			2 => MpegVersion::V2,
			3 => MpegVersion::V1,
			_ => return Err(TagError::Mpeg("Frame header has an invalid version")),
		};

		let version_index = if version == MpegVersion::V1 { 0 } else { 1 };

		let layer = match (header >> 17) & 0b11 {
			1 => Layer::Layer3,
			2 => Layer::Layer2,
			3 => Layer::Layer1,
			_ => return Err(TagError::Mpeg("Frame header uses a reserved layer")),
		};

		let layer_index = (layer as usize).saturating_sub(1);

		// A cleared protection bit means a CRC follows the header
		let protection_enabled = (header >> 16) & 1 == 0;

		let bitrate_index = (header >> 12) & 0xF;
		let bitrate = BITRATES[version_index][layer_index][bitrate_index as usize];

		let mut sample_rate = (header >> 10) & 0b11;

		match sample_rate {
			// This is invalid, but it doesn't seem worth it to error here
			3 => sample_rate = 0,
			_ => sample_rate = SAMPLE_RATES[version as usize][sample_rate as usize],
		}

		if sample_rate == 0 {
			return Err(TagError::Mpeg("Frame header has a sample rate of 0"));
		}

		let has_padding = ((header >> 9) & 1) != 0;
		let mut padding = 0;

		if has_padding {
			padding = u32::from(PADDING_SIZES[layer_index]);
		}

		let channel_mode = match (header >> 6) & 0b11 {
			0 => ChannelMode::Stereo,
			1 => ChannelMode::JointStereo,
			2 => ChannelMode::DualChannel,
			_ => ChannelMode::SingleChannel,
		};

		let is_copyrighted = (header >> 3) & 1 == 1;
		let is_original = (header >> 2) & 1 == 1;

		let data_start = SIDE_INFORMATION_SIZES[version_index][channel_mode as usize] + 4;
		let samples = SAMPLES[layer_index][version_index];

		let len = match layer {
			Layer::Layer1 => (bitrate * 12000 / sample_rate + padding) * 4,
			Layer::Layer2 | Layer::Layer3 => bitrate * 144_000 / sample_rate + padding,
		};

		let channels = if channel_mode == ChannelMode::SingleChannel {
			1
		} else {
			2
		};

		Ok(Self {
			sample_rate,
			channels,
			len,
			data_start,
			samples,
			bitrate,
			version,
			layer,
			channel_mode,
			protection_enabled,
			is_copyrighted,
			is_original,
		})
	}
}

/// A Xing/Info/VBRI header, found at the start of variable bitrate streams
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XingHeader {
	/// The total frame count of the stream
	pub frames: u32,
	/// The total byte size of the stream
	pub size: u32,
}

impl XingHeader {
	/// Attempts to parse a VBR header from the start of `reader`
	///
	/// # Errors
	///
	/// * No `Xing`/`Info`/`VBRI` signature is present
	/// * The signature is present with too little data behind it, or with
	///   the frame/size fields unset
	pub fn parse(mut reader: &[u8]) -> Result<Self> {
		let reader_len = reader.len();

		let mut header = [0; 4];
		reader.read_exact(&mut header)?;

		match &header {
			b"Xing" | b"Info" => {
				if reader_len < 16 {
					return Err(TagError::Mpeg("Xing header has an invalid size (< 16)"));
				}

				let mut flags = [0; 4];
				reader.read_exact(&mut flags)?;

				if flags[3] & 0x03 != 0x03 {
					return Err(TagError::Mpeg(
						"Xing header doesn't have required flags set (0x0001 and 0x0002)",
					));
				}

				let frames = reader.read_u32::<BigEndian>()?;
				let size = reader.read_u32::<BigEndian>()?;

				if frames == 0 || size == 0 {
					return Err(TagError::Mpeg("Xing header has empty frame/size fields"));
				}

				Ok(Self { frames, size })
			},
			b"VBRI" => {
				if reader_len < 32 {
					return Err(TagError::Mpeg("VBRI header has an invalid size (< 32)"));
				}

				// Skip 6 bytes
				// Version ID (2)
				// Delay float (2)
				// Quality indicator (2)
				let _info = reader.read_uint::<BigEndian>(6)?;

				let size = reader.read_u32::<BigEndian>()?;
				let frames = reader.read_u32::<BigEndian>()?;

				if frames == 0 || size == 0 {
					return Err(TagError::Mpeg("VBRI header has empty frame/size fields"));
				}

				Ok(Self { frames, size })
			},
			_ => Err(TagError::Mpeg("No Xing, LAME, or VBRI header located")),
		}
	}
}
