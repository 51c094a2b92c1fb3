use super::header::{ChannelMode, FrameHeader, Layer, MpegVersion, XingHeader};
use crate::error::Result;

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

/// An MPEG file's audio properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MpegProperties {
	version: MpegVersion,
	layer: Layer,
	channel_mode: ChannelMode,
	duration: Duration,
	bitrate: u32,
	sample_rate: u32,
	channels: u8,
	protection_enabled: bool,
	is_copyrighted: bool,
	is_original: bool,
	xing_header: Option<XingHeader>,
}

impl MpegProperties {
	/// Duration
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Bitrate (kbps)
	pub fn bitrate(&self) -> u32 {
		self.bitrate
	}

	/// Sample rate (Hz)
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// MPEG version
	pub fn version(&self) -> MpegVersion {
		self.version
	}

	/// MPEG layer
	pub fn layer(&self) -> Layer {
		self.layer
	}

	/// MPEG channel mode
	pub fn channel_mode(&self) -> ChannelMode {
		self.channel_mode
	}

	/// Whether the frames carry CRCs
	pub fn protection_enabled(&self) -> bool {
		self.protection_enabled
	}

	/// Whether the stream is marked as copyrighted
	pub fn is_copyrighted(&self) -> bool {
		self.is_copyrighted
	}

	/// Whether the stream is marked as an original recording
	pub fn is_original(&self) -> bool {
		self.is_original
	}

	/// The VBR header, when one was found and valid
	pub fn xing_header(&self) -> Option<&XingHeader> {
		self.xing_header.as_ref()
	}
}

// Only the first valid frame is required when a VBR header is present;
// otherwise the first and last frames bracket the stream.
pub(super) fn read_properties<R>(
	reader: &mut R,
	first_frame: Option<(FrameHeader, u64)>,
	last_frame: Option<(FrameHeader, u64)>,
) -> Result<MpegProperties>
where
	R: Read + Seek,
{
	let mut properties = MpegProperties::default();

	let (first_header, first_offset) = match first_frame {
		Some(frame) => frame,
		None => {
			log::warn!("MPEG: could not find an MPEG frame in the stream");
			return Ok(properties);
		},
	};

	// Check for a VBR header inside the first frame

	reader.seek(SeekFrom::Start(first_offset))?;

	let mut frame = Vec::with_capacity(first_header.len as usize);
	reader
		.by_ref()
		.take(u64::from(first_header.len))
		.read_to_end(&mut frame)?;

	let xing_header = parse_vbr_header(&frame, first_header.data_start as usize);

	if let Some(xing_header) = xing_header {
		if first_header.samples > 0 && first_header.sample_rate > 0 {
			// Length and bitrate come straight from the VBR header. The
			// bitrate divides by the unrounded length, which matters for
			// streams sitting close to a half-millisecond boundary.
			let time_per_frame =
				f64::from(first_header.samples) * 1000.0 / f64::from(first_header.sample_rate);
			let length = time_per_frame * f64::from(xing_header.frames);

			properties.duration = Duration::from_millis(length.round() as u64);
			properties.bitrate = (f64::from(xing_header.size) * 8.0 / length).round() as u32;
			properties.xing_header = Some(xing_header);
		}
	} else if first_header.bitrate > 0 {
		// Assume a constant bitrate and bracket the stream with the first
		// and last frames

		properties.bitrate = first_header.bitrate;

		match last_frame {
			Some((last_header, last_offset)) => {
				let stream_length = last_offset - first_offset + u64::from(last_header.len);

				if stream_length > 0 {
					let length = stream_length as f64 * 8.0 / f64::from(properties.bitrate);
					properties.duration = Duration::from_millis(length.round() as u64);
				}
			},
			None => {
				log::warn!("MPEG: could not find a last MPEG frame in the stream");
			},
		}
	}

	properties.version = first_header.version;
	properties.layer = first_header.layer;
	properties.channel_mode = first_header.channel_mode;
	properties.sample_rate = first_header.sample_rate;
	properties.channels = first_header.channels;
	properties.protection_enabled = first_header.protection_enabled;
	properties.is_copyrighted = first_header.is_copyrighted;
	properties.is_original = first_header.is_original;

	Ok(properties)
}

// A Xing/Info header sits past the side information; VBRI is always 32
// bytes into the frame.
fn parse_vbr_header(frame: &[u8], data_start: usize) -> Option<XingHeader> {
	if let Some(candidate) = frame.get(data_start..) {
		if let Ok(header) = XingHeader::parse(candidate) {
			return Some(header);
		}
	}

	if data_start != 36 {
		if let Some(candidate) = frame.get(36..) {
			return XingHeader::parse(candidate).ok();
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::{read_properties, FrameHeader};

	use std::io::Cursor;

	#[test]
	fn vbr_length_and_bitrate() {
		// 1152 samples per frame at 44100 Hz with 10000 frames and
		// 4000000 bytes of stream
		let first_header = FrameHeader::parse(0xFFFB_9004).unwrap();

		let mut frame = vec![0_u8; first_header.len as usize];
		let xing_start = first_header.data_start as usize;

		frame[xing_start..xing_start + 4].copy_from_slice(b"Xing");
		frame[xing_start + 4..xing_start + 8].copy_from_slice(&[0, 0, 0, 0x03]);
		frame[xing_start + 8..xing_start + 12].copy_from_slice(&10_000_u32.to_be_bytes());
		frame[xing_start + 12..xing_start + 16].copy_from_slice(&4_000_000_u32.to_be_bytes());

		let mut reader = Cursor::new(frame);
		let properties =
			read_properties(&mut reader, Some((first_header, 0)), None).unwrap();

		assert_eq!(properties.duration().as_millis(), 261_224);
		assert_eq!(properties.bitrate(), 122);
		assert_eq!(properties.sample_rate(), 44100);
		assert_eq!(properties.channels(), 2);
		assert!(properties.xing_header().is_some());
	}

	#[test]
	fn cbr_brackets_first_and_last_frames() {
		let header = FrameHeader::parse(0xFFFB_9004).unwrap();
		let frame_len = u64::from(header.len);

		// Ten frames of silence
		let file = vec![0_u8; (frame_len * 10) as usize];

		let mut reader = Cursor::new(file);
		let properties = read_properties(
			&mut reader,
			Some((header, 0)),
			Some((header, frame_len * 9)),
		)
		.unwrap();

		// 4170 bytes * 8 / 128 kbps, rounded
		assert_eq!(properties.duration().as_millis(), 261);
		assert_eq!(properties.bitrate(), 128);
	}

	#[test]
	fn missing_last_frame_keeps_bitrate() {
		let header = FrameHeader::parse(0xFFFB_9004).unwrap();

		let mut reader = Cursor::new(vec![0_u8; header.len as usize]);
		let properties = read_properties(&mut reader, Some((header, 0)), None).unwrap();

		assert_eq!(properties.duration().as_millis(), 0);
		assert_eq!(properties.bitrate(), 128);
	}

	#[test]
	fn no_frames_zeroes_everything() {
		let mut reader = Cursor::new(Vec::new());
		let properties = read_properties(&mut reader, None, None).unwrap();

		assert_eq!(properties.duration().as_millis(), 0);
		assert_eq!(properties.bitrate(), 0);
		assert_eq!(properties.sample_rate(), 0);
	}
}
