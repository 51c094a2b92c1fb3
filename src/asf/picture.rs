use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};

/// The picture type of an [`AsfPicture`], matching the ID3v2 APIC types
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AsfPictureType {
	Other,
	FileIcon,
	OtherFileIcon,
	FrontCover,
	BackCover,
	LeafletPage,
	Media,
	LeadArtist,
	Artist,
	Conductor,
	Band,
	Composer,
	Lyricist,
	RecordingLocation,
	DuringRecording,
	DuringPerformance,
	MovieScreenCapture,
	ColouredFish,
	Illustration,
	BandLogo,
	PublisherLogo,
	/// A type byte outside the defined range
	Undefined(u8),
}

impl From<u8> for AsfPictureType {
	fn from(byte: u8) -> Self {
		match byte {
			0 => Self::Other,
			1 => Self::FileIcon,
			2 => Self::OtherFileIcon,
			3 => Self::FrontCover,
			4 => Self::BackCover,
			5 => Self::LeafletPage,
			6 => Self::Media,
			7 => Self::LeadArtist,
			8 => Self::Artist,
			9 => Self::Conductor,
			10 => Self::Band,
			11 => Self::Composer,
			12 => Self::Lyricist,
			13 => Self::RecordingLocation,
			14 => Self::DuringRecording,
			15 => Self::DuringPerformance,
			16 => Self::MovieScreenCapture,
			17 => Self::ColouredFish,
			18 => Self::Illustration,
			19 => Self::BandLogo,
			20 => Self::PublisherLogo,
			other => Self::Undefined(other),
		}
	}
}

impl From<AsfPictureType> for u8 {
	fn from(pic_type: AsfPictureType) -> Self {
		match pic_type {
			AsfPictureType::Other => 0,
			AsfPictureType::FileIcon => 1,
			AsfPictureType::OtherFileIcon => 2,
			AsfPictureType::FrontCover => 3,
			AsfPictureType::BackCover => 4,
			AsfPictureType::LeafletPage => 5,
			AsfPictureType::Media => 6,
			AsfPictureType::LeadArtist => 7,
			AsfPictureType::Artist => 8,
			AsfPictureType::Conductor => 9,
			AsfPictureType::Band => 10,
			AsfPictureType::Composer => 11,
			AsfPictureType::Lyricist => 12,
			AsfPictureType::RecordingLocation => 13,
			AsfPictureType::DuringRecording => 14,
			AsfPictureType::DuringPerformance => 15,
			AsfPictureType::MovieScreenCapture => 16,
			AsfPictureType::ColouredFish => 17,
			AsfPictureType::Illustration => 18,
			AsfPictureType::BandLogo => 19,
			AsfPictureType::PublisherLogo => 20,
			AsfPictureType::Undefined(other) => other,
		}
	}
}

/// An ASF attached picture record
///
/// The picture body is shared: clones are cheap and [`std::mem::swap`] on
/// two pictures is O(1). Mutation goes through the outer handle and
/// replaces the shared body rather than editing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsfPicture {
	pic_type: AsfPictureType,
	mime: String,
	description: String,
	data: Arc<[u8]>,
}

impl AsfPicture {
	/// Creates a new picture record
	pub fn new(
		pic_type: AsfPictureType,
		mime: impl Into<String>,
		description: impl Into<String>,
		data: Vec<u8>,
	) -> Self {
		Self {
			pic_type,
			mime: mime.into(),
			description: description.into(),
			data: data.into(),
		}
	}

	/// Attempts to parse a picture record
	///
	/// Returns `None` when the record is structurally invalid: shorter than
	/// its 9 fixed bytes, missing a string terminator, carrying non UTF-16
	/// strings, or with a data length that disagrees with the input length.
	pub fn parse(bytes: &[u8]) -> Option<Self> {
		if bytes.len() < 9 {
			return None;
		}

		let pic_type = AsfPictureType::from(bytes[0]);
		let data_len = LittleEndian::read_u32(&bytes[1..5]) as usize;

		let mut pos = 5;

		let mime = read_utf16le(bytes, &mut pos)?;
		let description = read_utf16le(bytes, &mut pos)?;

		if pos + data_len != bytes.len() {
			return None;
		}

		Some(Self {
			pic_type,
			mime,
			description,
			data: bytes[pos..].into(),
		})
	}

	/// Renders the record
	///
	/// The layout is the type byte, the data length, the mime type and
	/// description as null terminated UTF-16LE, and the picture body.
	pub fn render(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.size());

		out.push(u8::from(self.pic_type));
		out.extend_from_slice(&(self.data.len() as u32).to_le_bytes());

		write_utf16le(&mut out, &self.mime);
		write_utf16le(&mut out, &self.description);

		out.extend_from_slice(&self.data);

		out
	}

	/// The rendered size in bytes
	pub fn size(&self) -> usize {
		9 + 2 * (self.mime.encode_utf16().count() + self.description.encode_utf16().count())
			+ self.data.len()
	}

	/// The picture type
	pub fn pic_type(&self) -> AsfPictureType {
		self.pic_type
	}

	/// Sets the picture type
	pub fn set_pic_type(&mut self, pic_type: AsfPictureType) {
		self.pic_type = pic_type;
	}

	/// The mime type of the picture body
	pub fn mime(&self) -> &str {
		&self.mime
	}

	/// Sets the mime type
	pub fn set_mime(&mut self, mime: impl Into<String>) {
		self.mime = mime.into();
	}

	/// The description
	pub fn description(&self) -> &str {
		&self.description
	}

	/// Sets the description
	pub fn set_description(&mut self, description: impl Into<String>) {
		self.description = description.into();
	}

	/// The picture body
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Replaces the picture body
	///
	/// Other clones of this picture keep the previous body.
	pub fn set_data(&mut self, data: Vec<u8>) {
		self.data = data.into();
	}
}

// Strings are UTF-16LE with a two byte terminator aligned to the code unit
// stride; a lone zero byte inside a code unit does not terminate.
fn read_utf16le(bytes: &[u8], pos: &mut usize) -> Option<String> {
	let mut units = Vec::new();
	let mut cursor = *pos;

	loop {
		if cursor + 2 > bytes.len() {
			return None;
		}

		let unit = LittleEndian::read_u16(&bytes[cursor..cursor + 2]);
		cursor += 2;

		if unit == 0 {
			break;
		}

		units.push(unit);
	}

	*pos = cursor;

	String::from_utf16(&units).ok()
}

fn write_utf16le(out: &mut Vec<u8>, value: &str) {
	for unit in value.encode_utf16() {
		out.extend_from_slice(&unit.to_le_bytes());
	}

	out.extend_from_slice(&[0, 0]);
}
