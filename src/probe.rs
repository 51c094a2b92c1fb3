use crate::ape::ApeFile;
use crate::error::{Result, TagError};
use crate::io::{find_pattern, read_header_window, MediaStream};
use crate::mpeg::MpegFile;
use crate::ogg::constants::{OPUSHEAD, SPEEXHEADER, VORBIS_IDENT_HEAD};
use crate::ogg::opus::OpusFile;
use crate::ogg::speex::SpeexFile;
use crate::ogg::vorbis::VorbisFile;
use crate::tag::PropertyMap;

use std::io::{Read, Seek};

/// The type of file read
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[allow(missing_docs)]
pub enum FileType {
	Ape,
	Mpeg,
	Vorbis,
	Opus,
	Speex,
}

/// Attempts to guess the [`FileType`] from the content of `reader`
///
/// Formats are identified purely by signature sniffing within the first
/// kilobyte; file extensions play no part.
///
/// # Errors
///
/// * The reader holds no data ([`TagError::EmptyFile`])
/// * No signature matched ([`TagError::UnknownFormat`])
/// * `reader` fails a seek or read
pub fn detect<R>(reader: &mut R) -> Result<FileType>
where
	R: Read + Seek,
{
	let buffer = read_header_window(reader, 1024)?;

	if buffer.is_empty() {
		return Err(TagError::EmptyFile);
	}

	if find_pattern(&buffer, b"OggS").is_some() {
		if find_pattern(&buffer, VORBIS_IDENT_HEAD).is_some() {
			return Ok(FileType::Vorbis);
		}

		if find_pattern(&buffer, OPUSHEAD).is_some() {
			return Ok(FileType::Opus);
		}

		if find_pattern(&buffer, SPEEXHEADER).is_some() {
			return Ok(FileType::Speex);
		}

		return Err(TagError::UnknownFormat);
	}

	if find_pattern(&buffer, b"MAC ").is_some() {
		return Ok(FileType::Ape);
	}

	if crate::mpeg::is_supported(reader)? {
		return Ok(FileType::Mpeg);
	}

	Err(TagError::UnknownFormat)
}

/// A concrete file handle behind a guessed [`FileType`]
///
/// This is what [`read_from`] returns when the format is not known up
/// front. The format specific handle stays reachable for everything the
/// generic surface doesn't cover.
pub enum TaggedFile<F> {
	/// An APE file
	Ape(ApeFile<F>),
	/// An MPEG file
	Mpeg(MpegFile<F>),
	/// An OGG Vorbis file
	Vorbis(VorbisFile<F>),
	/// An Opus file
	Opus(OpusFile<F>),
	/// A Speex file
	Speex(SpeexFile<F>),
}

impl<F: MediaStream> TaggedFile<F> {
	/// The detected [`FileType`]
	pub fn file_type(&self) -> FileType {
		match self {
			TaggedFile::Ape(_) => FileType::Ape,
			TaggedFile::Mpeg(_) => FileType::Mpeg,
			TaggedFile::Vorbis(_) => FileType::Vorbis,
			TaggedFile::Opus(_) => FileType::Opus,
			TaggedFile::Speex(_) => FileType::Speex,
		}
	}

	/// The merged properties of the file's tags
	pub fn tag_properties(&self) -> PropertyMap {
		match self {
			TaggedFile::Ape(file) => file.tag_properties(),
			TaggedFile::Mpeg(file) => file.tag_properties(),
			TaggedFile::Vorbis(file) => file.tag_properties(),
			TaggedFile::Opus(file) => file.tag_properties(),
			TaggedFile::Speex(file) => file.tag_properties(),
		}
	}

	/// Stores `properties` in the file's primary tag(s), returning the
	/// pairs no tag could hold
	pub fn set_tag_properties(&mut self, properties: PropertyMap) -> PropertyMap {
		match self {
			TaggedFile::Ape(file) => file.set_tag_properties(properties),
			TaggedFile::Mpeg(file) => file.set_tag_properties(properties),
			TaggedFile::Vorbis(file) => file.set_tag_properties(properties),
			TaggedFile::Opus(file) => file.set_tag_properties(properties),
			TaggedFile::Speex(file) => file.set_tag_properties(properties),
		}
	}

	/// Writes every pending tag edit back to the stream
	///
	/// # Errors
	///
	/// See the `save` documentation of the concrete handles
	pub fn save(&mut self) -> Result<()> {
		match self {
			TaggedFile::Ape(file) => file.save(),
			TaggedFile::Mpeg(file) => file.save(),
			TaggedFile::Vorbis(file) => file.save(),
			TaggedFile::Opus(file) => file.save(),
			TaggedFile::Speex(file) => file.save(),
		}
	}

	/// Consumes the handle, returning the owned stream
	pub fn into_inner(self) -> F {
		match self {
			TaggedFile::Ape(file) => file.into_inner(),
			TaggedFile::Mpeg(file) => file.into_inner(),
			TaggedFile::Vorbis(file) => file.into_inner(),
			TaggedFile::Opus(file) => file.into_inner(),
			TaggedFile::Speex(file) => file.into_inner(),
		}
	}
}

/// Reads a file of any supported format from `stream`, which the returned
/// handle then owns
///
/// The format is guessed with [`detect`] and the matching reader is
/// dispatched to.
///
/// # Errors
///
/// * No signature matched ([`TagError::UnknownFormat`])
/// * The matched format's reader rejects the file
/// * `stream` fails a seek or read
pub fn read_from<F>(mut stream: F, read_properties: bool) -> Result<TaggedFile<F>>
where
	F: MediaStream,
{
	Ok(match detect(&mut stream)? {
		FileType::Ape => TaggedFile::Ape(ApeFile::read_from(stream, read_properties)?),
		FileType::Mpeg => TaggedFile::Mpeg(MpegFile::read_from(stream, read_properties)?),
		FileType::Vorbis => TaggedFile::Vorbis(VorbisFile::read_from(stream, read_properties)?),
		FileType::Opus => TaggedFile::Opus(OpusFile::read_from(stream, read_properties)?),
		FileType::Speex => TaggedFile::Speex(SpeexFile::read_from(stream, read_properties)?),
	})
}

#[cfg(test)]
mod tests {
	use super::{detect, FileType};

	use std::io::Cursor;

	#[test]
	fn ape_signature_anywhere_in_prefix() {
		let mut buffer = vec![0_u8; 1024];
		buffer[5..9].copy_from_slice(b"MAC ");

		assert_eq!(detect(&mut Cursor::new(buffer)).unwrap(), FileType::Ape);
	}

	#[test]
	fn ogg_variants() {
		let mut vorbis = vec![0_u8; 64];
		vorbis[..4].copy_from_slice(b"OggS");
		vorbis[30..37].copy_from_slice(&[1, b'v', b'o', b'r', b'b', b'i', b's']);

		assert_eq!(detect(&mut Cursor::new(vorbis)).unwrap(), FileType::Vorbis);

		let mut opus = vec![0_u8; 64];
		opus[..4].copy_from_slice(b"OggS");
		opus[28..36].copy_from_slice(b"OpusHead");

		assert_eq!(detect(&mut Cursor::new(opus)).unwrap(), FileType::Opus);

		let mut speex = vec![0_u8; 64];
		speex[..4].copy_from_slice(b"OggS");
		speex[28..36].copy_from_slice(b"Speex   ");

		assert_eq!(detect(&mut Cursor::new(speex)).unwrap(), FileType::Speex);
	}

	#[test]
	fn mpeg_from_frame_sync() {
		let mut buffer = vec![0_u8; 64];
		buffer[..4].copy_from_slice(&0xFFFB_9004_u32.to_be_bytes());

		assert_eq!(detect(&mut Cursor::new(buffer)).unwrap(), FileType::Mpeg);
	}

	#[test]
	fn unknown_and_empty() {
		assert!(detect(&mut Cursor::new(vec![0_u8; 64])).is_err());
		assert!(detect(&mut Cursor::new(Vec::new())).is_err());
	}
}
