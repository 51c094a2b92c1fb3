use crate::error::Result;

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

// Tail shifts during surgery move at most this much per read/write pair, so
// a splice never buffers more than one chunk regardless of file size.
const SURGERY_CHUNK: u64 = 65536;

/// Dropping bytes at or after a given length
pub trait Truncate {
	/// Drops all bytes at or after `new_len`
	///
	/// # Errors
	///
	/// Errors depend on the medium being truncated
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.set_len(new_len)
	}
}

impl Truncate for Cursor<Vec<u8>> {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.get_mut().truncate(new_len as usize);
		Ok(())
	}
}

/// Querying the total length of a medium
pub trait Length {
	/// The total length in bytes
	///
	/// # Errors
	///
	/// Errors depend on the medium being queried
	fn len(&mut self) -> std::io::Result<u64>;
}

impl Length for File {
	fn len(&mut self) -> std::io::Result<u64> {
		Ok(self.metadata()?.len())
	}
}

impl Length for Cursor<Vec<u8>> {
	fn len(&mut self) -> std::io::Result<u64> {
		Ok(self.get_ref().len() as u64)
	}
}

/// A random access medium a file object can own
///
/// Implemented for any seekable reader/writer that can also report and change
/// its length, notably [`File`] and `Cursor<Vec<u8>>`. Every operation that
/// seeks leaves the position unspecified on return.
pub trait MediaStream: Read + Write + Seek + Truncate + Length {}

impl<T: Read + Write + Seek + Truncate + Length> MediaStream for T {}

/// Reads up to `len` bytes from the start of the reader
///
/// Short files yield short buffers rather than an error, since this is used
/// for signature sniffing.
pub(crate) fn read_header_window<R>(reader: &mut R, len: u64) -> Result<Vec<u8>>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(0))?;

	let mut buffer = Vec::with_capacity(len as usize);
	reader.by_ref().take(len).read_to_end(&mut buffer)?;

	Ok(buffer)
}

/// Returns the offset of the first occurrence of `pattern`
pub(crate) fn find_pattern(buffer: &[u8], pattern: &[u8]) -> Option<usize> {
	if pattern.is_empty() || buffer.len() < pattern.len() {
		return None;
	}

	(0..=buffer.len() - pattern.len()).find(|&i| &buffer[i..i + pattern.len()] == pattern)
}

/// Replaces the byte range `[offset, offset + old_len)` with `new`
///
/// Same length replacements overwrite in place. Otherwise the trailing bytes
/// are shifted in bounded chunks, so the audio payload following a tag block
/// is moved rather than rewritten from a full-file buffer. No recovery is
/// attempted if a write fails partway; the error surfaces to the caller.
pub(crate) fn replace_block<F>(file: &mut F, offset: u64, old_len: u64, new: &[u8]) -> Result<()>
where
	F: MediaStream,
{
	let file_len = file.len()?;
	debug_assert!(offset + old_len <= file_len);

	let new_len = new.len() as u64;

	if new_len == old_len {
		file.seek(SeekFrom::Start(offset))?;
		file.write_all(new)?;

		return Ok(());
	}

	let tail_start = offset + old_len;
	let tail_len = file_len - tail_start;
	let mut buffer = vec![0; SURGERY_CHUNK as usize];

	if new_len > old_len {
		let delta = new_len - old_len;

		// Walk the tail backward so a chunk is never overwritten before it
		// has been read
		let mut remaining = tail_len;

		while remaining > 0 {
			let chunk = remaining.min(SURGERY_CHUNK);
			let source = tail_start + remaining - chunk;

			file.seek(SeekFrom::Start(source))?;
			file.read_exact(&mut buffer[..chunk as usize])?;

			file.seek(SeekFrom::Start(source + delta))?;
			file.write_all(&buffer[..chunk as usize])?;

			remaining -= chunk;
		}

		file.seek(SeekFrom::Start(offset))?;
		file.write_all(new)?;
	} else {
		let delta = old_len - new_len;

		file.seek(SeekFrom::Start(offset))?;
		file.write_all(new)?;

		// Compact the tail forward, then drop the leftover bytes
		let mut moved = 0_u64;

		while moved < tail_len {
			let chunk = (tail_len - moved).min(SURGERY_CHUNK);

			file.seek(SeekFrom::Start(tail_start + moved))?;
			file.read_exact(&mut buffer[..chunk as usize])?;

			file.seek(SeekFrom::Start(tail_start + moved - delta))?;
			file.write_all(&buffer[..chunk as usize])?;

			moved += chunk;
		}

		file.truncate(file_len - delta)?;
	}

	Ok(())
}
