//! ID3v1 specific items
//!
//! ID3v1 is a severely limited format, with each field being incredibly
//! small in size. Attempting to write a field greater than its maximum size
//! will **not** error, it will just be shrunk. A V1.1 tag (zeroed comment
//! byte 28 followed by a track number) is always written.

use crate::tag::{PropertyMap, TagBlock};

use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::WriteBytesExt;

/// The genre list shared between ID3v1 readers
///
/// The genre byte of a tag is an index into this table.
pub const GENRES: [&str; 80] = [
	"Blues",
	"Classic Rock",
	"Country",
	"Dance",
	"Disco",
	"Funk",
	"Grunge",
	"Hip-Hop",
	"Jazz",
	"Metal",
	"New Age",
	"Oldies",
	"Other",
	"Pop",
	"R&B",
	"Rap",
	"Reggae",
	"Rock",
	"Techno",
	"Industrial",
	"Alternative",
	"Ska",
	"Death Metal",
	"Pranks",
	"Soundtrack",
	"Euro-Techno",
	"Ambient",
	"Trip-Hop",
	"Vocal",
	"Jazz+Funk",
	"Fusion",
	"Trance",
	"Classical",
	"Instrumental",
	"Acid",
	"House",
	"Game",
	"Sound Clip",
	"Gospel",
	"Noise",
	"Alternative Rock",
	"Bass",
	"Soul",
	"Punk",
	"Space",
	"Meditative",
	"Instrumental Pop",
	"Instrumental Rock",
	"Ethnic",
	"Gothic",
	"Darkwave",
	"Techno-Industrial",
	"Electronic",
	"Pop-Folk",
	"Eurodance",
	"Dream",
	"Southern Rock",
	"Comedy",
	"Cult",
	"Gangsta",
	"Top 40",
	"Christian Rap",
	"Pop/Funk",
	"Jungle",
	"Native American",
	"Cabaret",
	"New Wave",
	"Psychedelic",
	"Rave",
	"Showtunes",
	"Trailer",
	"Lo-Fi",
	"Tribal",
	"Acid Punk",
	"Acid Jazz",
	"Polka",
	"Retro",
	"Musical",
	"Rock & Roll",
	"Hard Rock",
];

/// An ID3v1 tag
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Id3v1Tag {
	/// Track title, 30 bytes max
	pub title: Option<String>,
	/// Track artist, 30 bytes max
	pub artist: Option<String>,
	/// Album title, 30 bytes max
	pub album: Option<String>,
	/// Release year, 4 bytes max
	pub year: Option<String>,
	/// A short comment, 28 bytes max when a track number is present
	pub comment: Option<String>,
	/// The track number, which cannot be 0
	pub track_number: Option<u8>,
	/// An index into [`GENRES`]
	pub genre: Option<u8>,
}

impl Id3v1Tag {
	/// Parses a tag from its full 128 byte block (including the `TAG`
	/// signature)
	pub fn parse(block: [u8; 128]) -> Self {
		let reader = &block[3..];

		let mut tag = Id3v1Tag {
			title: decode_text(&reader[..30]),
			artist: decode_text(&reader[30..60]),
			album: decode_text(&reader[60..90]),
			year: decode_text(&reader[90..94]),
			..Id3v1Tag::default()
		};

		// A zeroed byte 28 of the comment followed by a nonzero byte marks a
		// V1.1 tag carrying a track number
		let comment_range = if reader[122] == 0 && reader[123] != 0 {
			tag.track_number = Some(reader[123]);

			94_usize..122
		} else {
			94..124
		};

		tag.comment = decode_text(&reader[comment_range]);

		if reader[124] < GENRES.len() as u8 {
			tag.genre = Some(reader[124]);
		}

		tag
	}

	/// The genre as a string, when the genre byte indexes [`GENRES`]
	pub fn genre_str(&self) -> Option<&'static str> {
		self.genre
			.and_then(|g| GENRES.get(g as usize))
			.copied()
	}
}

fn decode_text(data: &[u8]) -> Option<String> {
	let read = data
		.iter()
		.filter(|c| **c != 0)
		.map(|c| *c as char)
		.collect::<String>();

	let read = read.trim_end();

	if read.is_empty() {
		None
	} else {
		Some(read.to_string())
	}
}

fn resize_string(value: Option<&String>, size: usize) -> Vec<u8> {
	let mut cursor = Cursor::new(vec![0; size]);

	if let Some(val) = value {
		let bytes = val.as_bytes();

		// Infallible, the cursor's buffer never grows
		let _ = cursor.seek(SeekFrom::Start(0));
		let _ = cursor.write_all(&bytes[..bytes.len().min(size)]);
	}

	cursor.into_inner()
}

impl TagBlock for Id3v1Tag {
	fn render(&self) -> Vec<u8> {
		let mut writer = Vec::with_capacity(128);

		// The write targets are infallible
		let _ = writer.write_all(b"TAG");
		let _ = writer.write_all(&resize_string(self.title.as_ref(), 30));
		let _ = writer.write_all(&resize_string(self.artist.as_ref(), 30));
		let _ = writer.write_all(&resize_string(self.album.as_ref(), 30));
		let _ = writer.write_all(&resize_string(self.year.as_ref(), 4));
		let _ = writer.write_all(&resize_string(self.comment.as_ref(), 28));
		let _ = writer.write_u8(0);
		let _ = writer.write_u8(self.track_number.unwrap_or(0));
		let _ = writer.write_u8(self.genre.unwrap_or(255));

		writer
	}

	fn is_empty(&self) -> bool {
		self.title.is_none()
			&& self.artist.is_none()
			&& self.album.is_none()
			&& self.year.is_none()
			&& self.comment.is_none()
			&& self.track_number.is_none()
			&& self.genre.is_none()
	}

	fn properties(&self) -> PropertyMap {
		let mut map = PropertyMap::new();

		let mut push = |key: &str, value: Option<String>| {
			if let Some(value) = value {
				map.insert(String::from(key), vec![value]);
			}
		};

		push("TITLE", self.title.clone());
		push("ARTIST", self.artist.clone());
		push("ALBUM", self.album.clone());
		push("DATE", self.year.clone());
		push("COMMENT", self.comment.clone());
		push("TRACKNUMBER", self.track_number.map(|t| t.to_string()));
		push("GENRE", self.genre_str().map(String::from));

		map
	}

	fn set_properties(&mut self, mut properties: PropertyMap) -> PropertyMap {
		let mut take = |key: &str| {
			properties
				.remove(key)
				.and_then(|values| values.into_iter().next())
		};

		self.title = take("TITLE");
		self.artist = take("ARTIST");
		self.album = take("ALBUM");
		self.year = take("DATE");
		self.comment = take("COMMENT");
		self.track_number = take("TRACKNUMBER").and_then(|t| t.parse().ok());
		self.genre = take("GENRE")
			.and_then(|name| GENRES.iter().position(|g| g.eq_ignore_ascii_case(&name)))
			.map(|index| index as u8);

		// Everything left over does not fit the format
		properties
	}

	fn remove_unsupported(&mut self, keys: &[String]) {
		for key in keys {
			match key.as_str() {
				"TITLE" => self.title = None,
				"ARTIST" => self.artist = None,
				"ALBUM" => self.album = None,
				"DATE" => self.year = None,
				"COMMENT" => self.comment = None,
				"TRACKNUMBER" => self.track_number = None,
				"GENRE" => self.genre = None,
				_ => {},
			}
		}
	}
}
