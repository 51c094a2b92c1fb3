use crate::error::{Result, TagError};
use crate::tag::{PropertyMap, TagBlock};

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Vorbis comments, the tag format shared by the OGG codec family
///
/// Keys are conventionally uppercase and may repeat; field order is
/// preserved. The vendor string identifies the encoding software and is
/// retained across edits.
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct XiphComment {
	pub(crate) vendor: String,
	pub(crate) fields: Vec<(String, String)>,
}

impl XiphComment {
	/// Parses the comment block following the codec's signature
	///
	/// # Errors
	///
	/// * The vendor string or a field is not UTF-8
	/// * The block is shorter than its length fields claim
	pub fn parse(data: &[u8]) -> Result<Self> {
		let reader = &mut &data[..];

		let vendor_len = reader.read_u32::<LittleEndian>()?;

		let mut vendor = vec![0; vendor_len as usize];
		reader.read_exact(&mut vendor)?;

		let vendor = String::from_utf8(vendor)
			.map_err(|_| TagError::Ogg("File has an invalid vendor string"))?;

		let mut comment = XiphComment {
			vendor,
			fields: Vec::new(),
		};

		let field_count = reader.read_u32::<LittleEndian>()?;

		for _ in 0..field_count {
			let field_len = reader.read_u32::<LittleEndian>()?;

			let mut field = vec![0; field_len as usize];
			reader.read_exact(&mut field)?;

			let field = String::from_utf8(field)?;

			match field.split_once('=') {
				Some((key, value)) => comment.push_field(key.to_string(), value.to_string()),
				None => log::debug!("OGG: skipping a comment field without a separator"),
			}
		}

		Ok(comment)
	}

	/// Renders the comment block, without any codec signature
	///
	/// Vorbis requires a trailing framing bit; Opus and Speex forbid it.
	pub fn render(&self, with_framing_bit: bool) -> Vec<u8> {
		let mut data = Vec::new();

		// The writes are infallible, the target is a Vec
		let _ = data.write_u32::<LittleEndian>(self.vendor.len() as u32);
		data.extend_from_slice(self.vendor.as_bytes());

		let _ = data.write_u32::<LittleEndian>(self.fields.len() as u32);

		for (key, value) in &self.fields {
			let field = format!("{}={}", key, value);

			let _ = data.write_u32::<LittleEndian>(field.len() as u32);
			data.extend_from_slice(field.as_bytes());
		}

		if with_framing_bit {
			data.push(1);
		}

		data
	}

	/// Returns the vendor string
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// Sets the vendor string
	pub fn set_vendor(&mut self, vendor: String) {
		self.vendor = vendor;
	}

	/// Returns the tag's fields in (key, value) pairs
	pub fn fields(&self) -> &[(String, String)] {
		&self.fields
	}

	/// Gets the first value for `key`, ignoring case
	pub fn get(&self, key: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v.as_str())
	}

	/// Appends a field, keeping any existing values for the key
	pub fn push_field(&mut self, key: String, value: String) {
		self.fields.push((key, value));
	}

	/// Inserts a field, removing all other values for the key
	pub fn insert_field(&mut self, key: String, value: String) {
		self.remove_key(&key);
		self.push_field(key, value);
	}

	/// Removes every value for `key`, ignoring case
	pub fn remove_key(&mut self, key: &str) {
		self.fields.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
	}
}

impl TagBlock for XiphComment {
	fn render(&self) -> Vec<u8> {
		self.render(false)
	}

	fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	fn properties(&self) -> PropertyMap {
		let mut map = PropertyMap::new();

		for (key, value) in &self.fields {
			map.entry(key.to_uppercase())
				.or_insert_with(Vec::new)
				.push(value.clone());
		}

		map
	}

	fn set_properties(&mut self, properties: PropertyMap) -> PropertyMap {
		self.fields.clear();

		for (key, values) in properties {
			for value in values {
				self.push_field(key.clone(), value);
			}
		}

		// Vorbis comments can hold any key/value pair
		PropertyMap::new()
	}

	fn remove_unsupported(&mut self, keys: &[String]) {
		for key in keys {
			self.remove_key(key);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::XiphComment;
	use crate::tag::TagBlock;

	#[test]
	fn roundtrip() {
		let mut comment = XiphComment::default();

		comment.set_vendor(String::from("tagsmith test"));
		comment.push_field(String::from("TITLE"), String::from("Foo title"));
		comment.push_field(String::from("ARTIST"), String::from("Bar artist"));
		comment.push_field(String::from("ARTIST"), String::from("Second artist"));

		let rendered = comment.render(false);
		let reparsed = XiphComment::parse(&rendered).unwrap();

		assert_eq!(reparsed, comment);
	}

	#[test]
	fn framing_bit_is_appended() {
		let comment = XiphComment::default();

		let without = comment.render(false);
		let with = comment.render(true);

		assert_eq!(with.len(), without.len() + 1);
		assert_eq!(with.last(), Some(&1));
	}

	#[test]
	fn properties_group_repeated_keys() {
		let mut comment = XiphComment::default();

		comment.push_field(String::from("Artist"), String::from("A"));
		comment.push_field(String::from("ARTIST"), String::from("B"));

		let properties = comment.properties();

		assert_eq!(
			properties.get("ARTIST"),
			Some(&vec![String::from("A"), String::from("B")])
		);
	}

	#[test]
	fn fields_without_separator_are_skipped() {
		// vendor "v", one field lacking '='
		let mut data = Vec::new();
		data.extend_from_slice(&1_u32.to_le_bytes());
		data.push(b'v');
		data.extend_from_slice(&1_u32.to_le_bytes());
		data.extend_from_slice(&7_u32.to_le_bytes());
		data.extend_from_slice(b"NOEQUAL");

		let comment = XiphComment::parse(&data).unwrap();

		assert!(comment.is_empty());
		assert_eq!(comment.vendor(), "v");
	}
}
