use super::item::{ApeItem, ItemValue};
use super::{APE_PREAMBLE, HAS_FOOTER, HAS_HEADER, IS_HEADER};
use crate::tag::{PropertyMap, TagBlock};

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

/// An `APE` tag
///
/// ## Item storage
///
/// `APE` isn't a very strict format, an [`ApeItem`] is only restricted by
/// its key. Multiple values live inside a single text item, separated by
/// NUL bytes.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct ApeTag {
	/// Whether or not to mark the tag as read only
	pub read_only: bool,
	pub(crate) items: Vec<ApeItem>,
}

impl ApeTag {
	/// Get an [`ApeItem`] by key
	///
	/// NOTE: While `APE` items are supposed to be case-sensitive,
	/// this rule is rarely followed, so this will ignore case when searching.
	pub fn get(&self, key: &str) -> Option<&ApeItem> {
		self.items
			.iter()
			.find(|i| i.key().eq_ignore_ascii_case(key))
	}

	/// Insert an [`ApeItem`]
	///
	/// This will remove any item with the same key prior to insertion
	pub fn insert(&mut self, value: ApeItem) {
		let key = value.key().to_string();

		self.remove(&key);
		self.items.push(value);
	}

	/// Insert a text item, dropping the pair if `key` is invalid
	pub fn insert_text(&mut self, key: &str, value: &str) {
		if let Ok(item) = ApeItem::new(String::from(key), ItemValue::Text(String::from(value))) {
			self.insert(item);
		}
	}

	/// Remove an [`ApeItem`] by key
	///
	/// NOTE: Like [`ApeTag::get`], this is not case-sensitive
	pub fn remove(&mut self, key: &str) {
		self.items
			.retain(|i| !i.key().eq_ignore_ascii_case(key));
	}

	/// Returns all of the tag's items
	pub fn items(&self) -> &[ApeItem] {
		&self.items
	}

	fn render_items(&self) -> Vec<u8> {
		let mut writer = Vec::new();

		for item in &self.items {
			let (mut flags, value) = match &item.value {
				ItemValue::Text(value) => (0_u32, value.as_bytes()),
				ItemValue::Binary(value) => (1_u32 << 1, value.as_slice()),
				ItemValue::Locator(value) => (2_u32 << 1, value.as_bytes()),
			};

			if item.read_only {
				flags |= 1;
			}

			// The writes are infallible, the target is a Vec
			let _ = writer.write_u32::<LittleEndian>(value.len() as u32);
			let _ = writer.write_u32::<LittleEndian>(flags);
			let _ = writer.write_all(item.key.as_bytes());
			let _ = writer.write_u8(0);
			let _ = writer.write_all(value);
		}

		writer
	}

	fn render_block(&self, size: u32, is_header: bool) -> Vec<u8> {
		let mut block = Vec::with_capacity(32);

		// A v2 tag always carries both blocks
		let mut flags = HAS_HEADER | HAS_FOOTER;

		if is_header {
			flags |= IS_HEADER;
		}

		if self.read_only {
			flags |= 1;
		}

		let _ = block.write_all(APE_PREAMBLE);
		// Always written as a v2 tag
		let _ = block.write_u32::<LittleEndian>(2000);
		let _ = block.write_u32::<LittleEndian>(size);
		let _ = block.write_u32::<LittleEndian>(self.items.len() as u32);
		let _ = block.write_u32::<LittleEndian>(flags);
		let _ = block.write_u64::<LittleEndian>(0);

		block
	}
}

impl TagBlock for ApeTag {
	// [header 32][items][footer 32]; the size fields count the items plus
	// one block, per the APEv2 layout.
	fn render(&self) -> Vec<u8> {
		let items = self.render_items();
		let size = (items.len() + 32) as u32;

		let mut tag = self.render_block(size, true);
		tag.extend_from_slice(&items);
		tag.extend_from_slice(&self.render_block(size, false));

		tag
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	fn properties(&self) -> PropertyMap {
		let mut map = PropertyMap::new();

		for item in &self.items {
			if let ItemValue::Text(text) = &item.value {
				let values = text.split('\0').map(String::from).collect::<Vec<_>>();

				map.insert(item.key.to_uppercase(), values);
			}
		}

		map
	}

	fn set_properties(&mut self, properties: PropertyMap) -> PropertyMap {
		let mut rejected = PropertyMap::new();

		// Text items are replaced wholesale; binary items are untouched by
		// the property interface
		self.items
			.retain(|i| !matches!(i.value, ItemValue::Text(_)));

		for (key, values) in properties {
			let joined = values.join("\0");

			match ApeItem::new(key.clone(), ItemValue::Text(joined)) {
				Ok(item) => self.insert(item),
				Err(_) => {
					rejected.insert(key, values);
				},
			}
		}

		rejected
	}

	fn remove_unsupported(&mut self, keys: &[String]) {
		for key in keys {
			self.remove(key);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{ApeItem, ApeTag, ItemValue};
	use crate::ape::tag::{find_ape, read_ape_tag};
	use crate::tag::TagBlock;

	use std::io::Cursor;

	#[test]
	fn roundtrip_with_binary_item() {
		let mut tag = ApeTag::default();

		tag.insert_text("Title", "Foo title");
		tag.insert(
			ApeItem::new(
				String::from("Cover Art (Front)"),
				ItemValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]),
			)
			.unwrap(),
		);

		let rendered = tag.render();

		// 32 byte header and footer wrapping the items
		assert_eq!(&rendered[..8], b"APETAGEX");
		assert_eq!(&rendered[rendered.len() - 32..][..8], b"APETAGEX");

		let mut reader = Cursor::new(rendered);
		let location = find_ape(&mut reader, None).unwrap().unwrap();
		let reparsed = read_ape_tag(&mut reader, &location).unwrap();

		assert_eq!(reparsed.items().len(), 2);
		assert_eq!(
			reparsed.get("cover art (front)").map(ApeItem::value),
			Some(&ItemValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]))
		);
	}

	#[test]
	fn insert_replaces_same_key() {
		let mut tag = ApeTag::default();

		tag.insert_text("Genre", "Classical");
		tag.insert_text("GENRE", "Rock");

		assert_eq!(tag.items().len(), 1);
		assert_eq!(
			tag.get("Genre").map(ApeItem::value),
			Some(&ItemValue::Text(String::from("Rock")))
		);
	}

	#[test]
	fn properties_split_multiple_values() {
		let mut tag = ApeTag::default();

		tag.insert(
			ApeItem::new(
				String::from("Artist"),
				ItemValue::Text(String::from("First\0Second")),
			)
			.unwrap(),
		);

		let properties = tag.properties();

		assert_eq!(
			properties.get("ARTIST"),
			Some(&vec![String::from("First"), String::from("Second")])
		);
	}

	#[test]
	fn set_properties_rejects_bad_keys() {
		let mut tag = ApeTag::default();

		let mut properties = crate::PropertyMap::new();
		properties.insert(String::from("TITLE"), vec![String::from("Foo")]);
		properties.insert(String::from("X"), vec![String::from("too short")]);

		let rejected = tag.set_properties(properties);

		assert_eq!(rejected.len(), 1);
		assert!(rejected.contains_key("X"));
		assert!(tag.get("TITLE").is_some());
	}
}
