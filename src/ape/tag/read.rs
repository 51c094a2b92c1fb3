use super::ape_tag::ApeTag;
use super::item::{ApeItem, ItemValue};
use crate::error::{Result, TagError};

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

// Reads `item_count` items; the reader must be positioned at the first item
// (just past the tag header, when one is present).
pub(super) fn read_ape_items<R>(data: &mut R, item_count: u32) -> Result<ApeTag>
where
	R: Read,
{
	let mut tag = ApeTag::default();

	for _ in 0..item_count {
		let value_size = data.read_u32::<LittleEndian>()?;

		if value_size == 0 {
			return Err(TagError::Ape("Tag item value has an invalid size (0)"));
		}

		let flags = data.read_u32::<LittleEndian>()?;

		let mut key = Vec::new();
		let mut key_char = data.read_u8()?;

		while key_char != 0 {
			key.push(key_char);
			key_char = data.read_u8()?;
		}

		let key = String::from_utf8(key)
			.map_err(|_| TagError::Ape("Tag item contains a non UTF-8 key"))?;

		let read_only = (flags & 1) == 1;
		let item_type = (flags & 6) >> 1;

		let mut value = vec![0; value_size as usize];
		data.read_exact(&mut value)?;

		let parsed_value = match item_type {
			0 => ItemValue::Text(String::from_utf8(value).map_err(|_| {
				TagError::Ape("Expected a string value based on flags, found binary data")
			})?),
			1 => ItemValue::Binary(value),
			2 => ItemValue::Locator(String::from_utf8(value).map_err(|_| {
				TagError::Ape("Failed to convert locator item into a UTF-8 string")
			})?),
			_ => return Err(TagError::Ape("Tag item contains an invalid item type")),
		};

		let mut item = ApeItem::new(key, parsed_value)?;

		if read_only {
			item.set_read_only()
		}

		tag.insert(item);
	}

	Ok(tag)
}
