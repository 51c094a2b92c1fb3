use crate::error::{Result, TagError};

// Keys that would collide with other tag signatures
const INVALID_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

/// The value of an [`ApeItem`]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ItemValue {
	/// A UTF-8 string; multiple values are separated by NUL bytes
	Text(String),
	/// Opaque binary data, typically cover art
	Binary(Vec<u8>),
	/// A UTF-8 link to external data
	Locator(String),
}

/// Represents an `APE` tag item
///
/// The restrictions for `APE` lie in the key rather than the value.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ApeItem {
	/// Whether or not to mark the item as read only
	pub read_only: bool,
	pub(crate) key: String,
	pub(crate) value: ItemValue,
}

impl ApeItem {
	/// Create an [`ApeItem`]
	///
	/// # Errors
	///
	/// * `key` is illegal ("ID3", "TAG", "OGGS", "MP+")
	/// * `key` has a bad length (must be 2 to 255, inclusive)
	/// * `key` contains invalid characters (must be in the range 0x20 to 0x7E, inclusive)
	pub fn new(key: String, value: ItemValue) -> Result<Self> {
		if INVALID_KEYS.contains(&&*key.to_uppercase()) {
			return Err(TagError::Ape("Tag item contains an illegal key"));
		}

		if !(2..=255).contains(&key.len()) {
			return Err(TagError::Ape(
				"Tag item key has an invalid length (< 2 || > 255)",
			));
		}

		if key.chars().any(|c| !(0x20..=0x7E).contains(&(c as u32))) {
			return Err(TagError::Ape("Tag item contains invalid characters"));
		}

		Ok(Self {
			read_only: false,
			key,
			value,
		})
	}

	/// Make the item read only
	pub fn set_read_only(&mut self) {
		self.read_only = true
	}

	/// Returns the item key
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the item value
	pub fn value(&self) -> &ItemValue {
		&self.value
	}
}
