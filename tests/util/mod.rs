#![allow(dead_code)]

use tagsmith::ape::{ApeTag, ItemValue};
use tagsmith::id3::v1::Id3v1Tag;
use tagsmith::TagBlock;

use std::io::Cursor;

pub fn media(bytes: Vec<u8>) -> Cursor<Vec<u8>> {
	Cursor::new(bytes)
}

fn synchsafe(size: u32) -> [u8; 4] {
	[
		((size >> 21) & 0x7F) as u8,
		((size >> 14) & 0x7F) as u8,
		((size >> 7) & 0x7F) as u8,
		(size & 0x7F) as u8,
	]
}

// An ID3v2.4 tag of exactly `total_size` bytes (header included), frames
// zeroed out.
pub fn id3v2_block(total_size: usize) -> Vec<u8> {
	assert!(total_size >= 10);

	let mut block = vec![b'I', b'D', b'3', 4, 0, 0];
	block.extend_from_slice(&synchsafe((total_size - 10) as u32));
	block.resize(total_size, 0);

	block
}

// A MAC 3.99 stream header: 52 byte descriptor followed by a 24 byte
// header describing 10 frames of stereo 44.1 kHz audio.
pub fn mac_header() -> Vec<u8> {
	let mut header = Vec::new();

	header.extend_from_slice(b"MAC ");
	header.extend_from_slice(&3990_u16.to_le_bytes()); // version
	header.extend_from_slice(&0_u16.to_le_bytes()); // padding
	header.extend_from_slice(&52_u32.to_le_bytes()); // descriptor length
	header.resize(52, 0);

	header.extend_from_slice(&2000_u16.to_le_bytes()); // compression
	header.extend_from_slice(&0_u16.to_le_bytes()); // format flags
	header.extend_from_slice(&73728_u32.to_le_bytes()); // blocks per frame
	header.extend_from_slice(&73728_u32.to_le_bytes()); // final frame blocks
	header.extend_from_slice(&10_u32.to_le_bytes()); // total frames
	header.extend_from_slice(&16_u16.to_le_bytes()); // bits per sample
	header.extend_from_slice(&2_u16.to_le_bytes()); // channels
	header.extend_from_slice(&44100_u32.to_le_bytes()); // sample rate

	header
}

pub fn sample_ape_tag() -> ApeTag {
	let mut tag = ApeTag::default();

	tag.insert_text("Title", "Foo title");
	tag.insert_text("Artist", "Bar artist");

	tag
}

pub fn sample_id3v1_tag() -> Id3v1Tag {
	Id3v1Tag {
		title: Some(String::from("Foo title")),
		artist: Some(String::from("Bar artist")),
		album: Some(String::from("Baz album")),
		year: Some(String::from("1984")),
		comment: Some(String::from("Qux comment")),
		track_number: Some(1),
		genre: Some(32),
	}
}

// [ID3v2][MAC header + padding][APE tag][ID3v1]; any section can be left
// out. The audio region is `audio_len` bytes, MAC header included.
pub fn build_ape_file(
	id3v2_size: Option<usize>,
	audio_len: usize,
	ape_tag: Option<&ApeTag>,
	id3v1_tag: Option<&Id3v1Tag>,
) -> Vec<u8> {
	let mut file = Vec::new();

	if let Some(size) = id3v2_size {
		file.extend_from_slice(&id3v2_block(size));
	}

	let audio_start = file.len();
	file.extend_from_slice(&mac_header());
	assert!(file.len() - audio_start <= audio_len);
	file.resize(audio_start + audio_len, 0);

	if let Some(tag) = ape_tag {
		file.extend_from_slice(&tag.render());
	}

	if let Some(tag) = id3v1_tag {
		file.extend_from_slice(&tag.render());
	}

	file
}

// A single 417 byte MPEG-1 Layer 3 CBR frame (128 kbps, 44.1 kHz, stereo)
pub fn cbr_frame() -> Vec<u8> {
	let mut frame = vec![0_u8; 417];
	frame[..4].copy_from_slice(&0xFFFB_9004_u32.to_be_bytes());

	frame
}

// An ApeItem helper for growing tags by a known amount
pub fn binary_item(key: &str, len: usize) -> tagsmith::ape::ApeItem {
	tagsmith::ape::ApeItem::new(String::from(key), ItemValue::Binary(vec![0x42; len])).unwrap()
}
