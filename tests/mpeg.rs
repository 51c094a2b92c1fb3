mod util;

use util::{cbr_frame, id3v2_block, media, sample_ape_tag, sample_id3v1_tag};

use tagsmith::mpeg::MpegFile;
use tagsmith::TagBlock;

fn build_mpeg_file(
	id3v2_size: Option<usize>,
	frames: usize,
	with_ape: bool,
	with_id3v1: bool,
) -> Vec<u8> {
	let mut file = Vec::new();

	if let Some(size) = id3v2_size {
		file.extend_from_slice(&id3v2_block(size));
	}

	for _ in 0..frames {
		file.extend_from_slice(&cbr_frame());
	}

	if with_ape {
		file.extend_from_slice(&sample_ape_tag().render());
	}

	if with_id3v1 {
		file.extend_from_slice(&sample_id3v1_tag().render());
	}

	file
}

#[test]
fn read_cbr() {
	let file = build_mpeg_file(Some(64), 10, true, true);

	let mpeg = MpegFile::read_from(media(file), true).unwrap();

	assert!(mpeg.has_id3v2_tag());
	assert!(mpeg.has_ape_tag());
	assert!(mpeg.has_id3v1_tag());

	// 4170 bytes of frames at 128 kbps
	assert_eq!(mpeg.properties().duration().as_millis(), 261);
	assert_eq!(mpeg.properties().bitrate(), 128);
	assert_eq!(mpeg.properties().sample_rate(), 44100);
	assert_eq!(mpeg.properties().channels(), 2);
	assert!(mpeg.properties().xing_header().is_none());
}

#[test]
fn tail_tags_ignored_by_frame_scan() {
	// Tag bytes must not be mistaken for audio even without ID3v2
	let with_tags = build_mpeg_file(None, 4, true, true);
	let bare = build_mpeg_file(None, 4, false, false);

	let tagged = MpegFile::read_from(media(with_tags), true).unwrap();
	let untagged = MpegFile::read_from(media(bare), true).unwrap();

	assert_eq!(
		tagged.properties().duration(),
		untagged.properties().duration()
	);
}

#[test]
fn strip_id3v2_shifts_tail_locations() {
	let file = build_mpeg_file(Some(100), 4, true, true);
	let frames_len = 4 * 417;

	let mut mpeg = MpegFile::read_from(media(file), false).unwrap();

	mpeg.strip_id3v2().unwrap();

	assert!(!mpeg.has_id3v2_tag());

	let bytes = mpeg.into_inner().into_inner();

	// The frames now start at offset zero, the tail right behind them
	assert_eq!(&bytes[..2], &[0xFF, 0xFB]);
	assert_eq!(&bytes[frames_len..frames_len + 8], b"APETAGEX");
}

#[test]
fn edit_ape_keeps_id3v1_intact() {
	let file = build_mpeg_file(None, 6, true, true);
	let id3v1_before = file[file.len() - 128..].to_vec();

	let mut mpeg = MpegFile::read_from(media(file), false).unwrap();

	mpeg.ape_tag_mut(false)
		.unwrap()
		.insert_text("Comment", "A much longer comment than before");

	mpeg.save().unwrap();

	let bytes = mpeg.into_inner().into_inner();

	assert_eq!(&bytes[bytes.len() - 128..], &id3v1_before[..]);
}

#[test]
fn reread_after_save() {
	let file = build_mpeg_file(Some(32), 6, false, false);

	let mut mpeg = MpegFile::read_from(media(file), false).unwrap();

	mpeg.ape_tag_mut(true).unwrap().insert_text("Title", "Saved");
	*mpeg.id3v1_tag_mut(true).unwrap() = sample_id3v1_tag();

	mpeg.save().unwrap();

	let bytes = mpeg.into_inner().into_inner();
	let reread = MpegFile::read_from(media(bytes), true).unwrap();

	assert!(reread.has_ape_tag());
	assert!(reread.has_id3v1_tag());
	assert_eq!(reread.properties().bitrate(), 128);
	assert_eq!(
		reread.tag_properties().get("TITLE"),
		Some(&vec![String::from("Saved")])
	);
}

#[test]
fn sniffing() {
	let file = build_mpeg_file(Some(48), 2, false, false);

	assert!(tagsmith::mpeg::is_supported(&mut media(file.clone())).unwrap());
	assert_eq!(
		tagsmith::detect(&mut media(file)).unwrap(),
		tagsmith::FileType::Mpeg
	);
}
