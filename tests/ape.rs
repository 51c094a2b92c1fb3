mod util;

use util::{build_ape_file, media, sample_ape_tag, sample_id3v1_tag};

use tagsmith::ape::ApeFile;
use tagsmith::{TagBlock, TagKinds};

#[test]
fn read() {
	let tag = sample_ape_tag();
	let id3v1 = sample_id3v1_tag();

	let file = build_ape_file(Some(100), 5000, Some(&tag), Some(&id3v1));
	let ape = ApeFile::read_from(media(file), true).unwrap();

	assert!(ape.has_id3v2_tag());
	assert!(ape.has_ape_tag());
	assert!(ape.has_id3v1_tag());

	assert_eq!(ape.ape_tag().unwrap(), &tag);
	assert_eq!(ape.id3v1_tag().unwrap(), &id3v1);

	// 737280 samples at 44.1 kHz
	assert_eq!(ape.properties().duration().as_millis(), 16718);
	assert_eq!(ape.properties().sample_rate(), 44100);
	assert_eq!(ape.properties().channels(), 2);
	assert_eq!(ape.properties().version(), 3990);
}

#[test]
fn merged_properties_prefer_ape() {
	let mut ape_tag = sample_ape_tag();
	ape_tag.insert_text("Title", "Ape title");

	let file = build_ape_file(None, 4000, Some(&ape_tag), Some(&sample_id3v1_tag()));
	let ape = ApeFile::read_from(media(file), false).unwrap();

	let merged = ape.tag_properties();

	// Both tags carry TITLE; the APE slot wins. ALBUM only exists in ID3v1.
	assert_eq!(merged.get("TITLE"), Some(&vec![String::from("Ape title")]));
	assert_eq!(merged.get("ALBUM"), Some(&vec![String::from("Baz album")]));
}

#[test]
fn strip_ape_then_save() {
	let tag = sample_ape_tag();
	let tag_size = tag.render().len() as u64;
	let id3v1 = sample_id3v1_tag();

	let file = build_ape_file(Some(100), 5000, Some(&tag), Some(&id3v1));
	let original_len = file.len() as u64;

	let mut ape = ApeFile::read_from(media(file), false).unwrap();

	ape.strip(TagKinds::APE);
	ape.save().unwrap();

	assert!(!ape.has_ape_tag());
	assert!(ape.has_id3v1_tag());

	let bytes = ape.into_inner().into_inner();

	assert_eq!(bytes.len() as u64, original_len - tag_size);
	// ID3v1 now sits straight after the 5000 byte audio region
	assert_eq!(&bytes[5100..5103], b"TAG");
	assert_eq!(bytes[5100..], id3v1.render()[..]);
}

#[test]
fn growing_ape_shifts_id3v1_exactly() {
	let tag = sample_ape_tag();
	let id3v1 = sample_id3v1_tag();

	let file = build_ape_file(None, 3000, Some(&tag), Some(&id3v1));
	let id3v1_before = file[file.len() - 128..].to_vec();

	let mut ape = ApeFile::read_from(media(file), false).unwrap();

	let old_size = tag.render().len() as u64;

	{
		let tag = ape.ape_tag_mut(false).unwrap();
		tag.insert(util::binary_item("Cover Art (Front)", 1000));
	}

	let new_size = ape.ape_tag().unwrap().render().len() as u64;
	assert!(new_size > old_size);

	ape.save().unwrap();

	let bytes = ape.into_inner().into_inner();

	// ID3v1 moved right by exactly the tag growth and is bit identical
	let id3v1_start = 3000 + new_size as usize;
	assert_eq!(&bytes[id3v1_start..], &id3v1_before[..]);
	assert_eq!(bytes.len(), id3v1_start + 128);
}

#[test]
fn save_is_idempotent() {
	let file = build_ape_file(Some(64), 2000, Some(&sample_ape_tag()), Some(&sample_id3v1_tag()));

	let mut ape = ApeFile::read_from(media(file), false).unwrap();

	ape.ape_tag_mut(false)
		.unwrap()
		.insert_text("Album", "Replaced album");

	ape.save().unwrap();
	let first = ape.into_inner().into_inner();

	let mut ape = ApeFile::read_from(media(first.clone()), false).unwrap();
	ape.save().unwrap();
	let second = ape.into_inner().into_inner();

	assert_eq!(first, second);
}

#[test]
fn tags_created_on_untagged_file() {
	let file = build_ape_file(None, 1500, None, None);

	let mut ape = ApeFile::read_from(media(file), false).unwrap();

	// With no ID3v1 tag present, an empty APE tag is always reachable
	assert!(ape.ape_tag().is_some());
	assert!(ape.ape_tag().unwrap().is_empty());

	ape.ape_tag_mut(true).unwrap().insert_text("Title", "New");
	*ape.id3v1_tag_mut(true).unwrap() = sample_id3v1_tag();

	ape.save().unwrap();

	assert!(ape.has_ape_tag());
	assert!(ape.has_id3v1_tag());

	let bytes = ape.into_inner().into_inner();

	// Coexistence: [audio][APE][ID3v1(128)], APE flush against ID3v1
	let id3v1_start = bytes.len() - 128;
	assert_eq!(&bytes[id3v1_start..id3v1_start + 3], b"TAG");
	assert_eq!(&bytes[id3v1_start - 32..id3v1_start - 24], b"APETAGEX");

	// And a reread agrees with what was written
	let reread = ApeFile::read_from(media(bytes), false).unwrap();

	assert_eq!(
		reread.ape_tag().unwrap().get("Title").map(|i| i.value()),
		Some(&tagsmith::ape::ItemValue::Text(String::from("New")))
	);
	assert_eq!(reread.id3v1_tag().unwrap(), &sample_id3v1_tag());
}

#[test]
fn emptying_all_tags_truncates_to_audio() {
	let file = build_ape_file(None, 2500, Some(&sample_ape_tag()), Some(&sample_id3v1_tag()));

	let mut ape = ApeFile::read_from(media(file), false).unwrap();

	ape.strip(TagKinds::ALL);
	ape.save().unwrap();

	let bytes = ape.into_inner().into_inner();

	assert_eq!(bytes.len(), 2500);
}

#[test]
fn read_only_save_fails_cleanly() {
	let file = build_ape_file(None, 1000, Some(&sample_ape_tag()), None);
	let original = file.clone();

	let mut ape = ApeFile::read_from(media(file), false).unwrap();
	ape.set_read_only();

	ape.ape_tag_mut(false).unwrap().insert_text("Title", "Nope");

	assert!(matches!(ape.save(), Err(tagsmith::TagError::ReadOnly)));

	// No side effects
	assert_eq!(ape.into_inner().into_inner(), original);
}

#[test]
fn save_to_a_real_file() {
	use std::io::{Read, Seek, SeekFrom, Write};

	let bytes = build_ape_file(None, 1200, None, Some(&sample_id3v1_tag()));

	let mut file = tempfile::tempfile().unwrap();
	file.write_all(&bytes).unwrap();
	file.seek(SeekFrom::Start(0)).unwrap();

	let mut ape = ApeFile::read_from(file, false).unwrap();

	ape.ape_tag_mut(true).unwrap().insert_text("Title", "On disk");
	ape.save().unwrap();

	let mut file = ape.into_inner();
	let mut written = Vec::new();

	file.seek(SeekFrom::Start(0)).unwrap();
	file.read_to_end(&mut written).unwrap();

	// [audio][APE][ID3v1]
	let id3v1_start = written.len() - 128;
	assert_eq!(&written[id3v1_start..id3v1_start + 3], b"TAG");
	assert_eq!(&written[id3v1_start - 32..id3v1_start - 24], b"APETAGEX");

	file.seek(SeekFrom::Start(0)).unwrap();
	let reread = ApeFile::read_from(file, false).unwrap();

	assert!(reread.has_ape_tag());
	assert!(reread.has_id3v1_tag());
}

#[test]
fn sniffing() {
	let file = build_ape_file(Some(128), 600, None, None);

	assert!(tagsmith::ape::is_supported(&mut media(file)).unwrap());
	assert_eq!(
		tagsmith::detect(&mut media(build_ape_file(None, 600, None, None))).unwrap(),
		tagsmith::FileType::Ape
	);
}

#[test]
fn generic_read_entry_dispatches() {
	let file = build_ape_file(None, 800, Some(&sample_ape_tag()), None);

	let mut tagged = tagsmith::read_from(media(file), false).unwrap();

	assert_eq!(tagged.file_type(), tagsmith::FileType::Ape);
	assert_eq!(
		tagged.tag_properties().get("TITLE"),
		Some(&vec![String::from("Foo title")])
	);

	// Edits flow through the generic handle too
	let mut properties = tagsmith::PropertyMap::new();
	properties.insert(String::from("TITLE"), vec![String::from("Dispatched")]);

	let rejected = tagged.set_tag_properties(properties);
	assert!(rejected.is_empty());

	tagged.save().unwrap();

	let reread = ApeFile::read_from(media(tagged.into_inner().into_inner()), false).unwrap();

	assert_eq!(
		reread.tag_properties().get("TITLE"),
		Some(&vec![String::from("Dispatched")])
	);
}
