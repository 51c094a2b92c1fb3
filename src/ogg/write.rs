use super::read::OggMetadata;
use crate::error::Result;
use crate::io::{replace_block, MediaStream};

use ogg_page::{Page, PageHeader, MAX_SEGMENTS};

// Replaces the comment packet (the first packet of the metadata page group)
// and splices the re-paginated group over the old one. Audio page bytes are
// untouched; their sequence numbers are rewritten in place only when the
// group's page count changed.
pub(crate) fn replace_comment_packet<F>(
	file: &mut F,
	metadata: &mut OggMetadata,
	comment_packet: Vec<u8>,
) -> Result<()>
where
	F: MediaStream,
{
	let mut packets = metadata.group_packets.clone();

	if packets.is_empty() {
		packets.push(comment_packet);
	} else {
		packets[0] = comment_packet;
	}

	let pages = paginate(&packets, metadata.serial, metadata.first_sequence)?;

	let mut rendered = Vec::new();

	for page in &pages {
		rendered.extend_from_slice(&page.render()?);
	}

	let old_len = metadata.group_end - metadata.group_start;
	replace_block(file, metadata.group_start, old_len, &rendered)?;

	let new_group_end = metadata.group_start + rendered.len() as u64;
	let new_page_count = pages.len() as u32;

	if new_page_count != metadata.group_page_count {
		log::debug!(
			"OGG: metadata group went from {} to {} pages, renumbering",
			metadata.group_page_count,
			new_page_count
		);

		renumber_following_pages(
			file,
			new_group_end,
			metadata.first_sequence + new_page_count as i32,
		)?;
	}

	metadata.group_packets = packets;
	metadata.group_end = new_group_end;
	metadata.group_page_count = new_page_count;

	Ok(())
}

// Packs `packets` into pages, at most 255 lacing values per page. A packet
// running past a page boundary continues on the next page with the
// continuation flag set.
pub(crate) fn paginate(packets: &[Vec<u8>], serial: u32, first_sequence: i32) -> Result<Vec<Page>> {
	let mut pages = Vec::new();
	let mut sequence = first_sequence;

	let mut sizes: Vec<u32> = Vec::new();
	let mut content: Vec<u8> = Vec::new();
	let mut segments_used = 0_usize;
	let mut continued = false;

	for (index, packet) in packets.iter().enumerate() {
		let mut remaining: &[u8] = packet;

		loop {
			let needed = remaining.len() / 255 + 1;
			let available = MAX_SEGMENTS - segments_used;

			if needed <= available {
				sizes.push(remaining.len() as u32);
				segments_used += needed;
				content.extend_from_slice(remaining);

				break;
			}

			// Fill the page with a 255-multiple of this packet and spill
			// the rest onto the next one
			let take = available * 255;

			sizes.push(take as u32);
			content.extend_from_slice(&remaining[..take]);
			remaining = &remaining[take..];

			pages.push(Page::new(
				PageHeader::new(
					std::mem::take(&mut sizes),
					continued,
					false,
					false,
					0,
					serial,
					sequence,
				),
				std::mem::take(&mut content),
			));

			sequence += 1;
			segments_used = 0;
			continued = true;
		}

		// A page that filled up exactly still closes before the next packet
		if segments_used == MAX_SEGMENTS && index + 1 < packets.len() {
			pages.push(Page::new(
				PageHeader::new(
					std::mem::take(&mut sizes),
					continued,
					true,
					false,
					0,
					serial,
					sequence,
				),
				std::mem::take(&mut content),
			));

			sequence += 1;
			segments_used = 0;
			continued = false;
		}
	}

	pages.push(Page::new(
		PageHeader::new(sizes, continued, true, false, 0, serial, sequence),
		content,
	));

	Ok(pages)
}

// Rewrites sequence numbers (and therefore checksums) of every page from
// `offset` to the end of the file. Page sizes never change, so each write
// is an equal-length overwrite.
fn renumber_following_pages<F>(file: &mut F, mut offset: u64, mut sequence: i32) -> Result<()>
where
	F: MediaStream,
{
	let file_len = file.len()?;

	while offset < file_len {
		let page = Page::read(file, offset)?;
		let header = page.header();

		let renumbered = Page::new(
			PageHeader::new(
				header.packet_sizes().to_vec(),
				header.first_packet_continued(),
				header.last_packet_completed(),
				header.last_page_of_stream(),
				header.granular_position(),
				header.serial(),
				sequence,
			),
			page.into_content(),
		);

		let rendered = renumbered.render()?;

		replace_block(file, offset, rendered.len() as u64, &rendered)?;

		offset += rendered.len() as u64;
		sequence += 1;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::paginate;

	#[test]
	fn single_small_packet() {
		let pages = paginate(&[vec![0xAA; 300]], 7, 1).unwrap();

		assert_eq!(pages.len(), 1);
		assert_eq!(pages[0].header().packet_sizes(), &[300]);
		assert_eq!(pages[0].header().sequence(), 1);
		assert!(pages[0].header().last_packet_completed());
		assert!(!pages[0].header().first_packet_continued());
	}

	#[test]
	fn oversized_packet_spills() {
		// 70000 bytes cannot fit the 65025 byte page limit
		let pages = paginate(&[vec![0xAB; 70000]], 7, 1).unwrap();

		assert_eq!(pages.len(), 2);
		assert!(!pages[0].header().last_packet_completed());
		assert!(pages[1].header().first_packet_continued());

		let total: u32 = pages
			.iter()
			.flat_map(|p| p.header().packet_sizes().iter())
			.sum();

		assert_eq!(total, 70000);

		// The spilled portion is a multiple of 255, the remainder follows
		assert_eq!(pages[0].header().packet_sizes(), &[65025]);
		assert_eq!(pages[1].header().packet_sizes(), &[70000 - 65025]);
	}

	#[test]
	fn multiple_packets_share_a_page() {
		let pages = paginate(&[vec![1; 40], vec![2; 500]], 9, 1).unwrap();

		assert_eq!(pages.len(), 1);
		assert_eq!(pages[0].header().packet_sizes(), &[40, 500]);
	}
}
