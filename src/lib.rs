//! Parse, edit, and write metadata in compressed audio containers.
//!
//! # Supported Formats
//!
//! | File Format | Metadata Format(s)                            | Audio Properties        |
//! |-------------|-----------------------------------------------|-------------------------|
//! | APE         | `APEv2`, `ID3v1`, `ID3v2` (location only)     | MAC stream header       |
//! | MP3         | `APEv2`, `ID3v1`, `ID3v2` (location only)     | Frame headers, Xing/VBRI|
//! | Ogg Vorbis  | `Vorbis Comments`                             | Identification header   |
//! | Opus        | `Vorbis Comments`                             | Identification header   |
//! | Speex       | `Vorbis Comments`                             | Identification header   |
//!
//! Tag edits are performed as in-place byte splices: the audio payload is
//! shifted only when a tag block changes size, and is never re-encoded or
//! rewritten wholesale. The [`asf`] module additionally provides the ASF
//! attached picture record used to carry cover art.
//!
//! # Examples
//!
//! ## Reading a generic file
//!
//! When the format isn't known up front, [`read_from`] guesses it from the
//! content and returns a dispatched [`TaggedFile`].
//!
//! ```no_run
//! # use tagsmith::Result;
//! # fn main() -> Result<()> {
//! use std::fs::OpenOptions;
//!
//! let file = OpenOptions::new()
//! 	.read(true)
//! 	.write(true)
//! 	.open("music.ogg")?;
//!
//! let tagged = tagsmith::read_from(file, true)?;
//!
//! println!("format: {:?}", tagged.file_type());
//! println!("tags: {:?}", tagged.tag_properties());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using concrete file types
//!
//! ```no_run
//! # use tagsmith::Result;
//! # fn main() -> Result<()> {
//! use std::fs::OpenOptions;
//! use tagsmith::ape::ApeFile;
//!
//! let file = OpenOptions::new()
//! 	.read(true)
//! 	.write(true)
//! 	.open("music.ape")?;
//!
//! let mut ape = ApeFile::read_from(file, true)?;
//!
//! if let Some(tag) = ape.ape_tag_mut(true) {
//! 	tag.insert_text("Title", "My Title");
//! }
//!
//! ape.save()?;
//! # Ok(())
//! # }
//! ```
#![deny(clippy::all, missing_docs, rustdoc::broken_intra_doc_links)]
#![allow(
	clippy::too_many_lines,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::cast_possible_wrap,
	clippy::cast_possible_truncation,
	clippy::cast_lossless,
	clippy::module_name_repetitions,
	clippy::must_use_candidate,
	clippy::doc_markdown,
	clippy::match_wildcard_for_single_variants,
	clippy::semicolon_if_nothing_returned,
	clippy::new_without_default,
	clippy::from_over_into,
	clippy::upper_case_acronyms,
	clippy::too_many_arguments,
	clippy::single_match_else,
	clippy::len_without_is_empty,
	clippy::unused_self
)]

pub mod ape;
pub mod asf;
mod error;
pub mod id3;
mod io;
pub mod mpeg;
pub mod ogg;
mod probe;
pub mod tag;

pub use crate::error::{Result, TagError};
pub use crate::io::{Length, MediaStream, Truncate};
pub use crate::probe::{detect, read_from, FileType, TaggedFile};
pub use crate::tag::{PropertyMap, TagBlock, TagKinds};
