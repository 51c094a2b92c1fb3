/// Errors that could occur within tagsmith.
#[derive(thiserror::Error, Debug)]
pub enum TagError {
	/// Unable to guess the format
	#[error("No format could be determined from the provided file.")]
	UnknownFormat,
	/// Provided an empty file
	#[error("File contains no data")]
	EmptyFile,
	/// Attempting to read or write an abnormally large amount of data
	#[error("An abnormally large amount of data was provided, and an overflow occurred")]
	TooMuchData,
	/// Save attempted on a handle marked read only
	#[error("File is read only")]
	ReadOnly,

	/// Errors that arise while parsing OGG pages
	#[error(transparent)]
	OggPage(#[from] ogg_page::PageError),
	/// Errors that arise while reading/writing to OGG files
	#[error("OGG: {0}")]
	Ogg(&'static str),
	/// Errors that arise while reading/writing to OGG Vorbis files
	#[error("Vorbis: {0}")]
	Vorbis(&'static str),
	/// Errors that arise while reading/writing to Opus files
	#[error("Opus: {0}")]
	Opus(&'static str),
	/// Errors that arise while reading/writing to Speex files
	#[error("Speex: {0}")]
	Speex(&'static str),
	/// Errors that arise while reading/writing to MPEG files
	#[error("MPEG: {0}")]
	Mpeg(&'static str),
	/// Errors that arise while reading/writing to APE files
	#[error("APE: {0}")]
	Ape(&'static str),
	/// Errors that arise while reading/writing ID3 tags
	#[error("ID3: {0}")]
	Id3(&'static str),

	/// Unable to convert bytes to a String
	#[error(transparent)]
	FromUtf8(#[from] std::string::FromUtf8Error),
	/// Represents all cases of `std::io::Error`.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Result of tag operations.
pub type Result<T> = std::result::Result<T, TagError>;
