pub const VORBIS_IDENT_HEAD: &[u8] = &[1, 118, 111, 114, 98, 105, 115];
pub const VORBIS_COMMENT_HEAD: &[u8] = &[3, 118, 111, 114, 98, 105, 115];

pub const OPUSHEAD: &[u8] = &[79, 112, 117, 115, 72, 101, 97, 100];
pub const OPUSTAGS: &[u8] = &[79, 112, 117, 115, 84, 97, 103, 115];

pub const SPEEXHEADER: &[u8] = b"Speex   ";
