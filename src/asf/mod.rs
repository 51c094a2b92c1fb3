//! ASF specific items
//!
//! Only the attached picture record is provided; it is the unit other
//! containers embed when carrying Windows Media style cover art.
mod picture;

pub use picture::{AsfPicture, AsfPictureType};
