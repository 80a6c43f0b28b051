pub mod image;
pub mod question;

pub use image::ImageData;
pub use question::{OptionLabel, OptionSlots, ParsedQuestion, QuestionRecord, DEFAULT_LANGUAGE};
