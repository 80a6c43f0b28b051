pub mod extraction_flow;
pub mod question_draft;
pub mod session;

pub use extraction_flow::{ExtractionFlow, ParseMode};
pub use question_draft::QuestionDraft;
pub use session::{EditState, Session};
