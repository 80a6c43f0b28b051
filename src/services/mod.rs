pub mod llm_service;
pub mod pdf_exporter;
pub mod question_store;
pub mod response_parser;

pub use llm_service::{LlmService, QuestionExtractor};
pub use pdf_exporter::PdfExporter;
pub use question_store::{Direction, QuestionStore};
pub use response_parser::{parse_response, parse_unlabeled};
