pub mod pdf_writer;
