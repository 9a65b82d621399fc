pub mod error;
pub mod extractor;

pub use error::ExtractionError;
pub use extractor::{extract_text, DocumentKind, ExtractedDocument};
