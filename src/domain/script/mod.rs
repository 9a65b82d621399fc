pub mod error;
pub mod prompt;
pub mod service;
pub mod validation;

pub use error::ParseError;
pub use prompt::STAGE_CHARACTER;
pub use service::{ScriptParser, ScriptParserApi};
