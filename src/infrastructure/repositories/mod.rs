pub mod app_state_repository;
pub mod audio_repository;
pub mod openai_script_model_repository;
pub mod script_model_repository;

pub use app_state_repository::AppStateRepository;
pub use audio_repository::{AudioBlob, AudioRepository, SqliteAudioRepository};
pub use openai_script_model_repository::OpenAiScriptModelRepository;
pub use script_model_repository::{ScriptModelRepository, StructuredRequest};
