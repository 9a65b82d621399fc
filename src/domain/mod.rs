pub mod document;
pub mod recording;
pub mod rehearsal;
pub mod scene;
pub mod script;
pub mod settings;
