pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::{SceneServiceError, StoreError};
pub use model::{LinePatch, ParsedLine, Role, Scene, ScriptLine};
pub use service::{SceneService, SceneServiceApi};
pub use store::SceneStore;
