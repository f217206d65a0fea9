pub mod document;
pub mod storage;
pub mod tracker;

pub use document::{StateDocument, SCHEMA_VERSION};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use tracker::Tracker;
