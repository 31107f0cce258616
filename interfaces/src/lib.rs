pub mod defs;
pub mod empty;
pub mod state;

pub use defs::{hash_link, Language, LanguagePreference, ReadStatus, DEFAULT_LANGUAGE, LANGUAGES};
pub use empty::MemoryStore;
pub use state::JsonFileStore;
