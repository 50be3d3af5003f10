pub mod core;
pub mod directory;
pub mod learnings;
pub mod session;
pub mod templates;
pub mod valuations;
