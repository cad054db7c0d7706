pub mod enums;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use enums::PathKind;
pub use error::CoreError;
