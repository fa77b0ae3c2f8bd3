pub mod progression;
pub mod typing;

// Re-export main components
pub use progression::*;
pub use typing::*;
