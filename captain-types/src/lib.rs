pub mod errors;
pub mod game;
pub mod messages;
pub mod typing;
pub mod user;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use typing::*;
pub use user::*;

pub type UserId = uuid::Uuid;
pub type ProjectId = uuid::Uuid;

/// Milliseconds since the Unix epoch, the resolution every record is stamped with.
pub type Timestamp = i64;
