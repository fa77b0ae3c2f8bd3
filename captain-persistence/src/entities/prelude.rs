pub use super::games::Entity as Games;
pub use super::logs::Entity as Logs;
pub use super::typing_results::Entity as TypingResults;
pub use super::users::Entity as Users;
