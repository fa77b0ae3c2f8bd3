pub mod action_log;
pub mod game_repository;
pub mod typing_result_repository;
pub mod user_repository;

pub use action_log::ActionLog;
pub use game_repository::GameRepository;
pub use typing_result_repository::TypingResultRepository;
pub use user_repository::UserRepository;

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
