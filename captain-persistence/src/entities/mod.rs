pub mod prelude;

pub mod games;
pub mod logs;
pub mod typing_results;
pub mod users;
