pub mod db;
pub mod models;
pub mod outbox;
pub mod profiles;
pub mod schema;
pub mod subtasks;
pub mod tasks;

mod error;

pub use error::{Error, Result};
