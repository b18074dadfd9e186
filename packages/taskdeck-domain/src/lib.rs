pub mod task;
pub mod upload;
