//! HTTP client for the taskdeck API plus the per-screen view models the
//! interactive frontends drive. The view models are pure state machines;
//! all network traffic goes through [`ApiClient`].

pub mod dashboard;
pub mod profile;
pub mod session;

mod api;

pub use api::{
	ApiClient, Error, Profile, Result, SearchHit, Session, SessionUser, Subtask, Task,
};
