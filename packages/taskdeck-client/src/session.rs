//! Navigation and login flow as explicit state machines.

use uuid::Uuid;

use crate::api::{Profile, Session};

/// Screens reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
	Home,
	Login,
	Signup,
	Dashboard,
	Profile,
}

/// Where the session stands. `NamePrompt` interposes between a successful
/// sign-in and the dashboard whenever the profile has no display name yet,
/// so a fresh account is greeted by name from the first dashboard render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFlow {
	SignedOut,
	NamePrompt { user_id: Uuid, email: String },
	Ready { user_id: Uuid, email: String, name: String },
}

#[derive(Debug)]
pub struct SessionModel {
	pub page: Page,
	pub flow: SessionFlow,
	pub busy: bool,
	pub error: Option<String>,
}
impl SessionModel {
	pub fn new() -> Self {
		Self { page: Page::Home, flow: SessionFlow::SignedOut, busy: false, error: None }
	}

	pub fn open_login(&mut self) {
		if matches!(self.flow, SessionFlow::SignedOut) {
			self.page = Page::Login;
			self.error = None;
		}
	}

	pub fn open_signup(&mut self) {
		if matches!(self.flow, SessionFlow::SignedOut) {
			self.page = Page::Signup;
			self.error = None;
		}
	}

	/// Marks the submit in flight. The caller performs the network call and
	/// reports back through `signed_in` or `failed`.
	pub fn submitting(&mut self) {
		self.busy = true;
		self.error = None;
	}

	/// Applies a successful sign-in or sign-up. An unnamed profile routes
	/// through the name prompt; a named one goes straight to the dashboard.
	pub fn signed_in(&mut self, session: &Session, profile: &Profile) {
		self.busy = false;
		self.error = None;

		if profile.name.trim().is_empty() {
			self.flow = SessionFlow::NamePrompt {
				user_id: session.user.id,
				email: session.user.email.clone(),
			};
			self.page = Page::Dashboard;
		} else {
			self.flow = SessionFlow::Ready {
				user_id: session.user.id,
				email: session.user.email.clone(),
				name: profile.name.clone(),
			};
			self.page = Page::Dashboard;
		}
	}

	/// Completes the name prompt. No-op in any other flow state.
	pub fn name_confirmed(&mut self, name: &str) {
		if let SessionFlow::NamePrompt { user_id, email } = &self.flow {
			self.flow = SessionFlow::Ready {
				user_id: *user_id,
				email: email.clone(),
				name: name.trim().to_string(),
			};
		}
	}

	pub fn failed(&mut self, message: String) {
		self.busy = false;
		self.error = Some(message);
	}

	pub fn signed_out(&mut self) {
		self.flow = SessionFlow::SignedOut;
		self.page = Page::Home;
		self.busy = false;
		self.error = None;
	}

	pub fn open_profile(&mut self) {
		if matches!(self.flow, SessionFlow::Ready { .. }) {
			self.page = Page::Profile;
		}
	}

	pub fn open_dashboard(&mut self) {
		if !matches!(self.flow, SessionFlow::SignedOut) {
			self.page = Page::Dashboard;
		}
	}
}
impl Default for SessionModel {
	fn default() -> Self {
		Self::new()
	}
}
