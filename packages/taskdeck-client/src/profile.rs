//! Profile screen state.

use crate::api::Profile;

#[derive(Debug, Default)]
pub struct ProfileModel {
	pub profile: Option<Profile>,
	pub name_draft: String,
	pub busy: bool,
	pub error: Option<String>,
}
impl ProfileModel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn loading(&mut self) {
		self.busy = true;
		self.error = None;
	}

	pub fn profile_arrived(&mut self, profile: Profile) {
		self.busy = false;
		self.name_draft = profile.name.clone();
		self.profile = Some(profile);
	}

	pub fn picture_uploaded(&mut self, url: String) {
		self.busy = false;

		if let Some(profile) = &mut self.profile {
			profile.profile_picture_url = Some(url);
		}
	}

	pub fn failed(&mut self, message: String) {
		self.busy = false;
		self.error = Some(message);
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;

	#[test]
	fn arrived_profile_seeds_the_name_draft() {
		let mut model = ProfileModel::new();

		model.loading();
		model.profile_arrived(Profile {
			user_id: Uuid::new_v4(),
			email: "jamie@example.com".to_string(),
			name: "Jamie".to_string(),
			profile_picture_url: None,
		});

		assert_eq!(model.name_draft, "Jamie");
		assert!(!model.busy);
	}

	#[test]
	fn upload_failure_keeps_the_previous_picture() {
		let mut model = ProfileModel::new();

		model.profile_arrived(Profile {
			user_id: Uuid::new_v4(),
			email: "jamie@example.com".to_string(),
			name: "Jamie".to_string(),
			profile_picture_url: Some("https://cdn.example/old.png".to_string()),
		});
		model.loading();
		model.failed("File size must be less than 5 MB.".to_string());

		let profile = model.profile.as_ref().expect("profile");

		assert_eq!(profile.profile_picture_url.as_deref(), Some("https://cdn.example/old.png"));
		assert_eq!(model.error.as_deref(), Some("File size must be less than 5 MB."));
	}
}
