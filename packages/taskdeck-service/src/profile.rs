//! User profile: display name and profile picture.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use taskdeck_domain::upload::{self, UploadInput};
use taskdeck_providers::objects;
use taskdeck_storage::{models::UserProfileRow, profiles};

use crate::{Error, Result, TaskdeckService, time_serde};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
	pub user_id: Uuid,
	pub email: String,
	pub name: String,
	pub profile_picture_url: Option<String>,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNameRequest {
	pub name: String,
}

pub struct UploadPictureRequest {
	pub filename: String,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct UploadPictureResponse {
	pub profile_picture_url: String,
}

impl TaskdeckService {
	/// Fetches the caller's profile, creating a blank row on first access.
	/// Accounts therefore never observe a missing profile.
	pub async fn fetch_profile(&self, token: &str) -> Result<ProfileResponse> {
		let user = self.require_user(token).await?;
		let row = match profiles::fetch_profile(&self.db, user.id).await? {
			Some(row) => row,
			None => {
				let now = OffsetDateTime::now_utc();

				profiles::insert_blank_profile(&self.db, user.id, now).await?;
				profiles::fetch_profile(&self.db, user.id).await?.ok_or_else(|| {
					Error::NotFound { message: "Profile not found.".to_string() }
				})?
			},
		};

		Ok(profile_response(row, user.email))
	}

	pub async fn update_profile_name(
		&self,
		token: &str,
		request: &UpdateNameRequest,
	) -> Result<ProfileResponse> {
		let user = self.require_user(token).await?;
		let name = request.name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Name must not be empty.".to_string(),
			});
		}

		let now = OffsetDateTime::now_utc();
		let affected = profiles::update_profile_name(&self.db, user.id, name, now).await?;

		if affected == 0 {
			profiles::insert_blank_profile(&self.db, user.id, now).await?;
			profiles::update_profile_name(&self.db, user.id, name, now).await?;
		}

		let row = profiles::fetch_profile(&self.db, user.id).await?.ok_or_else(|| {
			Error::NotFound { message: "Profile not found.".to_string() }
		})?;

		Ok(profile_response(row, user.email))
	}

	/// Validates, removes the previous picture, uploads the replacement to
	/// the object store and records its public URL. Removal is best effort;
	/// a failure there orphans one object and never blocks the new picture.
	pub async fn upload_profile_picture(
		&self,
		token: &str,
		request: UploadPictureRequest,
	) -> Result<UploadPictureResponse> {
		let user = self.require_user(token).await?;
		let input = UploadInput {
			content_type: &request.content_type,
			size_bytes: request.bytes.len() as u64,
		};

		upload::validate_upload(&input, self.cfg.upload.max_bytes)?;

		let previous_url = profiles::fetch_profile(&self.db, user.id)
			.await?
			.and_then(|row| row.profile_picture_url);

		if let Some(previous_url) = &previous_url
			&& let Some(previous_key) = objects::key_from_public_url(&self.cfg.object_store, previous_url)
			&& let Err(err) = self.providers.objects.remove(&self.cfg.object_store, &previous_key).await
		{
			tracing::warn!("Failed to remove the previous profile picture: {err}.");
		}

		let key = upload::picture_object_key(user.id, &request.filename);

		self.providers
			.objects
			.upload(&self.cfg.object_store, &key, &request.content_type, &request.bytes)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		let url = objects::public_url(&self.cfg.object_store, &key);
		let now = OffsetDateTime::now_utc();
		let affected = profiles::update_profile_picture(&self.db, user.id, &url, now).await?;

		if affected == 0 {
			profiles::insert_blank_profile(&self.db, user.id, now).await?;
			profiles::update_profile_picture(&self.db, user.id, &url, now).await?;
		}

		tracing::info!(user = %user.id, "Profile picture updated.");

		Ok(UploadPictureResponse { profile_picture_url: url })
	}
}

fn profile_response(row: UserProfileRow, email: String) -> ProfileResponse {
	ProfileResponse {
		user_id: row.user_id,
		email,
		name: row.name,
		profile_picture_url: row.profile_picture_url,
		updated_at: row.updated_at,
	}
}
