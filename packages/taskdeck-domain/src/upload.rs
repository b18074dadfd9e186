use uuid::Uuid;

/// Picture size cap shared by every surface that gates uploads.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectNotAnImage,
	RejectTooLarge,
	RejectEmptyFile,
}
impl RejectCode {
	pub fn user_message(self) -> &'static str {
		match self {
			Self::RejectNotAnImage => "Please select an image file.",
			Self::RejectTooLarge => "File size must be less than 5 MB.",
			Self::RejectEmptyFile => "The selected file is empty.",
		}
	}
}

pub struct UploadInput<'a> {
	pub content_type: &'a str,
	pub size_bytes: u64,
}

/// Gate applied before any network traffic: profile pictures must be images
/// and must fit under `max_bytes`.
pub fn validate_upload(input: &UploadInput<'_>, max_bytes: u64) -> Result<(), RejectCode> {
	if input.size_bytes == 0 {
		return Err(RejectCode::RejectEmptyFile);
	}
	if !input.content_type.starts_with("image/") {
		return Err(RejectCode::RejectNotAnImage);
	}
	if input.size_bytes > max_bytes {
		return Err(RejectCode::RejectTooLarge);
	}

	Ok(())
}

/// Derives the object key for a user's picture. Keys are unique per upload
/// so a stale CDN entry never shadows a replacement.
pub fn picture_object_key(user_id: Uuid, filename: &str) -> String {
	let extension = filename.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| {
		!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
	});

	match extension {
		Some(ext) => format!("{user_id}/{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
		None => format!("{user_id}/{}", Uuid::new_v4()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn oversized_upload_is_rejected() {
		let input = UploadInput { content_type: "image/png", size_bytes: 6 * 1024 * 1024 };

		assert_eq!(validate_upload(&input, DEFAULT_MAX_BYTES), Err(RejectCode::RejectTooLarge));
	}

	#[test]
	fn non_image_upload_is_rejected() {
		let input = UploadInput { content_type: "application/pdf", size_bytes: 1_024 };

		assert_eq!(validate_upload(&input, DEFAULT_MAX_BYTES), Err(RejectCode::RejectNotAnImage));
	}

	#[test]
	fn two_megabyte_png_is_accepted() {
		let input = UploadInput { content_type: "image/png", size_bytes: 2 * 1024 * 1024 };

		assert_eq!(validate_upload(&input, DEFAULT_MAX_BYTES), Ok(()));
	}

	#[test]
	fn object_key_keeps_ascii_extension() {
		let user_id = Uuid::new_v4();
		let key = picture_object_key(user_id, "avatar.PNG");

		assert!(key.starts_with(&format!("{user_id}/")));
		assert!(key.ends_with(".png"));
	}

	#[test]
	fn object_key_drops_suspicious_extension() {
		let user_id = Uuid::new_v4();
		let key = picture_object_key(user_id, "avatar.p/ng");

		assert!(!key.contains("p/ng"));
	}
}
