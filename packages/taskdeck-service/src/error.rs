pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Operation outcomes that are not successes. Variants map one-to-one onto
/// the HTTP statuses the API layer emits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	Unauthenticated { message: String },
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("{message}")]
	Conflict { message: String },
	#[error("{message}")]
	Provider { message: String },
	#[error(transparent)]
	Storage(#[from] taskdeck_storage::Error),
}

impl From<taskdeck_domain::task::RejectCode> for Error {
	fn from(code: taskdeck_domain::task::RejectCode) -> Self {
		use taskdeck_domain::task::RejectCode;

		let message = match code {
			RejectCode::RejectEmptyTitle => "Title must not be empty.",
			RejectCode::RejectUnknownPriority => {
				"Priority must be one of: low, medium, high."
			},
			RejectCode::RejectUnknownStatus => {
				"Status must be one of: pending, in-progress, done."
			},
		};

		Self::InvalidRequest { message: message.to_string() }
	}
}

impl From<taskdeck_domain::upload::RejectCode> for Error {
	fn from(code: taskdeck_domain::upload::RejectCode) -> Self {
		Self::InvalidRequest { message: code.user_message().to_string() }
	}
}
