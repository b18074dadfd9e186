//! Sign-up, sign-in and sign-out against the external auth provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, TaskdeckService};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
	pub id: Uuid,
	pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
	pub access_token: String,
	pub user: SessionUser,
}

impl TaskdeckService {
	pub async fn sign_up(&self, request: &CredentialsRequest) -> Result<SessionResponse> {
		validate_credentials(request)?;

		let session = self
			.providers
			.auth
			.sign_up(&self.cfg.auth, &request.email, &request.password)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		tracing::info!(user = %session.user.id, "User signed up.");

		Ok(SessionResponse {
			access_token: session.access_token,
			user: SessionUser { id: session.user.id, email: session.user.email },
		})
	}

	pub async fn sign_in(&self, request: &CredentialsRequest) -> Result<SessionResponse> {
		validate_credentials(request)?;

		// A provider outage is not a wrong password.
		let session = self
			.providers
			.auth
			.sign_in(&self.cfg.auth, &request.email, &request.password)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?
			.ok_or_else(|| Error::Unauthenticated {
				message: "Invalid email or password.".to_string(),
			})?;

		tracing::info!(user = %session.user.id, "User signed in.");

		Ok(SessionResponse {
			access_token: session.access_token,
			user: SessionUser { id: session.user.id, email: session.user.email },
		})
	}

	/// Revokes the token at the provider. A token the provider no longer
	/// recognizes still signs out cleanly.
	pub async fn sign_out(&self, token: &str) -> Result<()> {
		if token.trim().is_empty() {
			return Ok(());
		}
		if let Err(err) = self.providers.auth.sign_out(&self.cfg.auth, token).await {
			tracing::debug!("Sign-out against the auth provider failed: {err}.");
		}

		Ok(())
	}
}

fn validate_credentials(request: &CredentialsRequest) -> Result<()> {
	if request.email.trim().is_empty() || !request.email.contains('@') {
		return Err(Error::InvalidRequest {
			message: "Please enter a valid email address.".to_string(),
		});
	}
	if request.password.is_empty() {
		return Err(Error::InvalidRequest { message: "Please enter a password.".to_string() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_credentials_are_rejected_before_any_network_call() {
		let no_at = CredentialsRequest { email: "nobody".to_string(), password: "pw".to_string() };
		let no_pw = CredentialsRequest { email: "a@b.example".to_string(), password: String::new() };

		assert!(matches!(validate_credentials(&no_at), Err(Error::InvalidRequest { .. })));
		assert!(matches!(validate_credentials(&no_pw), Err(Error::InvalidRequest { .. })));
	}

	#[test]
	fn plausible_credentials_pass_the_local_gate() {
		let ok = CredentialsRequest {
			email: "a@b.example".to_string(),
			password: "hunter2".to_string(),
		};

		assert!(validate_credentials(&ok).is_ok());
	}
}
