use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use uuid::Uuid;

/// User record as the auth provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
	pub id: Uuid,
	pub email: String,
}

/// Bearer session returned by sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
	pub access_token: String,
	pub user: AuthUser,
}

pub async fn sign_up(
	cfg: &taskdeck_config::AuthProviderConfig,
	email: &str,
	password: &str,
) -> Result<AuthSession> {
	let client = client(cfg)?;
	let url = format!("{}/signup", cfg.api_base);
	let res = client
		.post(url)
		.header("apikey", &cfg.api_key)
		.json(&serde_json::json!({ "email": email, "password": password }))
		.send()
		.await?;

	parse_session(res).await
}

/// `Ok(None)` means the provider rejected the credentials; transport faults
/// and provider outages stay errors.
pub async fn sign_in(
	cfg: &taskdeck_config::AuthProviderConfig,
	email: &str,
	password: &str,
) -> Result<Option<AuthSession>> {
	let client = client(cfg)?;
	let url = format!("{}/token?grant_type=password", cfg.api_base);
	let res = client
		.post(url)
		.header("apikey", &cfg.api_key)
		.json(&serde_json::json!({ "email": email, "password": password }))
		.send()
		.await?;

	if matches!(
		res.status(),
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
	) {
		return Ok(None);
	}

	Ok(Some(res.error_for_status()?.json().await?))
}

pub async fn sign_out(cfg: &taskdeck_config::AuthProviderConfig, token: &str) -> Result<()> {
	let client = client(cfg)?;
	let url = format!("{}/logout", cfg.api_base);

	client
		.post(url)
		.header("apikey", &cfg.api_key)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

/// Resolves a bearer token to its user. `Ok(None)` means the provider
/// rejected the token, i.e. there is no active session.
pub async fn current_user(
	cfg: &taskdeck_config::AuthProviderConfig,
	token: &str,
) -> Result<Option<AuthUser>> {
	let client = client(cfg)?;
	let url = format!("{}/user", cfg.api_base);
	let res = client
		.get(url)
		.header("apikey", &cfg.api_key)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.send()
		.await?;

	if matches!(res.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
		return Ok(None);
	}

	let user: AuthUser = res.error_for_status()?.json().await?;

	Ok(Some(user))
}

fn client(cfg: &taskdeck_config::AuthProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

async fn parse_session(res: reqwest::Response) -> Result<AuthSession> {
	if matches!(
		res.status(),
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
	) {
		let body = res.text().await.unwrap_or_default();

		return Err(eyre::eyre!("Auth provider rejected the credentials: {body}"));
	}

	Ok(res.error_for_status()?.json().await?)
}
