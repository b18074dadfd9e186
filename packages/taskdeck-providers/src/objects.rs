use std::time::Duration;

use color_eyre::Result;
use reqwest::{
	Client,
	header::{AUTHORIZATION, CONTENT_TYPE},
};

/// Uploads an object into the configured bucket. The key is expected to be
/// pre-validated (see `taskdeck_domain::upload`).
pub async fn upload(
	cfg: &taskdeck_config::ObjectStoreConfig,
	key: &str,
	content_type: &str,
	bytes: Vec<u8>,
) -> Result<()> {
	let client = client(cfg)?;
	let url = format!("{}/object/{}/{key}", cfg.api_base, cfg.bucket);

	client
		.post(url)
		.header(AUTHORIZATION, format!("Bearer {}", cfg.api_key))
		.header(CONTENT_TYPE, content_type)
		.body(bytes)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

pub async fn remove(cfg: &taskdeck_config::ObjectStoreConfig, key: &str) -> Result<()> {
	let client = client(cfg)?;
	let url = format!("{}/object/{}/{key}", cfg.api_base, cfg.bucket);

	client
		.delete(url)
		.header(AUTHORIZATION, format!("Bearer {}", cfg.api_key))
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

/// Public URL for a stored object. No network call involved.
pub fn public_url(cfg: &taskdeck_config::ObjectStoreConfig, key: &str) -> String {
	match cfg.public_base.as_deref() {
		Some(base) => format!("{base}/{}/{key}", cfg.bucket),
		None => format!("{}/object/public/{}/{key}", cfg.api_base, cfg.bucket),
	}
}

/// Inverse of `public_url`; used to derive the key of the previous picture
/// when replacing it.
pub fn key_from_public_url(cfg: &taskdeck_config::ObjectStoreConfig, url: &str) -> Option<String> {
	let prefix = match cfg.public_base.as_deref() {
		Some(base) => format!("{base}/{}/", cfg.bucket),
		None => format!("{}/object/public/{}/", cfg.api_base, cfg.bucket),
	};

	url.strip_prefix(&prefix).filter(|key| !key.is_empty()).map(str::to_string)
}

fn client(cfg: &taskdeck_config::ObjectStoreConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}
