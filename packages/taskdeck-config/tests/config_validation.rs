use toml::Value;

use taskdeck_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn parse(value: Value) -> Config {
	value.try_into().expect("Failed to deserialize config.")
}

#[test]
fn sample_config_validates() {
	let cfg = parse(sample_value());

	taskdeck_config::validate(&cfg).expect("Sample config must validate.");
}

#[test]
fn rejects_mismatched_vector_dim() {
	let mut value = sample_value();

	value
		.get_mut("storage")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [storage].")
		.insert("vector_dim".to_string(), Value::Integer(768));

	let cfg = parse(value);
	let err = taskdeck_config::validate(&cfg).expect_err("Mismatched dimensions must fail.");

	assert!(matches!(err, Error::Validation { .. }));
	assert!(err.to_string().contains("dimensions"));
}

#[test]
fn rejects_blank_api_key() {
	let mut value = sample_value();

	value
		.get_mut("auth")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [auth].")
		.insert("api_key".to_string(), Value::String("  ".to_string()));

	let cfg = parse(value);
	let err = taskdeck_config::validate(&cfg).expect_err("Blank api_key must fail.");

	assert!(err.to_string().contains("auth api_key"));
}

#[test]
fn rejects_zero_upload_limit() {
	let mut value = sample_value();

	value
		.get_mut("upload")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [upload].")
		.insert("max_bytes".to_string(), Value::Integer(0));

	let cfg = parse(value);

	assert!(taskdeck_config::validate(&cfg).is_err());
}

#[test]
fn upload_and_search_default_when_absent() {
	let mut value = sample_value();
	let root = value.as_table_mut().expect("Sample config must be a table.");

	root.remove("upload");
	root.remove("search");

	let cfg = parse(value);

	assert_eq!(cfg.upload.max_bytes, 5 * 1024 * 1024);
	assert_eq!(cfg.search.top_k, 20);
	taskdeck_config::validate(&cfg).expect("Defaults must validate.");
}

#[test]
fn blank_public_base_normalizes_to_none() {
	let mut value = sample_value();

	value
		.get_mut("object_store")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [object_store].")
		.insert("public_base".to_string(), Value::String("  ".to_string()));

	let raw = toml::to_string(&value).expect("Failed to serialize config.");
	let dir = std::env::temp_dir().join(format!("taskdeck-config-{}", std::process::id()));

	std::fs::create_dir_all(&dir).expect("Failed to create temp dir.");

	let path = dir.join("config.toml");

	std::fs::write(&path, raw).expect("Failed to write temp config.");

	let cfg = taskdeck_config::load(&path).expect("Config must load.");

	assert!(cfg.object_store.public_base.is_none());

	let _ = std::fs::remove_file(&path);
}
