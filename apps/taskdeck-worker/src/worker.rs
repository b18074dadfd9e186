//! Drains the embedding outbox: one claimed entry at a time, embed the task
//! title, write the vector, mark the entry done. Failures retry with
//! exponential backoff; the claim lease keeps concurrent workers apart.

use std::time::Duration as StdDuration;

use color_eyre::{Result, eyre};
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use taskdeck_providers::embedding;
use taskdeck_storage::{db::Db, models::EmbeddingOutboxEntry, outbox, tasks};

const POLL_INTERVAL_MS: i64 = 500;
const CLAIM_LEASE_SECONDS: i64 = 30;
const BASE_BACKOFF_MS: i64 = 500;
const MAX_BACKOFF_MS: i64 = 30_000;
const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;

pub struct WorkerState {
	pub db: Db,
	pub embedding: taskdeck_config::EmbeddingProviderConfig,
	pub vector_dim: u32,
}

pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		if let Err(err) = process_outbox_once(&state).await {
			tracing::error!(error = %err, "Embedding outbox processing failed.");
		}

		tokio_time::sleep(to_std_duration(Duration::milliseconds(POLL_INTERVAL_MS))).await;
	}
}

async fn process_outbox_once(state: &WorkerState) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let entry = outbox::claim_next(
		&state.db,
		now,
		Duration::seconds(CLAIM_LEASE_SECONDS),
	)
	.await?;
	let Some(entry) = entry else {
		return Ok(());
	};

	match embed_task(state, &entry).await {
		Ok(()) => {
			outbox::mark_done(&state.db, entry.outbox_id, OffsetDateTime::now_utc()).await?;
		},
		Err(err) => {
			let attempts = entry.attempts.saturating_add(1);
			let error_text = sanitize_outbox_error(&err.to_string());

			outbox::mark_failed(
				&state.db,
				entry.outbox_id,
				attempts,
				&error_text,
				backoff_for_attempt(attempts),
				OffsetDateTime::now_utc(),
			)
			.await?;
			tracing::error!(error = %err, outbox_id = %entry.outbox_id, "Outbox job failed.");
		},
	}

	Ok(())
}

async fn embed_task(state: &WorkerState, entry: &EmbeddingOutboxEntry) -> Result<()> {
	let task = tasks::fetch_task_any_owner(&state.db, entry.task_id).await?;
	let Some(task) = task else {
		// Deleted before its embedding landed. Nothing left to do.
		tracing::info!(task_id = %entry.task_id, "Task missing for outbox entry. Marking done.");

		return Ok(());
	};
	let vector = embedding::embed_one(&state.embedding, &task.title).await?;

	validate_vector_dim(&vector, state.vector_dim)?;

	let affected =
		tasks::write_task_embedding(&state.db, task.task_id, &format_vector_text(&vector)).await?;

	if affected == 0 {
		tracing::info!(task_id = %task.task_id, "Task vanished while embedding. Marking done.");
	}

	Ok(())
}

fn validate_vector_dim(vec: &[f32], expected_dim: u32) -> Result<()> {
	if vec.len() != expected_dim as usize {
		return Err(eyre::eyre!(
			"Embedding dimension {} does not match configured vector_dim {}.",
			vec.len(),
			expected_dim
		));
	}

	Ok(())
}

fn format_vector_text(vec: &[f32]) -> String {
	let mut out = String::from("[");

	for (idx, value) in vec.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}
		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

/// Provider errors can echo request headers. Redact anything that looks like
/// a credential before it lands in `last_error`, then truncate.
fn sanitize_outbox_error(text: &str) -> String {
	let mut parts = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		let mut word = raw.to_string();

		if redact_next {
			word = "[REDACTED]".to_string();
			redact_next = false;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
		}

		let lowered = raw.to_ascii_lowercase();

		for key in ["api_key", "apikey", "password", "secret", "token"] {
			if lowered.contains(key) && (lowered.contains('=') || lowered.contains(':')) {
				let sep = if raw.contains('=') { '=' } else { ':' };
				let prefix = raw.split(sep).next().unwrap_or(raw);

				word = format!("{prefix}{sep}[REDACTED]");

				break;
			}
		}

		parts.push(word);
	}

	let mut out = parts.join(" ");

	if out.chars().count() > MAX_OUTBOX_ERROR_CHARS {
		out = out.chars().take(MAX_OUTBOX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

fn backoff_for_attempt(attempt: i32) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(6);
	let base = BASE_BACKOFF_MS.saturating_mul(1 << exp);
	let capped = base.min(MAX_BACKOFF_MS);

	Duration::milliseconds(capped)
}

fn to_std_duration(duration: Duration) -> StdDuration {
	let millis = duration.whole_milliseconds();

	if millis <= 0 {
		return StdDuration::from_millis(0);
	}

	StdDuration::from_millis(millis as u64)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backoff_doubles_per_attempt_and_caps() {
		assert_eq!(backoff_for_attempt(1), Duration::milliseconds(500));
		assert_eq!(backoff_for_attempt(2), Duration::milliseconds(1_000));
		assert_eq!(backoff_for_attempt(3), Duration::milliseconds(2_000));
		assert_eq!(backoff_for_attempt(7), Duration::milliseconds(30_000));
		assert_eq!(backoff_for_attempt(100), Duration::milliseconds(30_000));
	}

	#[test]
	fn outbox_errors_redact_credentials() {
		let sanitized = sanitize_outbox_error("request failed: api_key=sk-123 Bearer sk-456 done");

		assert!(sanitized.contains("api_key=[REDACTED]"));
		assert!(sanitized.contains("Bearer [REDACTED]"));
		assert!(!sanitized.contains("sk-123"));
		assert!(!sanitized.contains("sk-456"));
	}

	#[test]
	fn outbox_errors_are_truncated() {
		let long = "x".repeat(5_000);
		let sanitized = sanitize_outbox_error(&long);

		assert_eq!(sanitized.chars().count(), MAX_OUTBOX_ERROR_CHARS + 3);
		assert!(sanitized.ends_with("..."));
	}

	#[test]
	fn vector_text_matches_pgvector_syntax() {
		assert_eq!(format_vector_text(&[0.25, -1.0]), "[0.25,-1]");
	}

	#[test]
	fn mismatched_dimensions_are_rejected() {
		assert!(validate_vector_dim(&[0.0, 0.0], 4).is_err());
		assert!(validate_vector_dim(&[0.0; 4], 4).is_ok());
	}
}
