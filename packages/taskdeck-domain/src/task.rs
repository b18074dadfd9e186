use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Task urgency as the user sets it. Stored in Postgres as the same
/// kebab-case strings that travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
	Low,
	Medium,
	High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
	Pending,
	InProgress,
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmptyTitle,
	RejectUnknownPriority,
	RejectUnknownStatus,
}

impl Priority {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}
}

impl FromStr for Priority {
	type Err = RejectCode;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"low" => Ok(Self::Low),
			"medium" => Ok(Self::Medium),
			"high" => Ok(Self::High),
			_ => Err(RejectCode::RejectUnknownPriority),
		}
	}
}

impl Status {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::InProgress => "in-progress",
			Self::Done => "done",
		}
	}
}

impl FromStr for Status {
	type Err = RejectCode;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"pending" => Ok(Self::Pending),
			"in-progress" => Ok(Self::InProgress),
			"done" => Ok(Self::Done),
			_ => Err(RejectCode::RejectUnknownStatus),
		}
	}
}

/// Trims the title and rejects blank input. Applies to tasks and subtasks
/// alike.
pub fn validate_title(title: &str) -> Result<&str, RejectCode> {
	let trimmed = title.trim();

	if trimmed.is_empty() {
		return Err(RejectCode::RejectEmptyTitle);
	}

	Ok(trimmed)
}
