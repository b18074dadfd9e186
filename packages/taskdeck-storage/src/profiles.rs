use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, db::Db, models::UserProfileRow};

const PROFILE_COLUMNS: &str = "user_id, name, profile_picture_url, created_at, updated_at";

pub async fn fetch_profile(db: &Db, user_id: Uuid) -> Result<Option<UserProfileRow>> {
	let row = sqlx::query_as::<_, UserProfileRow>(&format!(
		"SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1",
	))
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

/// Lazy creation on first fetch after login. Racing sessions both succeed:
/// the conflict clause keeps whichever row landed first.
pub async fn insert_blank_profile(db: &Db, user_id: Uuid, now: OffsetDateTime) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO user_profiles (user_id, name, created_at, updated_at)
VALUES ($1, '', $2, $3)
ON CONFLICT (user_id) DO NOTHING",
	)
	.bind(user_id)
	.bind(now)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn update_profile_name(
	db: &Db,
	user_id: Uuid,
	name: &str,
	now: OffsetDateTime,
) -> Result<u64> {
	let result =
		sqlx::query("UPDATE user_profiles SET name = $1, updated_at = $2 WHERE user_id = $3")
			.bind(name)
			.bind(now)
			.bind(user_id)
			.execute(&db.pool)
			.await?;

	Ok(result.rows_affected())
}

pub async fn update_profile_picture(
	db: &Db,
	user_id: Uuid,
	url: &str,
	now: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE user_profiles SET profile_picture_url = $1, updated_at = $2 WHERE user_id = $3",
	)
	.bind(url)
	.bind(now)
	.bind(user_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}
