use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use taskdeck_config::Postgres;
use taskdeck_storage::{db::Db, models::TaskRow, outbox, subtasks, tasks};
use taskdeck_testkit::TestDatabase;

const VECTOR_DIM: u32 = 4;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn schema_bootstrap_creates_all_tables() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_creates_all_tables; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(VECTOR_DIM).await.expect("Failed to ensure schema.");
	// Bootstrap is idempotent.
	db.ensure_schema(VECTOR_DIM).await.expect("Failed to re-run schema bootstrap.");

	for table in ["tasks", "subtasks", "user_profiles", "embedding_outbox"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn deleting_a_task_cascades_to_subtasks_and_search_sees_embeddings() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping cascade test; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(VECTOR_DIM).await.expect("Failed to ensure schema.");

	let owner_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();
	let task = TaskRow {
		task_id: Uuid::new_v4(),
		owner_id,
		title: "Write report".to_string(),
		priority: "medium".to_string(),
		status: "pending".to_string(),
		created_at: now,
		updated_at: now,
	};
	let mut tx = db.pool.begin().await.expect("Failed to begin transaction.");

	tasks::insert_task_tx(&mut tx, &task).await.expect("Failed to insert task.");
	outbox::enqueue_tx(&mut tx, task.task_id, now).await.expect("Failed to enqueue outbox.");
	tx.commit().await.expect("Failed to commit.");

	let subtask = taskdeck_storage::models::SubtaskRow {
		subtask_id: Uuid::new_v4(),
		task_id: task.task_id,
		owner_id,
		title: "Collect the numbers".to_string(),
		created_at: now,
		updated_at: now,
	};

	subtasks::insert_subtask(&db, &subtask).await.expect("Failed to insert subtask.");

	let affected = tasks::write_task_embedding(&db, task.task_id, "[0.5,0.5,0.5,0.5]")
		.await
		.expect("Failed to write embedding.");

	assert_eq!(affected, 1);

	let hits = tasks::search_tasks(&db, owner_id, "[0.5,0.5,0.5,0.5]", 10)
		.await
		.expect("Failed to search tasks.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].task_id, task.task_id);
	assert!(hits[0].similarity > 0.99);

	let deleted = tasks::delete_task(&db, owner_id, task.task_id)
		.await
		.expect("Failed to delete task.");

	assert_eq!(deleted, 1);

	let remaining = subtasks::list_subtasks(&db, owner_id, task.task_id)
		.await
		.expect("Failed to list subtasks.");

	assert!(remaining.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn outbox_claim_leases_and_failures_back_off() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping outbox test; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(VECTOR_DIM).await.expect("Failed to ensure schema.");

	let now = OffsetDateTime::now_utc();
	let task = TaskRow {
		task_id: Uuid::new_v4(),
		owner_id: Uuid::new_v4(),
		title: "Embed me".to_string(),
		priority: "medium".to_string(),
		status: "pending".to_string(),
		created_at: now,
		updated_at: now,
	};
	let mut tx = db.pool.begin().await.expect("Failed to begin transaction.");

	tasks::insert_task_tx(&mut tx, &task).await.expect("Failed to insert task.");
	outbox::enqueue_tx(&mut tx, task.task_id, now).await.expect("Failed to enqueue outbox.");
	tx.commit().await.expect("Failed to commit.");

	let lease = Duration::seconds(30);
	let entry = outbox::claim_next(&db, now, lease)
		.await
		.expect("Failed to claim outbox entry.")
		.expect("Expected a claimable entry.");

	assert_eq!(entry.task_id, task.task_id);
	assert_eq!(entry.status, "PENDING");

	// Leased: a second claim at the same instant finds nothing.
	let contested = outbox::claim_next(&db, now, lease).await.expect("Failed to re-claim.");

	assert!(contested.is_none());

	outbox::mark_failed(&db, entry.outbox_id, 1, "provider timed out", Duration::seconds(1), now)
		.await
		.expect("Failed to mark failed.");

	// Due again once the backoff elapses.
	let retried = outbox::claim_next(&db, now + Duration::seconds(2), lease)
		.await
		.expect("Failed to claim after backoff.")
		.expect("Expected the failed entry to be claimable again.");

	assert_eq!(retried.outbox_id, entry.outbox_id);
	assert_eq!(retried.status, "FAILED");
	assert_eq!(retried.attempts, 1);
	assert_eq!(retried.last_error.as_deref(), Some("provider timed out"));

	outbox::mark_done(&db, entry.outbox_id, now).await.expect("Failed to mark done.");

	let drained = outbox::claim_next(&db, now + Duration::seconds(60), lease)
		.await
		.expect("Failed to claim after done.");

	assert!(drained.is_none());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
