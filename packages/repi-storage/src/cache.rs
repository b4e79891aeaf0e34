//! Postgres-backed response cache.
//!
//! Reads are best-effort and filtered by `expires_at`. Invalidation happens
//! inside the write transaction so a rolled-back write never drops a cache
//! entry.

use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::Result;

pub fn recipe_key(recipe_id: Uuid) -> String {
	format!("recipe:{recipe_id}")
}

pub fn owner_listing_key(owner_id: &str) -> String {
	format!("user-recipes:{owner_id}")
}

pub async fn get(pool: &PgPool, key: &str, now: OffsetDateTime) -> Result<Option<Value>> {
	let row: Option<(Value,)> =
		sqlx::query_as("SELECT payload FROM api_cache WHERE cache_key = $1 AND expires_at > $2")
			.bind(key)
			.bind(now)
			.fetch_optional(pool)
			.await?;

	Ok(row.map(|(payload,)| payload))
}

pub async fn put(
	pool: &PgPool,
	key: &str,
	payload: &Value,
	now: OffsetDateTime,
	ttl: Duration,
) -> Result<()> {
	sqlx::query(
		"INSERT INTO api_cache (cache_key, payload, stored_at, expires_at) \
		 VALUES ($1, $2, $3, $4) \
		 ON CONFLICT (cache_key) DO UPDATE SET \
		   payload = EXCLUDED.payload, \
		   stored_at = EXCLUDED.stored_at, \
		   expires_at = EXCLUDED.expires_at",
	)
	.bind(key)
	.bind(payload)
	.bind(now)
	.bind(now + ttl)
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, key: &str) -> Result<()> {
	sqlx::query("DELETE FROM api_cache WHERE cache_key = $1").bind(key).execute(&mut **tx).await?;

	Ok(())
}
