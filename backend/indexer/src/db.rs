//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{DetrustEvent, EventKind, EventRecord, VoteTally};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let in_memory = url.contains(":memory:");
    // Create the file on first start.
    let url = if url.contains('?') || in_memory {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Last-seen ledger; `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Raw pagination cursor, used to resume mid-ledger.
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction. Duplicates of
/// `(ledger, tx_hash, event_type, contract_id, actor)` are ignored, so
/// re-polling a ledger range is harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[DetrustEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_type, contract_id, actor, detail, ledger, timestamp, protocol_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&ev.event_type)
        .bind(&ev.contract_id)
        .bind(&ev.actor)
        .bind(&ev.detail)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.protocol_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Lifecycle events of one DeTrust contract, oldest first. Role events
/// share the `contract_id` column with their target address and are
/// excluded here.
pub async fn get_events_for_contract(
    pool: &SqlitePool,
    contract_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, contract_id, actor, detail, ledger, timestamp,
               protocol_id, tx_hash, created_at
        FROM   events
        WHERE  contract_id = ?1
          AND  event_type NOT IN (?2, ?3)
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(contract_id)
    .bind(EventKind::RoleSet.as_str())
    .bind(EventKind::RoleDel.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, contract_id, actor, detail, ledger, timestamp,
               protocol_id, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Count indexed votes per side and pick up the resolution, if any.
pub async fn get_vote_tally(pool: &SqlitePool, contract_id: &str) -> Result<VoteTally> {
    let (legitimate, fraudulent): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(detail = 'legitimate'), 0),
               COALESCE(SUM(detail = 'fraudulent'), 0)
        FROM   events
        WHERE  contract_id = ?1 AND event_type = ?2
        "#,
    )
    .bind(contract_id)
    .bind(EventKind::ContractVerified.as_str())
    .fetch_one(pool)
    .await?;

    let resolution: Option<(Option<String>,)> = sqlx::query_as(
        r#"
        SELECT detail
        FROM   events
        WHERE  contract_id = ?1 AND event_type = ?2
        ORDER  BY ledger DESC, id DESC
        LIMIT  1
        "#,
    )
    .bind(contract_id)
    .bind(EventKind::VerificationResolved.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(VoteTally {
        legitimate,
        fraudulent,
        resolution: resolution.and_then(|(v,)| v),
    })
}
