/*
 * Responsibility
 * - notes table via SQLx (PgPool)
 * - Conditional writes expressed with ON CONFLICT / RETURNING / rows_affected
 * - Expected schema (provisioned outside this service):
 *     CREATE TABLE <table> (
 *         note_id     TEXT PRIMARY KEY,
 *         "timestamp" TIMESTAMPTZ NOT NULL,
 *         title       TEXT,
 *         body        TEXT
 *     );
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};

use crate::repos::error::{StoreError, StoreResult};
use crate::repos::note_repo::{Note, NotePatch, NoteStore};
use crate::repos::retry::ClientPolicy;

#[derive(Debug, Clone, FromRow)]
struct NoteRow {
    note_id: String,
    timestamp: DateTime<Utc>,
    title: Option<String>,
    body: Option<String>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            note_id: row.note_id,
            timestamp: row.timestamp,
            title: row.title,
            body: row.body,
        }
    }
}

/// SQL text for one table. The table name is validated by `Config` before it reaches here.
#[derive(Debug, Clone)]
struct Statements {
    insert: String,
    scan: String,
    get: String,
    update: String,
    delete: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        let columns = r#"note_id, "timestamp", title, body"#;
        Self {
            insert: format!(
                r#"INSERT INTO "{table}" ({columns}) VALUES ($1, $2, $3, $4) ON CONFLICT (note_id) DO NOTHING"#
            ),
            // no ORDER BY: listing is a plain bounded scan
            scan: format!(r#"SELECT {columns} FROM "{table}" LIMIT $1"#),
            get: format!(r#"SELECT {columns} FROM "{table}" WHERE note_id = $1"#),
            update: format!(
                r#"UPDATE "{table}" SET title = COALESCE($2, title), body = COALESCE($3, body) WHERE note_id = $1 RETURNING {columns}"#
            ),
            delete: format!(r#"DELETE FROM "{table}" WHERE note_id = $1"#),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgNoteStore {
    pool: PgPool,
    sql: Statements,
    policy: ClientPolicy,
}

impl PgNoteStore {
    /// Builds a lazily-connecting pool: nothing is dialed until the first query.
    pub fn connect_lazy(
        database_url: &str,
        table: &str,
        policy: ClientPolicy,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(policy.timeout)
            .connect_lazy(database_url)?;

        Ok(Self::with_pool(pool, table, policy))
    }

    pub fn with_pool(pool: PgPool, table: &str, policy: ClientPolicy) -> Self {
        Self {
            pool,
            sql: Statements::for_table(table),
            policy,
        }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn put_if_absent(&self, note: &Note) -> StoreResult<()> {
        let result = self
            .policy
            .run("put", move || async move {
                sqlx::query(&self.sql.insert)
                    .bind(&note.note_id)
                    .bind(note.timestamp)
                    .bind(note.title.as_deref())
                    .bind(note.body.as_deref())
                    .execute(&self.pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn scan(&self, limit: usize) -> StoreResult<Vec<Note>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .policy
            .run("scan", move || async move {
                sqlx::query_as::<_, NoteRow>(&self.sql.scan)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn get(&self, note_id: &str) -> StoreResult<Option<Note>> {
        let row = self
            .policy
            .run("get", move || async move {
                sqlx::query_as::<_, NoteRow>(&self.sql.get)
                    .bind(note_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        Ok(row.map(Note::from))
    }

    async fn update_if_exists(&self, note_id: &str, patch: &NotePatch) -> StoreResult<Note> {
        let row = self
            .policy
            .run("update", move || async move {
                sqlx::query_as::<_, NoteRow>(&self.sql.update)
                    .bind(note_id)
                    .bind(patch.title.as_deref())
                    .bind(patch.body.as_deref())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        row.map(Note::from).ok_or(StoreError::ConditionFailed)
    }

    async fn delete_if_exists(&self, note_id: &str) -> StoreResult<()> {
        let result = self
            .policy
            .run("delete", move || async move {
                sqlx::query(&self.sql.delete)
                    .bind(note_id)
                    .execute(&self.pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }
}
