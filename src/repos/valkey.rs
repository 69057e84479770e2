use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use crate::repos::error::{StoreError, StoreResult};
use crate::repos::note_repo::{Note, NotePatch, NoteStore};
use crate::repos::retry::ClientPolicy;

// Insert the hash only when the key is absent. Returns 1 when stored, 0 when taken.
const PUT_IF_ABSENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

// Overwrite the given fields of an existing hash and return the whole hash.
// Returns nil (false) when the key does not exist.
const UPDATE_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return false
end
if #ARGV > 0 then
    redis.call('HSET', KEYS[1], unpack(ARGV))
end
return redis.call('HGETALL', KEYS[1])
";

/// Valkey/Redis-backed note table.
///
/// One hash per note under `<table>:<note_id>`. Conditional put/update run as
/// Lua scripts so the existence check and the write are a single atomic step;
/// conditional delete relies on the `DEL` count.
///
/// The connection is opened on first use and then shared for the life of the process.
pub struct ValkeyNoteStore {
    client: redis::Client,
    manager: OnceCell<ConnectionManager>,
    table: String,
    policy: ClientPolicy,
    put_script: redis::Script,
    update_script: redis::Script,
}

impl std::fmt::Debug for ValkeyNoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyNoteStore")
            .field("table", &self.table)
            .field("policy", &self.policy)
            .field("connected", &self.manager.initialized())
            .finish()
    }
}

impl ValkeyNoteStore {
    // `url` like `redis://localhost:6379`. Does not connect yet.
    pub fn new(url: &str, table: &str, policy: ClientPolicy) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;

        Ok(Self {
            client,
            manager: OnceCell::new(),
            table: table.to_string(),
            policy,
            put_script: redis::Script::new(PUT_IF_ABSENT),
            update_script: redis::Script::new(UPDATE_IF_EXISTS),
        })
    }

    fn key(&self, note_id: &str) -> String {
        note_key(&self.table, note_id)
    }

    async fn conn(&self) -> StoreResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                tracing::info!(table = %self.table, "opening valkey connection");
                self.client.get_connection_manager().await
            })
            .await?;

        // ConnectionManager is a cheap handle over a multiplexed connection
        Ok(manager.clone())
    }
}

fn note_key(table: &str, note_id: &str) -> String {
    format!("{table}:{note_id}")
}

fn note_to_fields(note: &Note) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("note_id", note.note_id.clone()),
        ("timestamp", note.timestamp.to_rfc3339()),
    ];
    if let Some(title) = &note.title {
        fields.push(("title", title.clone()));
    }
    if let Some(body) = &note.body {
        fields.push(("body", body.clone()));
    }
    fields
}

fn patch_to_fields(patch: &NotePatch) -> Vec<(&'static str, String)> {
    let mut fields = Vec::with_capacity(2);
    if let Some(title) = &patch.title {
        fields.push(("title", title.clone()));
    }
    if let Some(body) = &patch.body {
        fields.push(("body", body.clone()));
    }
    fields
}

fn note_from_fields(mut fields: HashMap<String, String>) -> StoreResult<Note> {
    let note_id = fields
        .remove("note_id")
        .ok_or_else(|| StoreError::Corrupt("missing note_id".into()))?;
    let raw_timestamp = fields
        .remove("timestamp")
        .ok_or_else(|| StoreError::Corrupt(format!("{note_id}: missing timestamp")))?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
        .map_err(|e| StoreError::Corrupt(format!("{note_id}: bad timestamp: {e}")))?
        .with_timezone(&Utc);

    Ok(Note {
        note_id,
        timestamp,
        title: fields.remove("title"),
        body: fields.remove("body"),
    })
}

fn script_args(invocation: &mut redis::ScriptInvocation<'_>, fields: &[(&'static str, String)]) {
    for (name, value) in fields {
        invocation.arg(*name).arg(value);
    }
}

#[async_trait]
impl NoteStore for ValkeyNoteStore {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn put_if_absent(&self, note: &Note) -> StoreResult<()> {
        let key = self.key(&note.note_id);
        let fields = note_to_fields(note);
        let (key, fields) = (&key, &fields);

        let stored: i64 = self
            .policy
            .run("put", move || async move {
                let mut conn = self.conn().await?;
                let mut invocation = self.put_script.key(key);
                script_args(&mut invocation, fields);
                let stored: i64 = invocation.invoke_async(&mut conn).await?;
                Ok::<_, StoreError>(stored)
            })
            .await?;

        if stored == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn scan(&self, limit: usize) -> StoreResult<Vec<Note>> {
        let pattern = note_key(&self.table, "*");
        let pattern = &pattern;

        let rows: Vec<HashMap<String, String>> = self
            .policy
            .run("scan", move || async move {
                let mut conn = self.conn().await?;

                // SCAN gives no ordering; COUNT is only a hint, so keep walking the
                // cursor until we have `limit` keys or the iteration wraps around.
                let mut keys: Vec<String> = Vec::new();
                let mut cursor: u64 = 0;
                loop {
                    let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(limit.max(10))
                        .query_async(&mut conn)
                        .await?;
                    keys.extend(batch);
                    if next == 0 || keys.len() >= limit {
                        break;
                    }
                    cursor = next;
                }
                keys.truncate(limit);

                if keys.is_empty() {
                    return Ok::<_, StoreError>(Vec::new());
                }

                let mut pipe = redis::pipe();
                for key in &keys {
                    pipe.cmd("HGETALL").arg(key);
                }
                let rows: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;
                Ok::<_, StoreError>(rows)
            })
            .await?;

        // A key removed between SCAN and HGETALL comes back as an empty hash.
        rows.into_iter()
            .filter(|fields| !fields.is_empty())
            .map(note_from_fields)
            .collect()
    }

    async fn get(&self, note_id: &str) -> StoreResult<Option<Note>> {
        let key = self.key(note_id);
        let key = &key;

        let fields: HashMap<String, String> = self
            .policy
            .run("get", move || async move {
                let mut conn = self.conn().await?;
                let fields: HashMap<String, String> = redis::cmd("HGETALL")
                    .arg(key)
                    .query_async(&mut conn)
                    .await?;
                Ok::<_, StoreError>(fields)
            })
            .await?;

        if fields.is_empty() {
            return Ok(None);
        }
        note_from_fields(fields).map(Some)
    }

    async fn update_if_exists(&self, note_id: &str, patch: &NotePatch) -> StoreResult<Note> {
        let key = self.key(note_id);
        let fields = patch_to_fields(patch);
        let (key, fields) = (&key, &fields);

        let updated: Option<HashMap<String, String>> = self
            .policy
            .run("update", move || async move {
                let mut conn = self.conn().await?;
                let mut invocation = self.update_script.key(key);
                script_args(&mut invocation, fields);
                let updated: Option<HashMap<String, String>> =
                    invocation.invoke_async(&mut conn).await?;
                Ok::<_, StoreError>(updated)
            })
            .await?;

        match updated {
            Some(fields) => note_from_fields(fields),
            None => Err(StoreError::ConditionFailed),
        }
    }

    async fn delete_if_exists(&self, note_id: &str) -> StoreResult<()> {
        let key = self.key(note_id);
        let key = &key;

        let removed: u64 = self
            .policy
            .run("delete", move || async move {
                let mut conn = self.conn().await?;
                // DEL returns number of keys removed (0 or 1 for a single key).
                let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
                Ok::<_, StoreError>(removed)
            })
            .await?;

        if removed == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }
}
