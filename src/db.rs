use crate::model::{AppData, STORAGE_KEY};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "flagmaster.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    conn.query_row("SELECT value FROM kv_store WHERE key = ?", [key], |r| {
        r.get(0)
    })
    .optional()
    .with_context(|| format!("failed to read key {key}"))
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv_store(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )
    .with_context(|| format!("failed to write key {key}"))?;
    Ok(())
}

/// Reads the whole document. A store that has never been written is initialized with the
/// default categories and saved immediately.
pub fn load(conn: &Connection) -> anyhow::Result<AppData> {
    match kv_get(conn, STORAGE_KEY)? {
        Some(text) => serde_json::from_str(&text).context("stored document is invalid JSON"),
        None => {
            let data = AppData::initial();
            save(conn, &data)?;
            tracing::info!(key = STORAGE_KEY, "initialized empty store");
            Ok(data)
        }
    }
}

/// Writes the whole document back under the single storage key.
pub fn save(conn: &Connection, data: &AppData) -> anyhow::Result<()> {
    let text = serde_json::to_string(data).context("failed to serialize document")?;
    kv_set(conn, STORAGE_KEY, &text)
}

/// The stored document, loaded and re-serialized as pretty JSON for backup files.
pub fn load_pretty(conn: &Connection) -> anyhow::Result<String> {
    let data = load(conn)?;
    serde_json::to_string_pretty(&data).context("failed to serialize document")
}
