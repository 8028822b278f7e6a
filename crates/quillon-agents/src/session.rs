use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use quillon_core::error::{QuillonError, Result};
use quillon_flow::SharedContext;

/// A stored session row, without its context payload.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub name: String,
    pub updated_at: String,
}

/// Persistent chat-session store backed by SQLite.
///
/// Each row holds one session's serialized shared context, keyed by name.
/// Saving an existing name replaces its snapshot.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open or create the session database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                QuillonError::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| QuillonError::Session(format!("Failed to open session store: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;

             CREATE TABLE IF NOT EXISTS sessions (
                 name TEXT PRIMARY KEY,
                 context_json TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );",
        )
        .map_err(|e| QuillonError::Session(format!("Failed to initialize session schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Save a session snapshot (upserts by name).
    pub fn save(&self, name: &str, context: &SharedContext) -> Result<()> {
        let context_json = serde_json::to_string(context.data())
            .map_err(|e| QuillonError::Session(format!("Failed to serialize session: {}", e)))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| QuillonError::Session(e.to_string()))?;
        conn.execute(
            "INSERT INTO sessions (name, context_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                 context_json = excluded.context_json,
                 updated_at = excluded.updated_at",
            params![name, context_json, Utc::now().to_rfc3339()],
        )
        .map_err(|e| QuillonError::Session(format!("Failed to save session: {}", e)))?;
        Ok(())
    }

    /// Load a session's context by name.
    pub fn load(&self, name: &str) -> Result<Option<SharedContext>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| QuillonError::Session(e.to_string()))?;
        let context_json: Option<String> = conn
            .query_row(
                "SELECT context_json FROM sessions WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| QuillonError::Session(format!("Failed to load session: {}", e)))?;

        match context_json {
            Some(json) => {
                let data: HashMap<String, serde_json::Value> = serde_json::from_str(&json)
                    .map_err(|e| {
                        QuillonError::Session(format!("Failed to deserialize session: {}", e))
                    })?;
                Ok(Some(SharedContext::from_map(data)))
            }
            None => Ok(None),
        }
    }

    /// List stored sessions, most recently updated first.
    pub fn list(&self) -> Result<Vec<SessionRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| QuillonError::Session(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT name, updated_at FROM sessions ORDER BY updated_at DESC")
            .map_err(|e| QuillonError::Session(format!("Failed to list sessions: {}", e)))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SessionRecord {
                    name: row.get(0)?,
                    updated_at: row.get(1)?,
                })
            })
            .map_err(|e| QuillonError::Session(format!("Failed to list sessions: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            records
                .push(row.map_err(|e| QuillonError::Session(format!("Failed to read row: {}", e)))?);
        }
        Ok(records)
    }

    /// Delete a session by name. Returns whether a row was removed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| QuillonError::Session(e.to_string()))?;
        let deleted = conn
            .execute("DELETE FROM sessions WHERE name = ?1", params![name])
            .map_err(|e| QuillonError::Session(format!("Failed to delete session: {}", e)))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn temp_store() -> SessionStore {
        let dir =
            std::env::temp_dir().join(format!("quillon_session_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        SessionStore::open(&dir.join("sessions.db")).unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = temp_store();

        let mut context = SharedContext::new();
        context.set_str("user_input", "hello");
        context.set("history", json!([{"role": "user", "content": "hello"}]));

        store.save("default", &context).unwrap();

        let loaded = store.load("default").unwrap().unwrap();
        assert_eq!(loaded.get_str("user_input"), Some("hello"));
        assert_eq!(loaded.get("history").unwrap()[0]["content"], json!("hello"));
    }

    #[test]
    fn test_load_missing_session_is_none() {
        let store = temp_store();
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_same_name() {
        let store = temp_store();

        let mut first = SharedContext::new();
        first.set_str("marker", "one");
        store.save("work", &first).unwrap();

        let mut second = SharedContext::new();
        second.set_str("marker", "two");
        store.save("work", &second).unwrap();

        let loaded = store.load("work").unwrap().unwrap();
        assert_eq!(loaded.get_str("marker"), Some("two"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_and_delete() {
        let store = temp_store();
        store.save("a", &SharedContext::new()).unwrap();
        store.save("b", &SharedContext::new()).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a".to_string()));

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
