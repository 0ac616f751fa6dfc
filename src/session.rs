// SQLite persistence layer for the client session.
//
// Plays the role the browser's localStorage plays in a web frontend: a small
// key/value store for `auth_token`, `user_id`, `user_name`, and
// `pending_bet_id` that survives restarts.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Well-known session keys.
pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_USER_NAME: &str = "user_name";
pub const KEY_PENDING_BET_ID: &str = "pending_bet_id";

/// SQLite-backed key/value store for session state.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open (or create) a session database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory store (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && path != ":memory:" {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create session directory for {path}"))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open session database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set session database pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create session schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("session mutex poisoned")
    }

    /// Store `value` under `key`, overwriting any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO session (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .context("failed to write session value")?;
        Ok(())
    }

    /// Load the value stored under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let value = conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("failed to read session value")?;
        Ok(value)
    }

    /// Remove the value stored under `key`. Removing an absent key is a
    /// no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM session WHERE key = ?1", params![key])
            .context("failed to remove session value")?;
        Ok(())
    }

    /// Drop every stored value (logout).
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM session", [])
            .context("failed to clear session")?;
        Ok(())
    }

    // -- Typed accessors ----------------------------------------------------

    /// The logged-in user's id, if a session exists.
    ///
    /// A stored value that does not parse as an integer is treated as
    /// absent rather than an error; it can only come from a corrupted
    /// store and behaves like a logged-out session.
    pub fn user_id(&self) -> Result<Option<i64>> {
        Ok(self
            .get(KEY_USER_ID)?
            .and_then(|v| v.parse::<i64>().ok()))
    }

    pub fn set_user_id(&self, id: i64) -> Result<()> {
        self.set(KEY_USER_ID, &id.to_string())
    }

    pub fn user_name(&self) -> Result<Option<String>> {
        self.get(KEY_USER_NAME)
    }

    pub fn set_user_name(&self, name: &str) -> Result<()> {
        self.set(KEY_USER_NAME, name)
    }

    pub fn auth_token(&self) -> Result<Option<String>> {
        self.get(KEY_AUTH_TOKEN)
    }

    pub fn set_auth_token(&self, token: &str) -> Result<()> {
        self.set(KEY_AUTH_TOKEN, token)
    }

    /// The id of a bet awaiting payment confirmation, if any.
    pub fn pending_bet_id(&self) -> Result<Option<i64>> {
        Ok(self
            .get(KEY_PENDING_BET_ID)?
            .and_then(|v| v.parse::<i64>().ok()))
    }

    pub fn set_pending_bet_id(&self, id: i64) -> Result<()> {
        self.set(KEY_PENDING_BET_ID, &id.to_string())
    }

    pub fn clear_pending_bet_id(&self) -> Result<()> {
        self.remove(KEY_PENDING_BET_ID)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::open(":memory:").unwrap()
    }

    #[test]
    fn set_get_roundtrip() {
        let s = store();
        assert_eq!(s.get("missing").unwrap(), None);
        s.set("k", "v1").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v1"));
        s.set("k", "v2").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn remove_is_idempotent() {
        let s = store();
        s.set("k", "v").unwrap();
        s.remove("k").unwrap();
        assert_eq!(s.get("k").unwrap(), None);
        s.remove("k").unwrap();
    }

    #[test]
    fn typed_user_accessors() {
        let s = store();
        assert_eq!(s.user_id().unwrap(), None);
        s.set_user_id(42).unwrap();
        s.set_user_name("Ada Lovelace").unwrap();
        s.set_auth_token("token_42_ada@example.com").unwrap();
        assert_eq!(s.user_id().unwrap(), Some(42));
        assert_eq!(s.user_name().unwrap().as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            s.auth_token().unwrap().as_deref(),
            Some("token_42_ada@example.com")
        );
    }

    #[test]
    fn pending_bet_lifecycle() {
        let s = store();
        assert_eq!(s.pending_bet_id().unwrap(), None);
        s.set_pending_bet_id(7).unwrap();
        assert_eq!(s.pending_bet_id().unwrap(), Some(7));
        s.clear_pending_bet_id().unwrap();
        assert_eq!(s.pending_bet_id().unwrap(), None);
    }

    #[test]
    fn corrupted_user_id_reads_as_absent() {
        let s = store();
        s.set(KEY_USER_ID, "not-a-number").unwrap();
        assert_eq!(s.user_id().unwrap(), None);
    }

    #[test]
    fn clear_drops_everything() {
        let s = store();
        s.set_user_id(1).unwrap();
        s.set_user_name("X").unwrap();
        s.set_pending_bet_id(9).unwrap();
        s.clear().unwrap();
        assert_eq!(s.user_id().unwrap(), None);
        assert_eq!(s.user_name().unwrap(), None);
        assert_eq!(s.pending_bet_id().unwrap(), None);
    }
}
