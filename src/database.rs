//! # Persisted Store
//!
//! Synchronous key/value storage of JSON blobs backed by SQLite. Holds the chat
//! history, the active chat id and the reminder list under fixed keys.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlite::{Connection, State};
use std::sync::{Arc, Mutex, MutexGuard};

pub const HISTORY_KEY: &str = "chatHistory";
pub const ACTIVE_CHAT_KEY: &str = "activeChatId";
pub const REMINDERS_KEY: &str = "wateringReminders";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn new(path: &str) -> Result<Self> {
        let conn = sqlite::open(path).with_context(|| format!("Failed to open database {path}"))?;
        Self::init(conn)
    }

    /// Private in-memory database, used by tests and `--ephemeral` runs
    pub fn in_memory() -> Result<Self> {
        let conn = sqlite::open(":memory:")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database connection lock poisoned"))
    }

    /// Raw string value for `key`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
        statement.bind((1, key))?;

        if let State::Row = statement.next()? {
            Ok(Some(statement.read::<String, _>(0)?))
        } else {
            Ok(None)
        }
    }

    /// Insert or replace the raw string value for `key`
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )?;
        statement.bind((1, key))?;
        statement.bind((2, value))?;
        while statement.next()? != State::Done {}
        debug!("Stored {} bytes under '{key}'", value.len());
        Ok(())
    }

    /// Copy the raw value under `key` to a fresh `<key>.unreadable[.n]` key
    ///
    /// Existing backups are never overwritten. Returns the backup key, or
    /// `None` when `key` holds nothing.
    pub fn preserve_unreadable(&self, key: &str) -> Result<Option<String>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };

        let mut backup = format!("{key}.unreadable");
        let mut n = 1;
        while self.get(&backup)?.is_some() {
            n += 1;
            backup = format!("{key}.unreadable.{n}");
        }
        self.set(&backup, &raw)?;
        Ok(Some(backup))
    }

    /// Decode the JSON stored under `key`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Stored value for '{key}' is not valid JSON"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it under `key`
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}
