use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::fetch::PageResponse;

/// SQLite-backed store of HTTP responses, keyed by method + URL. Entries
/// never expire and nothing is evicted; the table is emptied only by an
/// explicit `clear` from the operator.
pub struct HttpCache {
    conn: Connection,
}

impl HttpCache {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS responses (
                key        TEXT PRIMARY KEY,
                url        TEXT NOT NULL,
                status     INTEGER NOT NULL,
                headers    TEXT NOT NULL,
                body       BLOB NOT NULL,
                fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }

    pub fn get(&self, method: &str, url: &str) -> Result<Option<PageResponse>> {
        let row = self
            .conn
            .query_row(
                "SELECT status, headers, body FROM responses WHERE key = ?1",
                [cache_key(method, url)],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((status, headers, body)) => Ok(Some(PageResponse {
                status,
                headers: serde_json::from_str(&headers)?,
                body,
            })),
            None => Ok(None),
        }
    }

    /// Idempotent full-response replacement: storing the same request
    /// again overwrites the previous entry whole.
    pub fn put(&self, method: &str, url: &str, response: &PageResponse) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO responses (key, url, status, headers, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                cache_key(method, url),
                url,
                response.status,
                serde_json::to_string(&response.headers)?,
                response.body,
            ],
        )?;
        Ok(())
    }

    /// Drop every stored response. Returns how many were evicted.
    pub fn clear(&self) -> Result<usize> {
        let evicted = self.conn.execute("DELETE FROM responses", [])?;
        Ok(evicted)
    }
}

fn cache_key(method: &str, url: &str) -> String {
    format!("{} {}", method.to_uppercase(), url)
}
