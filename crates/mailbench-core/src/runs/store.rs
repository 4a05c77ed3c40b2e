use rusqlite::{Connection, Result};
use tracing::debug;

/// SQLite-backed history of classifier runs.
///
/// Each record is stored whole as JSON next to the columns used for filtering,
/// and every write happens inside a transaction.
pub struct RunStore {
    conn: Connection,
    max_history_items: usize,
}

impl RunStore {
    pub fn open(path: &str, max_history_items: usize) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = RunStore {
            conn,
            max_history_items,
        };
        store.configure_pragmas()?;
        store.migrate_schema()?;
        Ok(store)
    }

    pub fn open_in_memory(max_history_items: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = RunStore {
            conn,
            max_history_items,
        };
        store.configure_pragmas()?;
        store.migrate_schema()?;
        Ok(store)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("Run store schema initialized (version 1)");
        Ok(())
    }

    pub(super) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn max_history_items(&self) -> usize {
        self.max_history_items
    }
}
