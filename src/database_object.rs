//! # SQLite Chunk Collection
//!
//! This module provides a chunk collection stored in an SQLite database. Each
//! chunk collection (e.g. `fs.chunks`) is one table:
//!
//! ```text
//! _id TEXT PRIMARY KEY, files_id TEXT, n INTEGER, data BLOB
//! ```
//!
//! with a unique index on `(files_id, n)`. Because SQLite is dynamically typed,
//! the `data` column of rows written by older tools may hold TEXT instead of a
//! BLOB; such rows are returned in their stored encoding and normalized when a
//! chunk is hydrated from them.
//!
//! The write concern of a save is mapped onto the connection: journal or fsync
//! acknowledgment switches `PRAGMA synchronous` to `FULL` and a write timeout
//! becomes the busy timeout.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, Params, Row};

use crate::collection::ChunkCollection;
use crate::common::{
    compose_collection_name, GridStoreError, GridStoreResult, CHUNKS_COLLECTION_SUFFIX,
};
use crate::document::{ChunkDocument, DataValue, StoredChunkDocument};
use crate::object_id::ObjectId;
use crate::write_concern::WriteOptions;

/// Chunk collection backed by one table of an SQLite database.
///
/// The connection is guarded by a mutex, so a collection can be shared between
/// the files of a store through an `Arc`.
#[derive(Debug)]
pub struct SqliteCollection {
    connection: Mutex<Connection>,
    name: String,
    table: String,
}

impl SqliteCollection {
    /// Opens (or creates) the database at `database_file` and prepares the
    /// chunk collection of the `root` namespace.
    ///
    /// # Arguments
    ///
    /// * `database_file` - Path to the SQLite database file.
    /// * `root` - Namespace of the files stored in it, usually `fs`.
    ///
    /// # Returns
    ///
    /// Returns a Result containing the collection or an error if the database
    /// cannot be opened or the table cannot be created.
    pub fn open(database_file: &str, root: &str) -> GridStoreResult<Self> {
        let connection = Self::open_database(Path::new(database_file))?;
        Self::from_connection(connection, root)
    }

    /// Creates the collection in a private in-memory database.
    pub fn open_in_memory(root: &str) -> GridStoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, root)
    }

    /// Wraps an existing connection, creating the chunk table if missing.
    pub fn from_connection(connection: Connection, root: &str) -> GridStoreResult<Self> {
        let name = compose_collection_name(root, CHUNKS_COLLECTION_SUFFIX);
        let table = quote_identifier(&name);
        let index = quote_identifier(&format!("{name}_files_id_n"));
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                _id TEXT PRIMARY KEY NOT NULL, \
                files_id TEXT, \
                n INTEGER, \
                data BLOB); \
             CREATE UNIQUE INDEX IF NOT EXISTS {index} ON {table} (files_id, n);"
        ))?;
        log::debug!("Chunk collection {name} ready");
        Ok(Self {
            connection: Mutex::new(connection),
            name,
            table,
        })
    }

    fn open_database(path: &Path) -> GridStoreResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(path, flags)?)
    }

    /// Executes a single SQL statement against the underlying database.
    ///
    /// # Arguments
    ///
    /// * `sql` - The statement to execute.
    /// * `params` - Values bound to the statement's parameters.
    ///
    /// # Returns
    ///
    /// Returns the number of rows changed.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> GridStoreResult<usize> {
        let connection = self.connection.lock()?;
        Ok(connection.execute(sql, params)?)
    }

    /// Counts the chunk documents stored for `files_id`.
    pub fn count_file_chunks(&self, files_id: &ObjectId) -> GridStoreResult<usize> {
        let connection = self.connection.lock()?;
        let count: i64 = connection.query_row(
            &format!("SELECT count(*) FROM {} WHERE files_id = ?", self.table),
            [files_id.to_hex()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Busy timeout currently applied to the connection.
    pub fn busy_timeout(&self) -> GridStoreResult<Duration> {
        let connection = self.connection.lock()?;
        let millis: i64 = connection.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
        Ok(Duration::from_millis(millis.max(0) as u64))
    }

    fn find_by_query<P: Params>(
        &self,
        condition: &str,
        params: P,
    ) -> GridStoreResult<Option<StoredChunkDocument>> {
        let connection = self.connection.lock()?;
        let mut statement = connection.prepare(&format!(
            "SELECT _id, files_id, n, data FROM {} WHERE {} LIMIT 1",
            self.table, condition
        ))?;
        let mut rows = statement.query(params)?;
        match rows.next()? {
            None => Ok(None),
            Some(row) => Ok(Some(read_document(row)?)),
        }
    }

    fn apply_write_options(connection: &Connection, options: &WriteOptions) -> GridStoreResult<()> {
        let synchronous = if options.requires_sync() { "FULL" } else { "NORMAL" };
        connection.execute_batch(&format!("PRAGMA synchronous = {synchronous};"))?;
        connection.busy_timeout(options.wtimeout.unwrap_or(Duration::ZERO))?;
        Ok(())
    }
}

impl ChunkCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn upsert(
        &self,
        id: &ObjectId,
        document: &ChunkDocument,
        options: &WriteOptions,
    ) -> GridStoreResult<()> {
        let connection = self.connection.lock()?;
        Self::apply_write_options(&connection, options)?;
        let sql = if options.upsert {
            format!(
                "INSERT INTO {} (_id, files_id, n, data) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(_id) DO UPDATE SET \
                 files_id = excluded.files_id, n = excluded.n, data = excluded.data",
                self.table
            )
        } else {
            format!(
                "UPDATE {} SET files_id = ?2, n = ?3, data = ?4 WHERE _id = ?1",
                self.table
            )
        };
        let changed = connection.execute(
            &sql,
            params![
                id.to_hex(),
                document.files_id.to_hex(),
                document.n,
                document.data.as_bytes()
            ],
        )?;
        log::trace!("Upserted chunk {id} into {} ({changed} rows)", self.name);
        Ok(())
    }

    fn find_one(&self, id: &ObjectId) -> GridStoreResult<Option<StoredChunkDocument>> {
        self.find_by_query("_id = ?1", [id.to_hex()])
    }

    fn find_chunk(
        &self,
        files_id: &ObjectId,
        n: u32,
    ) -> GridStoreResult<Option<StoredChunkDocument>> {
        self.find_by_query("files_id = ?1 AND n = ?2", params![files_id.to_hex(), n])
    }

    fn remove_file_chunks(&self, files_id: &ObjectId) -> GridStoreResult<usize> {
        let connection = self.connection.lock()?;
        let removed = connection.execute(
            &format!("DELETE FROM {} WHERE files_id = ?1", self.table),
            [files_id.to_hex()],
        )?;
        log::debug!("Removed {removed} chunks of file {files_id} from {}", self.name);
        Ok(removed)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn read_document(row: &Row) -> GridStoreResult<StoredChunkDocument> {
    let id: Option<String> = row.get(0)?;
    let files_id: Option<String> = row.get(1)?;
    let n: Option<i64> = row.get(2)?;
    let data: Value = row.get(3)?;
    Ok(StoredChunkDocument {
        id: id.as_deref().map(ObjectId::parse_str).transpose()?,
        files_id: files_id.as_deref().map(ObjectId::parse_str).transpose()?,
        n: n.map(read_sequence_number).transpose()?,
        data: read_data_value(data),
    })
}

fn read_sequence_number(n: i64) -> GridStoreResult<u32> {
    u32::try_from(n)
        .map_err(|_| GridStoreError::InvalidChunkFormat(format!("invalid sequence number {}", n)))
}

fn read_data_value(value: Value) -> Option<DataValue> {
    match value {
        Value::Null => None,
        Value::Integer(integer) => Some(DataValue::Integer(integer)),
        Value::Real(real) => Some(DataValue::Double(real)),
        Value::Text(text) => Some(DataValue::Text(text)),
        Value::Blob(bytes) => Some(DataValue::Bytes(bytes)),
    }
}
