mod common;

use std::env;
use std::fs;
use std::sync::Arc;

use gridstore::{
    Chunk, ChunkCollection, DataValue, GridStoreError, GridStoreResult, ObjectId, SqliteCollection,
    StoredChunkDocument, WriteConcern, WriteOptions,
};
use rusqlite::params;

use common::{setup, TestFile};

fn sqlite_file() -> GridStoreResult<(Arc<SqliteCollection>, Arc<TestFile>)> {
    setup();
    let collection = Arc::new(SqliteCollection::open_in_memory("fs")?);
    let file = TestFile::new(collection.clone());
    Ok((collection, file))
}

fn insert_raw(
    collection: &SqliteCollection,
    id: &ObjectId,
    files_id: &ObjectId,
    data: rusqlite::types::Value,
) -> GridStoreResult<usize> {
    collection.execute(
        &format!(
            "INSERT INTO \"{}\" (_id, files_id, n, data) VALUES (?1, ?2, 0, ?3)",
            collection.name()
        ),
        params![id.to_hex(), files_id.to_hex(), data],
    )
}

#[test]
fn test_collection_name() -> GridStoreResult<()> {
    let collection = SqliteCollection::open_in_memory("images")?;
    assert_eq!("images.chunks", collection.name());
    Ok(())
}

#[test]
fn test_save_and_hydrate() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let payload: Vec<u8> = (0..=255).collect();
    let mut chunk = Chunk::new(file.clone(), None)?;
    chunk.write(&payload);
    chunk.save_default()?;

    let stored = collection.find_one(&chunk.id())?;
    assert!(stored.is_some());
    let mut hydrated = Chunk::new(file.clone(), stored)?;
    assert_eq!(chunk.id(), hydrated.id());
    assert_eq!(0, hydrated.n());
    assert_eq!(chunk.buffer(), hydrated.buffer());
    assert_eq!(Some(&payload[..]), hydrated.read_slice(payload.len()));
    Ok(())
}

#[test]
fn test_save_is_idempotent() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let mut chunk = Chunk::new(file.clone(), None)?;
    chunk.write_str("one");
    chunk.save_default()?;
    chunk.save_default()?;
    chunk.write_str("two");
    chunk.save_default()?;

    assert_eq!(1, collection.count_file_chunks(&file.files_id)?);
    let stored = collection
        .find_one(&chunk.id())?
        .ok_or(GridStoreError::ChunkNotFound)?;
    assert_eq!(Some(DataValue::Bytes(b"onetwo".to_vec())), stored.data);
    Ok(())
}

#[test]
fn test_find_chunk_by_sequence_number() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    for n in 0..3u32 {
        let mut chunk = Chunk::new(
            file.clone(),
            Some(StoredChunkDocument::with_sequence_number(n)),
        )?;
        chunk.write_str(&format!("chunk-{}", n));
        chunk.save_default()?;
    }

    let stored = collection
        .find_chunk(&file.files_id, 1)?
        .ok_or(GridStoreError::ChunkNotFound)?;
    assert_eq!(Some(1), stored.n);
    assert_eq!(Some(file.files_id), stored.files_id);
    let mut chunk = Chunk::new(file.clone(), Some(stored))?;
    assert_eq!("chunk-1", chunk.read(0));
    assert_eq!(None, collection.find_chunk(&file.files_id, 3)?);
    Ok(())
}

#[test]
fn test_hydrates_legacy_text_rows() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let id = ObjectId::new();
    insert_raw(&collection, &id, &file.files_id, "h\u{e9}llo".to_string().into())?;

    let stored = collection.find_one(&id)?;
    assert_eq!(
        Some(DataValue::Text("h\u{e9}llo".into())),
        stored.as_ref().and_then(|document| document.data.clone())
    );
    let mut chunk = Chunk::new(file.clone(), stored)?;
    assert_eq!(Some(&[0x68, 0xe9, 0x6c, 0x6c, 0x6f][..]), chunk.read_slice(5));
    Ok(())
}

#[test]
fn test_rejects_numeric_rows() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let id = ObjectId::new();
    insert_raw(&collection, &id, &file.files_id, 12i64.into())?;

    let stored = collection.find_one(&id)?;
    assert!(matches!(
        Chunk::new(file.clone(), stored).err(),
        Some(GridStoreError::InvalidChunkFormat(_))
    ));
    Ok(())
}

#[test]
fn test_null_data_rows_are_empty() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let id = ObjectId::new();
    insert_raw(&collection, &id, &file.files_id, rusqlite::types::Value::Null)?;

    let chunk = Chunk::new(file.clone(), collection.find_one(&id)?)?;
    assert_eq!(id, chunk.id());
    assert!(chunk.is_empty());
    Ok(())
}

#[test]
fn test_duplicate_sequence_number_fails() -> GridStoreResult<()> {
    let (_collection, file) = sqlite_file()?;
    let mut first = Chunk::new(file.clone(), None)?;
    first.write_str("a");
    first.save_default()?;

    let mut second = Chunk::new(file.clone(), None)?;
    second.write_str("b");
    assert!(matches!(
        second.save_default(),
        Err(GridStoreError::PersistenceFailure(_))
    ));
    assert_eq!(1, second.position());
    assert_eq!(b"b", second.buffer().as_bytes());
    second.set_position(0);
    assert_eq!("b", second.read(0));
    Ok(())
}

#[test]
fn test_update_without_upsert_skips_missing() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let mut chunk = Chunk::new(file.clone(), None)?;
    chunk.write_str("data");
    collection.upsert(&chunk.id(), &chunk.to_document(), &WriteOptions::default())?;
    assert_eq!(None, collection.find_one(&chunk.id())?);
    Ok(())
}

#[test]
fn test_remove_file_chunks() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    for n in 0..4u32 {
        let mut chunk = Chunk::new(
            file.clone(),
            Some(StoredChunkDocument::with_sequence_number(n)),
        )?;
        chunk.write(&[n as u8]);
        chunk.save_default()?;
    }
    assert_eq!(4, collection.count_file_chunks(&file.files_id)?);
    assert_eq!(4, collection.remove_file_chunks(&file.files_id)?);
    assert_eq!(0, collection.count_file_chunks(&file.files_id)?);
    Ok(())
}

#[test]
fn test_durable_write_concern() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let concern = WriteConcern::default()
        .with_journal(true)
        .with_wtimeout(std::time::Duration::from_millis(500));
    let mut chunk = Chunk::new(file.clone(), None)?.with_write_concern(concern);
    chunk.write_str("durable");
    chunk.save_default()?;
    assert!(collection.find_one(&chunk.id())?.is_some());
    Ok(())
}

#[test]
fn test_reopen_database_file() -> GridStoreResult<()> {
    setup();
    let path = env::temp_dir().join(format!("gridstore_test_{}.db", ObjectId::new()));
    let path_str = path.to_str().ok_or(GridStoreError::IO("invalid path".into()))?;
    let files_id;
    let chunk_id;
    {
        let collection = Arc::new(SqliteCollection::open(path_str, "fs")?);
        let file = TestFile::new(collection);
        files_id = file.files_id;
        let mut chunk = Chunk::new(file, None)?;
        chunk.write_str("persisted");
        chunk.save_default()?;
        chunk_id = chunk.id();
    }

    let collection = SqliteCollection::open(path_str, "fs")?;
    let stored = collection
        .find_chunk(&files_id, 0)?
        .ok_or(GridStoreError::ChunkNotFound)?;
    assert_eq!(Some(chunk_id), stored.id);
    drop(collection);
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_write_timeout_does_not_leak_into_later_saves() -> GridStoreResult<()> {
    let (collection, file) = sqlite_file()?;
    let mut patient = Chunk::new(file.clone(), None)?.with_write_concern(
        WriteConcern::default().with_wtimeout(std::time::Duration::from_millis(750)),
    );
    patient.write_str("slow");
    patient.save_default()?;
    assert_eq!(std::time::Duration::from_millis(750), collection.busy_timeout()?);

    let mut hasty = Chunk::new(
        file.clone(),
        Some(StoredChunkDocument::with_sequence_number(1)),
    )?;
    hasty.write_str("fast");
    hasty.save_default()?;
    assert_eq!(std::time::Duration::ZERO, collection.busy_timeout()?);
    Ok(())
}
