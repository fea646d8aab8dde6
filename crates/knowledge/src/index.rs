//! SQLite-backed persistence for the vector index.
//!
//! An index directory holds two files:
//! - `index.sqlite` with the embedded chunks and build metadata
//! - `source.hash` with the fingerprint of the sources the index was built from
//!
//! The database is always written to `index.sqlite.tmp` first and renamed into
//! place. The fingerprint is removed before the rename and written last, so a
//! fingerprint on disk always describes a complete index.

use crate::types::{Chunk, IndexMeta, IndexedChunk};
use chrono::{DateTime, Utc};
use guardiane_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub const DB_FILE: &str = "index.sqlite";
pub const DB_TMP_FILE: &str = "index.sqlite.tmp";
pub const FINGERPRINT_FILE: &str = "source.hash";

const META_EMBEDDING_MODEL: &str = "embedding_model";
const META_DIMENSIONS: &str = "dimensions";
const META_CHUNK_SIZE: &str = "chunk_size";
const META_CHUNK_OVERLAP: &str = "chunk_overlap";
const META_CHUNK_COUNT: &str = "chunk_count";
const META_BUILT_AT: &str = "built_at";

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join(DB_FILE)
}

pub fn fingerprint_path(dir: &Path) -> PathBuf {
    dir.join(FINGERPRINT_FILE)
}

fn sql_error(context: &'static str) -> impl Fn(rusqlite::Error) -> AppError {
    move |e| AppError::Knowledge(format!("{}: {}", context, e))
}

fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id INTEGER PRIMARY KEY,
            unit INTEGER NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .map_err(sql_error("Failed to create tables"))
}

/// Write a complete index into `dir`, replacing any previous one.
///
/// Removes the stored fingerprint; callers write the new one with
/// [`write_fingerprint`] once this returns.
pub fn write_index(dir: &Path, entries: &[IndexedChunk], meta: &IndexMeta) -> AppResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;

    let tmp_path = dir.join(DB_TMP_FILE);
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path).map_err(|e| {
            AppError::Knowledge(format!("Failed to remove leftover {}: {}", DB_TMP_FILE, e))
        })?;
    }

    {
        let mut conn =
            Connection::open(&tmp_path).map_err(sql_error("Failed to open SQLite index"))?;
        create_tables(&conn)?;

        let tx = conn
            .transaction()
            .map_err(sql_error("Failed to start transaction"))?;
        {
            let mut insert_chunk = tx
                .prepare(
                    "INSERT INTO chunks (id, unit, position, text, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(sql_error("Failed to prepare chunk insert"))?;

            for entry in entries {
                insert_chunk
                    .execute(params![
                        entry.chunk.id as i64,
                        entry.chunk.unit as i64,
                        entry.chunk.position as i64,
                        entry.chunk.text,
                        embedding_to_bytes(&entry.embedding),
                    ])
                    .map_err(sql_error("Failed to insert chunk"))?;
            }

            let mut insert_meta = tx
                .prepare("INSERT INTO meta (key, value) VALUES (?1, ?2)")
                .map_err(sql_error("Failed to prepare meta insert"))?;

            let rows = [
                (META_EMBEDDING_MODEL, meta.embedding_model.clone()),
                (META_DIMENSIONS, meta.dimensions.to_string()),
                (META_CHUNK_SIZE, meta.chunk_size.to_string()),
                (META_CHUNK_OVERLAP, meta.chunk_overlap.to_string()),
                (META_CHUNK_COUNT, meta.chunk_count.to_string()),
                (META_BUILT_AT, meta.built_at.to_rfc3339()),
            ];
            for (key, value) in rows {
                insert_meta
                    .execute(params![key, value])
                    .map_err(sql_error("Failed to insert metadata"))?;
            }
        }
        tx.commit()
            .map_err(sql_error("Failed to commit index"))?;
    }

    remove_fingerprint(dir)?;
    std::fs::rename(&tmp_path, db_path(dir))
        .map_err(|e| AppError::Knowledge(format!("Failed to move index into place: {}", e)))?;

    tracing::debug!("Wrote {} chunks to {:?}", entries.len(), db_path(dir));
    Ok(())
}

fn open_existing(dir: &Path) -> AppResult<Option<Connection>> {
    let path = db_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    Connection::open(&path)
        .map(Some)
        .map_err(sql_error("Failed to open SQLite index"))
}

fn meta_from_conn(conn: &Connection) -> AppResult<IndexMeta> {
    let get = |key: &str| -> AppResult<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(sql_error("Failed to read index metadata"))?
        .ok_or_else(|| AppError::Knowledge(format!("Index metadata is missing '{}'", key)))
    };
    let get_usize = |key: &str| -> AppResult<usize> {
        get(key)?.parse().map_err(|e| {
            AppError::Knowledge(format!("Invalid index metadata '{}': {}", key, e))
        })
    };

    let built_at = DateTime::parse_from_rfc3339(&get(META_BUILT_AT)?)
        .map_err(|e| AppError::Knowledge(format!("Invalid index build time: {}", e)))?
        .with_timezone(&Utc);

    Ok(IndexMeta {
        embedding_model: get(META_EMBEDDING_MODEL)?,
        dimensions: get_usize(META_DIMENSIONS)?,
        chunk_size: get_usize(META_CHUNK_SIZE)?,
        chunk_overlap: get_usize(META_CHUNK_OVERLAP)?,
        chunk_count: get_usize(META_CHUNK_COUNT)?,
        built_at,
    })
}

/// Read build metadata, or `None` when no index exists.
pub fn read_meta(dir: &Path) -> AppResult<Option<IndexMeta>> {
    match open_existing(dir)? {
        Some(conn) => meta_from_conn(&conn).map(Some),
        None => Ok(None),
    }
}

/// Load every chunk with its embedding, ordered by chunk id.
pub fn load_index(dir: &Path) -> AppResult<(Vec<IndexedChunk>, IndexMeta)> {
    let conn = open_existing(dir)?
        .ok_or_else(|| AppError::Knowledge(format!("No index found in {:?}", dir)))?;
    let meta = meta_from_conn(&conn)?;

    let mut stmt = conn
        .prepare("SELECT id, unit, position, text, embedding FROM chunks ORDER BY id")
        .map_err(sql_error("Failed to prepare query"))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                Chunk {
                    id: row.get::<_, i64>(0)? as u32,
                    unit: row.get::<_, i64>(1)? as u32,
                    position: row.get::<_, i64>(2)? as u32,
                    text: row.get(3)?,
                },
                row.get::<_, Vec<u8>>(4)?,
            ))
        })
        .map_err(sql_error("Failed to query chunks"))?;

    let mut entries = Vec::new();
    for row in rows {
        let (chunk, bytes) = row.map_err(sql_error("Failed to read chunk"))?;
        let embedding = bytes_to_embedding(&bytes)?;
        if embedding.len() != meta.dimensions {
            return Err(AppError::Knowledge(format!(
                "Chunk {} has {} dimensions, index expects {}",
                chunk.id,
                embedding.len(),
                meta.dimensions
            )));
        }
        entries.push(IndexedChunk { chunk, embedding });
    }

    if entries.len() != meta.chunk_count {
        return Err(AppError::Knowledge(format!(
            "Index holds {} chunks but metadata records {}",
            entries.len(),
            meta.chunk_count
        )));
    }

    Ok((entries, meta))
}

/// Stored fingerprint, or `None` if there is none.
pub fn read_fingerprint(dir: &Path) -> AppResult<Option<String>> {
    let path = fingerprint_path(dir);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let digest = content.trim();
            Ok((!digest.is_empty()).then(|| digest.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Knowledge(format!(
            "Failed to read {:?}: {}",
            path, e
        ))),
    }
}

/// Store a fingerprint through a temporary file and rename.
pub fn write_fingerprint(dir: &Path, fingerprint: &str) -> AppResult<()> {
    let tmp = dir.join(format!("{}.tmp", FINGERPRINT_FILE));
    std::fs::write(&tmp, fingerprint)
        .map_err(|e| AppError::Knowledge(format!("Failed to write fingerprint: {}", e)))?;
    std::fs::rename(&tmp, fingerprint_path(dir))
        .map_err(|e| AppError::Knowledge(format!("Failed to store fingerprint: {}", e)))
}

pub fn remove_fingerprint(dir: &Path) -> AppResult<()> {
    match std::fs::remove_file(fingerprint_path(dir)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::Knowledge(format!(
            "Failed to remove fingerprint: {}",
            e
        ))),
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: u32, text: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk: Chunk {
                id,
                unit: id,
                position: 0,
                text: text.to_string(),
            },
            embedding,
        }
    }

    fn meta(chunk_count: usize) -> IndexMeta {
        IndexMeta {
            embedding_model: "trigram-v1".to_string(),
            dimensions: 3,
            chunk_size: 300,
            chunk_overlap: 50,
            chunk_count,
            built_at: Utc::now(),
        }
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            entry(0, "first", vec![1.0, 0.0, 0.0]),
            entry(1, "second", vec![0.0, 0.5, -0.25]),
        ];

        write_index(dir.path(), &entries, &meta(2)).unwrap();
        let (loaded, loaded_meta) = load_index(dir.path()).unwrap();

        assert_eq!(loaded, entries);
        assert_eq!(loaded_meta.embedding_model, "trigram-v1");
        assert_eq!(loaded_meta.chunk_count, 2);
        assert!(!dir.path().join(DB_TMP_FILE).exists());
    }

    #[test]
    fn test_rewrite_replaces_previous_index() {
        let dir = TempDir::new().unwrap();
        write_index(dir.path(), &[entry(0, "old", vec![1.0, 0.0, 0.0])], &meta(1)).unwrap();
        write_index(dir.path(), &[entry(0, "new", vec![0.0, 1.0, 0.0])], &meta(1)).unwrap();

        let (loaded, _) = load_index(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].chunk.text, "new");
    }

    #[test]
    fn test_write_index_clears_fingerprint() {
        let dir = TempDir::new().unwrap();
        write_index(dir.path(), &[], &meta(0)).unwrap();
        write_fingerprint(dir.path(), "abc123").unwrap();
        assert_eq!(read_fingerprint(dir.path()).unwrap().as_deref(), Some("abc123"));

        write_index(dir.path(), &[], &meta(0)).unwrap();
        assert_eq!(read_fingerprint(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_missing_index() {
        let dir = TempDir::new().unwrap();
        assert!(read_meta(dir.path()).unwrap().is_none());
        assert!(read_fingerprint(dir.path()).unwrap().is_none());
        assert!(load_index(dir.path()).is_err());
        remove_fingerprint(dir.path()).unwrap();
    }

    #[test]
    fn test_embedding_bytes() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);
        assert!(bytes_to_embedding(&bytes[..5]).is_err());
    }
}
