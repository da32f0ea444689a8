//! SQLite snapshot format
//!
//! One file holds the documents, their vectors and the embedding
//! configuration. A save writes a sibling temporary file inside a single
//! transaction and renames it over the previous snapshot, so readers see
//! either the old or the new state and index/config never diverge.

use crate::StoreError;
use lore_domain::{Document, EmbeddingBackend, EmbeddingConfig};
use rusqlite::{params, Connection, OpenFlags};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE documents (
    id        INTEGER PRIMARY KEY,
    source    TEXT,
    content   TEXT NOT NULL,
    embedding BLOB NOT NULL
);
CREATE TABLE embedding_config (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const MODEL_KWARGS_PREFIX: &str = "model_kwargs.";
const ENCODE_KWARGS_PREFIX: &str = "encode_kwargs.";

/// Everything a snapshot holds
pub(crate) struct SnapshotContents {
    pub documents: Vec<Document>,
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
    pub config: EmbeddingConfig,
}

/// Write a snapshot, replacing any previous one at `path`
pub(crate) fn write(
    path: &Path,
    documents: &[Document],
    embeddings: &[Vec<f32>],
    dimension: usize,
    config: &EmbeddingConfig,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    if staging.exists() {
        fs::remove_file(&staging)?;
    }

    {
        let mut conn = Connection::open(&staging)?;
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction()?;
        {
            let mut insert_doc = tx.prepare(
                "INSERT INTO documents (id, source, content, embedding) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (id, (doc, embedding)) in documents.iter().zip(embeddings).enumerate() {
                insert_doc.execute(params![
                    id as i64,
                    &doc.source,
                    &doc.content,
                    vec_to_blob(embedding),
                ])?;
            }

            let mut insert_kv =
                tx.prepare("INSERT INTO embedding_config (key, value) VALUES (?1, ?2)")?;
            for (key, value) in config_to_pairs(config, dimension) {
                insert_kv.execute(params![key, value])?;
            }
        }
        tx.commit()?;
    }

    fs::rename(&staging, path)?;
    debug!("Wrote snapshot with {} documents to {}", documents.len(), path.display());
    Ok(())
}

/// Read only the embedding configuration and dimension
pub(crate) fn read_config(path: &Path) -> Result<(EmbeddingConfig, usize), StoreError> {
    let conn = open_existing(path)?;
    load_config(&conn)
}

/// Read a full snapshot
pub(crate) fn read(path: &Path) -> Result<SnapshotContents, StoreError> {
    let conn = open_existing(path)?;
    let (config, dimension) = load_config(&conn)?;

    let mut stmt = conn.prepare("SELECT source, content, embedding FROM documents ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut documents = Vec::with_capacity(rows.len());
    let mut embeddings = Vec::with_capacity(rows.len());
    for (source, content, blob) in rows {
        let embedding = blob_to_vec(&blob)?;
        if embedding.len() != dimension {
            return Err(StoreError::InvalidData(format!(
                "Stored vector has {} dimensions, snapshot records {}",
                embedding.len(),
                dimension
            )));
        }
        documents.push(Document { content, source });
        embeddings.push(embedding);
    }

    Ok(SnapshotContents {
        documents,
        embeddings,
        dimension,
        config,
    })
}

fn open_existing(path: &Path) -> Result<Connection, StoreError> {
    if !path.is_file() {
        return Err(StoreError::SnapshotNotFound(path.to_path_buf()));
    }
    Ok(Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn config_to_pairs(config: &EmbeddingConfig, dimension: usize) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("backend".to_string(), config.backend.to_string()),
        ("model_name".to_string(), config.model_name.clone()),
        ("dimension".to_string(), dimension.to_string()),
    ];
    pairs.extend(
        config
            .model_kwargs
            .iter()
            .map(|(k, v)| (format!("{}{}", MODEL_KWARGS_PREFIX, k), v.clone())),
    );
    pairs.extend(
        config
            .encode_kwargs
            .iter()
            .map(|(k, v)| (format!("{}{}", ENCODE_KWARGS_PREFIX, k), v.clone())),
    );
    pairs
}

fn load_config(conn: &Connection) -> Result<(EmbeddingConfig, usize), StoreError> {
    let mut stmt = conn.prepare("SELECT key, value FROM embedding_config")?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut backend: Option<EmbeddingBackend> = None;
    let mut model_name: Option<String> = None;
    let mut dimension: Option<usize> = None;
    let mut model_kwargs = BTreeMap::new();
    let mut encode_kwargs = BTreeMap::new();

    for (key, value) in pairs {
        if let Some(name) = key.strip_prefix(MODEL_KWARGS_PREFIX) {
            model_kwargs.insert(name.to_string(), value);
        } else if let Some(name) = key.strip_prefix(ENCODE_KWARGS_PREFIX) {
            encode_kwargs.insert(name.to_string(), value);
        } else {
            match key.as_str() {
                "backend" => backend = Some(value.parse().map_err(StoreError::InvalidData)?),
                "model_name" => model_name = Some(value),
                "dimension" => {
                    dimension = Some(value.parse::<usize>().map_err(|e| {
                        StoreError::InvalidData(format!("Invalid dimension '{}': {}", value, e))
                    })?)
                }
                other => {
                    return Err(StoreError::InvalidData(format!(
                        "Unknown embedding config key: {}",
                        other
                    )))
                }
            }
        }
    }

    let missing = |field: &str| StoreError::InvalidData(format!("Embedding config is missing '{}'", field));

    let config = EmbeddingConfig {
        backend: backend.ok_or_else(|| missing("backend"))?,
        model_name: model_name.ok_or_else(|| missing("model_name"))?,
        model_kwargs,
        encode_kwargs,
    };
    Ok((config, dimension.ok_or_else(|| missing("dimension"))?))
}

/// Encode a vector as little-endian `f32` bytes
pub(crate) fn vec_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode little-endian `f32` bytes
pub(crate) fn blob_to_vec(blob: &[u8]) -> Result<Vec<f32>, StoreError> {
    if blob.len() % 4 != 0 {
        return Err(StoreError::InvalidData(format!(
            "Embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect())
}
