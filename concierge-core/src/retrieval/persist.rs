//! Index artifact I/O.
//!
//! Layout: `<blake3 hex of payload>\n<JSON payload>`. The payload carries the
//! vocabulary, IDF weights, sparse rows and document metadata together.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::retrieval::corpus::Document;
use crate::retrieval::index::{corpus_fingerprint, Index};
use crate::retrieval::tfidf::{SparseVec, TfidfVectorizer};
use crate::retrieval::RetrievalError;

const FORMAT: &str = "concierge-tfidf/1";

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    format: String,
    fingerprint: String,
    documents: Vec<Document>,
    terms: Vec<String>,
    idf: Vec<f64>,
    rows: Vec<Vec<(u32, f64)>>,
}

pub fn save(index: &Index) -> Result<Vec<u8>, RetrievalError> {
    let artifact = IndexArtifact {
        format: FORMAT.to_string(),
        fingerprint: index.fingerprint.clone(),
        documents: index.documents.clone(),
        terms: index.vectorizer.terms().to_vec(),
        idf: index.vectorizer.idf().to_vec(),
        rows: index.rows.iter().map(|r| r.entries().to_vec()).collect(),
    };
    let payload = serde_json::to_vec(&artifact).map_err(|e| RetrievalError::Encode(e.to_string()))?;
    let mut out = Vec::with_capacity(payload.len() + 65);
    out.extend_from_slice(blake3::hash(&payload).to_hex().as_bytes());
    out.push(b'\n');
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn load(bytes: &[u8]) -> Result<Index, RetrievalError> {
    let corrupt = |m: String| RetrievalError::IndexCorrupt(m);

    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| corrupt("missing checksum header".into()))?;
    let (header, payload) = (&bytes[..split], &bytes[split + 1..]);
    let expected = std::str::from_utf8(header).map_err(|_| corrupt("checksum header is not UTF-8".into()))?;
    if blake3::hash(payload).to_hex().as_str() != expected.trim() {
        return Err(corrupt("checksum mismatch".into()));
    }

    let artifact: IndexArtifact =
        serde_json::from_slice(payload).map_err(|e| corrupt(format!("payload: {e}")))?;
    if artifact.format != FORMAT {
        return Err(corrupt(format!("unsupported format '{}'", artifact.format)));
    }
    if artifact.documents.is_empty() {
        return Err(corrupt("no documents".into()));
    }
    if artifact.rows.len() != artifact.documents.len() {
        return Err(corrupt(format!(
            "{} rows for {} documents",
            artifact.rows.len(),
            artifact.documents.len()
        )));
    }
    if corpus_fingerprint(&artifact.documents) != artifact.fingerprint {
        return Err(corrupt("fingerprint does not match documents".into()));
    }

    let vectorizer = TfidfVectorizer::from_parts(artifact.terms, artifact.idf)?;
    let vocab = vectorizer.len() as u32;
    let mut rows = Vec::with_capacity(artifact.rows.len());
    for row in artifact.rows {
        if row.iter().any(|(ix, w)| *ix >= vocab || !w.is_finite()) {
            return Err(corrupt("row references unknown term".into()));
        }
        rows.push(SparseVec::from_entries(row));
    }

    Ok(Index {
        fingerprint: artifact.fingerprint,
        vectorizer,
        documents: artifact.documents,
        rows,
    })
}

/// Write the artifact next to `path` and rename it into place.
pub fn save_to(index: &Index, path: &Path) -> Result<(), RetrievalError> {
    let io = |source| RetrievalError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io)?;
    }
    let bytes = save(index)?;
    let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
    fs::write(&tmp, &bytes).map_err(io)?;
    fs::rename(&tmp, path).map_err(io)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "index saved");
    Ok(())
}

pub fn load_from(path: &Path) -> Result<Index, RetrievalError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RetrievalError::IndexNotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(RetrievalError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    load(&bytes)
}
