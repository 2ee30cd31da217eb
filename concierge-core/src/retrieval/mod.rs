//! Lexical retrieval over the reference corpus.
//!
//! - `corpus`   — `Document` and the Markdown folder loader.
//! - `tokenize` — lowercase word tokens, English stop words, uni+bigrams.
//! - `tfidf`    — fitted vocabulary/IDF and sparse L2-normalized vectors.
//! - `index`    — build/search over an immutable `Index`, snippets.
//! - `persist`  — checksummed JSON artifact (bytes or file).
//! - `shared`   — atomically swappable handle for a live index.

use std::path::PathBuf;
use thiserror::Error;

pub mod corpus;
pub mod index;
pub mod persist;
pub mod shared;
pub mod tfidf;
pub mod tokenize;

pub use corpus::{load_from_folder, Document};
pub use index::{make_snippet, Index, RetrievalHit, DEFAULT_MAX_FEATURES};
pub use persist::{load, load_from, save, save_to};
pub use shared::SharedIndex;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,
    #[error("index artifact not found at {0}")]
    IndexNotFound(PathBuf),
    #[error("index artifact is corrupt: {0}")]
    IndexCorrupt(String),
    #[error("encoding index artifact: {0}")]
    Encode(String),
    #[error("index I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
