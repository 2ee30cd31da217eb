use std::cmp::Ordering;

use crate::retrieval::corpus::Document;
use crate::retrieval::tfidf::{SparseVec, TfidfVectorizer};
use crate::retrieval::tokenize::analyze;
use crate::retrieval::RetrievalError;

pub const DEFAULT_MAX_FEATURES: usize = 25_000;

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    pub document: Document,
    /// Cosine similarity in (0, 1].
    pub score: f64,
}

/// Fitted vectorizer + document-term matrix + document metadata.
/// Immutable once built; a rebuild produces a new value.
#[derive(Debug, Clone)]
pub struct Index {
    pub(crate) fingerprint: String,
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) documents: Vec<Document>,
    pub(crate) rows: Vec<SparseVec>,
}

impl Index {
    pub fn build(documents: Vec<Document>) -> Result<Self, RetrievalError> {
        Self::build_with(documents, DEFAULT_MAX_FEATURES)
    }

    pub fn build_with(documents: Vec<Document>, max_features: usize) -> Result<Self, RetrievalError> {
        if documents.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| analyze(&d.text)).collect();
        let vectorizer = TfidfVectorizer::fit(&analyzed, max_features.max(1));
        let rows = analyzed.iter().map(|a| vectorizer.transform(a)).collect();
        let fingerprint = corpus_fingerprint(&documents);

        tracing::info!(
            docs = documents.len(),
            vocabulary = vectorizer.len(),
            %fingerprint,
            "retrieval index built"
        );
        Ok(Self {
            fingerprint,
            vectorizer,
            documents,
            rows,
        })
    }

    /// Version tag derived from document ids and texts.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.len()
    }

    /// Top `top_k` documents by cosine similarity, only scores > 0, ties broken
    /// by original document order. `top_k` is clamped to `[1, len]`.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RetrievalHit> {
        if query.trim().is_empty() || self.documents.is_empty() {
            return Vec::new();
        }
        let q = self.vectorizer.transform(&analyze(query));
        if q.is_empty() {
            return Vec::new();
        }
        let k = top_k.clamp(1, self.documents.len());

        let mut scored: Vec<(usize, f64)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, row.dot(&q).min(1.0)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| RetrievalHit {
                document: self.documents[i].clone(),
                score,
            })
            .collect()
    }
}

pub(crate) fn corpus_fingerprint(documents: &[Document]) -> String {
    let mut h = blake3::Hasher::new();
    for d in documents {
        h.update(d.doc_id.as_bytes());
        h.update(&[0]);
        h.update(d.text.as_bytes());
        h.update(&[0]);
    }
    h.finalize().to_hex()[..16].to_string()
}

/// Collapse whitespace runs, cut to `max_len` characters, mark truncation with `…`.
pub fn make_snippet(text: &str, max_len: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.chars().count() <= max_len {
        return clean;
    }
    let mut out: String = clean.chars().take(max_len).collect();
    out.push('…');
    out
}
