//! TF-IDF term weighting.
//!
//! Weights are raw counts scaled by smooth IDF `ln((1 + n) / (1 + df)) + 1`, and
//! every vector is L2-normalized, so a dot product is the cosine similarity.

use std::collections::{BTreeMap, HashMap};

use crate::retrieval::RetrievalError;

/// Sparse vector: `(term index, weight)` sorted by index, unit length or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVec {
    entries: Vec<(u32, f64)>,
}

impl SparseVec {
    pub fn from_entries(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|e| e.0);
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVec) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0usize, 0usize);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    terms: Vec<String>,
    idf: Vec<f64>,
    lookup: HashMap<String, u32>,
}

impl TfidfVectorizer {
    /// Fit over analyzed documents. When the vocabulary exceeds `max_features`,
    /// the most frequent terms across the corpus are kept (ties: lexicographic).
    pub fn fit(docs: &[Vec<String>], max_features: usize) -> Self {
        let mut total: HashMap<&str, u64> = HashMap::new();
        let mut df: HashMap<&str, u64> = HashMap::new();
        for doc in docs {
            let mut seen: Vec<&str> = Vec::new();
            for term in doc {
                *total.entry(term.as_str()).or_default() += 1;
                seen.push(term.as_str());
            }
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term).or_default() += 1;
            }
        }

        let mut chosen: Vec<(&str, u64)> = total.into_iter().collect();
        if chosen.len() > max_features {
            chosen.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            chosen.truncate(max_features);
        }
        let mut terms: Vec<String> = chosen.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let n = docs.len() as f64;
        let idf = terms
            .iter()
            .map(|t| {
                let d = df.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + d)).ln() + 1.0
            })
            .collect();

        Self::assemble(terms, idf)
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(terms: Vec<String>, idf: Vec<f64>) -> Result<Self, RetrievalError> {
        if terms.len() != idf.len() {
            return Err(RetrievalError::IndexCorrupt(format!(
                "{} terms but {} idf weights",
                terms.len(),
                idf.len()
            )));
        }
        if idf.iter().any(|w| !w.is_finite()) {
            return Err(RetrievalError::IndexCorrupt("non-finite idf weight".into()));
        }
        let v = Self::assemble(terms, idf);
        if v.lookup.len() != v.terms.len() {
            return Err(RetrievalError::IndexCorrupt("duplicate vocabulary terms".into()));
        }
        Ok(v)
    }

    fn assemble(terms: Vec<String>, idf: Vec<f64>) -> Self {
        let lookup = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { terms, idf, lookup }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Project analyzed tokens; out-of-vocabulary terms are ignored.
    pub fn transform(&self, tokens: &[String]) -> SparseVec {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for t in tokens {
            if let Some(&ix) = self.lookup.get(t) {
                *counts.entry(ix).or_default() += 1.0;
            }
        }
        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(ix, c)| (ix, c * self.idf[ix as usize]))
            .collect();
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return SparseVec::default();
        }
        for e in entries.iter_mut() {
            e.1 /= norm;
        }
        SparseVec { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn rare_terms_weigh_more() {
        let docs = vec![toks("essay deadline"), toks("essay fee"), toks("essay waiver")];
        let v = TfidfVectorizer::fit(&docs, 100);
        let essay = v.terms().iter().position(|t| t == "essay").unwrap();
        let fee = v.terms().iter().position(|t| t == "fee").unwrap();
        assert!(v.idf()[fee] > v.idf()[essay]);
        assert!((v.idf()[essay] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vectors_are_unit_length() {
        let docs = vec![toks("a b b c"), toks("c d")];
        let v = TfidfVectorizer::fit(&docs, 100);
        let x = v.transform(&toks("b b c d"));
        assert!((x.dot(&x) - 1.0).abs() < 1e-9);
        assert!(v.transform(&toks("zzz")).is_empty());
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let docs = vec![toks("x x x y y z")];
        let v = TfidfVectorizer::fit(&docs, 2);
        assert_eq!(v.terms(), &["x".to_string(), "y".to_string()]);
    }
}
