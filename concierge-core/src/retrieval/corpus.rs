use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Immutable reference document. `doc_id` must stay stable across rebuilds so
/// citations remain reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub title: String,
    pub text: String,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Load every `*.md` file of `dir` in file-name order.
/// `doc_id` is the file name; the title is the first Markdown heading, or `Untitled`.
pub fn load_from_folder(dir: &Path) -> Result<Vec<Document>> {
    let pattern = dir.join("*.md");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("non UTF-8 corpus path {:?}", dir))?;

    let mut paths: Vec<_> = glob::glob(pattern)
        .with_context(|| format!("bad corpus pattern {pattern}"))?
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let doc_id = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let text = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
        let title = markdown_title(&text).unwrap_or_else(|| "Untitled".to_string());
        docs.push(Document { doc_id, title, text });
    }
    tracing::debug!(count = docs.len(), dir = %dir.display(), "corpus loaded");
    Ok(docs)
}

fn markdown_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| l.starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim().to_string())
}
