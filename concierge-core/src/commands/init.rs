// concierge-core/src/commands/init.rs

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::concierge_root;

#[derive(Debug, Clone)]
pub struct InitReport {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existed: Vec<String>,
}

/// Initialize the root named by `CONCIERGE_ROOT` (default `.concierge`).
pub fn ensure_initialized() -> Result<InitReport> {
    ensure_initialized_at(&concierge_root())
}

/// Idempotent. Creates the directory layout and seeds files that are absent;
/// existing files are never overwritten.
pub fn ensure_initialized_at(root: &Path) -> Result<InitReport> {
    let root = root.to_path_buf();
    let mut created = Vec::new();
    let mut existed = Vec::new();

    ensure_dir(&root, "", &mut created, &mut existed)?;
    ensure_dir(&root, "cache", &mut created, &mut existed)?;
    ensure_dir(&root, "index", &mut created, &mut existed)?;
    ensure_dir(&root, "policy", &mut created, &mut existed)?;
    let docs_were_absent = !root.join("docs").exists();
    ensure_dir(&root, "docs", &mut created, &mut existed)?;

    ensure_file(&root, "config.toml", DEFAULT_CONFIG_TOML, &mut created, &mut existed)?;

    let seeded = admissions_policy::write_default_rules(root.join("policy"))?;
    if seeded.is_empty() {
        existed.push(admissions_policy::assets::DEFAULT_RULES_NAME.to_string());
    }
    created.extend(seeded);

    // Starter corpus only for a brand new docs directory.
    if docs_were_absent {
        for (name, text) in SAMPLE_DOCS {
            ensure_file(&root.join("docs"), name, text, &mut created, &mut existed)?;
        }
    }

    initialize_logbook(&root, &mut created, &mut existed)?;

    tracing::info!(root = %root.display(), created = created.len(), "concierge root ready");
    Ok(InitReport { root, created, existed })
}

fn ensure_dir(
    base: &Path,
    rel: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = if rel.is_empty() { base.to_path_buf() } else { base.join(rel) };
    let label = if rel.is_empty() { ".".to_string() } else { rel.to_string() };
    if p.exists() {
        existed.push(label);
        return Ok(());
    }
    fs::create_dir_all(&p).with_context(|| format!("create_dir_all({:?})", p))?;
    created.push(label);
    Ok(())
}

fn ensure_file(
    base: &Path,
    rel_file: &str,
    content_if_absent: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = base.join(rel_file);
    if p.exists() {
        existed.push(rel_file.to_string());
        return Ok(());
    }
    write_atomic(&p, content_if_absent.as_bytes())?;
    created.push(rel_file.to_string());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create_dir_all({:?})", parent))?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)
            .with_context(|| format!("open temp file {:?}", tmp))?;
        f.write_all(bytes)?;
        f.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))?;
    Ok(())
}

fn initialize_logbook(root: &Path, created: &mut Vec<String>, existed: &mut Vec<String>) -> Result<()> {
    ensure_dir(root, "logbook", created, existed)?;
    let init_event = serde_json::json!({
        "timestamp": Utc::now().to_rfc3339(),
        "event": "system_init",
        "agent": "system",
        "details": { "version": env!("CARGO_PKG_VERSION") }
    });
    let line = format!("{}\n", serde_json::to_string(&init_event)?);
    ensure_file(&root.join("logbook"), "actions.jsonl", &line, created, existed)?;
    Ok(())
}

// ---------- defaults ----------

const DEFAULT_CONFIG_TOML: &str = r#"[system]
name = "Admissions Concierge"
version = "0.1.0"

# Paths are relative to this root.
[retrieval]
top_k = 4
snippet_len = 280
max_features = 25000
index_path = "index/tfidf.json"
docs_dir = "docs"

[store]
db_path = "cache/concierge.db"
recent_messages = 12

[logbook]
path = "logbook"
enabled = true
preview_len = 160

[policy]
rules_path = "policy/escalation.toml"

[pipeline]
append_progress_footer = true
"#;

const SAMPLE_DOCS: [(&str, &str); 3] = [
    (
        "01-application-process.md",
        "# Application Process\n\n\
         A complete application file includes the application form, official transcripts from every \
         school attended, two recommendations, the personal statement and essays, and the application \
         fee or an approved fee waiver.\n\n\
         Files are reviewed only once every required item has been received and verified by the \
         admissions office.\n",
    ),
    (
        "02-fee-waivers.md",
        "# Application Fee Waivers\n\n\
         Applicants for whom the application fee would be a hardship may request a fee waiver. \
         Requests are submitted with the application and reviewed by the admissions office.\n\n\
         Veterans and active-duty service members are eligible for an automatic fee waiver when they \
         indicate their service status on the application form.\n",
    ),
    (
        "03-recommendations.md",
        "# Recommendations\n\n\
         Two recommendations are required. Ask recommenders early, share your goals and resume, and \
         allow them at least three weeks before the deadline.\n\n\
         Recommenders submit their letters directly through the online portal; letters sent by the \
         applicant cannot be accepted.\n",
    ),
];
