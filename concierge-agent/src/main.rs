use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use concierge_core::commands::{ensure_initialized_at, Concierge, IndexStatus};
use concierge_core::config::{concierge_root, CoreConfig};
use concierge_core::domain::{AgentResult, Segment};
use concierge_core::services::sqlite_store::SqliteStore;
use concierge_core::services::store::SessionStore;

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    about = "Admissions concierge: policy-gated routing over a local reference library"
)]
struct Cli {
    /// Concierge root (defaults to $CONCIERGE_ROOT or ./.concierge)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the root layout, default config, policy rules and starter docs
    Init,
    #[command(flatten)]
    Rooted(RootedCmd),
}

/// Commands that need an initialized root: config, store and concierge.
#[derive(Subcommand, Debug)]
enum RootedCmd {
    /// Rebuild the TF-IDF index from the docs folder and persist it
    BuildIndex,
    /// Search the persisted index
    Search {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Run only the escalation check on a message
    EscalateCheck { message: String },
    #[command(subcommand)]
    Session(SessionCmd),
    #[command(subcommand)]
    Checklist(ChecklistCmd),
    /// Send one message through the full pipeline
    Chat { session_id: String, message: String },
}

#[derive(Subcommand, Debug)]
enum SessionCmd {
    Create {
        #[arg(long)]
        name: String,
        /// traditional | transfer | international | active_duty
        #[arg(long, default_value = "traditional")]
        segment: String,
        #[arg(long)]
        program: String,
        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    Show { session_id: String },
}

#[derive(Subcommand, Debug)]
enum ChecklistCmd {
    /// Status: missing | in_progress | submitted | verified
    Set {
        session_id: String,
        item: String,
        status: String,
    },
    Show { session_id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let root = cli.root.clone().unwrap_or_else(concierge_root);
    match cli.command {
        Command::Init => init(&root, cli.json),
        Command::Rooted(command) => run(command, &root, cli.json),
    }
}

fn init(root: &Path, json: bool) -> Result<()> {
    let report = ensure_initialized_at(root)?;
    info!(root = %report.root.display(), "initialized");
    let value = serde_json::json!({
        "root": report.root.display().to_string(),
        "created": report.created,
        "existed": report.existed,
    });
    emit(json, &value, || {
        let mut out = format!("root: {}", report.root.display());
        for c in &report.created {
            out.push_str(&format!("\n  created {c}"));
        }
        out
    })
}

fn run(command: RootedCmd, root: &Path, json: bool) -> Result<()> {
    let cfg = CoreConfig::load(root)?;
    let store = Arc::new(
        SqliteStore::open(&cfg.store.db_path)
            .with_context(|| format!("opening store under {}", root.display()))?,
    );
    let concierge = Concierge::new(cfg, store.clone())?;

    match command {
        RootedCmd::BuildIndex => {
            let index = concierge.rebuild_index()?;
            let value = serde_json::json!({
                "docs": index.len(),
                "vocabulary": index.vocabulary_size(),
                "fingerprint": index.fingerprint(),
            });
            emit(json, &value, || {
                format!(
                    "indexed {} docs ({} terms), fingerprint {}",
                    index.len(),
                    index.vocabulary_size(),
                    index.fingerprint()
                )
            })
        }
        RootedCmd::Search { query, top_k } => {
            require_index(&concierge)?;
            let hits = concierge.search(&query, top_k).map_err(|e| anyhow!(e.reply()))?;
            let rows: Vec<_> = hits
                .iter()
                .map(|h| serde_json::json!({
                    "doc_id": h.document.doc_id,
                    "title": h.document.title,
                    "score": h.score,
                }))
                .collect();
            emit(json, &rows, || {
                if hits.is_empty() {
                    return "no matching documents".to_string();
                }
                hits.iter()
                    .map(|h| format!("{:.4}  {}  {}", h.score, h.document.doc_id, h.document.title))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RootedCmd::EscalateCheck { message } => {
            let d = concierge.gate().should_escalate(&message);
            emit(json, &d, || {
                if d.escalated {
                    format!("ESCALATE: {}", d.reason)
                } else {
                    "ok: no escalation".to_string()
                }
            })
        }
        RootedCmd::Session(SessionCmd::Create { name, segment, program, deadline }) => {
            let segment: Segment = segment.parse()?;
            let deadline = deadline
                .map(|d| {
                    NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                        .with_context(|| format!("bad deadline '{d}'"))
                })
                .transpose()?;
            let s = store.create_session(&name, segment, &program, deadline)?;
            emit(json, &s, || s.id.clone())
        }
        RootedCmd::Session(SessionCmd::Show { session_id }) => {
            let s = store
                .get_session(&session_id)?
                .ok_or_else(|| anyhow!("session not found: {session_id}"))?;
            let history = concierge.history(&session_id)?;
            emit(json, &serde_json::json!({ "session": s, "messages": history }), || {
                let mut out = format!(
                    "{} ({}) -> {}{}",
                    s.display_name,
                    s.segment,
                    s.target_program,
                    s.deadline.map(|d| format!(", deadline {d}")).unwrap_or_default()
                );
                for m in &history {
                    out.push_str(&format!("\n[{}] {}", m.role, m.content));
                }
                out
            })
        }
        RootedCmd::Checklist(ChecklistCmd::Set { session_id, item, status }) => {
            let out = concierge.update_checklist(&session_id, &item, &status)?;
            emit(json, &out, || {
                format!(
                    "{}: {}",
                    out["item"].as_str().unwrap_or_default(),
                    out["status"].as_str().unwrap_or_default()
                )
            })
        }
        RootedCmd::Checklist(ChecklistCmd::Show { session_id }) => {
            let items = concierge.checklist(&session_id)?;
            emit(json, &items, || {
                if items.is_empty() {
                    return "no checklist items tracked".to_string();
                }
                items
                    .iter()
                    .map(|c| format!("- {}: {}", c.item_name, c.status))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RootedCmd::Chat { session_id, message } => {
            load_index_quietly(&concierge)?;
            let result = concierge.chat(&session_id, &message)?;
            emit(json, &result, || render(&result))
        }
    }
}

fn require_index(concierge: &Concierge) -> Result<()> {
    match concierge.load_index()? {
        IndexStatus::Loaded { .. } => Ok(()),
        IndexStatus::Missing => Err(anyhow!("no index yet; run `concierge build-index`")),
        IndexStatus::Corrupt(why) => {
            Err(anyhow!("index rejected ({why}); run `concierge build-index`"))
        }
    }
}

/// Chat still works without an index; only policy questions get the not-ready reply.
fn load_index_quietly(concierge: &Concierge) -> Result<()> {
    if let IndexStatus::Corrupt(why) = concierge.load_index()? {
        warn!(%why, "chat continues without the corrupt index");
    }
    Ok(())
}

fn render(r: &AgentResult) -> String {
    let mut out = r.reply.clone();
    if r.escalated_to_human {
        out.push_str("\n\n[escalated to a human advisor]");
    }
    for a in &r.actions {
        out.push_str(&format!("\n[tool] {} {}", a.tool_name, a.output));
    }
    out
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
