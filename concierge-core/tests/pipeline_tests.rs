use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use concierge_core::commands::pipeline::{route_message, Pipeline, RouteError};
use concierge_core::domain::{ChatMessage, ChecklistItem, Segment, Session, FALLBACK_REPLY};
use concierge_core::retrieval::{Document, Index};
use concierge_core::services::generator::{
    AnswerGenerator, PassthroughGenerator, TemplateGenerator, NO_CONTEXT_REPLY,
};
use concierge_core::services::handlers::rag_qa::{QaSettings, NO_MATCH_NOTE};
use concierge_core::services::router::IntentRouter;
use concierge_core::services::store::{InMemoryStore, SessionStore};
use concierge_core::PolicyGate;

// ----------------------- Fixtures -----------------------

fn session(segment: Segment, deadline: Option<&str>) -> Session {
    Session {
        id: "s-1".to_string(),
        display_name: "Jordan".to_string(),
        segment,
        target_program: "BS Nursing".to_string(),
        deadline: deadline.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
    }
}

fn index() -> Index {
    Index::build(vec![
        Document::new(
            "fees.md",
            "Fee Waivers",
            "Application fee waivers are available for eligible applicants who request one with the application.",
        ),
        Document::new(
            "early.md",
            "Early Submission",
            "Submitting early does not guarantee admission, but it gives reviewers time to verify every item.",
        ),
    ])
    .unwrap()
}

struct Deps {
    gate: PolicyGate,
    router: IntentRouter,
    generator: TemplateGenerator,
}

impl Deps {
    fn new() -> Self {
        Self {
            gate: PolicyGate::default(),
            router: IntentRouter::default(),
            generator: TemplateGenerator::new(),
        }
    }

    fn pipeline<'a>(&'a self, store: &'a dyn SessionStore, index: Option<&'a Index>) -> Pipeline<'a> {
        Pipeline {
            gate: &self.gate,
            router: &self.router,
            store,
            index,
            generator: &self.generator,
            qa: QaSettings::default(),
        }
    }
}

struct BrokenStore;

impl SessionStore for BrokenStore {
    fn get_session(&self, _: &str) -> Result<Option<Session>> {
        Err(anyhow!("db offline"))
    }
    fn get_checklist(&self, _: &str) -> Result<Vec<ChecklistItem>> {
        Err(anyhow!("db offline"))
    }
    fn upsert_checklist_item(&self, _: &str, _: &str, _: &str) -> Result<()> {
        Err(anyhow!("db offline"))
    }
    fn add_message(&self, _: &str, _: &str, _: &str) -> Result<()> {
        Err(anyhow!("db offline"))
    }
    fn recent_messages(&self, _: &str, _: usize) -> Result<Vec<ChatMessage>> {
        Err(anyhow!("db offline"))
    }
}

struct FailingGenerator;

impl AnswerGenerator for FailingGenerator {
    fn generate_answer(&self, _: &str, _: &str, _: &str) -> Result<String> {
        Err(anyhow!("model unavailable"))
    }
}

// ----------------------- Escalation -----------------------

#[test]
fn integrity_question_escalates_before_routing() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    // would otherwise route to the checklist handler
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "Should I lie about my missing documents?",
    )
    .unwrap();

    assert!(r.escalated_to_human);
    assert!(r.reply.contains("should i lie"));
    assert!(r.citations.is_empty());
    assert_eq!(r.actions.len(), 1);
    assert_eq!(r.actions[0].tool_name, "escalate");
}

#[test]
fn escalation_does_not_need_an_index() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "I have a felony record, does that matter?",
    )
    .unwrap();
    assert!(r.escalated_to_human);
    assert!(!r.reply.is_empty());
}

// ----------------------- Checklist -----------------------

#[test]
fn empty_checklist_lists_the_five_defaults() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "What's missing from my checklist?",
    )
    .unwrap();

    assert!(!r.escalated_to_human);
    assert!(r.citations.is_empty());
    assert_eq!(r.actions.len(), 1);
    assert_eq!(r.actions[0].tool_name, "get_checklist");
    assert_eq!(r.actions[0].output["checklist"].as_array().unwrap().len(), 0);
    assert_eq!(r.reply.matches("(set to: missing)").count(), 5);
    assert!(r.reply.contains("Application fee or waiver"));
}

#[test]
fn tracked_items_are_reported_verbatim() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    store.upsert_checklist_item("s-1", "Application form", "submitted").unwrap();
    store.upsert_checklist_item("s-1", "Portfolio", "waiting_on_school").unwrap();

    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "Is my file complete?",
    )
    .unwrap();

    assert!(r.reply.contains("- Application form: **submitted**"));
    assert!(r.reply.contains("- Portfolio: **waiting_on_school**"));
    assert!(r.reply.contains("initialize missing default items"));
    // reading never writes
    assert_eq!(store.get_checklist("s-1").unwrap().len(), 2);
}

#[test]
fn store_failure_becomes_safe_reply() {
    let deps = Deps::new();
    let r = route_message(
        &deps.pipeline(&BrokenStore, None),
        &session(Segment::Traditional, None),
        "checklist please",
    )
    .unwrap();
    assert_eq!(r.reply, FALLBACK_REPLY);
    assert!(r.actions.is_empty());
    assert!(r.citations.is_empty());
    assert!(!r.escalated_to_human);
}

// ----------------------- Military -----------------------

#[test]
fn deployment_before_deadline_gets_two_week_buffer() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::ActiveDuty, Some("2025-11-01")),
        "I deploy 2025-10-15, what's the plan?",
    )
    .unwrap();

    assert_eq!(r.actions[0].tool_name, "deployment_buffer");
    let out = &r.actions[0].output;
    assert_eq!(out["deadline"], "2025-11-01");
    assert_eq!(out["deployment_start"], "2025-10-15");
    assert_eq!(out["soft_deadline"], "2025-10-01");
    assert!(r.reply.starts_with("Military support plan"));
}

#[test]
fn deployment_after_deadline_keeps_the_deadline() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::ActiveDuty, Some("2025-11-01")),
        "I deploy 2025-12-01",
    )
    .unwrap();
    assert_eq!(r.actions[0].output["soft_deadline"], "2025-11-01");
}

#[test]
fn missing_deadline_asks_for_both_dates() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::ActiveDuty, None),
        "Got my orders 2025-10-15",
    )
    .unwrap();
    let out = &r.actions[0].output;
    assert!(out["note"].as_str().unwrap().contains("Provide both"));
    assert!(out.get("soft_deadline").is_none());
}

// ----------------------- Coach / Outreach -----------------------

#[test]
fn coach_adds_active_duty_edge_only_for_active_duty() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let msg = "How can I improve my essay?";

    let ad = route_message(&deps.pipeline(&store, None), &session(Segment::ActiveDuty, None), msg).unwrap();
    let tr = route_message(&deps.pipeline(&store, None), &session(Segment::Traditional, None), msg).unwrap();

    assert!(ad.reply.contains("Active-duty edge"));
    assert!(!tr.reply.contains("Active-duty edge"));
    assert!(tr.actions.is_empty());
}

#[test]
fn outreach_names_first_outstanding_item() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    store.upsert_checklist_item("s-1", "Application form", "submitted").unwrap();
    store.upsert_checklist_item("s-1", "Official transcripts", "in_progress").unwrap();
    store.upsert_checklist_item("s-1", "Recommendations (2)", "missing").unwrap();

    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "Can you nudge me?",
    )
    .unwrap();
    assert_eq!(r.actions[0].tool_name, "next_best_nudge");
    assert!(r.reply.starts_with("Next best step: complete 'Official transcripts'."));

    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::ActiveDuty, None),
        "Can you nudge me?",
    )
    .unwrap();
    assert!(r.reply.starts_with("Next best step: focus on 'Official transcripts'."));
}

#[test]
fn outreach_congratulates_when_nothing_is_outstanding() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    store.upsert_checklist_item("s-1", "Application form", "verified").unwrap();
    let r = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "remind me what to do",
    )
    .unwrap();
    assert!(r.reply.starts_with("Nice work"));
}

// ----------------------- Retrieval-grounded Q&A -----------------------

#[test]
fn policy_question_without_index_is_unavailable() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let err = route_message(
        &deps.pipeline(&store, None),
        &session(Segment::Traditional, None),
        "How do fee waivers work?",
    )
    .unwrap_err();
    assert_eq!(err, RouteError::IndexUnavailable);
    assert!(!err.reply().is_empty());
}

#[test]
fn grounded_answer_cites_sources() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let r = route_message(
        &deps.pipeline(&store, Some(&idx)),
        &session(Segment::Traditional, None),
        "How do fee waivers work?",
    )
    .unwrap();

    assert!(!r.citations.is_empty());
    assert_eq!(r.citations[0].doc_id, "fees.md");
    assert_eq!(r.citations[0].title, "Fee Waivers");
    assert!(r.reply.contains("\n\nSources:\n- fees.md: Fee Waivers"));
    assert_eq!(r.actions[0].tool_name, "rag_search");
    assert_eq!(r.actions[0].output["hits"], r.citations.len());
}

#[test]
fn grounded_answer_never_guarantees() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let r = route_message(
        &deps.pipeline(&store, Some(&idx)),
        &session(Segment::Traditional, None),
        "Does submitting early help?",
    )
    .unwrap();

    assert_eq!(r.citations[0].doc_id, "early.md");
    assert!(r.reply.contains("cannot guarantee"));
    let without_hedge = r.reply.to_lowercase().replace("cannot guarantee", "");
    assert!(!without_hedge.contains("guarantee"));
}

#[test]
fn no_relevant_documents_says_so() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let r = route_message(
        &deps.pipeline(&store, Some(&idx)),
        &session(Segment::Traditional, None),
        "Where is the dining hall?",
    )
    .unwrap();
    assert!(r.citations.is_empty());
    assert!(!r.reply.contains("Sources:"));
    assert!(r.reply.starts_with(NO_MATCH_NOTE));
    assert!(r.reply.len() > NO_MATCH_NOTE.len());
    assert_eq!(r.actions[0].output["hits"], 0);
}

#[test]
fn no_relevant_documents_is_stated_once_with_passthrough() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let passthrough = PassthroughGenerator;
    let pipeline = Pipeline {
        generator: &passthrough,
        ..deps.pipeline(&store, Some(&idx))
    };
    let r = route_message(&pipeline, &session(Segment::Traditional, None), "Where is the dining hall?").unwrap();
    assert_eq!(r.reply, NO_CONTEXT_REPLY);
    assert!(!r.reply.contains(NO_MATCH_NOTE));
}

#[test]
fn matched_documents_skip_the_no_match_note() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let r = route_message(
        &deps.pipeline(&store, Some(&idx)),
        &session(Segment::Traditional, None),
        "How do fee waivers work?",
    )
    .unwrap();
    assert!(!r.citations.is_empty());
    assert!(!r.reply.contains(NO_MATCH_NOTE));
}

#[test]
fn generator_failure_becomes_safe_reply() {
    let deps = Deps::new();
    let store = InMemoryStore::new();
    let idx = index();
    let failing = FailingGenerator;
    let pipeline = Pipeline {
        generator: &failing,
        ..deps.pipeline(&store, Some(&idx))
    };
    let r = route_message(&pipeline, &session(Segment::Traditional, None), "fee waivers?").unwrap();
    assert_eq!(r.reply, FALLBACK_REPLY);
    assert!(r.citations.is_empty());
}
