//! Keyword intent routing: an ordered rule table, first match wins.

use serde::Serialize;
use std::fmt;

use crate::domain::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Military,
    Checklist,
    Coach,
    Outreach,
    RetrievalQa,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Military => "military",
            Intent::Checklist => "checklist",
            Intent::Coach => "coach",
            Intent::Outreach => "outreach",
            Intent::RetrievalQa => "retrieval_qa",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub intent: Intent,
    /// Rule only applies to this segment when set.
    pub segment: Option<Segment>,
    pub keywords: &'static [&'static str],
}

pub const DEFAULT_RULES: &[RouteRule] = &[
    RouteRule {
        intent: Intent::Military,
        segment: Some(Segment::ActiveDuty),
        keywords: &["deploy", "active duty", "pcs", "orders"],
    },
    RouteRule {
        intent: Intent::Checklist,
        segment: None,
        keywords: &["checklist", "complete", "missing", "documents"],
    },
    RouteRule {
        intent: Intent::Coach,
        segment: None,
        keywords: &["improve", "competitive", "essay", "activities"],
    },
    RouteRule {
        intent: Intent::Outreach,
        segment: None,
        keywords: &["remind", "nudge", "next step", "start"],
    },
];

/// Stateless classifier; falls through to [`Intent::RetrievalQa`].
#[derive(Debug, Clone)]
pub struct IntentRouter {
    rules: Vec<RouteRule>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl IntentRouter {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, segment: Segment, message: &str) -> Intent {
        let text = message.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.segment.map_or(true, |s| s == segment))
            .find(|r| r.keywords.iter().any(|k| text.contains(k)))
            .map(|r| r.intent)
            .unwrap_or(Intent::RetrievalQa)
    }
}
