//! Shared data types: sessions, checklist items and the normalized handler result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ----------------- Session -----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Traditional,
    Transfer,
    International,
    ActiveDuty,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Traditional => "traditional",
            Segment::Transfer => "transfer",
            Segment::International => "international",
            Segment::ActiveDuty => "active_duty",
        }
    }

    /// Human phrasing used in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Segment::Traditional => "traditional applicant",
            Segment::Transfer => "transfer applicant",
            Segment::International => "international applicant",
            Segment::ActiveDuty => "active-duty military applicant",
        }
    }
}

impl Default for Segment {
    fn default() -> Self {
        Segment::Traditional
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown segment '{0}' (expected traditional, transfer, international or active_duty)")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "traditional" => Ok(Segment::Traditional),
            "transfer" => Ok(Segment::Transfer),
            "international" => Ok(Segment::International),
            "active_duty" => Ok(Segment::ActiveDuty),
            _ => Err(UnknownSegment(s.to_string())),
        }
    }
}

/// Externally owned session. The pipeline only reads `segment` and `deadline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub display_name: String,
    pub segment: Segment,
    pub target_program: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

// ----------------- Checklist -----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Missing,
    InProgress,
    Submitted,
    Verified,
}

impl ChecklistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Missing => "missing",
            ChecklistStatus::InProgress => "in_progress",
            ChecklistStatus::Submitted => "submitted",
            ChecklistStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("Invalid status '{0}'. Use one of: missing, in_progress, submitted, verified.")]
    InvalidStatus(String),
    #[error("checklist item name must not be empty")]
    EmptyItem,
}

impl FromStr for ChecklistStatus {
    type Err = ChecklistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing" => Ok(ChecklistStatus::Missing),
            "in_progress" => Ok(ChecklistStatus::InProgress),
            "submitted" => Ok(ChecklistStatus::Submitted),
            "verified" => Ok(ChecklistStatus::Verified),
            _ => Err(ChecklistError::InvalidStatus(s.to_string())),
        }
    }
}

/// Externally owned checklist row. `status` is kept verbatim; the store may hold
/// values outside [`ChecklistStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub session_id: String,
    #[serde(rename = "item")]
    pub item_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ChecklistItem {
    /// Still needs work: `missing` or `in_progress`.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self.status.trim().to_ascii_lowercase().as_str(),
            "missing" | "in_progress"
        )
    }

    /// Counted toward file completion.
    pub fn is_done(&self) -> bool {
        matches!(
            self.status.trim().to_ascii_lowercase().as_str(),
            "submitted" | "verified" | "complete"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

// ----------------- Agent result -----------------

/// Structured record of a tool a handler consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    #[serde(rename = "tool")]
    pub tool_name: String,
    pub output: Value,
}

impl ToolRecord {
    pub fn new(tool_name: &str, output: Value) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    pub title: String,
    pub snippet: String,
}

/// Normalized output of every handler and of the escalation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub reply: String,
    pub actions: Vec<ToolRecord>,
    pub citations: Vec<Citation>,
    pub escalated_to_human: bool,
}

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't complete that request right now. \
Please try again, or contact the admissions office if it's urgent.";

impl AgentResult {
    pub fn new(reply: String, actions: Vec<ToolRecord>, citations: Vec<Citation>) -> Self {
        Self {
            reply,
            actions,
            citations,
            escalated_to_human: false,
        }
    }

    /// Safe default used when a handler fails.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_REPLY.to_string(), Vec::new(), Vec::new())
    }

    /// The only constructor that sets `escalated_to_human`.
    pub fn escalation(reason: &str) -> Self {
        let reply = format!(
            "This question may involve high-stakes policy or integrity issues. \
             I recommend contacting the admissions office or a counselor for guidance. \
             (Reason: {reason})"
        );
        Self {
            reply,
            actions: vec![ToolRecord::new(
                "escalate",
                serde_json::json!({ "reason": reason }),
            )],
            citations: Vec::new(),
            escalated_to_human: true,
        }
    }
}
