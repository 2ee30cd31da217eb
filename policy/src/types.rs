use serde::{Deserialize, Serialize};

/// A full policy rule set: the escalation denylist plus the guardrail phrases.
///
/// This is the schema of a rules override file (see `PolicyConfig::rules_path`
/// in the core crate). Trigger order is significant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyRules {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub guardrail: GuardrailRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Trigger {
    pub phrase: String,
    // "legal" | "medical" | "disciplinary" | "immigration" | "integrity"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GuardrailRules {
    pub hedge: String,
    #[serde(default)]
    pub banned: Vec<String>,
}

impl Default for GuardrailRules {
    fn default() -> Self {
        Self {
            hedge: crate::guardrail::HEDGE.to_string(),
            banned: crate::guardrail::BANNED_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Outcome of the escalation check. `reason` is empty iff `escalated` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub escalated: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            escalated: false,
            reason: String::new(),
            trigger: None,
            category: None,
        }
    }

    pub fn escalate(trigger: &Trigger) -> Self {
        Self {
            escalated: true,
            reason: format!(
                "High-stakes or integrity-related query trigger: '{}'",
                trigger.phrase
            ),
            trigger: Some(trigger.phrase.clone()),
            category: trigger.category.clone(),
        }
    }
}
