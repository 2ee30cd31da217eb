use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::error::PolicyError;
use crate::guardrail::GuaranteeGuard;
use crate::normalize::for_rules;
use crate::types::{PolicyDecision, PolicyRules, Trigger};

// ----------------- Default denylist -----------------

/// Ordered `(phrase, category)` table. Order is the tie-break: the first phrase
/// found in a message decides the reason.
pub const DEFAULT_TRIGGERS: &[(&str, &str)] = &[
    ("legal", "legal"),
    ("lawsuit", "legal"),
    ("medical", "medical"),
    ("diagnosis", "medical"),
    ("disability", "medical"),
    ("criminal", "disciplinary"),
    ("felony", "disciplinary"),
    ("misdemeanor", "disciplinary"),
    ("court", "legal"),
    ("immigration", "immigration"),
    ("should i lie", "integrity"),
    ("fake", "integrity"),
    ("fabricate", "integrity"),
    ("cheat", "integrity"),
    ("forge", "integrity"),
];

pub fn default_rules() -> PolicyRules {
    PolicyRules {
        name: "escalation".into(),
        version: "1.0".into(),
        description: Some("High-stakes and integrity topics that must be routed to a human.".into()),
        triggers: DEFAULT_TRIGGERS
            .iter()
            .map(|(phrase, category)| Trigger {
                phrase: phrase.to_string(),
                category: Some(category.to_string()),
            })
            .collect(),
        guardrail: Default::default(),
    }
}

static DEFAULT_GATE: Lazy<PolicyGate> = Lazy::new(PolicyGate::default);

// ----------------- Gate -----------------

/// Stateless escalation classifier plus the post-generation guardrail.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    name: String,
    version: String,
    // (normalized phrase, original trigger), in evaluation order
    triggers: Vec<(String, Trigger)>,
    guard: GuaranteeGuard,
}

impl PolicyGate {
    pub fn from_rules(rules: PolicyRules) -> Result<Self, PolicyError> {
        let mut triggers = Vec::with_capacity(rules.triggers.len());
        for (i, t) in rules.triggers.into_iter().enumerate() {
            let norm = for_rules(t.phrase.trim());
            if norm.is_empty() {
                return Err(PolicyError::EmptyTrigger(i));
            }
            triggers.push((norm, t));
        }
        let guard = GuaranteeGuard::new(&rules.guardrail.hedge, &rules.guardrail.banned)?;
        Ok(Self {
            name: rules.name,
            version: rules.version,
            triggers,
            guard,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        let rules: PolicyRules = toml::from_str(text)?;
        Self::from_rules(rules)
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let text = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter().map(|(_, t)| t)
    }

    /// First trigger contained in the normalized message wins.
    pub fn should_escalate(&self, message: &str) -> PolicyDecision {
        let text = for_rules(message);
        self.triggers
            .iter()
            .find(|(norm, _)| text.contains(norm.as_str()))
            .map(|(_, t)| PolicyDecision::escalate(t))
            .unwrap_or_else(PolicyDecision::allow)
    }

    pub fn enforce_no_guarantees(&self, text: &str) -> String {
        self.guard.apply(text)
    }
}

impl Default for PolicyGate {
    fn default() -> Self {
        let rules = default_rules();
        Self {
            name: rules.name,
            version: rules.version,
            triggers: rules
                .triggers
                .into_iter()
                .map(|t| (for_rules(&t.phrase), t))
                .collect(),
            guard: GuaranteeGuard::default(),
        }
    }
}

/// Escalation check against the built-in denylist.
pub fn should_escalate(message: &str) -> PolicyDecision {
    DEFAULT_GATE.should_escalate(message)
}
