pub mod assets;
pub mod error;
pub mod evaluator;
pub mod guardrail;
pub mod normalize;
pub mod types;

pub use assets::{default_rules_toml, write_default_rules};
pub use error::PolicyError;
pub use evaluator::{default_rules, should_escalate, PolicyGate, DEFAULT_TRIGGERS};
pub use guardrail::{enforce_no_guarantees, GuaranteeGuard, BANNED_PHRASES, HEDGE};
pub use normalize::for_rules as normalize_for_rules;
pub use types::{GuardrailRules, PolicyDecision, PolicyRules, Trigger};
