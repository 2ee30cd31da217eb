use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::evaluator::default_rules;

pub const DEFAULT_RULES_NAME: &str = "escalation.toml";

/// Render the built-in rule set as TOML, in the override-file schema.
pub fn default_rules_toml() -> Result<String> {
    toml::to_string_pretty(&default_rules()).context("render default policy rules")
}

/// Seed the default rules file into `dir` if it is missing (idempotent).
/// Returns the names of files that were created.
pub fn write_default_rules(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("create_dir_all({:?})", dir))?;

    let mut created = Vec::new();
    let path = dir.join(DEFAULT_RULES_NAME);
    if !path.exists() {
        fs::write(&path, default_rules_toml()?).with_context(|| format!("write {:?}", path))?;
        created.push(DEFAULT_RULES_NAME.to_string());
    }
    Ok(created)
}
