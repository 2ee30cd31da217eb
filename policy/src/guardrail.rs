//! No-guarantee guardrail applied to generated answers.
//!
//! Banned phrases are matched case-insensitively on the normalized view of the
//! text and replaced in a single left-to-right pass, so a substituted hedge is
//! never rescanned. Existing occurrences of the hedge are left untouched, which
//! makes the rewrite idempotent.
//!
//! `100%` is replaced unconditionally, including in statements that are not
//! outcome predictions.

use crate::error::PolicyError;
use crate::normalize::{chars_with_spans, for_rules};

pub const HEDGE: &str = "cannot guarantee";

/// Checked in this order at each position of the text.
pub const BANNED_PHRASES: &[&str] = &["guarantee", "certainly admitted", "will be admitted", "100%"];

#[derive(Debug, Clone)]
pub struct GuaranteeGuard {
    hedge: String,
    hedge_chars: Vec<char>,
    banned: Vec<Vec<char>>,
}

impl GuaranteeGuard {
    pub fn new(hedge: &str, banned: &[String]) -> Result<Self, PolicyError> {
        if hedge.trim().is_empty() {
            return Err(PolicyError::EmptyHedge);
        }
        let mut phrases = Vec::with_capacity(banned.len());
        for (i, p) in banned.iter().enumerate() {
            let chars: Vec<char> = for_rules(p).chars().collect();
            if chars.is_empty() {
                return Err(PolicyError::EmptyBannedPhrase(i));
            }
            phrases.push(chars);
        }
        Ok(Self {
            hedge: hedge.to_string(),
            hedge_chars: for_rules(hedge).chars().collect(),
            banned: phrases,
        })
    }

    pub fn hedge(&self) -> &str {
        &self.hedge
    }

    pub fn apply(&self, text: &str) -> String {
        let (chars, spans) = chars_with_spans(text);

        // Collect original byte ranges to replace; i only moves forward so the
        // ranges come out sorted and disjoint.
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut i = 0usize;
        while i < chars.len() {
            if starts_with_at(&chars, i, &self.hedge_chars) {
                i += self.hedge_chars.len();
                continue;
            }
            match self.banned.iter().find(|p| starts_with_at(&chars, i, p)) {
                Some(p) => {
                    let (s, _) = spans[i];
                    let (_, e) = spans[i + p.len() - 1];
                    let overlaps = ranges.last().map(|last| s < last.1).unwrap_or(false);
                    if !overlaps {
                        ranges.push((s, e));
                    }
                    i += p.len();
                }
                None => i += 1,
            }
        }

        let mut out = text.to_string();
        for (s, e) in ranges.into_iter().rev() {
            out.replace_range(s..e, &self.hedge);
        }
        out
    }
}

impl Default for GuaranteeGuard {
    fn default() -> Self {
        Self {
            hedge: HEDGE.to_string(),
            hedge_chars: HEDGE.chars().collect(),
            banned: BANNED_PHRASES.iter().map(|p| p.chars().collect()).collect(),
        }
    }
}

fn starts_with_at(hay: &[char], at: usize, needle: &[char]) -> bool {
    !needle.is_empty() && hay.len() >= at + needle.len() && hay[at..at + needle.len()] == *needle
}

/// Rewrite absolute-certainty language using the built-in phrase list.
pub fn enforce_no_guarantees(text: &str) -> String {
    GuaranteeGuard::default().apply(text)
}
