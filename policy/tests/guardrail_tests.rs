use admissions_policy::{enforce_no_guarantees, GuaranteeGuard, PolicyError, BANNED_PHRASES, HEDGE};

fn without_hedge(s: &str) -> String {
    s.to_lowercase().replace(HEDGE, "")
}

#[test]
fn guarantee_is_hedged() {
    let out = enforce_no_guarantees("We guarantee admission");
    assert_eq!(out, "We cannot guarantee admission");
    let rest = without_hedge(&out);
    for p in BANNED_PHRASES {
        assert!(!rest.contains(p), "banned phrase {p:?} survived in {out:?}");
    }
}

#[test]
fn every_banned_phrase_is_replaced() {
    let out = enforce_no_guarantees(
        "You will be admitted, you are certainly admitted, 100% sure, Guaranteed!",
    );
    let rest = without_hedge(&out);
    for p in BANNED_PHRASES {
        assert!(!rest.contains(p), "banned phrase {p:?} survived in {out:?}");
    }
    assert_eq!(out.matches(HEDGE).count(), 4);
}

#[test]
fn rewrite_is_idempotent() {
    let once = enforce_no_guarantees("We guarantee a 100% result");
    let twice = enforce_no_guarantees(&once);
    assert_eq!(once, twice);
}

#[test]
fn existing_hedge_is_left_alone() {
    let text = "We cannot guarantee an outcome.";
    assert_eq!(enforce_no_guarantees(text), text);
}

#[test]
fn percent_statement_is_rewritten_unconditionally() {
    // Over-triggers on non-predictive text as well.
    let out = enforce_no_guarantees("100% of applicants submit by January");
    assert_eq!(out, "cannot guarantee of applicants submit by January");
}

#[test]
fn clean_text_is_unchanged() {
    let text = "Submit transcripts early and ask recommenders in advance.";
    assert_eq!(enforce_no_guarantees(text), text);
}

#[test]
fn non_ascii_text_keeps_byte_boundaries() {
    let out = enforce_no_guarantees("Résumé tips — we GUARANTEE nothing 🎓");
    assert_eq!(out, "Résumé tips — we cannot guarantee nothing 🎓");
}

#[test]
fn empty_hedge_is_rejected() {
    let err = GuaranteeGuard::new("  ", &["x".to_string()]).unwrap_err();
    assert!(matches!(err, PolicyError::EmptyHedge));
}
