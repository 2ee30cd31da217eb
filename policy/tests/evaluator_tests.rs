use admissions_policy::{should_escalate, PolicyError, PolicyGate};

#[test]
fn integrity_question_escalates() {
    let d = should_escalate("Should I lie on my application?");
    assert!(d.escalated);
    assert!(!d.reason.is_empty());
    assert_eq!(d.trigger.as_deref(), Some("should i lie"));
    assert_eq!(d.category.as_deref(), Some("integrity"));
}

#[test]
fn ordinary_question_passes() {
    let d = should_escalate("What is a recommendation letter?");
    assert!(!d.escalated);
    assert!(d.reason.is_empty());
    assert!(d.trigger.is_none());
}

#[test]
fn first_trigger_in_table_order_wins() {
    // "court" comes after "felony" in the table even though it appears first in the text.
    let d = should_escalate("My court date is about a felony charge");
    assert_eq!(d.trigger.as_deref(), Some("felony"));
    assert!(d.reason.contains("'felony'"));
}

#[test]
fn matching_is_case_insensitive_and_ignores_zero_width() {
    assert!(should_escalate("IMMIGRATION status question").escalated);
    assert!(should_escalate("can I fa\u{200B}ke a transcript").escalated);
}

#[test]
fn substring_containment_is_not_word_bounded() {
    // "forge" inside "forget" still trips the denylist.
    let d = should_escalate("I always forget my password");
    assert!(d.escalated);
    assert_eq!(d.trigger.as_deref(), Some("forge"));
}

#[test]
fn custom_rules_from_toml() {
    let gate = PolicyGate::from_toml_str(
        r#"
        name = "custom"
        version = "2"

        [[triggers]]
        phrase = "Visa"
        category = "immigration"

        [guardrail]
        hedge = "may not guarantee"
        banned = ["sure thing"]
        "#,
    )
    .expect("parse custom rules");

    assert_eq!(gate.name(), "custom");
    assert!(gate.should_escalate("my visa expired").escalated);
    assert!(!gate.should_escalate("Should I lie?").escalated);
    assert_eq!(gate.enforce_no_guarantees("It's a sure thing"), "It's a may not guarantee");
}

#[test]
fn empty_trigger_is_rejected() {
    let err = PolicyGate::from_toml_str(
        r#"
        name = "bad"
        version = "1"
        [[triggers]]
        phrase = "   "
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, PolicyError::EmptyTrigger(0)));
}

#[test]
fn default_rules_round_trip_through_seeded_file() {
    let dir = tempfile::tempdir().unwrap();
    let created = admissions_policy::write_default_rules(dir.path()).unwrap();
    assert_eq!(created, vec!["escalation.toml".to_string()]);
    // idempotent
    assert!(admissions_policy::write_default_rules(dir.path()).unwrap().is_empty());

    let gate = PolicyGate::from_file(&dir.path().join("escalation.toml")).unwrap();
    let defaults = PolicyGate::default();
    assert!(gate.triggers().eq(defaults.triggers()));
    assert!(gate.should_escalate("lawsuit pending").escalated);
}

#[test]
fn missing_rules_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PolicyGate::from_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, PolicyError::Io { .. }));
}
