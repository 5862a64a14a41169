use std::collections::BTreeMap;

use evsyn_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes};
use evsyn_core::{
    records_from_papers, stable_hash_string, EffectSizeEntry, EffectSizeRecord, EvsynError,
    PaperEffectSizes, PaperId, StudySet,
};

fn paper(id: i64, title: &str, outcomes: &[(&str, f64, f64)]) -> PaperEffectSizes {
    let mut effect_sizes = BTreeMap::new();
    for (name, d, se) in outcomes {
        effect_sizes.insert(name.to_string(), EffectSizeEntry { d: *d, se: *se });
    }
    PaperEffectSizes {
        paper_id: Some(PaperId::Numeric(id)),
        title: Some(title.to_string()),
        effect_sizes,
        subgroup_value: None,
        attributes: BTreeMap::new(),
    }
}

#[test]
fn non_positive_std_errors_are_rejected() {
    for se in [0.0, -0.1, f64::NAN] {
        let err = EffectSizeRecord::new(0.3, se).unwrap_err();
        assert!(matches!(err, EvsynError::Validation(_)));
        assert_eq!(err.info().code, "non-positive-std-error");
    }
    assert!(EffectSizeRecord::new(0.3, 0.1).is_ok());
}

#[test]
fn default_labels_follow_position() {
    let record = EffectSizeRecord::new(0.1, 0.2).unwrap();
    assert_eq!(record.label_or_default(0), "Study 1");
    assert_eq!(record.label_or_default(4), "Study 5");
    let labelled = record.with_label("Smith 2023");
    assert_eq!(labelled.label_or_default(4), "Smith 2023");
}

#[test]
fn paper_ids_accept_numbers_and_strings() {
    let numeric: PaperId = from_json_slice(b"42").unwrap();
    let text: PaperId = from_json_slice(b"\"10.1000/xyz\"").unwrap();
    assert_eq!(numeric, PaperId::Numeric(42));
    assert_eq!(text.to_string(), "10.1000/xyz");
}

#[test]
fn papers_convert_to_records_by_outcome() {
    let papers = vec![
        paper(1, "Spaced repetition", &[("math", 0.45, 0.12), ("retention", 0.38, 0.14)]),
        paper(2, "Active learning", &[("engagement", 0.51, 0.13)]),
        paper(3, "Peer tutoring", &[("math", 0.30, 0.10)]),
    ];

    let math = records_from_papers(&papers, Some("math")).unwrap();
    assert_eq!(math.len(), 2);
    assert_eq!(math[0].study_label.as_deref(), Some("Spaced repetition"));
    assert_eq!(math[1].paper_id, Some(PaperId::Numeric(3)));

    let first = records_from_papers(&papers, None).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].effect_size, 0.45);
    assert_eq!(first[1].effect_size, 0.51);
}

#[test]
fn invalid_stored_effect_size_reports_paper() {
    let papers = vec![paper(7, "Broken", &[("math", 0.2, 0.0)])];
    let err = records_from_papers(&papers, Some("math")).unwrap_err();
    assert_eq!(err.info().context["paper"], "0");
    assert_eq!(err.info().context["outcome"], "math");
}

#[test]
fn study_set_loads_from_yaml() {
    let yaml = b"studies:\n  - effect_size: 0.5\n    std_error: 0.15\n    subgroup_value: elementary\n  - effect_size: 0.3\n    std_error: 0.12\n    paper_id: abc\n";
    let set: StudySet = from_yaml_slice(yaml).unwrap();
    let records = set.into_records(None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].subgroup_value.as_deref(), Some("elementary"));
    assert_eq!(records[1].paper_id, Some(PaperId::from("abc")));
}

#[test]
fn study_set_rejects_invalid_records() {
    let json = br#"{"studies": [{"effect_size": 0.5, "std_error": -1.0}]}"#;
    let set: StudySet = from_json_slice(json).unwrap();
    assert!(set.into_records(None).unwrap_err().is_validation());
}

#[test]
fn study_set_rejects_misnamed_sections() {
    let json = br#"{"study": [{"effect_size": 0.5, "std_error": 0.1}]}"#;
    assert!(matches!(
        from_json_slice::<StudySet>(json).unwrap_err(),
        EvsynError::Serde(_)
    ));
    let yaml = b"studies: []
paper: []
";
    assert!(from_yaml_slice::<StudySet>(yaml).is_err());
}

#[test]
fn canonical_json_is_key_ordered_and_hash_stable() {
    let record = EffectSizeRecord::new(0.5, 0.15)
        .unwrap()
        .with_subgroup("a")
        .with_label("x");
    let bytes = to_canonical_json_bytes(&record).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
        text,
        r#"{"effect_size":0.5,"std_error":0.15,"study_label":"x","subgroup_value":"a"}"#
    );
    assert_eq!(
        stable_hash_string(&record).unwrap(),
        stable_hash_string(&record.clone()).unwrap()
    );
}

#[test]
fn grouping_value_reads_subgroup_or_attribute() {
    let record = EffectSizeRecord::new(0.2, 0.1)
        .unwrap()
        .with_subgroup("elementary")
        .with_attribute("intervention_type", "tutoring");
    assert_eq!(record.grouping_value("subgroup_value"), Some("elementary"));
    assert_eq!(record.grouping_value("intervention_type"), Some("tutoring"));
    assert_eq!(record.grouping_value("age_group"), None);
}

#[test]
fn paper_attributes_carry_over() {
    let mut source = paper(3, "Tutoring trial", &[("math", 0.4, 0.1)]);
    source.attributes.insert("setting".into(), "rural".into());
    let records = records_from_papers(&[source], Some("math")).unwrap();
    assert_eq!(records[0].grouping_value("setting"), Some("rural"));
}
