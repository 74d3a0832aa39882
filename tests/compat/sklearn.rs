//! scikit-learn tree dumps compiled end to end.

use serde::Deserialize;

use dtree_tcam::compat::SklearnTree;
use dtree_tcam::compile::compile;
use dtree_tcam::domain::FeatureDomains;
use dtree_tcam::trees::ClassLabel;

use crate::common::{
    assert_priorities_increasing, assert_single_match, load_json, sklearn_test_cases_dir,
};

#[derive(Debug, Deserialize)]
struct Expected {
    cases: Vec<ExpectedCase>,
}

#[derive(Debug, Deserialize)]
struct ExpectedCase {
    point: Vec<u64>,
    label: u32,
}

fn load_case() -> (SklearnTree, FeatureDomains, Expected) {
    let dir = sklearn_test_cases_dir();
    (
        load_json(&dir.join("flow_classifier.json")),
        load_json(&dir.join("domains.json")),
        load_json(&dir.join("expected.json")),
    )
}

#[test]
fn converts_flow_classifier() {
    let (model, _, expected) = load_case();
    let tree = model.to_tree().unwrap();
    assert_eq!(tree.n_nodes(), 9);
    assert_eq!(tree.n_leaves(), 5);
    // 128.5 -> 128, 12.75 -> 12
    assert_eq!(tree.node(0).split_condition().unwrap().threshold, 128);
    assert_eq!(tree.node(6).split_condition().unwrap().threshold, 12);

    for case in &expected.cases {
        assert_eq!(tree.evaluate(&case.point), Some(ClassLabel(case.label)), "{case:?}");
    }
}

#[test]
fn compiled_rules_reproduce_classifier() {
    let (model, domains, expected) = load_case();
    let tree = model.to_tree().unwrap();
    let output = compile(&tree, &domains).unwrap();

    assert_eq!(output.stats.n_regions, 5);
    assert!(output.unreachable.is_empty());
    assert_priorities_increasing(&output.rules);
    for case in &expected.cases {
        let rule = assert_single_match(&output.rules, &case.point);
        assert_eq!(rule.label(), ClassLabel(case.label), "{case:?}");
    }
}

#[test]
fn domains_fixture_round_trips() {
    let (_, domains, _) = load_case();
    assert_eq!(domains.len(), 3);
    assert_eq!(domains.position("diffLen"), Some(1));
    let json = serde_json::to_string(&domains).unwrap();
    let back: FeatureDomains = serde_json::from_str(&json).unwrap();
    assert_eq!(back, domains);
}
