//! Emitted table entries for a compiled tree.

use dtree_tcam::compile::compile;
use dtree_tcam::domain::{FeatureDomain, FeatureDomains};
use dtree_tcam::emit::{emit_rules, MatchFormat, TableAddFormat, VecSink, WriterSink};
use dtree_tcam::trees::{ClassLabel, TreeBuilder};

/// a <= 3 ? 0 : 1 over a 4-bit field and a 2-bit field
fn output() -> dtree_tcam::CompileOutput {
    let domains = FeatureDomains::new(vec![
        FeatureDomain::full("a", 4).unwrap(),
        FeatureDomain::full("b", 2).unwrap(),
    ]);
    let mut builder = TreeBuilder::new();
    builder.add_split(0, 3, 1, 2);
    builder.add_leaf(ClassLabel(0));
    builder.add_leaf(ClassLabel(1));
    compile(&builder.build().unwrap(), &domains).unwrap()
}

fn render<F: dtree_tcam::emit::RuleFormat>(format: F) -> String {
    let output = output();
    let mut sink = WriterSink::new(Vec::new(), format);
    emit_rules(&output.rules, &mut sink).unwrap();
    String::from_utf8(sink.into_inner()).unwrap()
}

#[test]
fn table_add_lines() {
    // [0, 3] -> 0/12; [4, 15] -> 4/12, 8/8
    assert_eq!(
        render(TableAddFormat::default()),
        "table_add MyIngress.ml_code set_result 0->12 0->0 => 0 1\n\
         table_add MyIngress.ml_code set_result 4->12 0->0 => 1 2\n\
         table_add MyIngress.ml_code set_result 8->8 0->0 => 1 3\n"
    );
}

#[test]
fn match_lines() {
    assert_eq!(
        render(MatchFormat::default()),
        "match 0x0/0xc 0x0/0x0 priority 1 action set_result val 0\n\
         match 0x4/0xc 0x0/0x0 priority 2 action set_result val 1\n\
         match 0x8/0x8 0x0/0x0 priority 3 action set_result val 1\n"
    );
}

#[test]
fn custom_table_and_action() {
    let format = TableAddFormat {
        table: "Ingress.classify".to_string(),
        action: "mark".to_string(),
    };
    assert!(render(format).starts_with("table_add Ingress.classify mark 0->12 0->0 => 0 1\n"));
}

#[test]
fn sinks_preserve_order_and_priorities() {
    let output = output();
    let mut sink = VecSink::default();
    assert_eq!(emit_rules(&output.rules, &mut sink).unwrap(), 3);
    assert_eq!(sink.rules, output.rules);
}
