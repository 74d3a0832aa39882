//! Text formats for match-action table entries.

use crate::compile::Rule;

/// Renders one rule as one line of table configuration (without newline).
pub trait RuleFormat {
    fn format_rule(&self, rule: &Rule) -> String;
}

/// behavioral-model runtime CLI `table_add` command with decimal keys.
///
/// `table_add <table> <action> v->m v->m ... => <label> <priority>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAddFormat {
    pub table: String,
    pub action: String,
}

impl Default for TableAddFormat {
    fn default() -> Self {
        Self {
            table: "MyIngress.ml_code".to_string(),
            action: "set_result".to_string(),
        }
    }
}

impl RuleFormat for TableAddFormat {
    fn format_rule(&self, rule: &Rule) -> String {
        let mut parts = vec!["table_add".to_string(), self.table.clone(), self.action.clone()];
        parts.extend(rule.value_masks().map(|(v, m)| format!("{v}->{m}")));
        parts.push("=>".to_string());
        parts.push(rule.label().to_string());
        parts.push(rule.priority().to_string());
        parts.join(" ")
    }
}

/// Ternary `match` entry with hex keys.
///
/// `match 0xv/0xm ... priority <p> action <action> <param> <label>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFormat {
    pub action: String,
    pub param: String,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self {
            action: "set_result".to_string(),
            param: "val".to_string(),
        }
    }
}

impl RuleFormat for MatchFormat {
    fn format_rule(&self, rule: &Rule) -> String {
        let mut parts = vec!["match".to_string()];
        parts.extend(rule.blocks().iter().map(ToString::to_string));
        parts.push(format!("priority {}", rule.priority()));
        parts.push(format!("action {} {} {}", self.action, self.param, rule.label()));
        parts.join(" ")
    }
}
