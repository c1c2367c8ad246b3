use serde_json::{Map, Value};

use super::{NodeRule, RuleFindings, issue, string_param};
use crate::config::IssueKind;

/// Checks for `code` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeRule;

impl NodeRule for CodeRule {
    fn check(&self, config: &Map<String, Value>, findings: &mut RuleFindings) {
        let language = string_param(config, "language").unwrap_or("javaScript");
        let python = language.starts_with("python");
        let key = if python { "pythonCode" } else { "jsCode" };
        let code = string_param(config, key).unwrap_or_default();

        if code.trim().is_empty() {
            findings.error(
                issue(IssueKind::MissingRequired, key, "Code cannot be empty")
                    .with_fix("Add code that processes the input items"),
            );
            return;
        }

        if code.contains("eval(") || code.contains("exec(") {
            findings.warning(issue(
                IssueKind::Security,
                key,
                "Code uses eval() or exec(), which runs arbitrary code",
            ));
        }

        if !python && !code.contains("return") {
            findings.warning(
                issue(
                    IssueKind::MissingCommon,
                    key,
                    "Code does not return anything, so no items are passed on",
                )
                .with_fix("End the code with a return statement, e.g. return items;"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(config: Value) -> RuleFindings {
        let mut findings = RuleFindings::new();
        CodeRule.check(config.as_object().expect("object"), &mut findings);
        findings
    }

    #[test]
    fn test_empty_code_by_language() {
        let findings = run(json!({ "language": "python", "jsCode": "return items" }));
        assert_eq!(findings.errors()[0].property.as_deref(), Some("pythonCode"));

        let findings = run(json!({ "jsCode": "" }));
        assert_eq!(findings.errors()[0].property.as_deref(), Some("jsCode"));
    }

    #[test]
    fn test_eval_and_missing_return() {
        let findings = run(json!({ "jsCode": "eval(input)" }));
        let kinds: Vec<IssueKind> = findings.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![IssueKind::Security, IssueKind::MissingCommon]);

        assert!(run(json!({ "jsCode": "return $input.all();" })).is_empty());
        assert!(run(json!({ "language": "python", "pythonCode": "print(1)" })).is_empty());
    }
}
