use serde_json::{Map, Value};

use super::{NodeRule, RuleFindings, issue, string_param};
use crate::config::IssueKind;

/// Checks for `webhook` trigger nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookRule;

impl NodeRule for WebhookRule {
    fn check(&self, config: &Map<String, Value>, findings: &mut RuleFindings) {
        if let Some(path) = string_param(config, "path") {
            if path.trim().is_empty() {
                findings.error(
                    issue(IssueKind::InvalidValue, "path", "Webhook path cannot be empty")
                        .with_fix("Set a unique path such as \"my-webhook\""),
                );
            } else if let Some(stripped) = path.strip_prefix('/') {
                findings.warning(issue(
                    IssueKind::BestPractice,
                    "path",
                    "Webhook path should not start with a slash",
                ));
                findings.autofix("path", Value::String(stripped.to_owned()));
            }
        }

        if string_param(config, "responseMode") == Some("responseNode") {
            findings.suggest(
                "Add a Respond to Webhook node to send the response, since responseMode is responseNode",
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
        let config = config.as_object().cloned().unwrap_or_default();
        WebhookRule.check(&config, &mut findings);
        findings
    }

    #[test]
    fn test_empty_path_is_error() {
        let findings = run(json!({ "path": "  " }));
        assert_eq!(findings.errors().len(), 1);
        assert!(run(json!({ "path": "orders" })).is_empty());
    }

    #[test]
    fn test_leading_slash_autofix() {
        let findings = run(json!({ "path": "/orders" }));
        assert_eq!(findings.warnings().len(), 1);
        assert_eq!(findings.autofix.get("path"), Some(&json!("orders")));
    }

    #[test]
    fn test_response_node_suggestion() {
        let findings = run(json!({ "path": "orders", "responseMode": "responseNode" }));
        assert_eq!(findings.suggestions().len(), 1);
        assert!(findings.errors().is_empty());
    }
}
