use serde_json::{Map, Value};

use super::{NodeRule, RuleFindings, issue, string_param};
use crate::config::IssueKind;
use crate::expression::is_expression_str;

/// Checks for `httpRequest` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRequestRule;

impl NodeRule for HttpRequestRule {
    fn check(&self, config: &Map<String, Value>, findings: &mut RuleFindings) {
        if let Some(url) = string_param(config, "url")
            && !url.is_empty()
            && !is_expression_str(url)
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            findings.error(
                issue(
                    IssueKind::InvalidValue,
                    "url",
                    "URL must start with http:// or https://",
                )
                .with_fix(format!("Use \"https://{url}\"")),
            );
        }

        let method = string_param(config, "method")
            .unwrap_or("GET")
            .to_ascii_uppercase();
        let sends_body = config.get("sendBody").and_then(Value::as_bool) == Some(true);
        if matches!(method.as_str(), "POST" | "PUT" | "PATCH") && !sends_body {
            findings.warning(
                issue(
                    IssueKind::MissingCommon,
                    "sendBody",
                    format!("{method} requests usually send a body, but sendBody is not enabled"),
                )
                .with_fix("Set sendBody to true"),
            );
            findings.autofix("sendBody", Value::Bool(true));
        }

        if let Some(body) = string_param(config, "jsonBody")
            && !body.trim().is_empty()
            && !is_expression_str(body)
            && let Err(error) = serde_json::from_str::<Value>(body)
        {
            findings.error(issue(
                IssueKind::InvalidValue,
                "jsonBody",
                format!("JSON body is not valid JSON: {error}"),
            ));
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
        HttpRequestRule.check(&config, &mut findings);
        findings
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let findings = run(json!({ "url": "example.com/api" }));
        assert_eq!(findings.errors().len(), 1);
        assert_eq!(findings.errors()[0].property.as_deref(), Some("url"));

        assert!(run(json!({ "url": "https://example.com" })).is_empty());
        assert!(run(json!({ "url": "={{ $json.url }}" })).is_empty());
    }

    #[test]
    fn test_body_methods_autofix_send_body() {
        let findings = run(json!({ "url": "https://example.com", "method": "POST" }));
        assert_eq!(findings.warnings()[0].kind, IssueKind::MissingCommon);
        assert_eq!(findings.autofix.get("sendBody"), Some(&json!(true)));

        let findings = run(json!({ "url": "https://example.com", "method": "PUT", "sendBody": true }));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_invalid_json_body() {
        let findings = run(json!({
            "method": "POST",
            "sendBody": true,
            "jsonBody": "{ \"a\": 1,"
        }));
        assert_eq!(findings.errors().len(), 1);
        assert!(findings.errors()[0].message.starts_with("JSON body is not valid JSON"));

        let findings = run(json!({ "sendBody": true, "jsonBody": "={{ JSON.stringify($json) }}" }));
        assert!(findings.errors().is_empty());
    }
}
