use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{NodeRule, RuleFindings, issue, string_param};
use crate::config::IssueKind;

struct SqlPatterns {
    delete: Regex,
    update: Regex,
    where_clause: Regex,
    truncate: Regex,
    drop: Regex,
    select_star: Regex,
}

impl SqlPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            delete: Regex::new(r"(?i)\bDELETE\s+FROM\b")?,
            update: Regex::new(r"(?i)\bUPDATE\s+\S+\s+SET\b")?,
            where_clause: Regex::new(r"(?i)\bWHERE\b")?,
            truncate: Regex::new(r"(?i)\bTRUNCATE\b")?,
            drop: Regex::new(r"(?i)\bDROP\s+(TABLE|DATABASE|SCHEMA|VIEW|INDEX)\b")?,
            select_star: Regex::new(r"(?i)\bSELECT\s+\*")?,
        })
    }
}

static PATTERNS: LazyLock<Option<SqlPatterns>> = LazyLock::new(|| SqlPatterns::compile().ok());

/// Checks shared by the `postgres`, `mySql` and `microsoftSql` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlRule;

impl NodeRule for SqlRule {
    fn check(&self, config: &Map<String, Value>, findings: &mut RuleFindings) {
        let query = string_param(config, "query").unwrap_or_default();
        if query.trim().is_empty() {
            if string_param(config, "operation") == Some("executeQuery") {
                findings.error(issue(
                    IssueKind::MissingRequired,
                    "query",
                    "SQL query is required for the executeQuery operation",
                ));
            }
            return;
        }

        if query.contains("{{") {
            findings.warning(
                issue(
                    IssueKind::Security,
                    "query",
                    "Query interpolates expressions directly, which can allow SQL injection",
                )
                .with_fix("Use query parameters instead of {{ }} interpolation"),
            );
        }

        let Some(patterns) = PATTERNS.as_ref() else {
            return;
        };
        let has_where = patterns.where_clause.is_match(query);

        if patterns.delete.is_match(query) && !has_where {
            findings.error(
                issue(
                    IssueKind::InvalidValue,
                    "query",
                    "DELETE query without a WHERE clause deletes every row",
                )
                .with_fix("Add a WHERE clause"),
            );
        }
        if patterns.update.is_match(query) && !has_where {
            findings.warning(issue(
                IssueKind::Security,
                "query",
                "UPDATE query without a WHERE clause updates every row",
            ));
        }
        if patterns.truncate.is_match(query) {
            findings.warning(issue(
                IssueKind::Security,
                "query",
                "TRUNCATE removes every row from the table",
            ));
        }
        if patterns.drop.is_match(query) {
            findings.warning(issue(
                IssueKind::Security,
                "query",
                "DROP permanently deletes database objects",
            ));
        }
        if patterns.select_star.is_match(query) {
            findings.suggest("Select only the columns you need instead of SELECT *");
        }
    }
}
