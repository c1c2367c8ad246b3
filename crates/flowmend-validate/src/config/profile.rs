//! Profile filtering of configuration issues.

use super::{ConfigValidationResult, IssueKind, ValidationProfile};

const HARDENING_SUGGESTIONS: [&str; 2] = [
    "Consider adding error handling with onError or continueOnFail",
    "Consider enabling retryOnFail for operations that call external services",
];

/// Drops the issues the profile does not report.
///
/// Runs after every other check, so rule findings are filtered too.
pub(super) fn apply_profile(result: &mut ConfigValidationResult, profile: ValidationProfile) {
    match profile {
        ValidationProfile::Strict => {
            if result.errors.is_empty() && result.warnings.is_empty() {
                result
                    .suggestions
                    .extend(HARDENING_SUGGESTIONS.iter().map(|s| (*s).to_owned()));
            }
        }
        ValidationProfile::Runtime => {
            result.errors.retain(|issue| {
                matches!(issue.kind, IssueKind::MissingRequired | IssueKind::InvalidValue)
            });
            result
                .warnings
                .retain(|issue| matches!(issue.kind, IssueKind::Security | IssueKind::Deprecated));
            result.suggestions.clear();
        }
        ValidationProfile::Minimal => {
            result
                .errors
                .retain(|issue| issue.kind == IssueKind::MissingRequired);
            result.warnings.clear();
        }
        ValidationProfile::AiFriendly => {
            result
                .warnings
                .retain(|issue| issue.kind != IssueKind::Inefficient);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigIssue, ValidationMode};

    fn sample(profile: ValidationProfile) -> ConfigValidationResult {
        let mut result = ConfigValidationResult::new(ValidationMode::Full, profile);
        result.errors = vec![
            ConfigIssue::new(IssueKind::MissingRequired, "missing"),
            ConfigIssue::new(IssueKind::InvalidType, "type"),
            ConfigIssue::new(IssueKind::InvalidValue, "value"),
        ];
        result.warnings = vec![
            ConfigIssue::new(IssueKind::Security, "secret"),
            ConfigIssue::new(IssueKind::Inefficient, "unused"),
            ConfigIssue::new(IssueKind::BestPractice, "practice"),
        ];
        result.suggestions = vec!["suggestion".into()];
        apply_profile(&mut result, profile);
        result
    }

    fn kinds(issues: &[ConfigIssue]) -> Vec<IssueKind> {
        issues.iter().map(|issue| issue.kind).collect()
    }

    #[test]
    fn test_runtime_profile() {
        let result = sample(ValidationProfile::Runtime);
        assert_eq!(
            kinds(&result.errors),
            vec![IssueKind::MissingRequired, IssueKind::InvalidValue]
        );
        assert_eq!(kinds(&result.warnings), vec![IssueKind::Security]);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_minimal_profile() {
        let result = sample(ValidationProfile::Minimal);
        assert_eq!(kinds(&result.errors), vec![IssueKind::MissingRequired]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_ai_friendly_profile() {
        let result = sample(ValidationProfile::AiFriendly);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(
            kinds(&result.warnings),
            vec![IssueKind::Security, IssueKind::BestPractice]
        );
    }

    #[test]
    fn test_strict_profile() {
        let result = sample(ValidationProfile::Strict);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.warnings.len(), 3);
        assert_eq!(result.suggestions.len(), 1);

        let mut clean = ConfigValidationResult::new(ValidationMode::Full, ValidationProfile::Strict);
        apply_profile(&mut clean, ValidationProfile::Strict);
        assert_eq!(clean.suggestions.len(), HARDENING_SUGGESTIONS.len());
    }
}
