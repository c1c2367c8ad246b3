//! Namespace-prefix rules for node-type identifiers.
//!
//! Workflows use the canonical package prefixes (`n8n-nodes-base.`,
//! `@n8n/n8n-nodes-langchain.`), type repositories key metadata by the short
//! prefixes (`nodes-base.`, `nodes-langchain.`). A workflow node carrying a
//! short prefix uses a deprecated alias.

/// Canonical prefix of the core node package.
pub const BASE_PREFIX: &str = "n8n-nodes-base.";

/// Canonical prefix of the LangChain node package.
pub const LANGCHAIN_PREFIX: &str = "@n8n/n8n-nodes-langchain.";

/// Short prefix of the core node package.
pub const BASE_SHORT_PREFIX: &str = "nodes-base.";

/// Short prefix of the LangChain node package.
pub const LANGCHAIN_SHORT_PREFIX: &str = "nodes-langchain.";

const PREFIX_PAIRS: [(&str, &str); 2] = [
    (BASE_PREFIX, BASE_SHORT_PREFIX),
    (LANGCHAIN_PREFIX, LANGCHAIN_SHORT_PREFIX),
];

/// Returns whether the type carries a `package.name` separator.
pub fn has_package_prefix(node_type: &str) -> bool {
    node_type
        .rsplit_once('.')
        .is_some_and(|(package, name)| !package.is_empty() && !name.is_empty())
}

/// Returns the canonical replacement when the type uses a deprecated short prefix.
pub fn deprecated_alias(node_type: &str) -> Option<String> {
    PREFIX_PAIRS.iter().find_map(|(canonical, short)| {
        node_type
            .strip_prefix(short)
            .map(|name| format!("{canonical}{name}"))
    })
}

/// Converts a canonical type into the repository short form.
pub fn to_short_form(node_type: &str) -> String {
    PREFIX_PAIRS
        .iter()
        .find_map(|(canonical, short)| {
            node_type
                .strip_prefix(canonical)
                .map(|name| format!("{short}{name}"))
        })
        .unwrap_or_else(|| node_type.to_owned())
}

/// Converts a short-form type into the canonical workflow form.
pub fn to_canonical_form(node_type: &str) -> String {
    deprecated_alias(node_type).unwrap_or_else(|| node_type.to_owned())
}

/// Returns the identifiers to try when resolving a type, literal first.
pub fn lookup_candidates(node_type: &str) -> Vec<String> {
    let mut candidates = vec![node_type.to_owned()];
    for candidate in [to_short_form(node_type), to_canonical_form(node_type)] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Returns the part after the last `.`.
pub fn base_name(node_type: &str) -> &str {
    node_type
        .rsplit_once('.')
        .map_or(node_type, |(_, name)| name)
}

/// Returns whether the type uses one of the canonical workflow prefixes.
pub fn is_canonical(node_type: &str) -> bool {
    PREFIX_PAIRS
        .iter()
        .any(|(canonical, _)| node_type.starts_with(canonical))
}

/// Returns whether a type belongs to the LangChain package in any form.
pub fn is_langchain_type(node_type: &str) -> bool {
    node_type.contains("langchain")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_prefix() {
        assert!(has_package_prefix("n8n-nodes-base.webhook"));
        assert!(has_package_prefix("@n8n/n8n-nodes-langchain.agent"));
        assert!(!has_package_prefix("webhook"));
        assert!(!has_package_prefix("webhook."));
    }

    #[test]
    fn test_deprecated_alias() {
        assert_eq!(
            deprecated_alias("nodes-base.slack").as_deref(),
            Some("n8n-nodes-base.slack")
        );
        assert_eq!(
            deprecated_alias("nodes-langchain.agent").as_deref(),
            Some("@n8n/n8n-nodes-langchain.agent")
        );
        assert_eq!(deprecated_alias("n8n-nodes-base.slack"), None);
    }

    #[test]
    fn test_short_and_canonical_forms() {
        assert_eq!(to_short_form("n8n-nodes-base.slack"), "nodes-base.slack");
        assert_eq!(
            to_short_form("@n8n/n8n-nodes-langchain.agent"),
            "nodes-langchain.agent"
        );
        assert_eq!(to_short_form("custom.node"), "custom.node");
        assert_eq!(to_canonical_form("nodes-base.slack"), "n8n-nodes-base.slack");
    }

    #[test]
    fn test_lookup_candidates() {
        assert_eq!(
            lookup_candidates("n8n-nodes-base.slack"),
            vec!["n8n-nodes-base.slack", "nodes-base.slack"]
        );
        assert_eq!(
            lookup_candidates("nodes-base.slack"),
            vec!["nodes-base.slack", "n8n-nodes-base.slack"]
        );
        assert_eq!(lookup_candidates("custom.node"), vec!["custom.node"]);
    }

    #[test]
    fn test_canonical_prefixes() {
        assert!(is_canonical("n8n-nodes-base.code"));
        assert!(is_canonical("@n8n/n8n-nodes-langchain.toolCode"));
        assert!(!is_canonical("nodes-base.code"));
        assert!(!is_canonical("n8n-nodes-community.tool"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("@n8n/n8n-nodes-langchain.agent"), "agent");
        assert_eq!(base_name("start"), "start");
    }
}
