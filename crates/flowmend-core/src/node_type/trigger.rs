//! Trigger classification over node type identifiers.

use super::normalize::base_name;

/// Base names of entry-point types whose identifier does not say "trigger".
const ENTRY_POINT_NAMES: [&str; 3] = ["start", "cron", "interval"];

/// Base name of the node that answers a webhook call instead of receiving it.
const WEBHOOK_RESPONDER: &str = "respondtowebhook";

/// Returns whether nodes of this type can start a workflow.
///
/// Covers webhook receivers, schedule, manual and form triggers, and the
/// legacy `start`, `cron` and `interval` nodes.
pub fn is_trigger_type(node_type: &str) -> bool {
    let lower = node_type.to_ascii_lowercase();
    lower.contains("trigger")
        || is_webhook_type(node_type)
        || ENTRY_POINT_NAMES.contains(&base_name(node_type))
}

/// Returns whether the type receives webhooks.
///
/// `respondToWebhook` sits downstream of a receiver and is excluded.
pub fn is_webhook_type(node_type: &str) -> bool {
    node_type.to_ascii_lowercase().contains("webhook")
        && !base_name(node_type).eq_ignore_ascii_case(WEBHOOK_RESPONDER)
}

/// Returns whether the type looks like an agent that can use tools.
pub fn is_agent_type(node_type: &str) -> bool {
    base_name(node_type).to_ascii_lowercase().contains("agent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_types() {
        for node_type in [
            "n8n-nodes-base.webhook",
            "n8n-nodes-base.manualTrigger",
            "n8n-nodes-base.scheduleTrigger",
            "n8n-nodes-base.formTrigger",
            "n8n-nodes-base.start",
            "n8n-nodes-base.cron",
            "@n8n/n8n-nodes-langchain.chatTrigger",
        ] {
            assert!(is_trigger_type(node_type), "{node_type} should be a trigger");
        }
    }

    #[test]
    fn test_non_trigger_types() {
        for node_type in ["n8n-nodes-base.httpRequest", "n8n-nodes-base.set", "n8n-nodes-base.startsWith"] {
            assert!(!is_trigger_type(node_type), "{node_type} should not be a trigger");
        }
    }

    #[test]
    fn test_agent_types() {
        assert!(is_agent_type("@n8n/n8n-nodes-langchain.agent"));
        assert!(!is_agent_type("n8n-nodes-base.httpRequest"));
    }

    #[test]
    fn test_respond_to_webhook_is_not_a_receiver() {
        assert!(is_webhook_type("n8n-nodes-base.webhook"));
        for node_type in ["n8n-nodes-base.respondToWebhook", "nodes-base.RespondToWebhook"] {
            assert!(!is_webhook_type(node_type), "{node_type} should not receive webhooks");
            assert!(!is_trigger_type(node_type), "{node_type} should not be a trigger");
        }
    }
}
