//! Metadata pass operations.

use flowmend_core::workflow::Workflow;
use serde_json::{Map, Value};

/// Shallow-merges `settings` into the workflow settings.
pub(super) fn update_settings(workflow: &mut Workflow, settings: &Map<String, Value>) {
    let current = workflow.settings.get_or_insert_with(Map::new);
    for (key, value) in settings {
        current.insert(key.clone(), value.clone());
    }
}

pub(super) fn add_tag(workflow: &mut Workflow, tag: &str) {
    let tags = workflow.tags.get_or_insert_with(Vec::new);
    if !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_owned());
    }
}

pub(super) fn remove_tag(workflow: &mut Workflow, tag: &str) {
    if let Some(tags) = workflow.tags.as_mut() {
        tags.retain(|existing| existing != tag);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_update_settings_merges() {
        let mut workflow = Workflow::new("w");
        workflow.settings = json!({ "timezone": "UTC", "saveManualExecutions": true })
            .as_object()
            .cloned();

        let patch = json!({ "timezone": "Europe/Berlin" });
        update_settings(&mut workflow, patch.as_object().expect("object"));

        let settings = workflow.settings.expect("settings");
        assert_eq!(settings["timezone"], json!("Europe/Berlin"));
        assert_eq!(settings["saveManualExecutions"], json!(true));
    }

    #[test]
    fn test_tags_behave_as_a_set() {
        let mut workflow = Workflow::new("w");
        remove_tag(&mut workflow, "missing");
        assert!(workflow.tags.is_none());

        add_tag(&mut workflow, "a");
        add_tag(&mut workflow, "a");
        add_tag(&mut workflow, "b");
        remove_tag(&mut workflow, "a");
        assert_eq!(workflow.tags, Some(vec!["b".to_string()]));
    }
}
