//! Checklist items and the built-in handover checklist template

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

const TEMPLATE_FILE: &str = "checklist_template.yaml";

/// One checklist entry of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Store rowid, None until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub item_name: String,

    #[serde(default)]
    pub completed: bool,

    /// Person in charge
    #[serde(default)]
    pub person: String,

    /// Path to the supporting evidence, blank when not yet attached
    #[serde(default)]
    pub reference: String,

    /// Display order within the project's checklist
    #[serde(default)]
    pub seq: i64,
}

/// An item of the checklist template: name plus default person in charge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateItem {
    pub name: String,

    #[serde(default)]
    pub person: String,
}

/// The fixed checklist template a new project is initialized from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub items: Vec<TemplateItem>,
}

#[derive(Debug, Error)]
pub enum ChecklistTemplateError {
    #[error("built-in checklist template asset is missing")]
    Missing,

    #[error("failed to parse checklist template: {0}")]
    Parse(String),
}

impl ChecklistTemplate {
    /// Load the built-in template embedded in the binary
    pub fn builtin() -> Result<Self, ChecklistTemplateError> {
        let file = Assets::get(TEMPLATE_FILE).ok_or(ChecklistTemplateError::Missing)?;
        let text = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| ChecklistTemplateError::Parse(e.to_string()))?;
        serde_yml::from_str(text).map_err(|e| ChecklistTemplateError::Parse(e.to_string()))
    }

    /// Load a custom template from a YAML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ChecklistTemplateError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChecklistTemplateError::Parse(e.to_string()))?;
        serde_yml::from_str(&text).map_err(|e| ChecklistTemplateError::Parse(e.to_string()))
    }

    /// Materialize the template as checklist items, all incomplete
    pub fn to_items(&self) -> Vec<ChecklistItem> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| ChecklistItem {
                id: None,
                item_name: item.name.clone(),
                completed: false,
                person: item.person.clone(),
                reference: String::new(),
                seq: (i + 1) as i64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_template_loads() {
        let template = ChecklistTemplate::builtin().unwrap();
        assert_eq!(template.items.len(), 42);
        assert_eq!(
            template.items[0].name,
            "Design Record (BOM & 3D/2D Drawings)"
        );
        assert_eq!(template.items[0].person, "SANTHOSH");
    }

    #[test]
    fn test_to_items_is_sequenced_and_incomplete() {
        let template = ChecklistTemplate::builtin().unwrap();
        let items = template.to_items();
        assert_eq!(items.len(), template.items.len());
        assert!(items.iter().all(|i| !i.completed));
        assert!(items.iter().all(|i| i.reference.is_empty()));
        assert_eq!(items[0].seq, 1);
        assert_eq!(items[items.len() - 1].seq, items.len() as i64);
    }
}
