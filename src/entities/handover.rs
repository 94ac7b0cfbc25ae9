//! Handover document records

use serde::{Deserialize, Serialize};

/// Document categories tracked during handover, in display order
pub const CATEGORIES: [&str; 14] = [
    "Process Flow Chart",
    "PFMEA",
    "Control Plan",
    "Process Parameters",
    "SAP BOM",
    "Label Artwork",
    "Cycle Time Study",
    "Assembly Qualification Report",
    "Packaging Document",
    "WI",
    "SOP",
    "Stencil, Tools & Fixtures",
    "Lessons Learnt",
    "Other Documents",
];

/// Lifecycle of a handover document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum HandoverStatus {
    /// Registered but not yet accepted by the receiving team
    #[default]
    Open,
    /// Accepted, no further changes expected
    Closed,
}

impl std::fmt::Display for HandoverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandoverStatus::Open => write!(f, "open"),
            HandoverStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for HandoverStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(HandoverStatus::Open),
            "closed" => Ok(HandoverStatus::Closed),
            _ => Err(format!("Invalid handover status: {}. Use open or closed", s)),
        }
    }
}

/// A document registered for handover
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverDoc {
    /// Store rowid, None until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// One of [`CATEGORIES`], stored as text so ad-hoc categories survive
    pub category: String,

    /// Path relative to the project directory
    pub file_path: String,

    /// Content hash recorded at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(default)]
    pub status: HandoverStatus,
}

impl HandoverDoc {
    pub fn new(category: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            file_path: file_path.into(),
            ..Self::default()
        }
    }
}
