//! Project record - the fully resolved view of one NPI project

use serde::{Deserialize, Serialize};

use crate::entities::checklist::ChecklistItem;
use crate::entities::handover::HandoverDoc;
use crate::entities::matrix::{MatrixKind, MatrixRow};
use crate::entities::mes::MesEntry;

/// Core project fields, one row per project.
///
/// Dates are free text, as entered in the source systems; no date parsing is
/// applied beyond trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    /// Unique project name, the store's natural key
    pub project_name: String,

    /// Finished-goods part number
    #[serde(default)]
    pub fg_part_number: String,

    /// PCB assembly part number
    #[serde(default)]
    pub pcba_part_number: String,

    #[serde(default)]
    pub start_date: String,

    #[serde(default)]
    pub end_date: String,

    /// Reference to the bill-of-materials file/sheet
    #[serde(default)]
    pub bom_file: String,

    /// Responsible NPI engineer
    #[serde(default)]
    pub npi_engineer: String,
}

impl ProjectDetails {
    /// True when `identifier` names this project: project name, FG part
    /// number, or PCBA part number (empty fields never match).
    pub fn matches(&self, identifier: &str) -> bool {
        let candidates = [
            &self.project_name,
            &self.fg_part_number,
            &self.pcba_part_number,
        ];
        candidates.iter().any(|c| !c.is_empty() && *c == identifier)
    }
}

/// A project with all child collections loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Store rowid, None for records not yet persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    /// Product this project belongs to
    #[serde(default)]
    pub product_name: String,

    pub details: ProjectDetails,

    /// MES workflow entry, at most one per project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mes: Option<MesEntry>,

    #[serde(default)]
    pub build_matrix: Vec<MatrixRow>,

    #[serde(default)]
    pub assembly_drawings: Vec<MatrixRow>,

    #[serde(default)]
    pub machine_programs: Vec<MatrixRow>,

    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,

    #[serde(default)]
    pub handover_docs: Vec<HandoverDoc>,
}

impl ProjectRecord {
    pub fn new(product_name: impl Into<String>, details: ProjectDetails) -> Self {
        Self {
            product_name: product_name.into(),
            details,
            ..Self::default()
        }
    }

    /// Matrix rows for the given kind
    pub fn matrix(&self, kind: MatrixKind) -> &[MatrixRow] {
        match kind {
            MatrixKind::Build => &self.build_matrix,
            MatrixKind::Assembly => &self.assembly_drawings,
            MatrixKind::Machine => &self.machine_programs,
        }
    }

    pub fn set_matrix(&mut self, kind: MatrixKind, rows: Vec<MatrixRow>) {
        match kind {
            MatrixKind::Build => self.build_matrix = rows,
            MatrixKind::Assembly => self.assembly_drawings = rows,
            MatrixKind::Machine => self.machine_programs = rows,
        }
    }
}
