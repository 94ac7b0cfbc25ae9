//! Entity type definitions
//!
//! One `ProjectRecord` per NPI project, assembled from the project row and
//! its child collections: the MES entry, the three reference matrices, the
//! checklist, and the registered handover documents.

pub mod checklist;
pub mod handover;
pub mod matrix;
pub mod mes;
pub mod project;

pub use checklist::{ChecklistItem, ChecklistTemplate, ChecklistTemplateError};
pub use handover::{HandoverDoc, HandoverStatus};
pub use matrix::{MatrixKind, MatrixRow};
pub use mes::MesEntry;
pub use project::{ProjectDetails, ProjectRecord};
