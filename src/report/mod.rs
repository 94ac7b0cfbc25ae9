//! Project report generation (PDF and Word)
//!
//! Both renderers consume the same shaped rows so the two formats stay in
//! agreement about section order and labels: project details, MES workflow,
//! the three matrices, checklist status, and handover documents grouped by
//! category.

pub mod bundle;
mod docx;
mod pdf;

use std::io;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::{HandoverDoc, MesEntry, ProjectRecord};

pub use bundle::bundle_handover;

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("cannot generate a report: {0} is empty")]
    #[diagnostic(code(npi::report::missing_field))]
    MissingField(&'static str),

    #[error("failed to render report: {0}")]
    #[diagnostic(code(npi::report::render))]
    Render(String),

    #[error("io error: {0}")]
    #[diagnostic(code(npi::report::io))]
    Io(#[from] io::Error),
}

/// Output format of a generated report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Word,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Pdf => write!(f, "pdf"),
            ReportFormat::Word => write!(f, "word"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "word" | "docx" => Ok(ReportFormat::Word),
            _ => Err(format!("Invalid report format: {}. Use pdf or word", s)),
        }
    }
}

/// Render a full project report to `path` in the requested format
pub fn generate(
    record: &ProjectRecord,
    format: ReportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    if record.details.project_name.is_empty() {
        return Err(ReportError::MissingField("project name"));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ReportFormat::Pdf => pdf::render(record, path),
        ReportFormat::Word => docx::render(record, path),
    }?;
    tracing::info!(project = %record.details.project_name, %format, ?path, "report generated");
    Ok(())
}

/// Report title line
fn title(record: &ProjectRecord) -> String {
    format!(
        "Project Report - {} / {}",
        record.product_name, record.details.project_name
    )
}

/// Timestamp line printed under the title
fn generated_line() -> String {
    format!(
        "Generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    )
}

/// Label/value pairs for the project details section
fn detail_rows(record: &ProjectRecord) -> Vec<(&'static str, String)> {
    let d = &record.details;
    vec![
        ("Product Name", record.product_name.clone()),
        ("Project Name", d.project_name.clone()),
        ("FG Part Number", d.fg_part_number.clone()),
        ("PCBA Part Number", d.pcba_part_number.clone()),
        ("Start Date", d.start_date.clone()),
        ("End Date", d.end_date.clone()),
        ("BOM File", d.bom_file.clone()),
        ("NPI Engineer", d.npi_engineer.clone()),
    ]
}

/// Label/value pairs for the MES section
fn mes_rows(mes: &MesEntry) -> Vec<(&'static str, String)> {
    vec![
        ("LOT ID", mes.lot_id.clone()),
        ("Workflow SMT - Name", mes.workflow_smt.clone()),
        ("Workflow TLA - Name", mes.workflow_tla.clone()),
        ("SMT - Work Order", mes.smt_work_order.clone()),
        ("TLA - Work Order", mes.tla_work_order.clone()),
        ("Work Order Quantity", qty(mes.work_order_qty)),
        ("PO NUMBER", mes.po_number.clone()),
        ("PO Quantity", qty(mes.po_qty)),
    ]
}

fn qty(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Handover docs grouped by category, preserving first-seen category order
fn grouped_handover(docs: &[HandoverDoc]) -> Vec<(String, Vec<&HandoverDoc>)> {
    let mut groups: Vec<(String, Vec<&HandoverDoc>)> = Vec::new();
    for doc in docs {
        match groups.iter_mut().find(|(cat, _)| *cat == doc.category) {
            Some((_, items)) => items.push(doc),
            None => groups.push((doc.category.clone(), vec![doc])),
        }
    }
    groups
}
