//! Word renderer - same sections as the PDF, with real tables

use std::fs::File;
use std::path::Path;

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

use crate::entities::{MatrixKind, ProjectRecord};
use crate::report::{detail_rows, generated_line, grouped_handover, mes_rows, title, ReportError};

// Run sizes are in half-points
const TITLE_SIZE: usize = 32;
const HEADING_SIZE: usize = 26;
const BODY_SIZE: usize = 20;

fn para(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).size(BODY_SIZE))
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(HEADING_SIZE))
}

fn cell(text: &str, bold: bool) -> TableCell {
    let mut run = Run::new().add_text(text).size(BODY_SIZE);
    if bold {
        run = run.bold();
    }
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

/// Two-column table of label/value pairs, labels bold
fn pairs_table(rows: &[(&str, String)]) -> Table {
    Table::new(
        rows.iter()
            .map(|(label, value)| TableRow::new(vec![cell(label, true), cell(value, false)]))
            .collect(),
    )
}

pub(super) fn render(record: &ProjectRecord, path: &Path) -> Result<(), ReportError> {
    let mut doc = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(title(record)).bold().size(TITLE_SIZE)),
        )
        .add_paragraph(para(&generated_line()));

    doc = doc
        .add_paragraph(heading("Project Details"))
        .add_table(pairs_table(&detail_rows(record)));

    doc = doc.add_paragraph(heading("MES Workflow Details"));
    doc = match &record.mes {
        Some(mes) => doc.add_table(pairs_table(&mes_rows(mes))),
        None => doc.add_paragraph(para("No MES entry recorded.")),
    };

    for kind in MatrixKind::ALL {
        doc = doc.add_paragraph(heading(kind.title()));
        let rows = record.matrix(kind);
        if rows.is_empty() {
            doc = doc.add_paragraph(para("No entries."));
            continue;
        }
        let (name_label, value_label) = kind.headers();
        let mut table_rows = vec![TableRow::new(vec![
            cell(name_label, true),
            cell(value_label, true),
        ])];
        table_rows.extend(
            rows.iter()
                .map(|row| TableRow::new(vec![cell(&row.name, false), cell(&row.value, false)])),
        );
        doc = doc.add_table(Table::new(table_rows));
    }

    doc = doc.add_paragraph(heading("Handover Checklist"));
    if record.checklist.is_empty() {
        doc = doc.add_paragraph(para("Checklist not initialized."));
    } else {
        let done = record.checklist.iter().filter(|i| i.completed).count();
        doc = doc.add_paragraph(para(&format!(
            "{} of {} items complete",
            done,
            record.checklist.len()
        )));
        let mut table_rows = vec![TableRow::new(vec![
            cell("#", true),
            cell("Item", true),
            cell("Status", true),
            cell("Person", true),
            cell("Reference", true),
        ])];
        table_rows.extend(record.checklist.iter().map(|item| {
            let status = if item.completed { "Done" } else { "Open" };
            TableRow::new(vec![
                cell(&item.seq.to_string(), false),
                cell(&item.item_name, false),
                cell(status, false),
                cell(&item.person, false),
                cell(&item.reference, false),
            ])
        }));
        doc = doc.add_table(Table::new(table_rows));
    }

    doc = doc.add_paragraph(heading("Handover Documents"));
    if record.handover_docs.is_empty() {
        doc = doc.add_paragraph(para("No documents registered."));
    } else {
        for (category, docs) in grouped_handover(&record.handover_docs) {
            doc = doc.add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(category).bold().size(BODY_SIZE)),
            );
            let table_rows = docs
                .iter()
                .map(|d| {
                    TableRow::new(vec![
                        cell(&d.file_path, false),
                        cell(&d.status.to_string(), false),
                    ])
                })
                .collect();
            doc = doc.add_table(Table::new(table_rows));
        }
    }

    let file = File::create(path)?;
    doc.build()
        .pack(file)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(())
}
