//! PDF renderer built on printpdf's builtin Helvetica fonts
//!
//! Layout is a single column of text lines on A4 pages with a simple
//! y-cursor; a new page starts whenever a line would cross the bottom
//! margin.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::entities::{MatrixKind, ProjectRecord};
use crate::report::{detail_rows, generated_line, grouped_handover, mes_rows, title, ReportError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_TOP: f32 = 277.0;
const MARGIN_BOTTOM: f32 = 20.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.5;

/// Indent for the value column of label/value rows, in mm
const VALUE_X: f32 = 75.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(doc_title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(doc_title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN_TOP,
        })
    }

    fn ensure_room(&mut self, lines: f32) {
        if self.y - lines * LINE_HEIGHT < MARGIN_BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = MARGIN_TOP;
        }
    }

    fn advance(&mut self, lines: f32) {
        self.y -= lines * LINE_HEIGHT;
    }

    fn title(&mut self, text: &str) {
        self.layer
            .use_text(text, TITLE_SIZE, Mm(MARGIN_LEFT), Mm(self.y), &self.bold);
        self.advance(2.0);
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading with at least two body lines
        self.ensure_room(4.0);
        self.advance(1.0);
        self.layer
            .use_text(text, HEADING_SIZE, Mm(MARGIN_LEFT), Mm(self.y), &self.bold);
        self.advance(1.5);
    }

    fn line(&mut self, text: &str) {
        self.ensure_room(1.0);
        self.layer
            .use_text(text, BODY_SIZE, Mm(MARGIN_LEFT), Mm(self.y), &self.regular);
        self.advance(1.0);
    }

    fn labelled(&mut self, label: &str, value: &str) {
        self.ensure_room(1.0);
        self.layer
            .use_text(label, BODY_SIZE, Mm(MARGIN_LEFT), Mm(self.y), &self.bold);
        self.layer
            .use_text(value, BODY_SIZE, Mm(VALUE_X), Mm(self.y), &self.regular);
        self.advance(1.0);
    }

    fn save(self, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| ReportError::Render(e.to_string()))
    }
}

pub(super) fn render(record: &ProjectRecord, path: &Path) -> Result<(), ReportError> {
    let mut pdf = PdfWriter::new(&title(record))?;

    pdf.title(&title(record));
    pdf.line(&generated_line());

    pdf.heading("Project Details");
    for (label, value) in detail_rows(record) {
        pdf.labelled(label, &value);
    }

    pdf.heading("MES Workflow Details");
    match &record.mes {
        Some(mes) => {
            for (label, value) in mes_rows(mes) {
                pdf.labelled(label, &value);
            }
        }
        None => pdf.line("No MES entry recorded."),
    }

    for kind in MatrixKind::ALL {
        pdf.heading(kind.title());
        let rows = record.matrix(kind);
        if rows.is_empty() {
            pdf.line("No entries.");
            continue;
        }
        let (name_label, value_label) = kind.headers();
        pdf.labelled(name_label, value_label);
        for row in rows {
            pdf.labelled(&row.name, &row.value);
        }
    }

    pdf.heading("Handover Checklist");
    if record.checklist.is_empty() {
        pdf.line("Checklist not initialized.");
    } else {
        let done = record.checklist.iter().filter(|i| i.completed).count();
        pdf.line(&format!(
            "{} of {} items complete",
            done,
            record.checklist.len()
        ));
        for item in &record.checklist {
            let mark = if item.completed { "[x]" } else { "[ ]" };
            let person = if item.person.is_empty() {
                String::new()
            } else {
                format!(" ({})", item.person)
            };
            pdf.line(&format!("{} {}. {}{}", mark, item.seq, item.item_name, person));
        }
    }

    pdf.heading("Handover Documents");
    if record.handover_docs.is_empty() {
        pdf.line("No documents registered.");
    } else {
        for (category, docs) in grouped_handover(&record.handover_docs) {
            pdf.ensure_room(1.0 + docs.len() as f32);
            pdf.labelled(&category, "");
            for doc in docs {
                pdf.line(&format!("    {} [{}]", doc.file_path, doc.status));
            }
        }
    }

    pdf.save(path)
}
