//! Spreadsheet fallback reader for the fixed-layout NPI workbook
//!
//! Layout: a `Products` sheet with a `Product Name` column, and one sheet
//! per product whose header row carries the project detail columns, the MES
//! columns, and numbered matrix columns (`Component 1` .. `Component 9` and
//! so on). The workbook is read once at open and never mutated; a missing
//! file or a broken layout is a configuration error surfaced there, not per
//! lookup.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use miette::Diagnostic;
use thiserror::Error;

use crate::entities::{MatrixKind, MatrixRow, MesEntry, ProjectDetails, ProjectRecord};

/// Sheet listing the known products
pub const PRODUCTS_SHEET: &str = "Products";

/// Numbered matrix columns per kind in the fixed layout
const MATRIX_COLUMNS: usize = 9;

const COL_PRODUCT_NAME: &str = "Product Name";
const COL_PROJECT_NAME: &str = "Project Name";
const COL_FG: &str = "FG Part Number";
const COL_PCBA: &str = "PCBA Part Number";
const COL_START: &str = "Start Date";
const COL_END: &str = "End Date";
const COL_BOM: &str = "BOM File";
const COL_ENGINEER: &str = "NPI Engineer";

const COL_LOT_ID: &str = "LOT ID";
const COL_WF_SMT: &str = "Workflow SMT - Name";
const COL_WF_TLA: &str = "Workflow TLA - Name";
const COL_SMT_WO: &str = "SMT - Work Order";
const COL_TLA_WO: &str = "TLA - Work Order";
const COL_WO_QTY: &str = "Work Order Quantity";
const COL_PO_NUMBER: &str = "PO NUMBER";
const COL_PO_QTY: &str = "PO Quantity";

#[derive(Debug, Error, Diagnostic)]
pub enum WorkbookError {
    #[error("workbook not found at {0:?}")]
    #[diagnostic(code(npi::workbook::missing))]
    Missing(PathBuf),

    #[error("failed to read workbook: {0}")]
    #[diagnostic(code(npi::workbook::read))]
    Read(String),

    #[error("sheet '{sheet}' is missing required column '{column}'")]
    #[diagnostic(
        code(npi::workbook::layout),
        help("product sheets must carry a header row in the fixed NPI layout")
    )]
    Layout { sheet: String, column: String },
}

/// One product sheet, with every cell coerced to text at the boundary
#[derive(Debug)]
struct ProductSheet {
    product: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ProductSheet {
    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell under a named column, empty when the column or cell is absent
    fn field(&self, row: &[String], column: &str) -> String {
        self.column_index(column)
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or_default()
    }

    fn int_field(&self, row: &[String], column: &str) -> Option<i64> {
        self.field(row, column).trim().parse().ok()
    }
}

/// The read-only workbook fallback
#[derive(Debug)]
pub struct Workbook {
    path: PathBuf,
    products: Vec<String>,
    sheets: Vec<ProductSheet>,
}

impl Workbook {
    /// Open and validate the workbook, loading all product sheets
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        if !path.exists() {
            return Err(WorkbookError::Missing(path.to_path_buf()));
        }

        let mut xlsx = open_workbook::<Xlsx<_>, _>(path)
            .map_err(|e: calamine::XlsxError| WorkbookError::Read(e.to_string()))?;
        let sheet_names = xlsx.sheet_names().to_owned();

        let mut sheets = Vec::new();
        for name in &sheet_names {
            if name == PRODUCTS_SHEET {
                continue;
            }
            let range = xlsx
                .worksheet_range(name)
                .map_err(|e| WorkbookError::Read(e.to_string()))?;
            let mut rows = range.rows();
            let Some(header) = rows.next() else {
                continue;
            };
            let columns: Vec<String> = header.iter().map(cell_text).collect();
            if !columns.iter().any(|c| c == COL_PROJECT_NAME) {
                return Err(WorkbookError::Layout {
                    sheet: name.clone(),
                    column: COL_PROJECT_NAME.to_string(),
                });
            }
            let rows = rows
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            sheets.push(ProductSheet {
                product: name.clone(),
                columns,
                rows,
            });
        }

        let mut products = Vec::new();
        if sheet_names.iter().any(|n| n == PRODUCTS_SHEET) {
            let range = xlsx
                .worksheet_range(PRODUCTS_SHEET)
                .map_err(|e| WorkbookError::Read(e.to_string()))?;
            let mut rows = range.rows();
            if let Some(header) = rows.next() {
                let idx = header
                    .iter()
                    .position(|c| cell_text(c) == COL_PRODUCT_NAME);
                if let Some(idx) = idx {
                    products = rows
                        .filter_map(|row| row.get(idx).map(cell_text))
                        .filter(|p| !p.is_empty())
                        .collect();
                }
            }
        }
        if products.is_empty() {
            // Legacy workbooks without a products sheet: sheet names stand in
            products = sheets.iter().map(|s| s.product.clone()).collect();
        }

        Ok(Self {
            path: path.to_path_buf(),
            products,
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Project names on a product sheet
    pub fn projects_for_product(&self, product: &str) -> Vec<String> {
        let Some(sheet) = self.sheets.iter().find(|s| s.product == product) else {
            return Vec::new();
        };
        sheet
            .rows
            .iter()
            .map(|row| sheet.field(row, COL_PROJECT_NAME))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Find a project row by identifier (project name, FG or PCBA part
    /// number) across all product sheets and assemble a record from it.
    /// Checklist and handover collections default to empty - the workbook
    /// does not encode them.
    pub fn lookup(&self, identifier: &str) -> Option<ProjectRecord> {
        if identifier.is_empty() {
            return None;
        }
        for sheet in &self.sheets {
            for row in &sheet.rows {
                let details = ProjectDetails {
                    project_name: sheet.field(row, COL_PROJECT_NAME),
                    fg_part_number: sheet.field(row, COL_FG),
                    pcba_part_number: sheet.field(row, COL_PCBA),
                    start_date: sheet.field(row, COL_START),
                    end_date: sheet.field(row, COL_END),
                    bom_file: sheet.field(row, COL_BOM),
                    npi_engineer: sheet.field(row, COL_ENGINEER),
                };
                if !details.matches(identifier) {
                    continue;
                }

                let mut record = ProjectRecord::new(sheet.product.clone(), details);
                record.mes = assemble_mes(sheet, row);
                for kind in MatrixKind::ALL {
                    record.set_matrix(kind, assemble_matrix(sheet, row, kind));
                }
                return Some(record);
            }
        }
        None
    }
}

fn assemble_mes(sheet: &ProductSheet, row: &[String]) -> Option<MesEntry> {
    let entry = MesEntry {
        lot_id: sheet.field(row, COL_LOT_ID),
        workflow_smt: sheet.field(row, COL_WF_SMT),
        workflow_tla: sheet.field(row, COL_WF_TLA),
        smt_work_order: sheet.field(row, COL_SMT_WO),
        tla_work_order: sheet.field(row, COL_TLA_WO),
        work_order_qty: sheet.int_field(row, COL_WO_QTY),
        po_number: sheet.field(row, COL_PO_NUMBER),
        po_qty: sheet.int_field(row, COL_PO_QTY),
    };
    if entry.is_empty() {
        None
    } else {
        Some(entry)
    }
}

fn assemble_matrix(sheet: &ProductSheet, row: &[String], kind: MatrixKind) -> Vec<MatrixRow> {
    let (name_label, value_label) = kind.headers();
    (1..=MATRIX_COLUMNS)
        .map(|n| {
            MatrixRow::new(
                sheet.field(row, &format!("{} {}", name_label, n)),
                sheet.field(row, &format!("{} {}", value_label, n)),
            )
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Coerce a cell to trimmed text; numeric part numbers lose a trailing `.0`
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;
    use tempfile::tempdir;

    /// Write a minimal fixture in the fixed layout
    fn write_fixture(path: &Path) {
        let mut wb = XlsxWorkbook::new();

        let products = wb.add_worksheet();
        products.set_name(PRODUCTS_SHEET).unwrap();
        products.write_string(0, 0, COL_PRODUCT_NAME).unwrap();
        products.write_string(1, 0, "HVAC").unwrap();

        let sheet = wb.add_worksheet();
        sheet.set_name("HVAC").unwrap();
        let headers = [
            COL_PROJECT_NAME,
            COL_FG,
            COL_PCBA,
            COL_BOM,
            COL_ENGINEER,
            COL_LOT_ID,
            COL_WO_QTY,
            "Component 1",
            "Make 1",
            "Component 2",
            "Make 2",
            "Machine Name 1",
            "Program Name 1",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let values = [
            "Glovebox Mk2",
            "FG-1001",
            "PCBA-204",
            "BOM-77",
            "R. Iyer",
            "LOT-42",
        ];
        for (col, value) in values.iter().enumerate() {
            sheet.write_string(1, col as u16, *value).unwrap();
        }
        sheet.write_number(1, 6, 250.0).unwrap();
        sheet.write_string(1, 7, "Enclosure").unwrap();
        sheet.write_string(1, 8, "In-house").unwrap();
        // Component 2 / Make 2 left blank on purpose
        sheet.write_string(1, 11, "AOI-3").unwrap();
        sheet.write_string(1, 12, "prog_77").unwrap();

        wb.save(path).unwrap();
    }

    #[test]
    fn test_open_missing_file_fails_once() {
        let err = Workbook::open(Path::new("/no/such/workbook.xlsx")).unwrap_err();
        assert!(matches!(err, WorkbookError::Missing(_)));
    }

    #[test]
    fn test_lookup_by_name_and_part_number() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("npi.xlsx");
        write_fixture(&path);

        let wb = Workbook::open(&path).unwrap();
        let record = wb.lookup("FG-1001").unwrap();
        assert_eq!(record.product_name, "HVAC");
        assert_eq!(record.details.project_name, "Glovebox Mk2");
        assert_eq!(record.details.bom_file, "BOM-77");

        let by_name = wb.lookup("Glovebox Mk2").unwrap();
        assert_eq!(by_name.details.fg_part_number, "FG-1001");

        assert!(wb.lookup("FG-9999").is_none());
        assert!(wb.lookup("").is_none());
    }

    #[test]
    fn test_lookup_assembles_mes_and_matrices() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("npi.xlsx");
        write_fixture(&path);

        let wb = Workbook::open(&path).unwrap();
        let record = wb.lookup("Glovebox Mk2").unwrap();

        let mes = record.mes.unwrap();
        assert_eq!(mes.lot_id, "LOT-42");
        // Numeric cell coerced without a trailing .0
        assert_eq!(mes.work_order_qty, Some(250));

        assert_eq!(record.build_matrix.len(), 1);
        assert_eq!(record.build_matrix[0], MatrixRow::new("Enclosure", "In-house"));
        assert_eq!(record.machine_programs.len(), 1);
        assert!(record.assembly_drawings.is_empty());
        assert!(record.checklist.is_empty());
        assert!(record.handover_docs.is_empty());
    }

    #[test]
    fn test_products_and_projects_listing() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("npi.xlsx");
        write_fixture(&path);

        let wb = Workbook::open(&path).unwrap();
        assert_eq!(wb.products(), ["HVAC"]);
        assert_eq!(wb.projects_for_product("HVAC"), ["Glovebox Mk2"]);
        assert!(wb.projects_for_product("Audio").is_empty());
    }

    #[test]
    fn test_sheet_without_project_name_column_is_a_layout_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.xlsx");

        let mut xlsx = XlsxWorkbook::new();
        let sheet = xlsx.add_worksheet();
        sheet.set_name("HVAC").unwrap();
        sheet.write_string(0, 0, "Wrong Header").unwrap();
        sheet.write_string(1, 0, "data").unwrap();
        xlsx.save(&path).unwrap();

        let err = Workbook::open(&path).unwrap_err();
        assert!(matches!(err, WorkbookError::Layout { .. }));
    }
}
