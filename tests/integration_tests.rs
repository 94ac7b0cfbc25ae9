//! End-to-end flow: workbook-only project resolved, backfilled, updated,
//! handed over, reported, and bundled

use std::fs;
use std::path::Path;

use npi::core::{
    project_dir, register_handover_file, BackfillPolicy, ProjectStore, ResolveError, Resolver,
    Workbook,
};
use npi::entities::{HandoverStatus, MatrixKind, MatrixRow};
use npi::report::{bundle_handover, generate, ReportFormat};
use tempfile::tempdir;

const HEADERS: [&str; 13] = [
    "Project Name",
    "FG Part Number",
    "PCBA Part Number",
    "Start Date",
    "End Date",
    "BOM File",
    "NPI Engineer",
    "LOT ID",
    "Work Order Quantity",
    "Component 1",
    "Make 1",
    "Machine Name 1",
    "Program Name 1",
];

/// Write a workbook holding one HVAC project in the fixed layout
fn write_workbook(path: &Path) {
    let mut wb = rust_xlsxwriter::Workbook::new();

    let products = wb.add_worksheet();
    products.set_name("Products").unwrap();
    products.write_string(0, 0, "Product Name").unwrap();
    products.write_string(1, 0, "HVAC").unwrap();

    let sheet = wb.add_worksheet();
    sheet.set_name("HVAC").unwrap();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    let values = [
        "Glovebox Mk2",
        "FG-1001",
        "PCBA-204",
        "2026-01-12",
        "2026-06-30",
        "BOM-77",
        "R. Iyer",
        "LOT-42",
    ];
    for (col, value) in values.iter().enumerate() {
        sheet.write_string(1, col as u16, *value).unwrap();
    }
    sheet.write_number(1, 8, 250.0).unwrap();
    sheet.write_string(1, 9, "Enclosure").unwrap();
    sheet.write_string(1, 10, "In-house").unwrap();
    sheet.write_string(1, 11, "AOI-3").unwrap();
    sheet.write_string(1, 12, "prog_77").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn test_workbook_record_is_backfilled_then_served_from_store() {
    let tmp = tempdir().unwrap();
    let workbook_path = tmp.path().join("npi.xlsx");
    write_workbook(&workbook_path);

    let store = ProjectStore::open(&tmp.path().join("npi.db")).unwrap();
    let workbook = Workbook::open(&workbook_path).unwrap();
    let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Always).unwrap();

    // Unknown to the database, found in the workbook, promoted on the spot
    let record = resolver.resolve("FG-1001").unwrap();
    assert_eq!(record.details.project_name, "Glovebox Mk2");
    assert_eq!(record.details.bom_file, "BOM-77");
    assert!(record.project_id.is_some(), "backfill assigns an id");
    assert_eq!(record.checklist.len(), 42, "backfill seeds the checklist");
    assert_eq!(record.mes.as_ref().unwrap().work_order_qty, Some(250));
    assert_eq!(
        record.build_matrix,
        vec![MatrixRow::new("Enclosure", "In-house")]
    );

    // Second resolve comes straight from the store and is identical
    let again = resolver.resolve("Glovebox Mk2").unwrap();
    assert_eq!(again.project_id, record.project_id);
    assert_eq!(again.details, record.details);
    assert_eq!(again.checklist.len(), record.checklist.len());

    assert!(matches!(
        resolver.resolve("FG-9999"),
        Err(ResolveError::NotFound(_))
    ));
}

#[test]
fn test_never_policy_leaves_store_untouched() {
    let tmp = tempdir().unwrap();
    let workbook_path = tmp.path().join("npi.xlsx");
    write_workbook(&workbook_path);

    let store = ProjectStore::open(&tmp.path().join("npi.db")).unwrap();
    let workbook = Workbook::open(&workbook_path).unwrap();
    let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Never).unwrap();

    let record = resolver.resolve("FG-1001").unwrap();
    assert!(record.project_id.is_none());
    assert!(record.checklist.is_empty());
    assert!(resolver.store().get_project("FG-1001").unwrap().is_none());
}

#[test]
fn test_full_handover_flow() {
    let tmp = tempdir().unwrap();
    let workbook_path = tmp.path().join("npi.xlsx");
    write_workbook(&workbook_path);

    let store = ProjectStore::open(&tmp.path().join("npi.db")).unwrap();
    let workbook = Workbook::open(&workbook_path).unwrap();
    let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Always).unwrap();

    let record = resolver.resolve("Glovebox Mk2").unwrap();
    let project_id = record.project_id.unwrap();

    // Tick a checklist item
    let first = &record.checklist[0];
    resolver
        .store()
        .update_checklist_item(first.id.unwrap(), true, &first.person, "BOM-77.xlsx")
        .unwrap();

    // Add a matrix row on top of the backfilled one
    resolver
        .store()
        .add_matrix_row(
            project_id,
            MatrixKind::Machine,
            &MatrixRow::new("SPI-1", "paste_check"),
        )
        .unwrap();

    // Register a handover file
    let source = tmp.path().join("pfmea_v3.xlsx");
    fs::write(&source, b"pfmea").unwrap();
    let dir = project_dir(tmp.path(), "HVAC", "Glovebox Mk2");
    let doc = register_handover_file(resolver.store(), project_id, "PFMEA", &source, &dir).unwrap();
    assert!(doc.sha256.is_some());
    resolver
        .store()
        .set_handover_status(doc.id.unwrap(), HandoverStatus::Closed)
        .unwrap();

    // Everything round-trips through a fresh resolve
    let record = resolver.resolve("Glovebox Mk2").unwrap();
    assert!(record.checklist[0].completed);
    assert_eq!(record.machine_programs.len(), 2);
    assert_eq!(record.handover_docs.len(), 1);
    assert_eq!(record.handover_docs[0].status, HandoverStatus::Closed);

    // Reports in both formats
    generate(&record, ReportFormat::Pdf, &tmp.path().join("report.pdf")).unwrap();
    generate(&record, ReportFormat::Word, &tmp.path().join("report.docx")).unwrap();

    // Zip bundle holds the report and the registered file
    let zip_path = tmp.path().join("handover.zip");
    bundle_handover(&record, &dir, &zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names
        .iter()
        .any(|n| n.ends_with("Project_Report.pdf")));
    assert!(names.iter().any(|n| n.ends_with("PFMEA/pfmea_v3.xlsx")));
}

#[test]
fn test_products_listed_from_workbook_before_backfill() {
    let tmp = tempdir().unwrap();
    let workbook_path = tmp.path().join("npi.xlsx");
    write_workbook(&workbook_path);

    let store = ProjectStore::open_in_memory().unwrap();
    let workbook = Workbook::open(&workbook_path).unwrap();
    let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Always).unwrap();

    assert_eq!(resolver.products().unwrap(), ["HVAC"]);
    assert_eq!(
        resolver.projects_for_product("HVAC").unwrap(),
        ["Glovebox Mk2"]
    );
}
