//! Handover bundle - a zip of the whole project directory plus a fresh
//! PDF report

use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::entities::ProjectRecord;
use crate::report::{generate, ReportError, ReportFormat};

/// File name of the report written into the project directory
pub const REPORT_FILE: &str = "Project_Report.pdf";

/// Generate a PDF report into `project_dir`, then zip the directory tree to
/// `zip_path`. Entries are named under the directory's own name so the
/// archive unpacks into a single folder.
pub fn bundle_handover(
    record: &ProjectRecord,
    project_dir: &Path,
    zip_path: &Path,
) -> Result<(), ReportError> {
    std::fs::create_dir_all(project_dir)?;
    generate(record, ReportFormat::Pdf, &project_dir.join(REPORT_FILE))?;

    // Entry names are relative to the parent so "<dir_name>/" prefixes them
    let root = project_dir.parent().unwrap_or(project_dir);

    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(project_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ReportError::Render(e.to_string()))?;
        let path = entry.path();
        let name = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| ReportError::Render(e.to_string()))?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|e| ReportError::Render(e.to_string()))?;
            let mut source = File::open(path)?;
            io::copy(&mut source, &mut writer)?;
        }
    }
    writer
        .finish()
        .map_err(|e| ReportError::Render(e.to_string()))?;

    tracing::info!(project = %record.details.project_name, ?zip_path, "handover bundle written");
    Ok(())
}
