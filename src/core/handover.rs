//! Handover file registration - copy into the project tree, hash, record
//!
//! Registered files live under a per-project directory, one sub-directory per
//! handover category, names derived from the product and project with spaces
//! replaced by underscores so paths stay shell-friendly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::store::{ProjectStore, StoreError};
use crate::entities::HandoverDoc;

#[derive(Debug, Error, Diagnostic)]
pub enum HandoverError {
    #[error("io error: {0}")]
    #[diagnostic(code(npi::handover::io))]
    Io(#[from] io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Directory for one project's files: `<base>/Projects/<Product>_<Project>`
/// with spaces replaced by underscores
pub fn project_dir(base: &Path, product_name: &str, project_name: &str) -> PathBuf {
    let leaf = format!("{}_{}", product_name, project_name).replace(' ', "_");
    base.join("Projects").join(leaf)
}

/// Copy `source` into the project's category directory, hash it, and upsert
/// the document row. Re-registering the same file refreshes the stored hash
/// instead of creating a duplicate row. Returns the document with its id and
/// path filled in.
pub fn register_handover_file(
    store: &ProjectStore,
    project_id: i64,
    category: &str,
    source: &Path,
    project_dir: &Path,
) -> Result<HandoverDoc, HandoverError> {
    let category_dir = project_dir.join(category.replace(' ', "_"));
    fs::create_dir_all(&category_dir)?;

    let file_name = source
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;
    let dest = category_dir.join(file_name);
    fs::copy(source, &dest)?;

    let sha256 = hash_file(&dest)?;
    let relative = dest
        .strip_prefix(project_dir)
        .unwrap_or(&dest)
        .to_string_lossy()
        .replace('\\', "/");

    let mut doc = HandoverDoc::new(category, relative);
    doc.sha256 = Some(sha256);
    let id = store.upsert_handover_doc(project_id, &doc)?;
    doc.id = Some(id);

    tracing::debug!(project_id, category, path = %doc.file_path, "registered handover file");
    Ok(doc)
}

/// SHA-256 of a file's contents as lowercase hex
pub fn hash_file(path: &Path) -> Result<String, io::Error> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{HandoverStatus, ProjectDetails};
    use tempfile::tempdir;

    fn store_with_project() -> (ProjectStore, i64) {
        let store = ProjectStore::open_in_memory().unwrap();
        let details = ProjectDetails {
            project_name: "Alpha".to_string(),
            ..Default::default()
        };
        let id = store.upsert_project("HVAC", &details).unwrap();
        (store, id)
    }

    #[test]
    fn test_project_dir_flattens_spaces() {
        let dir = project_dir(Path::new("/data"), "HVAC Unit", "Glovebox Mk2");
        assert_eq!(dir, Path::new("/data/Projects/HVAC_Unit_Glovebox_Mk2"));
    }

    #[test]
    fn test_register_copies_hashes_and_records() {
        let (store, project_id) = store_with_project();
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("pfmea_v3.xlsx");
        fs::write(&source, b"pfmea contents").unwrap();
        let proj_dir = tmp.path().join("Projects").join("HVAC_Alpha");

        let doc =
            register_handover_file(&store, project_id, "Process Flow Chart", &source, &proj_dir)
                .unwrap();

        assert!(doc.id.is_some());
        assert_eq!(doc.file_path, "Process_Flow_Chart/pfmea_v3.xlsx");
        assert_eq!(doc.status, HandoverStatus::Open);
        assert!(proj_dir.join("Process_Flow_Chart/pfmea_v3.xlsx").exists());

        let expected = hash_file(&source).unwrap();
        assert_eq!(doc.sha256.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_reregistering_updates_in_place() {
        let (store, project_id) = store_with_project();
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("sop.pdf");
        fs::write(&source, b"rev A").unwrap();
        let proj_dir = tmp.path().join("Projects").join("HVAC_Alpha");

        let first =
            register_handover_file(&store, project_id, "SOP", &source, &proj_dir).unwrap();

        fs::write(&source, b"rev B").unwrap();
        let second =
            register_handover_file(&store, project_id, "SOP", &source, &proj_dir).unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.sha256, second.sha256);
        assert_eq!(store.list_handover_docs(project_id, None).unwrap().len(), 1);
    }
}
