//! Record resolution - database first, workbook fallback, backfill
//!
//! Every read of a project record goes through [`Resolver::resolve`] so the
//! rest of the crate never has to know which source a record came from. The
//! database wins when it has the project; otherwise the workbook row is
//! promoted into the database so the next resolve is served locally.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::store::{ProjectStore, StoreError};
use crate::core::workbook::{Workbook, WorkbookError};
use crate::entities::{ChecklistTemplate, ChecklistTemplateError, ProjectRecord};

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("no project found for '{0}'")]
    #[diagnostic(
        code(npi::resolve::not_found),
        help("the identifier may be a project name, FG part number, or PCBA part number")
    )]
    NotFound(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("checklist template error: {0}")]
    #[diagnostic(code(npi::resolve::template))]
    Template(#[from] ChecklistTemplateError),
}

/// Whether workbook hits are written back into the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackfillPolicy {
    /// Promote workbook rows into the database on first resolve
    #[default]
    Always,
    /// Serve workbook rows without touching the database
    Never,
}

/// Database-first record resolver with an optional workbook fallback
pub struct Resolver {
    store: ProjectStore,
    workbook: Option<Workbook>,
    template: ChecklistTemplate,
    policy: BackfillPolicy,
}

impl Resolver {
    /// Build a resolver around an open store. Loading the built-in checklist
    /// template can fail if the embedded asset is corrupt.
    pub fn new(
        store: ProjectStore,
        workbook: Option<Workbook>,
        policy: BackfillPolicy,
    ) -> Result<Self, ResolveError> {
        Ok(Self {
            store,
            workbook,
            template: ChecklistTemplate::builtin()?,
            policy,
        })
    }

    /// Swap the checklist template used when seeding backfilled projects
    pub fn with_template(mut self, template: ChecklistTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    /// Resolve an identifier to a full project record.
    ///
    /// The database is consulted first. On a miss, the workbook (when
    /// configured) is searched; a hit there is backfilled into the database
    /// under [`BackfillPolicy::Always`], including a freshly seeded
    /// checklist, and re-read so the caller gets the stored form. Backfill
    /// failures are logged and the workbook record is returned as-is rather
    /// than failing the lookup.
    pub fn resolve(&self, identifier: &str) -> Result<ProjectRecord, ResolveError> {
        if let Some(record) = self.store.load_record(identifier)? {
            tracing::debug!(identifier, "resolved from database");
            return Ok(record);
        }

        let Some(workbook) = &self.workbook else {
            return Err(ResolveError::NotFound(identifier.to_string()));
        };
        let Some(record) = workbook.lookup(identifier) else {
            return Err(ResolveError::NotFound(identifier.to_string()));
        };
        tracing::debug!(identifier, "resolved from workbook");

        if self.policy == BackfillPolicy::Never {
            return Ok(record);
        }

        match self.backfill(&record) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                tracing::warn!(identifier, error = %err, "backfill failed, serving workbook record");
                Ok(record)
            }
        }
    }

    /// Write a workbook record into the database, seed its checklist, and
    /// re-read so identifiers and checklist ids are populated.
    ///
    /// Insert-or-ignore on the project name: if the database already holds a
    /// project under this name, the stored row is authoritative and is
    /// returned untouched. A read must never overwrite stored state with
    /// stale workbook data.
    fn backfill(&self, record: &ProjectRecord) -> Result<ProjectRecord, ResolveError> {
        if let Some(existing) = self.store.load_record(&record.details.project_name)? {
            tracing::debug!(
                project = %record.details.project_name,
                "already stored under this name, keeping database row"
            );
            return Ok(existing);
        }

        let project_id = self.store.store_record(record)?;
        let seeded = self.store.init_checklist(project_id, &self.template)?;
        tracing::debug!(
            project_id,
            seeded,
            project = %record.details.project_name,
            "backfilled project from workbook"
        );
        self.store
            .load_record(&record.details.project_name)?
            .ok_or_else(|| ResolveError::NotFound(record.details.project_name.clone()))
    }

    /// Known products - database list, falling back to the workbook sheet
    /// list when the database has none
    pub fn products(&self) -> Result<Vec<String>, ResolveError> {
        let products = self.store.list_products()?;
        if !products.is_empty() {
            return Ok(products);
        }
        Ok(self
            .workbook
            .as_ref()
            .map(|wb| wb.products().to_vec())
            .unwrap_or_default())
    }

    /// Project names under a product, merged from both sources
    pub fn projects_for_product(&self, product: &str) -> Result<Vec<String>, ResolveError> {
        let mut projects = self.store.list_projects_for_product(product)?;
        if let Some(workbook) = &self.workbook {
            for name in workbook.projects_for_product(product) {
                if !projects.contains(&name) {
                    projects.push(name);
                }
            }
        }
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MatrixKind, MatrixRow, MesEntry, ProjectDetails};
    use std::path::Path;
    use tempfile::tempdir;

    /// Minimal one-sheet workbook with name/FG columns
    fn write_workbook(path: &Path, rows: &[(&str, &str)]) {
        let mut wb = rust_xlsxwriter::Workbook::new();
        let sheet = wb.add_worksheet();
        sheet.set_name("HVAC").unwrap();
        sheet.write_string(0, 0, "Project Name").unwrap();
        sheet.write_string(0, 1, "FG Part Number").unwrap();
        for (i, (name, fg)) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, *name).unwrap();
            sheet.write_string(row, 1, *fg).unwrap();
        }
        wb.save(path).unwrap();
    }

    fn workbook_record(name: &str, fg: &str) -> ProjectRecord {
        let details = ProjectDetails {
            project_name: name.to_string(),
            fg_part_number: fg.to_string(),
            pcba_part_number: "PCBA-1".to_string(),
            bom_file: "BOM-1".to_string(),
            ..Default::default()
        };
        let mut record = ProjectRecord::new("HVAC", details);
        record.mes = Some(MesEntry {
            lot_id: "LOT-9".to_string(),
            ..Default::default()
        });
        record.set_matrix(
            MatrixKind::Build,
            vec![MatrixRow::new("Enclosure", "In-house")],
        );
        record
    }

    /// Build a resolver whose store already holds a record, no workbook
    fn seeded_resolver() -> Resolver {
        let store = ProjectStore::open_in_memory().unwrap();
        store.store_record(&workbook_record("Alpha", "FG-1")).unwrap();
        Resolver::new(store, None, BackfillPolicy::Always).unwrap()
    }

    #[test]
    fn test_resolves_from_store_first() {
        let resolver = seeded_resolver();
        let record = resolver.resolve("FG-1").unwrap();
        assert_eq!(record.details.project_name, "Alpha");
        assert!(record.project_id.is_some());
    }

    #[test]
    fn test_unknown_identifier_is_not_found() {
        let resolver = seeded_resolver();
        let err = resolver.resolve("FG-404").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[test]
    fn test_backfill_seeds_checklist() {
        // Simulate the workbook path by backfilling directly
        let store = ProjectStore::open_in_memory().unwrap();
        let resolver = Resolver::new(store, None, BackfillPolicy::Always).unwrap();
        let record = workbook_record("Beta", "FG-2");

        let stored = resolver.backfill(&record).unwrap();
        assert!(stored.project_id.is_some());
        let template_len = ChecklistTemplate::builtin().unwrap().items.len();
        assert_eq!(stored.checklist.len(), template_len);
        assert_eq!(stored.build_matrix, record.build_matrix);

        // Second backfill is idempotent and does not duplicate the checklist
        let again = resolver.backfill(&record).unwrap();
        assert_eq!(again.checklist.len(), stored.checklist.len());
        assert_eq!(again.project_id, stored.project_id);
    }

    #[test]
    fn test_stale_workbook_row_never_overwrites_stored_project() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("npi.xlsx");
        write_workbook(&path, &[("Alpha", "FG-OLD")]);

        let store = ProjectStore::open_in_memory().unwrap();
        store.store_record(&workbook_record("Alpha", "FG-NEW")).unwrap();
        let workbook = Workbook::open(&path).unwrap();
        let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Always).unwrap();

        // The stale identifier misses the database but hits the workbook;
        // the read must not overwrite the stored row
        let record = resolver.resolve("FG-OLD").unwrap();
        assert_eq!(record.details.fg_part_number, "FG-NEW");

        let stored = resolver.store().get_project("Alpha").unwrap().unwrap();
        assert_eq!(stored.details.fg_part_number, "FG-NEW");
        assert!(resolver.store().get_project("FG-NEW").unwrap().is_some());
        assert!(resolver.store().get_project("FG-OLD").unwrap().is_none());
    }

    #[test]
    fn test_backfill_failure_serves_workbook_record() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("npi.xlsx");
        write_workbook(&path, &[("Beta", "FG-2")]);

        let store = ProjectStore::open_in_memory().unwrap();
        store.execute_raw("DROP TABLE checklist_items").unwrap();
        let workbook = Workbook::open(&path).unwrap();
        let resolver = Resolver::new(store, Some(workbook), BackfillPolicy::Always).unwrap();

        // Backfill cannot seed the checklist, but the lookup still succeeds
        // with the workbook record as-is
        let record = resolver.resolve("FG-2").unwrap();
        assert_eq!(record.details.project_name, "Beta");
        assert!(record.project_id.is_none());
        assert!(record.checklist.is_empty());
    }

    #[test]
    fn test_product_listing_prefers_store() {
        let resolver = seeded_resolver();
        assert_eq!(resolver.products().unwrap(), ["HVAC"]);
        assert_eq!(resolver.projects_for_product("HVAC").unwrap(), ["Alpha"]);
    }
}
