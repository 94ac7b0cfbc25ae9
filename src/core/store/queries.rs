//! CRUD statements for projects and their child collections

use rusqlite::{params, OptionalExtension};

use super::{ProjectStore, StoreError, StoredProject};
use crate::entities::{
    ChecklistItem, ChecklistTemplate, HandoverDoc, HandoverStatus, MatrixKind, MatrixRow, MesEntry,
    ProjectDetails, ProjectRecord,
};

impl ProjectStore {
    // =========================================================================
    // Projects
    // =========================================================================

    /// Look up a project by identifier: project name, FG part number, or
    /// PCBA part number (empty columns never match)
    pub fn get_project(&self, identifier: &str) -> Result<Option<StoredProject>, StoreError> {
        // A nameless row is reachable via part-number-only backfill; an empty
        // identifier must not match it
        if identifier.is_empty() {
            return Ok(None);
        }
        let row = self
            .conn
            .query_row(
                r#"SELECT project_id, product_name, project_name, fg_part_number,
                          pcba_part_number, start_date, end_date, bom_file, npi_engineer
                   FROM projects
                   WHERE project_name = ?1
                      OR (fg_part_number != '' AND fg_part_number = ?1)
                      OR (pcba_part_number != '' AND pcba_part_number = ?1)"#,
                params![identifier],
                |row| {
                    Ok(StoredProject {
                        project_id: row.get(0)?,
                        product_name: row.get(1)?,
                        details: ProjectDetails {
                            project_name: row.get(2)?,
                            fg_part_number: row.get(3)?,
                            pcba_part_number: row.get(4)?,
                            start_date: row.get(5)?,
                            end_date: row.get(6)?,
                            bom_file: row.get(7)?,
                            npi_engineer: row.get(8)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Insert a project or update the existing row with the same name.
    /// Returns the project id.
    pub fn upsert_project(
        &self,
        product_name: &str,
        details: &ProjectDetails,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"INSERT INTO projects (product_name, project_name, fg_part_number,
                                     pcba_part_number, start_date, end_date, bom_file, npi_engineer)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(project_name) DO UPDATE SET
                   product_name = excluded.product_name,
                   fg_part_number = excluded.fg_part_number,
                   pcba_part_number = excluded.pcba_part_number,
                   start_date = excluded.start_date,
                   end_date = excluded.end_date,
                   bom_file = excluded.bom_file,
                   npi_engineer = excluded.npi_engineer"#,
            params![
                product_name,
                details.project_name,
                details.fg_part_number,
                details.pcba_part_number,
                details.start_date,
                details.end_date,
                details.bom_file,
                details.npi_engineer,
            ],
        )?;

        let project_id = self.conn.query_row(
            "SELECT project_id FROM projects WHERE project_name = ?1",
            params![details.project_name],
            |row| row.get(0),
        )?;
        Ok(project_id)
    }

    /// Distinct product names, sorted
    pub fn list_products(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT product_name FROM projects
             WHERE product_name != '' ORDER BY product_name",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Project names under a product, sorted
    pub fn list_projects_for_product(&self, product_name: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT project_name FROM projects WHERE product_name = ?1 ORDER BY project_name",
        )?;
        let rows = stmt.query_map(params![product_name], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // MES
    // =========================================================================

    /// Replace the project's MES entry
    pub fn save_mes(&self, project_id: i64, entry: &MesEntry) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM mes WHERE project_id = ?1",
            params![project_id],
        )?;
        self.conn.execute(
            r#"INSERT INTO mes (project_id, lot_id, workflow_smt, workflow_tla,
                                smt_work_order, tla_work_order, work_order_qty, po_number, po_qty)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                project_id,
                entry.lot_id,
                entry.workflow_smt,
                entry.workflow_tla,
                entry.smt_work_order,
                entry.tla_work_order,
                entry.work_order_qty,
                entry.po_number,
                entry.po_qty,
            ],
        )?;
        Ok(())
    }

    pub fn get_mes(&self, project_id: i64) -> Result<Option<MesEntry>, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"SELECT lot_id, workflow_smt, workflow_tla, smt_work_order,
                          tla_work_order, work_order_qty, po_number, po_qty
                   FROM mes WHERE project_id = ?1"#,
                params![project_id],
                |row| {
                    Ok(MesEntry {
                        lot_id: row.get(0)?,
                        workflow_smt: row.get(1)?,
                        workflow_tla: row.get(2)?,
                        smt_work_order: row.get(3)?,
                        tla_work_order: row.get(4)?,
                        work_order_qty: row.get(5)?,
                        po_number: row.get(6)?,
                        po_qty: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // =========================================================================
    // Matrices
    // =========================================================================

    /// Replace all rows of one matrix, renumbering seq from 1
    pub fn save_matrix(
        &self,
        project_id: i64,
        kind: MatrixKind,
        rows: &[MatrixRow],
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM matrix_rows WHERE project_id = ?1 AND kind = ?2",
            params![project_id, kind.as_str()],
        )?;
        for (i, row) in rows.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO matrix_rows (project_id, kind, name, value, seq)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![project_id, kind.as_str(), row.name, row.value, (i + 1) as i64],
            )?;
        }
        Ok(())
    }

    /// Append one row after the current highest seq
    pub fn add_matrix_row(
        &self,
        project_id: i64,
        kind: MatrixKind,
        row: &MatrixRow,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            r#"INSERT INTO matrix_rows (project_id, kind, name, value, seq)
               VALUES (?1, ?2, ?3, ?4,
                       (SELECT COALESCE(MAX(seq), 0) + 1 FROM matrix_rows
                        WHERE project_id = ?1 AND kind = ?2))"#,
            params![project_id, kind.as_str(), row.name, row.value],
        )?;
        Ok(())
    }

    pub fn matrix(&self, project_id: i64, kind: MatrixKind) -> Result<Vec<MatrixRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, value FROM matrix_rows
             WHERE project_id = ?1 AND kind = ?2 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![project_id, kind.as_str()], |row| {
            Ok(MatrixRow {
                name: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Checklist
    // =========================================================================

    /// Populate the checklist from the template if the project has none.
    /// Returns the number of items inserted (0 when already initialized).
    pub fn init_checklist(
        &self,
        project_id: i64,
        template: &ChecklistTemplate,
    ) -> Result<usize, StoreError> {
        let existing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM checklist_items WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(0);
        }

        let items = template.to_items();
        for item in &items {
            self.conn.execute(
                r#"INSERT INTO checklist_items (project_id, item_name, completed, person, reference, seq)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    project_id,
                    item.item_name,
                    item.completed as i64,
                    item.person,
                    item.reference,
                    item.seq,
                ],
            )?;
        }
        Ok(items.len())
    }

    pub fn checklist(&self, project_id: i64) -> Result<Vec<ChecklistItem>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_name, completed, person, reference, seq
             FROM checklist_items WHERE project_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(ChecklistItem {
                id: Some(row.get(0)?),
                item_name: row.get(1)?,
                completed: row.get::<_, i64>(2)? != 0,
                person: row.get(3)?,
                reference: row.get(4)?,
                seq: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_checklist_item(
        &self,
        item_id: i64,
        completed: bool,
        person: &str,
        reference: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE checklist_items SET completed = ?1, person = ?2, reference = ?3 WHERE id = ?4",
            params![completed as i64, person, reference, item_id],
        )?;
        Ok(())
    }

    // =========================================================================
    // Handover documents
    // =========================================================================

    /// Insert a new document record, returning its id
    pub fn add_handover_doc(&self, project_id: i64, doc: &HandoverDoc) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO handover_docs (project_id, category, file_path, sha256, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project_id,
                doc.category,
                doc.file_path,
                doc.sha256,
                doc.status.to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or refresh the record keyed on (project, category, path),
    /// returning its id
    pub fn upsert_handover_doc(
        &self,
        project_id: i64,
        doc: &HandoverDoc,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"INSERT INTO handover_docs (project_id, category, file_path, sha256, status)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(project_id, category, file_path) DO UPDATE SET
                   sha256 = excluded.sha256,
                   status = excluded.status"#,
            params![
                project_id,
                doc.category,
                doc.file_path,
                doc.sha256,
                doc.status.to_string(),
            ],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM handover_docs WHERE project_id = ?1 AND category = ?2 AND file_path = ?3",
            params![project_id, doc.category, doc.file_path],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Documents of one category, or all of them ordered by category
    pub fn list_handover_docs(
        &self,
        project_id: i64,
        category: Option<&str>,
    ) -> Result<Vec<HandoverDoc>, StoreError> {
        let (sql, filter) = match category {
            Some(cat) => (
                "SELECT id, category, file_path, sha256, status FROM handover_docs
                 WHERE project_id = ?1 AND category = ?2 ORDER BY id",
                Some(cat),
            ),
            None => (
                "SELECT id, category, file_path, sha256, status FROM handover_docs
                 WHERE project_id = ?1 ORDER BY category, id",
                None,
            ),
        };

        let map_row = |row: &rusqlite::Row<'_>| {
            let status: String = row.get(4)?;
            Ok(HandoverDoc {
                id: Some(row.get(0)?),
                category: row.get(1)?,
                file_path: row.get(2)?,
                sha256: row.get(3)?,
                status: status.parse().unwrap_or(HandoverStatus::Open),
            })
        };

        let mut stmt = self.conn.prepare(sql)?;
        let docs = match filter {
            Some(cat) => stmt
                .query_map(params![project_id, cat], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![project_id], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(docs)
    }

    pub fn remove_handover_doc(&self, doc_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM handover_docs WHERE id = ?1",
            params![doc_id],
        )?;
        Ok(())
    }

    pub fn set_handover_status(
        &self,
        doc_id: i64,
        status: HandoverStatus,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE handover_docs SET status = ?1 WHERE id = ?2",
            params![status.to_string(), doc_id],
        )?;
        Ok(())
    }

    // =========================================================================
    // Whole records
    // =========================================================================

    /// Assemble the full record for an identifier, or None on a store miss
    pub fn load_record(&self, identifier: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let Some(stored) = self.get_project(identifier)? else {
            return Ok(None);
        };
        let project_id = stored.project_id;

        let mut record = ProjectRecord::new(stored.product_name, stored.details);
        record.project_id = Some(project_id);
        record.mes = self.get_mes(project_id)?;
        for kind in MatrixKind::ALL {
            record.set_matrix(kind, self.matrix(project_id, kind)?);
        }
        record.checklist = self.checklist(project_id)?;
        record.handover_docs = self.list_handover_docs(project_id, None)?;
        Ok(Some(record))
    }

    /// Persist a record and its child collections, returning the project id.
    /// Matrices and the MES entry are replaced; handover docs are upserted.
    /// The checklist is not touched here - see [`ProjectStore::init_checklist`].
    pub fn store_record(&self, record: &ProjectRecord) -> Result<i64, StoreError> {
        let project_id = self.upsert_project(&record.product_name, &record.details)?;

        if let Some(mes) = &record.mes {
            self.save_mes(project_id, mes)?;
        }
        for kind in MatrixKind::ALL {
            let rows = record.matrix(kind);
            if !rows.is_empty() {
                self.save_matrix(project_id, kind, rows)?;
            }
        }
        for doc in &record.handover_docs {
            self.upsert_handover_doc(project_id, doc)?;
        }
        Ok(project_id)
    }
}
