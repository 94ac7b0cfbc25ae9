//! Database schema initialization

use rusqlite::params;

use super::{ProjectStore, StoreError, SCHEMA_VERSION};

impl ProjectStore {
    /// Create all tables if they do not exist and record the schema version
    /// of a fresh database. An existing version row is left untouched so a
    /// mismatch can be detected.
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per project; project_name is the natural key
            CREATE TABLE IF NOT EXISTS projects (
                project_id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT NOT NULL DEFAULT '',
                project_name TEXT NOT NULL UNIQUE,
                fg_part_number TEXT NOT NULL DEFAULT '',
                pcba_part_number TEXT NOT NULL DEFAULT '',
                start_date TEXT NOT NULL DEFAULT '',
                end_date TEXT NOT NULL DEFAULT '',
                bom_file TEXT NOT NULL DEFAULT '',
                npi_engineer TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_projects_product ON projects(product_name);
            CREATE INDEX IF NOT EXISTS idx_projects_fg ON projects(fg_part_number);
            CREATE INDEX IF NOT EXISTS idx_projects_pcba ON projects(pcba_part_number);

            -- MES workflow entry, replaced wholesale on save
            CREATE TABLE IF NOT EXISTS mes (
                mes_id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                lot_id TEXT NOT NULL DEFAULT '',
                workflow_smt TEXT NOT NULL DEFAULT '',
                workflow_tla TEXT NOT NULL DEFAULT '',
                smt_work_order TEXT NOT NULL DEFAULT '',
                tla_work_order TEXT NOT NULL DEFAULT '',
                work_order_qty INTEGER,
                po_number TEXT NOT NULL DEFAULT '',
                po_qty INTEGER,
                FOREIGN KEY(project_id) REFERENCES projects(project_id)
            );
            CREATE INDEX IF NOT EXISTS idx_mes_project ON mes(project_id);

            -- Build/assembly/machine matrices, typed by kind
            CREATE TABLE IF NOT EXISTS matrix_rows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                value TEXT NOT NULL DEFAULT '',
                seq INTEGER NOT NULL,
                FOREIGN KEY(project_id) REFERENCES projects(project_id)
            );
            CREATE INDEX IF NOT EXISTS idx_matrix_project_kind ON matrix_rows(project_id, kind);

            -- Checklist, initialized from the template on project creation
            CREATE TABLE IF NOT EXISTS checklist_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                item_name TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                person TEXT NOT NULL DEFAULT '',
                reference TEXT NOT NULL DEFAULT '',
                seq INTEGER NOT NULL,
                FOREIGN KEY(project_id) REFERENCES projects(project_id)
            );
            CREATE INDEX IF NOT EXISTS idx_checklist_project ON checklist_items(project_id);

            -- Registered handover documents
            CREATE TABLE IF NOT EXISTS handover_docs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                file_path TEXT NOT NULL,
                sha256 TEXT,
                status TEXT NOT NULL DEFAULT 'open',
                FOREIGN KEY(project_id) REFERENCES projects(project_id),
                UNIQUE(project_id, category, file_path)
            );
            CREATE INDEX IF NOT EXISTS idx_handover_project ON handover_docs(project_id);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO schema_version (version)
             SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM schema_version)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
