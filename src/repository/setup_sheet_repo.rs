// ==========================================
// Setup Sheet Analyzer - Setup sheet repository
// ==========================================
// Rule: raw report HTML is stored verbatim
// ==========================================

use crate::domain::catalog::{NewSetupSheet, SetupSheetPatch, StoredSetupSheet};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::now;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "SELECT id, project_id, name, file_name, content, scale, ignored, created_at FROM setup_sheet";

/// Manages the `setup_sheet` table
pub struct SetupSheetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SetupSheetRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Store a sheet with scale 1, not ignored.
    ///
    /// # Returns
    /// - Ok(id): new sheet id
    /// - Err(ForeignKeyViolation): unknown project
    pub fn create(&self, project_id: &str, sheet: &NewSetupSheet) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            r#"
            INSERT INTO setup_sheet (id, project_id, name, file_name, content, scale, ignored, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1.0, 0, ?6)
            "#,
            params![id, project_id, sheet.name, sheet.file_name, sheet.content, now()],
        )?;
        Ok(id)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<StoredSetupSheet>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let sheet = conn
            .query_row(&sql, params![id], map_sheet_row)
            .optional()?;
        Ok(sheet)
    }

    /// Sheets of a project in creation order
    pub fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<StoredSetupSheet>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE project_id = ?1 ORDER BY created_at ASC, rowid ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let sheets = stmt
            .query_map(params![project_id], map_sheet_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sheets)
    }

    pub fn update(&self, id: &str, patch: SetupSheetPatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE setup_sheet
            SET ignored = COALESCE(?2, ignored),
                scale = COALESCE(?3, scale)
            WHERE id = ?1
            "#,
            params![id, patch.ignored, patch.scale],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("setup_sheet", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM setup_sheet WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("setup_sheet", id));
        }
        Ok(())
    }
}

fn map_sheet_row(row: &Row<'_>) -> SqliteResult<StoredSetupSheet> {
    Ok(StoredSetupSheet {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        file_name: row.get(3)?,
        content: row.get(4)?,
        scale: row.get(5)?,
        ignored: row.get(6)?,
        created_at: row.get(7)?,
    })
}
