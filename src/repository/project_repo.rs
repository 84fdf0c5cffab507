// ==========================================
// Setup Sheet Analyzer - Project repository
// ==========================================
// Rule: no business logic, data access only
// ==========================================

use crate::domain::catalog::{ProjectPatch, ProjectRecord, ProjectSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ProjectRepository
// ==========================================
/// Manages the `project` table
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// Build from an existing shared connection
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create a project with scale 1 and an empty description.
    ///
    /// # Returns
    /// The new project id
    pub fn create(&self, name: &str) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let id = Uuid::new_v4().to_string();
        let now = now();
        conn.execute(
            r#"
            INSERT INTO project (id, name, description, scale, created_at, updated_at)
            VALUES (?1, ?2, '', 1.0, ?3, ?3)
            "#,
            params![id, name, now],
        )?;
        Ok(id)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ProjectRecord>> {
        let conn = self.get_conn()?;
        let project = conn
            .query_row(
                r#"
                SELECT id, name, description, scale, created_at, updated_at
                FROM project
                WHERE id = ?1
                "#,
                params![id],
                map_project_row,
            )
            .optional()?;
        Ok(project)
    }

    /// All projects, oldest first, with their setup sheet counts
    pub fn list_with_counts(&self) -> RepositoryResult<Vec<ProjectSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.name, p.description, p.scale, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM setup_sheet s WHERE s.project_id = p.id)
            FROM project p
            ORDER BY p.created_at ASC, p.rowid ASC
            "#,
        )?;

        let projects = stmt
            .query_map([], |row| {
                let count: i64 = row.get(6)?;
                Ok(ProjectSummary {
                    project: map_project_row(row)?,
                    setup_sheet_count: count as usize,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(projects)
    }

    /// Apply the set fields of `patch`; fails with NotFound for unknown ids.
    pub fn update(&self, id: &str, patch: &ProjectPatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE project
            SET name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                scale = COALESCE(?4, scale),
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![id, patch.name, patch.description, patch.scale, now()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("project", id));
        }
        Ok(())
    }

    /// Delete a project; its sheets and groups cascade.
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM project WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("project", id));
        }
        Ok(())
    }
}

fn map_project_row(row: &Row<'_>) -> SqliteResult<ProjectRecord> {
    Ok(ProjectRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        scale: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
