// ==========================================
// Setup Sheet Analyzer - Tool group repository
// ==========================================
// Tables: tool_group, tool_group_member
// Rule: a new group copies diameter, price and durability from the
//       catalog entry of its FIRST listed tool
// ==========================================

use crate::domain::catalog::{GroupDefinition, NewGroup};
use crate::domain::types::ToolDurability;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::now;
use crate::repository::tool_repo::read_durability;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Manages `tool_group` and its member rows
pub struct ToolGroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ToolGroupRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create a group and its members in one transaction.
    ///
    /// # Returns
    /// - Ok(id): new group id
    /// - Err(ValidationError): no tool names
    /// - Err(NotFound): first tool is not in the catalog
    pub fn create(&self, group: &NewGroup) -> RepositoryResult<String> {
        let first = group
            .tool_names
            .first()
            .ok_or_else(|| RepositoryError::ValidationError("group has no tools".to_string()))?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let template = tx
            .query_row(
                r#"
                SELECT diameter, price,
                       durability_rough, durability_drilling, durability_face_milling,
                       durability_semi_finish, durability_finish
                FROM tool
                WHERE name = ?1
                "#,
                params![first],
                |row| {
                    let diameter: f64 = row.get(0)?;
                    let price: f64 = row.get(1)?;
                    Ok((diameter, price, read_durability(row, 2)?))
                },
            )
            .optional()?;
        let (diameter, price, d) = template.ok_or_else(|| RepositoryError::not_found("tool", first))?;

        let id = Uuid::new_v4().to_string();
        tx.execute(
            r#"
            INSERT INTO tool_group (
                id, project_id, name, diameter, price,
                durability_rough, durability_drilling, durability_face_milling,
                durability_semi_finish, durability_finish, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                id,
                group.project_id,
                group.name,
                diameter,
                price,
                d.rough,
                d.drilling,
                d.face_milling,
                d.semi_finish,
                d.finish,
                now(),
            ],
        )?;

        for (position, tool_name) in group.tool_names.iter().enumerate() {
            tx.execute(
                r#"
                INSERT OR IGNORE INTO tool_group_member (group_id, tool_name, position)
                VALUES (?1, ?2, ?3)
                "#,
                params![id, tool_name, position as i64],
            )?;
        }

        tx.commit()?;
        Ok(id)
    }

    /// Overwrite price and durability
    pub fn update(&self, id: &str, price: f64, durability: &ToolDurability) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE tool_group
            SET price = ?2,
                durability_rough = ?3,
                durability_drilling = ?4,
                durability_face_milling = ?5,
                durability_semi_finish = ?6,
                durability_finish = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                price,
                durability.rough,
                durability.drilling,
                durability.face_milling,
                durability.semi_finish,
                durability.finish,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("tool_group", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<GroupDefinition>> {
        let conn = self.get_conn()?;
        let group = conn
            .query_row(
                r#"
                SELECT id, project_id, name, diameter, price,
                       durability_rough, durability_drilling, durability_face_milling,
                       durability_semi_finish, durability_finish
                FROM tool_group
                WHERE id = ?1
                "#,
                params![id],
                map_group_header,
            )
            .optional()?;

        match group {
            Some(mut group) => {
                group.tool_names = load_members(&conn, &group.id)?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    /// Groups of a project in creation order, members included
    pub fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<GroupDefinition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, name, diameter, price,
                   durability_rough, durability_drilling, durability_face_milling,
                   durability_semi_finish, durability_finish
            FROM tool_group
            WHERE project_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;
        let mut groups = stmt
            .query_map(params![project_id], map_group_header)?
            .collect::<SqliteResult<Vec<_>>>()?;

        for group in groups.iter_mut() {
            group.tool_names = load_members(&conn, &group.id)?;
        }
        Ok(groups)
    }

    /// Delete a group; member rows cascade.
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM tool_group WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("tool_group", id));
        }
        Ok(())
    }
}

fn map_group_header(row: &rusqlite::Row<'_>) -> SqliteResult<GroupDefinition> {
    Ok(GroupDefinition {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        diameter: row.get(3)?,
        price: row.get(4)?,
        durability: read_durability(row, 5)?,
        tool_names: Vec::new(),
    })
}

fn load_members(conn: &Connection, group_id: &str) -> SqliteResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tool_name FROM tool_group_member WHERE group_id = ?1 ORDER BY position ASC",
    )?;
    let names = stmt
        .query_map(params![group_id], |row| row.get(0))?
        .collect::<SqliteResult<Vec<String>>>()?;
    Ok(names)
}
