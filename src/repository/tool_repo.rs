// ==========================================
// Setup Sheet Analyzer - Tool catalog repository
// ==========================================
// Rule: tools are keyed by name; upsert overwrites every field
// ==========================================

use crate::domain::catalog::{CatalogTool, ToolRegistration};
use crate::domain::types::ToolDurability;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::now;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Manages the `tool` table
pub struct ToolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ToolRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create or update a tool by name
    pub fn upsert(&self, tool: &ToolRegistration) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let d = &tool.durability;
        conn.execute(
            r#"
            INSERT INTO tool (
                name, diameter, price,
                durability_rough, durability_drilling, durability_face_milling,
                durability_semi_finish, durability_finish, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(name) DO UPDATE SET
                diameter = excluded.diameter,
                price = excluded.price,
                durability_rough = excluded.durability_rough,
                durability_drilling = excluded.durability_drilling,
                durability_face_milling = excluded.durability_face_milling,
                durability_semi_finish = excluded.durability_semi_finish,
                durability_finish = excluded.durability_finish,
                updated_at = excluded.updated_at
            "#,
            params![
                tool.name,
                tool.diameter,
                tool.price,
                d.rough,
                d.drilling,
                d.face_milling,
                d.semi_finish,
                d.finish,
                now(),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<CatalogTool>> {
        let conn = self.get_conn()?;
        let tool = conn
            .query_row(
                r#"
                SELECT name, diameter, price,
                       durability_rough, durability_drilling, durability_face_milling,
                       durability_semi_finish, durability_finish
                FROM tool
                WHERE name = ?1
                "#,
                params![name],
                map_tool_row,
            )
            .optional()?;
        Ok(tool)
    }

    /// Whole catalog ordered by name
    pub fn list(&self) -> RepositoryResult<Vec<CatalogTool>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT name, diameter, price,
                   durability_rough, durability_drilling, durability_face_milling,
                   durability_semi_finish, durability_finish
            FROM tool
            ORDER BY name ASC
            "#,
        )?;
        let tools = stmt
            .query_map([], map_tool_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(tools)
    }
}

fn map_tool_row(row: &Row<'_>) -> SqliteResult<CatalogTool> {
    Ok(CatalogTool {
        name: row.get(0)?,
        diameter: row.get(1)?,
        price: row.get(2)?,
        durability: read_durability(row, 3)?,
    })
}

/// Five durability columns starting at `start`, in category order
pub(crate) fn read_durability(row: &Row<'_>, start: usize) -> SqliteResult<ToolDurability> {
    Ok(ToolDurability {
        rough: row.get(start)?,
        drilling: row.get(start + 1)?,
        face_milling: row.get(start + 2)?,
        semi_finish: row.get(start + 3)?,
        finish: row.get(start + 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn repo() -> ToolRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ToolRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn registration(name: &str, price: f64, rough: u32) -> ToolRegistration {
        ToolRegistration {
            name: name.to_string(),
            diameter: 10.0,
            price,
            durability: ToolDurability {
                rough,
                finish: 90,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_upsert_creates_then_overwrites() {
        let repo = repo();
        repo.upsert(&registration("EM10", 120.0, 45)).unwrap();
        repo.upsert(&registration("EM10", 150.0, 50)).unwrap();

        let tool = repo.find_by_name("EM10").unwrap().unwrap();
        assert_eq!(tool.price, 150.0);
        assert_eq!(tool.durability.rough, 50);
        assert_eq!(tool.durability.finish, 90);
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_sorted_by_name() {
        let repo = repo();
        repo.upsert(&registration("T2", 1.0, 1)).unwrap();
        repo.upsert(&registration("T1", 1.0, 1)).unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["T1", "T2"]);
        assert!(repo.find_by_name("T3").unwrap().is_none());
    }
}
