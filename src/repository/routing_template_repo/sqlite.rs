use super::rows::{
    execute_upsert_operation, execute_upsert_template, map_operation_row, map_template_row,
    OPERATION_COLUMNS, TEMPLATE_COLUMNS, UPSERT_OPERATION_SQL, UPSERT_TEMPLATE_SQL,
};
use super::RoutingTemplateRepository;
use crate::db::{format_datetime, open_sqlite_connection};
use crate::domain::routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteRoutingTemplateRepository - 模板仓储 (SQLite)
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct SqliteRoutingTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRoutingTemplateRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl RoutingTemplateRepository for SqliteRoutingTemplateRepository {
    fn find_by_id(&self, template_id: &str) -> RepositoryResult<Option<RoutingTemplate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM routing_template WHERE template_id = ?1 AND is_deleted = 0",
            TEMPLATE_COLUMNS
        );
        let template = conn
            .query_row(&sql, params![template_id], map_template_row)
            .optional()?;
        Ok(template)
    }

    fn find_by_code(&self, code: &str, org_id: &str) -> RepositoryResult<Option<RoutingTemplate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM routing_template WHERE code = ?1 AND org_id = ?2 AND is_deleted = 0",
            TEMPLATE_COLUMNS
        );
        let template = conn
            .query_row(&sql, params![code, org_id], map_template_row)
            .optional()?;
        Ok(template)
    }

    fn find_code_owner(&self, code: &str, org_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let owner = conn
            .query_row(
                "SELECT template_id FROM routing_template WHERE code = ?1 AND org_id = ?2",
                params![code, org_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(owner)
    }

    fn list_by_org(&self, org_id: &str) -> RepositoryResult<Vec<RoutingTemplate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM routing_template WHERE org_id = ?1 AND is_deleted = 0 ORDER BY code",
            TEMPLATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let templates = stmt
            .query_map(params![org_id], map_template_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    fn save(&self, template: &RoutingTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(UPSERT_TEMPLATE_SQL)?;
        execute_upsert_template(&mut stmt, template)?;
        Ok(())
    }

    fn save_snapshot(&self, snapshot: &TemplateSnapshot) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut template_stmt = tx.prepare(UPSERT_TEMPLATE_SQL)?;
            execute_upsert_template(&mut template_stmt, &snapshot.template)?;

            let mut op_stmt = tx.prepare(UPSERT_OPERATION_SQL)?;
            for op in &snapshot.operations {
                execute_upsert_operation(&mut op_stmt, op)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn soft_delete(&self, template_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let now = format_datetime(&chrono::Local::now().naive_local());
        let rows = conn.execute(
            r#"
            UPDATE routing_template
            SET is_deleted = 1, is_active = 0, last_modified_at = ?2
            WHERE template_id = ?1 AND is_deleted = 0
            "#,
            params![template_id, now],
        )?;
        Ok(rows > 0)
    }

    fn find_operations(&self, template_id: &str) -> RepositoryResult<Vec<RoutingOperation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM routing_operation WHERE template_id = ?1 \
             ORDER BY sequence_number, operation_code",
            OPERATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let operations = stmt
            .query_map(params![template_id], map_operation_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(operations)
    }

    fn find_operation(&self, operation_id: &str) -> RepositoryResult<Option<RoutingOperation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM routing_operation WHERE operation_id = ?1",
            OPERATION_COLUMNS
        );
        let operation = conn
            .query_row(&sql, params![operation_id], map_operation_row)
            .optional()?;
        Ok(operation)
    }

    fn save_operation(&self, operation: &RoutingOperation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(UPSERT_OPERATION_SQL)?;
        execute_upsert_operation(&mut stmt, operation)?;
        Ok(())
    }

    fn delete_operation(&self, operation_id: &str) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "UPDATE routing_operation SET previous_operation_id = NULL WHERE previous_operation_id = ?1",
            params![operation_id],
        )?;
        let rows = tx.execute(
            "DELETE FROM routing_operation WHERE operation_id = ?1",
            params![operation_id],
        )?;

        tx.commit()?;
        Ok(rows > 0)
    }
}
