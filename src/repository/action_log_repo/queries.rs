use super::core::TemplateActionLogRepository;
use crate::domain::action_log::TemplateActionLog;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, OptionalExtension, Result as SqliteResult};

impl TemplateActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 action_id 查询单个日志
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<TemplateActionLog>> {
        let conn = self.get_conn()?;

        let log = conn
            .query_row(
                r#"
                SELECT action_id, template_id, action_type, action_ts, actor, payload_json, detail
                FROM routing_action_log
                WHERE action_id = ?1
                "#,
                params![action_id],
                |row| self.map_row(row),
            )
            .optional()?;

        Ok(log)
    }

    /// 查询指定模板的操作日志 (最新在前)
    pub fn find_by_template_id(&self, template_id: &str) -> RepositoryResult<Vec<TemplateActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, template_id, action_type, action_ts, actor, payload_json, detail
            FROM routing_action_log
            WHERE template_id = ?1
            ORDER BY action_ts DESC, rowid DESC
            "#,
        )?;

        let logs = stmt
            .query_map(params![template_id], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定操作人的最近日志
    pub fn find_by_actor(&self, actor: &str, limit: i32) -> RepositoryResult<Vec<TemplateActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, template_id, action_type, action_ts, actor, payload_json, detail
            FROM routing_action_log
            WHERE actor = ?1
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![actor, limit], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 统计指定模板的日志条数
    pub fn count_by_template(&self, template_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM routing_action_log WHERE template_id = ?1",
            params![template_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
