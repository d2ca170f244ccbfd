// ==========================================
// 工艺路线模板引擎 - 工作中心仓储
// ==========================================
// 职责: 工作中心只读查询 (校验、费率回退、维护计划)
// 说明: 工作中心由外部维护,这里只提供 upsert 供初始化/测试灌数
// ==========================================

use crate::db::{parse_date, DATE_FORMAT};
use crate::domain::work_center::WorkCenter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkCenterLookup Trait
// ==========================================
pub trait WorkCenterLookup: Send + Sync {
    /// 按ID查询 (未删除)
    fn find(&self, work_center_id: &str) -> RepositoryResult<Option<WorkCenter>>;

    /// 存在且启用
    fn is_active(&self, work_center_id: &str) -> RepositoryResult<bool> {
        Ok(self
            .find(work_center_id)?
            .map(|wc| wc.is_available())
            .unwrap_or(false))
    }

    /// 缺省小时费率 (工作中心不存在时为 None)
    fn default_hourly_rate(&self, work_center_id: &str) -> RepositoryResult<Option<f64>> {
        Ok(self.find(work_center_id)?.map(|wc| wc.hourly_rate))
    }

    fn next_maintenance_date(&self, work_center_id: &str) -> RepositoryResult<Option<NaiveDate>> {
        Ok(self
            .find(work_center_id)?
            .and_then(|wc| wc.next_maintenance_date))
    }
}

const WORK_CENTER_COLUMNS: &str = r#"
    work_center_id, org_id, code, name, work_center_type,
    daily_capacity_hours, hourly_rate, efficiency_pct,
    is_active, is_deleted, last_maintenance_date, next_maintenance_date
"#;

fn map_work_center_row(row: &Row) -> rusqlite::Result<WorkCenter> {
    Ok(WorkCenter {
        work_center_id: row.get(0)?,
        org_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        work_center_type: row.get(4)?,
        daily_capacity_hours: row.get(5)?,
        hourly_rate: row.get(6)?,
        efficiency_pct: row.get(7)?,
        is_active: row.get(8)?,
        is_deleted: row.get(9)?,
        last_maintenance_date: row
            .get::<_, Option<String>>(10)?
            .and_then(|s| parse_date(&s)),
        next_maintenance_date: row
            .get::<_, Option<String>>(11)?
            .and_then(|s| parse_date(&s)),
    })
}

// ==========================================
// WorkCenterRepository - 工作中心仓储
// ==========================================
pub struct WorkCenterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkCenterRepository {
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

    /// 新增或覆盖工作中心
    pub fn upsert(&self, wc: &WorkCenter) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO work_center (
                work_center_id, org_id, code, name, work_center_type,
                daily_capacity_hours, hourly_rate, efficiency_pct,
                is_active, is_deleted, last_maintenance_date, next_maintenance_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                wc.work_center_id,
                wc.org_id,
                wc.code,
                wc.name,
                wc.work_center_type,
                wc.daily_capacity_hours,
                wc.hourly_rate,
                wc.efficiency_pct,
                wc.is_active,
                wc.is_deleted,
                wc.last_maintenance_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                wc.next_maintenance_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;
        Ok(())
    }

    /// 组织内未删除的工作中心,按编码排序
    pub fn list_by_org(&self, org_id: &str) -> RepositoryResult<Vec<WorkCenter>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_center WHERE org_id = ?1 AND is_deleted = 0 ORDER BY code",
            WORK_CENTER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![org_id], map_work_center_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl WorkCenterLookup for WorkCenterRepository {
    fn find(&self, work_center_id: &str) -> RepositoryResult<Option<WorkCenter>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_center WHERE work_center_id = ?1 AND is_deleted = 0",
            WORK_CENTER_COLUMNS
        );
        let wc = conn
            .query_row(&sql, params![work_center_id], map_work_center_row)
            .optional()?;
        Ok(wc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> WorkCenterRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        WorkCenterRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn wc(id: &str, active: bool) -> WorkCenter {
        WorkCenter {
            work_center_id: id.to_string(),
            org_id: "ORG1".to_string(),
            code: id.to_string(),
            name: id.to_string(),
            work_center_type: "Production".to_string(),
            daily_capacity_hours: 8.0,
            hourly_rate: 42.0,
            efficiency_pct: 100.0,
            is_active: active,
            is_deleted: false,
            last_maintenance_date: None,
            next_maintenance_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        }
    }

    #[test]
    fn test_lookup_defaults() {
        let repo = setup_repo();
        repo.upsert(&wc("WC1", true)).unwrap();
        repo.upsert(&wc("WC2", false)).unwrap();

        assert!(repo.is_active("WC1").unwrap());
        assert!(!repo.is_active("WC2").unwrap());
        assert!(!repo.is_active("MISSING").unwrap());
        assert_eq!(repo.default_hourly_rate("WC1").unwrap(), Some(42.0));
        assert_eq!(repo.default_hourly_rate("MISSING").unwrap(), None);
        assert_eq!(
            repo.next_maintenance_date("WC1").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }

    #[test]
    fn test_deleted_work_center_is_invisible() {
        let repo = setup_repo();
        let mut gone = wc("WC9", true);
        gone.is_deleted = true;
        repo.upsert(&gone).unwrap();

        assert!(repo.find("WC9").unwrap().is_none());
        assert!(repo.list_by_org("ORG1").unwrap().is_empty());
    }
}
