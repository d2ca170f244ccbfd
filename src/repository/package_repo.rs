// ==========================================
// 工艺路线模板引擎 - 生产包仓储
// ==========================================
// 职责: 模板消费方 (生产包/明细行) 的引用写入与使用统计
// 说明: 生产包由外部系统管理,这里只写模板/工序引用
// ==========================================

use crate::db::{format_datetime, parse_datetime};
use crate::domain::consumer::{LineItem, Package, TemplateUsage};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ConsumerRepository Trait
// ==========================================
pub trait ConsumerRepository: Send + Sync {
    fn find_package(&self, package_id: &str) -> RepositoryResult<Option<Package>>;

    /// 写入生产包的模板引用; 返回 false 表示生产包不存在
    fn assign_template(
        &self,
        package_id: &str,
        template_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<bool>;

    /// 生产包下未删除的明细行
    fn list_line_items(&self, package_id: &str) -> RepositoryResult<Vec<LineItem>>;

    fn set_line_item_operation(
        &self,
        line_item_id: &str,
        operation_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<bool>;

    /// 引用该模板的未删除生产包数量
    fn count_references(&self, template_id: &str) -> RepositoryResult<i64>;

    /// 最近一次引用该模板的生产包创建时间
    fn last_used(&self, template_id: &str) -> RepositoryResult<Option<NaiveDateTime>>;

    /// 组织内各模板的引用次数 (只含被引用过的模板)
    fn usage_counts(&self, org_id: &str) -> RepositoryResult<Vec<TemplateUsage>>;
}

fn datetime_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法解析时间: {}", raw).into(),
        )
    })
}

fn map_package_row(row: &Row) -> rusqlite::Result<Package> {
    Ok(Package {
        package_id: row.get(0)?,
        org_id: row.get(1)?,
        package_number: row.get(2)?,
        routing_template_id: row.get(3)?,
        is_deleted: row.get(4)?,
        created_at: datetime_column(row, 5)?,
        last_modified_at: datetime_column(row, 6)?,
    })
}

fn map_line_item_row(row: &Row) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        line_item_id: row.get(0)?,
        package_id: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        routing_operation_id: row.get(4)?,
        is_deleted: row.get(5)?,
        last_modified_at: datetime_column(row, 6)?,
    })
}

// ==========================================
// PackageRepository - 生产包仓储
// ==========================================
pub struct PackageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackageRepository {
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

    /// 新增生产包 (初始化/测试灌数)
    pub fn insert_package(&self, package: &Package) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO package (
                package_id, org_id, package_number, routing_template_id,
                is_deleted, created_at, last_modified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                package.package_id,
                package.org_id,
                package.package_number,
                package.routing_template_id,
                package.is_deleted,
                format_datetime(&package.created_at),
                format_datetime(&package.last_modified_at),
            ],
        )?;
        Ok(())
    }

    /// 新增明细行 (初始化/测试灌数)
    pub fn insert_line_item(&self, item: &LineItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO package_line_item (
                line_item_id, package_id, description, quantity,
                routing_operation_id, is_deleted, last_modified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                item.line_item_id,
                item.package_id,
                item.description,
                item.quantity,
                item.routing_operation_id,
                item.is_deleted,
                format_datetime(&item.last_modified_at),
            ],
        )?;
        Ok(())
    }
}

impl ConsumerRepository for PackageRepository {
    fn find_package(&self, package_id: &str) -> RepositoryResult<Option<Package>> {
        let conn = self.get_conn()?;
        let package = conn
            .query_row(
                r#"
                SELECT package_id, org_id, package_number, routing_template_id,
                       is_deleted, created_at, last_modified_at
                FROM package
                WHERE package_id = ?1 AND is_deleted = 0
                "#,
                params![package_id],
                map_package_row,
            )
            .optional()?;
        Ok(package)
    }

    fn assign_template(
        &self,
        package_id: &str,
        template_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE package SET routing_template_id = ?2, last_modified_at = ?3
            WHERE package_id = ?1 AND is_deleted = 0
            "#,
            params![package_id, template_id, format_datetime(&at)],
        )?;
        Ok(rows > 0)
    }

    fn list_line_items(&self, package_id: &str) -> RepositoryResult<Vec<LineItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT line_item_id, package_id, description, quantity,
                   routing_operation_id, is_deleted, last_modified_at
            FROM package_line_item
            WHERE package_id = ?1 AND is_deleted = 0
            ORDER BY line_item_id
            "#,
        )?;
        let items = stmt
            .query_map(params![package_id], map_line_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn set_line_item_operation(
        &self,
        line_item_id: &str,
        operation_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE package_line_item SET routing_operation_id = ?2, last_modified_at = ?3
            WHERE line_item_id = ?1 AND is_deleted = 0
            "#,
            params![line_item_id, operation_id, format_datetime(&at)],
        )?;
        Ok(rows > 0)
    }

    fn count_references(&self, template_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM package WHERE routing_template_id = ?1 AND is_deleted = 0",
            params![template_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn last_used(&self, template_id: &str) -> RepositoryResult<Option<NaiveDateTime>> {
        let conn = self.get_conn()?;
        let raw: Option<String> = conn.query_row(
            "SELECT MAX(created_at) FROM package WHERE routing_template_id = ?1 AND is_deleted = 0",
            params![template_id],
            |row| row.get(0),
        )?;
        Ok(raw.and_then(|s| parse_datetime(&s)))
    }

    fn usage_counts(&self, org_id: &str) -> RepositoryResult<Vec<TemplateUsage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.routing_template_id, COUNT(*) AS usage_count
            FROM package p
            JOIN routing_template t ON t.template_id = p.routing_template_id
            WHERE t.org_id = ?1 AND t.is_deleted = 0 AND p.is_deleted = 0
            GROUP BY p.routing_template_id
            "#,
        )?;
        let usages = stmt
            .query_map(params![org_id], |row| {
                Ok(TemplateUsage {
                    template_id: row.get(0)?,
                    usage_count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usages)
    }
}
