// ==========================================
// 工艺路线模板引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表入口，应用启动与测试共用同一份 schema
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库时间格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 数据库日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时间写库格式化
pub fn format_datetime(ts: &NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

/// 解析库内时间 (兼容 SQLite datetime('now') 与 ISO 'T' 分隔)
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// 解析库内日期
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS work_center (
            work_center_id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            work_center_type TEXT NOT NULL DEFAULT 'Production',
            daily_capacity_hours REAL NOT NULL DEFAULT 8,
            hourly_rate REAL NOT NULL DEFAULT 0,
            efficiency_pct REAL NOT NULL DEFAULT 100,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            last_maintenance_date TEXT,
            next_maintenance_date TEXT,
            UNIQUE(org_id, code)
        );

        CREATE TABLE IF NOT EXISTS routing_template (
            template_id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            template_type TEXT NOT NULL DEFAULT 'STANDARD',
            product_category TEXT,
            material_type TEXT,
            complexity_level TEXT NOT NULL DEFAULT 'MEDIUM',
            default_efficiency_pct REAL NOT NULL DEFAULT 100,
            includes_welding INTEGER NOT NULL DEFAULT 0,
            includes_quality_control INTEGER NOT NULL DEFAULT 1,
            version TEXT NOT NULL DEFAULT '1.0',
            approval_status TEXT NOT NULL DEFAULT 'DRAFT'
                CHECK(approval_status IN ('DRAFT', 'PENDING', 'APPROVED', 'REJECTED')),
            is_active INTEGER NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            estimated_total_hours REAL NOT NULL DEFAULT 0,
            submitted_by TEXT,
            submitted_at TEXT,
            approved_by TEXT,
            approval_date TEXT,
            rejected_by TEXT,
            rejected_at TEXT,
            notes TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            last_modified_by TEXT,
            last_modified_at TEXT NOT NULL,
            UNIQUE(org_id, code)
        );

        CREATE INDEX IF NOT EXISTS idx_routing_template_org ON routing_template(org_id, is_deleted);

        CREATE TABLE IF NOT EXISTS routing_operation (
            operation_id TEXT PRIMARY KEY,
            template_id TEXT NOT NULL REFERENCES routing_template(template_id) ON DELETE CASCADE,
            sequence_number INTEGER NOT NULL,
            operation_code TEXT NOT NULL,
            operation_name TEXT NOT NULL,
            description TEXT,
            operation_type TEXT NOT NULL DEFAULT 'PROCESSING',
            work_center_id TEXT NOT NULL,
            machine_center_id TEXT,
            calculation_method TEXT NOT NULL DEFAULT 'PER_UNIT',
            setup_time_minutes REAL NOT NULL DEFAULT 0,
            processing_time_per_unit REAL NOT NULL DEFAULT 0,
            processing_time_per_kg REAL NOT NULL DEFAULT 0,
            movement_time_minutes REAL NOT NULL DEFAULT 0,
            waiting_time_minutes REAL NOT NULL DEFAULT 0,
            efficiency_factor REAL NOT NULL DEFAULT 100,
            required_operators INTEGER NOT NULL DEFAULT 1,
            required_skill_level TEXT,
            requires_inspection INTEGER NOT NULL DEFAULT 0,
            inspection_percentage REAL NOT NULL DEFAULT 0,
            can_run_in_parallel INTEGER NOT NULL DEFAULT 0,
            previous_operation_id TEXT,
            hourly_rate REAL NOT NULL DEFAULT 0,
            override_hourly_rate REAL,
            material_cost_per_unit REAL NOT NULL DEFAULT 0,
            tooling_cost REAL NOT NULL DEFAULT 0,
            scrap_percentage REAL NOT NULL DEFAULT 0,
            work_instructions TEXT,
            safety_notes TEXT,
            quality_notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_optional INTEGER NOT NULL DEFAULT 0,
            is_critical_path INTEGER NOT NULL DEFAULT 0,
            created_by TEXT,
            created_at TEXT NOT NULL,
            last_modified_by TEXT,
            last_modified_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_routing_operation_template
            ON routing_operation(template_id, sequence_number);

        CREATE TABLE IF NOT EXISTS package (
            package_id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            package_number TEXT NOT NULL,
            routing_template_id TEXT REFERENCES routing_template(template_id),
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_modified_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_package_template ON package(routing_template_id);

        CREATE TABLE IF NOT EXISTS package_line_item (
            line_item_id TEXT PRIMARY KEY,
            package_id TEXT NOT NULL REFERENCES package(package_id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            routing_operation_id TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            last_modified_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS routing_action_log (
            action_id TEXT PRIMARY KEY,
            template_id TEXT NOT NULL,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_routing_action_log_template
            ON routing_action_log(template_id, action_ts DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_datetime_text_formats() {
        let ts = parse_datetime("2024-03-01 09:30:00").unwrap();
        assert_eq!(format_datetime(&ts), "2024-03-01 09:30:00");
        assert_eq!(parse_datetime("2024-03-01T09:30:00.250").map(|t| t.date()), Some(ts.date()));
        assert!(parse_datetime("yesterday").is_none());
        assert_eq!(parse_date("2024-03-08"), NaiveDate::from_ymd_opt(2024, 3, 8));
    }
}
