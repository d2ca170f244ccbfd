// ==========================================
// 工艺路线模板引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::{FixedSetupPolicy, VersionOrdering};
use crate::config::routing_config_trait::RoutingConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        tracing::info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 复制/创建版本时记录当时的计算口径
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let map: HashMap<String, String> = pairs.into_iter().collect();
        Ok(serde_json::to_string(&map)?)
    }
}

// ==========================================
// 实现 RoutingConfigReader
// ==========================================
#[async_trait]
impl RoutingConfigReader for ConfigManager {
    async fn get_default_efficiency_pct(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_EFFICIENCY_PCT, "100")?;
        Ok(value.trim().parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(value = %value, "缺省效率系数无法解析, 使用100");
            100.0
        }))
    }

    async fn get_fixed_setup_policy(&self) -> Result<FixedSetupPolicy, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::FIXED_SETUP_POLICY, "LEGACY_DOUBLE_COUNT")?;
        Ok(FixedSetupPolicy::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "固定工时口径无法识别, 使用 LEGACY_DOUBLE_COUNT");
            FixedSetupPolicy::LegacyDoubleCount
        }))
    }

    async fn get_version_ordering(&self) -> Result<VersionOrdering, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::VERSION_ORDERING, "LEXICOGRAPHIC")?;
        Ok(VersionOrdering::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "版本排序口径无法识别, 使用 LEXICOGRAPHIC");
            VersionOrdering::Lexicographic
        }))
    }

    async fn get_maintenance_lookahead_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MAINTENANCE_LOOKAHEAD_DAYS, "7")?;
        Ok(value.trim().parse::<i64>().unwrap_or(7))
    }

    async fn get_most_used_top_n(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MOST_USED_TOP_N, "10")?;
        Ok(value.trim().parse::<usize>().unwrap_or(10))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEFAULT_EFFICIENCY_PCT: &str = "routing_default_efficiency_pct";
    pub const FIXED_SETUP_POLICY: &str = "routing_fixed_setup_policy";
    pub const VERSION_ORDERING: &str = "routing_version_ordering";
    pub const MAINTENANCE_LOOKAHEAD_DAYS: &str = "routing_maintenance_lookahead_days";
    pub const MOST_USED_TOP_N: &str = "routing_most_used_top_n";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::engine_config::RoutingEngineConfig;

    fn setup() -> (tempfile::NamedTempFile, ConfigManager) {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let manager = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let (_tmp, manager) = setup();

        let config = RoutingEngineConfig::load(&manager).await.unwrap();
        assert_eq!(config, RoutingEngineConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let (_tmp, manager) = setup();
        manager
            .set_global_config_value(config_keys::FIXED_SETUP_POLICY, "SINGLE_COUNT")
            .unwrap();
        manager
            .set_global_config_value(config_keys::VERSION_ORDERING, "semantic")
            .unwrap();
        manager
            .set_global_config_value(config_keys::MAINTENANCE_LOOKAHEAD_DAYS, "14")
            .unwrap();

        let config = RoutingEngineConfig::load(&manager).await.unwrap();
        assert_eq!(config.fixed_setup_policy, FixedSetupPolicy::SingleCount);
        assert_eq!(config.version_ordering, VersionOrdering::Semantic);
        assert_eq!(config.maintenance_lookahead_days, 14);
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back() {
        let (_tmp, manager) = setup();
        manager
            .set_global_config_value(config_keys::DEFAULT_EFFICIENCY_PCT, "-5")
            .unwrap();
        manager
            .set_global_config_value(config_keys::VERSION_ORDERING, "by-date")
            .unwrap();

        let config = RoutingEngineConfig::load(&manager).await.unwrap();
        assert_eq!(config.default_efficiency_pct, 100.0);
        assert_eq!(config.version_ordering, VersionOrdering::Lexicographic);
    }

    #[test]
    fn test_config_snapshot_is_json() {
        let (_tmp, manager) = setup();
        manager
            .set_global_config_value(config_keys::MOST_USED_TOP_N, "5")
            .unwrap();
        let snapshot = manager.get_config_snapshot().unwrap();
        let map: HashMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(map.get(config_keys::MOST_USED_TOP_N).map(String::as_str), Some("5"));
    }
}
