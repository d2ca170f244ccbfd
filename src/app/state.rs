// ==========================================
// 工艺路线模板引擎 - 应用状态
// ==========================================
// 职责: 打开数据库、加载配置、装配仓储与模板服务
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::RoutingTemplateApi;
use crate::config::{ConfigManager, RoutingEngineConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    PackageRepository, SqliteRoutingTemplateRepository, TemplateActionLogRepository,
    WorkCenterRepository,
};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 加载时的引擎配置快照
    pub config: RoutingEngineConfig,

    /// 模板服务
    pub routing_template_api: Arc<RoutingTemplateApi>,

    /// 工作中心仓储 (初始化/维护用)
    pub work_center_repo: Arc<WorkCenterRepository>,

    /// 生产包仓储 (初始化/维护用)
    pub package_repo: Arc<PackageRepository>,

    /// 操作日志仓储
    pub action_log_repo: Arc<TemplateActionLogRepository>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建 AppState
    ///
    /// # 说明
    /// 1. 打开数据库并初始化 schema (幂等)
    /// 2. 从 config_kv 加载引擎配置
    /// 3. 装配仓储与模板服务
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("schema 初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config = RoutingEngineConfig::load(config_manager.as_ref())
            .await
            .map_err(|e| format!("配置加载失败: {}", e))?;

        let template_repo = Arc::new(SqliteRoutingTemplateRepository::from_connection(conn.clone()));
        let work_center_repo = Arc::new(WorkCenterRepository::from_connection(conn.clone()));
        let package_repo = Arc::new(PackageRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(TemplateActionLogRepository::new(conn));

        let routing_template_api = Arc::new(RoutingTemplateApi::new(
            template_repo,
            work_center_repo.clone(),
            package_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            routing_template_api,
            work_center_repo,
            package_repo,
            action_log_repo,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先读取环境变量 ROUTING_ENGINE_DB_PATH,
/// 否则使用 <data_dir>/routing-template-engine/routing.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("ROUTING_ENGINE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./routing.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("routing-template-engine");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("routing.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_wires_services() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let state = AppState::new(path).await.unwrap();
        assert_eq!(state.config, RoutingEngineConfig::default());
        assert!(state
            .routing_template_api
            .list_templates("ORG1", true)
            .unwrap()
            .is_empty());
    }
}
