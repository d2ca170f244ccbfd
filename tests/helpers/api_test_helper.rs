// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供模板服务集成测试的通用环境与辅助函数
// ==========================================

use std::sync::Arc;
use tempfile::NamedTempFile;

use routing_template_engine::api::RoutingTemplateApi;
use routing_template_engine::config::RoutingEngineConfig;
use routing_template_engine::domain::routing::{RoutingOperation, RoutingTemplate};
use routing_template_engine::repository::{
    PackageRepository, SqliteRoutingTemplateRepository, TemplateActionLogRepository,
    WorkCenterRepository,
};

use super::test_data_builder::{OperationBuilder, TemplateBuilder, WorkCenterBuilder};
use crate::test_helpers;

pub const ACTOR: &str = "alice";
pub const APPROVER: &str = "bob";

// ==========================================
// API测试环境
// ==========================================

pub struct ApiTestEnv {
    pub db_path: String,
    pub api: Arc<RoutingTemplateApi>,

    // Repository层（用于测试数据准备）
    pub template_repo: Arc<SqliteRoutingTemplateRepository>,
    pub work_center_repo: Arc<WorkCenterRepository>,
    pub package_repo: Arc<PackageRepository>,
    pub action_log_repo: Arc<TemplateActionLogRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 默认配置的测试环境
    pub fn new() -> Result<Self, String> {
        Self::with_config(RoutingEngineConfig::default())
    }

    /// 指定配置的测试环境
    pub fn with_config(config: RoutingEngineConfig) -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let conn = test_helpers::open_shared_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        let template_repo = Arc::new(SqliteRoutingTemplateRepository::from_connection(conn.clone()));
        let work_center_repo = Arc::new(WorkCenterRepository::from_connection(conn.clone()));
        let package_repo = Arc::new(PackageRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(TemplateActionLogRepository::new(conn));

        let api = Arc::new(RoutingTemplateApi::new(
            template_repo.clone(),
            work_center_repo.clone(),
            package_repo.clone(),
            action_log_repo.clone(),
            config,
        ));

        Ok(Self {
            db_path,
            api,
            template_repo,
            work_center_repo,
            package_repo,
            action_log_repo,
            _temp_file: temp_file,
        })
    }

    /// 灌入标准工作中心: WC1 (60/h), WC2 (40/h), DRILL (停用)
    pub fn seed_work_centers(&self) {
        self.work_center_repo
            .upsert(&WorkCenterBuilder::new("WC1").rate(60.0).build())
            .expect("写入WC1失败");
        self.work_center_repo
            .upsert(&WorkCenterBuilder::new("WC2").rate(40.0).build())
            .expect("写入WC2失败");
        self.work_center_repo
            .upsert(&WorkCenterBuilder::new("DRILL").inactive().build())
            .expect("写入DRILL失败");
    }

    /// 创建草稿模板
    pub fn create_template(&self, code: &str) -> RoutingTemplate {
        self.api
            .create_template(TemplateBuilder::new(code, &format!("{}模板", code)).build(), ACTOR)
            .expect("创建模板失败")
    }

    pub fn add_operation(&self, template_id: &str, op: OperationBuilder) -> RoutingOperation {
        self.api
            .add_operation(template_id, op.build(), ACTOR)
            .expect("新增工序失败")
    }

    /// 创建带一道有效工序 (WC1) 的草稿模板
    pub fn create_valid_template(&self, code: &str) -> RoutingTemplate {
        let template = self.create_template(code);
        self.add_operation(
            &template.template_id,
            OperationBuilder::new("SAW", "WC1").setup(30.0).per_unit(10.0),
        );
        template
    }

    /// 提交并批准
    pub fn approve_template(&self, template_id: &str) -> RoutingTemplate {
        self.api
            .submit_for_approval(template_id, ACTOR)
            .expect("提交审批失败");
        self.api.approve(template_id, APPROVER).expect("批准失败")
    }
}
