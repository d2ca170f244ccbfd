// ==========================================
// 工艺路线模板引擎 - 核心库
// ==========================================
// 职责: 工序依赖校验、工时/成本计算、审批流转、复制与版本
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 校验/计算/审批/版本
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 模板服务
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ApprovalAction, ApprovalStatus, CalculationMethod, ComplexityLevel, OperationType,
    TemplateType,
};

// 领域实体
pub use domain::{
    LineItem, LineItemDraft, Package, RoutingOperation, RoutingTemplate, TemplateActionLog,
    TemplateActionType, TemplateSnapshot, WorkCenter,
};

// 引擎
pub use engine::{
    ApprovalStateMachine, RoutingCalculation, RoutingCalculator, TemplateCloner,
    TemplateValidator, ValidationError, ValidationErrorKind,
};

// API
pub use api::{ApiError, ApiResult, RoutingTemplateApi, TemplateFilter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工艺路线模板引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
