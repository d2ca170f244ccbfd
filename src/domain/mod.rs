// ==========================================
// 工艺路线模板引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod consumer;
pub mod routing;
pub mod types;
pub mod work_center;

// 重导出核心类型
pub use action_log::{TemplateActionLog, TemplateActionType};
pub use consumer::{LineItem, LineItemDraft, Package, TemplateUsage};
pub use routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot};
pub use types::{
    ApprovalAction, ApprovalStatus, CalculationMethod, ComplexityLevel, OperationType,
    TemplateType,
};
pub use work_center::WorkCenter;
