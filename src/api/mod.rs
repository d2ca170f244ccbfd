// ==========================================
// 工艺路线模板引擎 - API 层
// ==========================================
// 职责: 模板服务对外接口,组合引擎与仓储
// ==========================================

pub mod error;
pub mod routing_template_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use routing_template_api::{RoutingTemplateApi, TemplateFilter, TemplateUsageRank};
