// ==========================================
// 工艺路线模板引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod package_repo;
pub mod routing_template_repo;
pub mod work_center_repo;

// 重导出核心仓储
pub use action_log_repo::TemplateActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use package_repo::{ConsumerRepository, PackageRepository};
pub use routing_template_repo::{RoutingTemplateRepository, SqliteRoutingTemplateRepository};
pub use work_center_repo::{WorkCenterLookup, WorkCenterRepository};
