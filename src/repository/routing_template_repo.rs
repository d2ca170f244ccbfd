// ==========================================
// 工艺路线模板引擎 - 模板仓储接口
// ==========================================
// 职责: 模板与工序的持久化 (不含业务规则)
// 实现者: SqliteRoutingTemplateRepository (rusqlite)
// ==========================================
// 红线: 已软删除的模板对所有查询不可见
// ==========================================

use crate::domain::routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot};
use crate::repository::error::RepositoryResult;

mod rows;
mod sqlite;


pub use sqlite::SqliteRoutingTemplateRepository;

// ==========================================
// RoutingTemplateRepository Trait
// ==========================================
pub trait RoutingTemplateRepository: Send + Sync {
    // ===== 模板 =====

    /// 按ID查询 (未删除)
    fn find_by_id(&self, template_id: &str) -> RepositoryResult<Option<RoutingTemplate>>;

    /// 按组织内编码查询 (未删除)
    fn find_by_code(&self, code: &str, org_id: &str) -> RepositoryResult<Option<RoutingTemplate>>;

    /// 占用该编码的模板ID (含已软删除)
    fn find_code_owner(&self, code: &str, org_id: &str) -> RepositoryResult<Option<String>>;

    /// 组织内全部未删除模板,按编码排序
    fn list_by_org(&self, org_id: &str) -> RepositoryResult<Vec<RoutingTemplate>>;

    /// 新增或覆盖模板元数据 (不触碰工序)
    fn save(&self, template: &RoutingTemplate) -> RepositoryResult<()>;

    /// 在同一事务内写入模板及其全部工序
    fn save_snapshot(&self, snapshot: &TemplateSnapshot) -> RepositoryResult<()>;

    /// 软删除; 返回 false 表示模板不存在或已删除
    fn soft_delete(&self, template_id: &str) -> RepositoryResult<bool>;

    // ===== 工序 =====

    /// 模板下全部工序 (含未启用),按工序号排序
    fn find_operations(&self, template_id: &str) -> RepositoryResult<Vec<RoutingOperation>>;

    fn find_operation(&self, operation_id: &str) -> RepositoryResult<Option<RoutingOperation>>;

    fn save_operation(&self, operation: &RoutingOperation) -> RepositoryResult<()>;

    /// 删除工序并清除指向它的前序引用; 返回 false 表示不存在
    fn delete_operation(&self, operation_id: &str) -> RepositoryResult<bool>;
}
