// ==========================================
// 工艺路线模板引擎 - 结构校验器
// ==========================================
// 职责: 检查模板必填字段、工作中心可用性、工序依赖环
// 输入: 模板快照 + 可用工作中心集合
// 输出: 校验问题列表 (不抛错)
// ==========================================
// 红线: 校验问题只阻止审批/使用,不阻止查看
// ==========================================

mod core;
mod report;

#[cfg(test)]
mod tests;

pub use core::TemplateValidator;
pub use report::{ValidationError, ValidationErrorKind};
