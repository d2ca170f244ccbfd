// ==========================================
// 工艺路线模板引擎 - 模板操作日志仓储
// ==========================================
// 依据: routing_action_log 表
// 红线: 审批流转、复制、删除必须留痕
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::TemplateActionLogRepository;
