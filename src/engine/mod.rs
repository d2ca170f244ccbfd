// ==========================================
// 工艺路线模板引擎 - 引擎层
// ==========================================
// 职责: 结构校验、工时成本计算、审批流转、复制与版本
// 红线: Engine 不拼 SQL, 只处理内存快照
// ==========================================

pub mod calculator;
pub mod lifecycle;
pub mod validator;
pub mod versioning;

// 重导出核心引擎
pub use calculator::{OperationBreakdown, RoutingCalculation, RoutingCalculator};
pub use lifecycle::{ApprovalStateMachine, TransitionError};
pub use validator::{TemplateValidator, ValidationError, ValidationErrorKind};
pub use versioning::TemplateCloner;
