// ==========================================
// 工艺路线模板引擎 - 工时与成本计算器
// ==========================================
// 职责: 基于模板快照计算总工时、总成本、工作中心负荷、交货周期
// 输入: 模板快照 + 数量 + 可选重量 + 费率表
// 输出: RoutingCalculation (含逐工序明细)
// ==========================================
// 红线: 纯函数,不读库; 数值边界有定义,不报错
// ==========================================

mod core;
mod report;


pub use core::RoutingCalculator;
pub use report::{OperationBreakdown, RoutingCalculation};
