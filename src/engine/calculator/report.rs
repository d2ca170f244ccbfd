use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// OperationBreakdown - 单工序计算明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationBreakdown {
    pub operation_id: String,
    pub operation_code: String,
    pub work_center_id: String,

    /// 效率修正后的工时 (小时)
    pub hours: f64,

    /// 实际采用的小时费率
    pub hourly_rate: f64,

    /// 工时费 + 材料费 + 工装费
    pub cost: f64,

    /// 计入交货周期的分钟数 (可并行工序为 0)
    pub lead_time_minutes: f64,
}

// ==========================================
// RoutingCalculation - 模板计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingCalculation {
    pub template_id: String,
    pub quantity: i32,
    pub weight_kg: Option<f64>,

    pub total_hours: f64,
    pub total_cost: f64,

    /// work_center_id -> 纯加工工时 (小时)
    pub work_center_load: HashMap<String, f64>,

    pub lead_time_minutes: f64,

    /// 按工序号排列的有效工序明细
    pub operations: Vec<OperationBreakdown>,
}

impl RoutingCalculation {
    /// 交货周期 (毫秒精度)
    pub fn lead_time(&self) -> Duration {
        minutes_to_duration(self.lead_time_minutes)
    }
}

pub(super) fn minutes_to_duration(minutes: f64) -> Duration {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Duration::zero();
    }
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}
