// ==========================================
// 工艺路线模板引擎 - 工作中心领域模型
// ==========================================
// 工作中心由外部维护,工序只引用不拥有
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkCenter - 工作中心
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCenter {
    pub work_center_id: String,
    pub org_id: String,
    pub code: String,
    pub name: String,
    pub work_center_type: String,    // Production/Assembly/QC...
    pub daily_capacity_hours: f64,   // 日产能 (小时)
    pub hourly_rate: f64,            // 缺省小时费率
    pub efficiency_pct: f64,
    pub is_active: bool,
    pub is_deleted: bool,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
}

impl WorkCenter {
    /// 是否可被工序引用 (启用且未删除)
    pub fn is_available(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// 在 [.., horizon] 内是否有计划维护
    pub fn has_maintenance_before(&self, horizon: NaiveDate) -> bool {
        matches!(self.next_maintenance_date, Some(d) if d <= horizon)
    }
}
