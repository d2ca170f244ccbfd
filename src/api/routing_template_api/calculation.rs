use super::*;
use crate::domain::work_center::WorkCenter;
use crate::engine::RoutingCalculation;
use chrono::{Duration, NaiveDate};

impl RoutingTemplateApi {
    // ==========================================
    // 计算接口
    // ==========================================
    // 只计有效工序; 工作中心缺省费率由此处解析后交给计算器

    /// 完整计算 (工时、成本、负荷、交货周期与工序明细)
    pub fn calculate(
        &self,
        template_id: &str,
        quantity: i32,
        weight_kg: Option<f64>,
    ) -> ApiResult<RoutingCalculation> {
        let snapshot = self.require_snapshot(template_id)?;
        let rates = self.work_center_rates(&snapshot)?;
        Ok(self
            .calculator
            .calculate(&snapshot, quantity, weight_kg, &rates))
    }

    pub fn calculate_total_hours(
        &self,
        template_id: &str,
        quantity: i32,
        weight_kg: Option<f64>,
    ) -> ApiResult<f64> {
        let snapshot = self.require_snapshot(template_id)?;
        Ok(self.calculator.total_hours(&snapshot, quantity, weight_kg))
    }

    pub fn calculate_total_cost(
        &self,
        template_id: &str,
        quantity: i32,
        weight_kg: Option<f64>,
    ) -> ApiResult<f64> {
        Ok(self.calculate(template_id, quantity, weight_kg)?.total_cost)
    }

    /// 工作中心负荷 (work_center_id -> 小时)
    pub fn calculate_work_center_load(
        &self,
        template_id: &str,
        quantity: i32,
    ) -> ApiResult<HashMap<String, f64>> {
        let snapshot = self.require_snapshot(template_id)?;
        Ok(RoutingCalculator::work_center_load(&snapshot, quantity))
    }

    pub fn calculate_lead_time(&self, template_id: &str, quantity: i32) -> ApiResult<Duration> {
        let snapshot = self.require_snapshot(template_id)?;
        Ok(RoutingCalculator::lead_time(&snapshot, quantity))
    }

    // ==========================================
    // 工作中心集成
    // ==========================================

    /// 有效工序用到的工作中心 (去重,按首次出现顺序); 不存在的跳过
    pub fn required_work_centers(&self, template_id: &str) -> ApiResult<Vec<WorkCenter>> {
        let snapshot = self.require_snapshot(template_id)?;
        let mut seen = HashSet::new();
        let mut centers = Vec::new();

        for op in snapshot.active_operations() {
            if !seen.insert(op.work_center_id.as_str()) {
                continue;
            }
            match self.work_centers.find(&op.work_center_id)? {
                Some(wc) => centers.push(wc),
                None => warn!(
                    template_id = %template_id,
                    work_center_id = %op.work_center_id,
                    "工序引用的工作中心不存在"
                ),
            }
        }
        Ok(centers)
    }

    /// 从 start_date 起的前瞻窗口内,所需工作中心是否全部可用
    ///
    /// 任一工作中心不存在、未启用或在窗口内有计划维护即返回 false
    pub fn check_work_center_availability(
        &self,
        template_id: &str,
        start_date: NaiveDate,
    ) -> ApiResult<bool> {
        let snapshot = self.require_snapshot(template_id)?;
        let horizon = start_date + Duration::days(self.config.maintenance_lookahead_days);

        let referenced: HashSet<&str> = snapshot
            .active_operations()
            .map(|op| op.work_center_id.as_str())
            .collect();

        for wc_id in referenced {
            let available = match self.work_centers.find(wc_id)? {
                Some(wc) => wc.is_available() && !wc.has_maintenance_before(horizon),
                None => false,
            };
            if !available {
                debug!(
                    template_id = %template_id,
                    work_center_id = %wc_id,
                    horizon = %horizon,
                    "工作中心在窗口内不可用"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 单件工时占工作中心日产能的百分比
    ///
    /// 每道有效工序计 (准备 + 单件加工) / 60 小时; 日产能 <= 0 的工作中心不计
    pub fn work_center_utilization(&self, template_id: &str) -> ApiResult<HashMap<String, f64>> {
        let snapshot = self.require_snapshot(template_id)?;

        let mut hours_by_wc: HashMap<&str, f64> = HashMap::new();
        for op in snapshot.active_operations() {
            *hours_by_wc.entry(op.work_center_id.as_str()).or_insert(0.0) +=
                (op.setup_time_minutes + op.processing_time_per_unit) / 60.0;
        }

        let mut utilization = HashMap::new();
        for (wc_id, hours) in hours_by_wc {
            let Some(wc) = self.work_centers.find(wc_id)? else {
                continue;
            };
            if wc.daily_capacity_hours <= 0.0 {
                continue;
            }
            utilization.insert(wc_id.to_string(), hours / wc.daily_capacity_hours * 100.0);
        }
        Ok(utilization)
    }
}
