use crate::config::engine_config::{FixedSetupPolicy, RoutingEngineConfig};
use crate::domain::routing::{RoutingOperation, TemplateSnapshot, DEFAULT_EFFICIENCY_PCT};
use crate::domain::types::CalculationMethod;
use chrono::Duration;
use std::collections::HashMap;
use tracing::debug;

use super::report::{minutes_to_duration, OperationBreakdown, RoutingCalculation};

// ==========================================
// RoutingCalculator - 工时与成本计算器
// ==========================================
// 只计算有效工序,按工序号顺序
pub struct RoutingCalculator {
    config: RoutingEngineConfig,
}

impl RoutingCalculator {
    pub fn new(config: RoutingEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingEngineConfig {
        &self.config
    }

    // ==========================================
    // 汇总计算
    // ==========================================

    /// 计算模板的全部派生量
    ///
    /// # 参数
    /// - `snapshot`: 模板快照
    /// - `quantity`: 数量 (<= 0 时不计准备与按件加工)
    /// - `weight_kg`: 重量,仅按重量计时的工序使用
    /// - `work_center_rates`: 工作中心缺省小时费率 (工序自身费率缺失时回退)
    pub fn calculate(
        &self,
        snapshot: &TemplateSnapshot,
        quantity: i32,
        weight_kg: Option<f64>,
        work_center_rates: &HashMap<String, f64>,
    ) -> RoutingCalculation {
        let mut operations = Vec::new();
        let mut total_hours = 0.0;
        let mut total_cost = 0.0;
        let mut lead_time_minutes = 0.0;

        for op in snapshot.active_operations() {
            let hours = self.operation_hours(op, quantity, weight_kg);
            let hourly_rate = Self::effective_hourly_rate(op, work_center_rates);
            let cost = Self::operation_cost(op, hours, hourly_rate, quantity);
            let lead = Self::operation_lead_minutes(op, quantity);

            total_hours += hours;
            total_cost += cost;
            lead_time_minutes += lead;

            operations.push(OperationBreakdown {
                operation_id: op.operation_id.clone(),
                operation_code: op.operation_code.clone(),
                work_center_id: op.work_center_id.clone(),
                hours,
                hourly_rate,
                cost,
                lead_time_minutes: lead,
            });
        }

        let result = RoutingCalculation {
            template_id: snapshot.template.template_id.clone(),
            quantity,
            weight_kg,
            total_hours,
            total_cost,
            work_center_load: Self::work_center_load(snapshot, quantity),
            lead_time_minutes,
            operations,
        };

        debug!(
            template_id = %result.template_id,
            quantity,
            total_hours = result.total_hours,
            total_cost = result.total_cost,
            lead_time_minutes = result.lead_time_minutes,
            "模板计算完成"
        );

        result
    }

    /// 总工时 (小时)
    pub fn total_hours(
        &self,
        snapshot: &TemplateSnapshot,
        quantity: i32,
        weight_kg: Option<f64>,
    ) -> f64 {
        snapshot
            .active_operations()
            .map(|op| self.operation_hours(op, quantity, weight_kg))
            .sum()
    }

    /// 工作中心负荷: 只计按件加工时间,不含准备/搬运/等待,不做效率修正
    pub fn work_center_load(snapshot: &TemplateSnapshot, quantity: i32) -> HashMap<String, f64> {
        let quantity = f64::from(quantity.max(0));
        let mut load: HashMap<String, f64> = HashMap::new();

        for op in snapshot.active_operations() {
            *load.entry(op.work_center_id.clone()).or_insert(0.0) +=
                op.processing_time_per_unit * quantity / 60.0;
        }

        load
    }

    /// 交货周期: 可并行工序不计入
    pub fn lead_time(snapshot: &TemplateSnapshot, quantity: i32) -> Duration {
        let minutes: f64 = snapshot
            .active_operations()
            .map(|op| Self::operation_lead_minutes(op, quantity))
            .sum();
        minutes_to_duration(minutes)
    }

    // ==========================================
    // 单工序计算
    // ==========================================

    /// 单工序工时 (小时,已做效率修正)
    pub fn operation_hours(
        &self,
        op: &RoutingOperation,
        quantity: i32,
        weight_kg: Option<f64>,
    ) -> f64 {
        let mut minutes = 0.0;

        if quantity > 0 {
            minutes += op.setup_time_minutes;
        }

        minutes += match op.calculation_method {
            CalculationMethod::PerUnit => op.processing_time_per_unit * f64::from(quantity.max(0)),
            CalculationMethod::PerWeight => weight_kg
                .map(|w| op.processing_time_per_kg * w)
                .unwrap_or(0.0),
            // 固定工时与数量无关,数量为 0 也计入
            CalculationMethod::Fixed => {
                let flat = op.movement_time_minutes + op.waiting_time_minutes;
                match self.config.fixed_setup_policy {
                    FixedSetupPolicy::LegacyDoubleCount => op.setup_time_minutes + flat,
                    FixedSetupPolicy::SingleCount => flat,
                }
            }
        };

        let efficiency = self.effective_efficiency(op.efficiency_factor);
        minutes / 60.0 * (100.0 / efficiency)
    }

    /// 效率系数 <= 0 (或非数) 时使用配置缺省值
    fn effective_efficiency(&self, factor: f64) -> f64 {
        if factor.is_finite() && factor > 0.0 {
            return factor;
        }
        let fallback = self.config.default_efficiency_pct;
        if fallback.is_finite() && fallback > 0.0 {
            fallback
        } else {
            DEFAULT_EFFICIENCY_PCT
        }
    }

    /// 小时费率优先级: 覆写费率 > 工序费率 > 工作中心缺省费率 > 0
    pub fn effective_hourly_rate(
        op: &RoutingOperation,
        work_center_rates: &HashMap<String, f64>,
    ) -> f64 {
        if let Some(rate) = op.override_hourly_rate.filter(|r| *r > 0.0) {
            return rate;
        }
        if op.hourly_rate > 0.0 {
            return op.hourly_rate;
        }
        work_center_rates
            .get(&op.work_center_id)
            .copied()
            .filter(|r| *r > 0.0)
            .unwrap_or(0.0)
    }

    fn operation_cost(op: &RoutingOperation, hours: f64, hourly_rate: f64, quantity: i32) -> f64 {
        hours * hourly_rate + op.material_cost_per_unit * f64::from(quantity.max(0)) + op.tooling_cost
    }

    fn operation_lead_minutes(op: &RoutingOperation, quantity: i32) -> f64 {
        if op.can_run_in_parallel {
            return 0.0;
        }
        op.setup_time_minutes
            + op.processing_time_per_unit * f64::from(quantity.max(0))
            + op.movement_time_minutes
            + op.waiting_time_minutes
    }
}
