// ==========================================
// 工艺路线模板引擎 - 模板服务 API
// ==========================================
// 职责: 组合校验器、计算器、审批状态机、复制器与仓储,
//       对外提供模板全部业务操作
// 红线: 校验问题不阻止查看,只阻止审批
// 红线: 非法流转、未找到一律返回错误,不伪装为成功
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::RoutingEngineConfig;
use crate::domain::action_log::{TemplateActionLog, TemplateActionType};
use crate::domain::routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot};
use crate::domain::types::{ComplexityLevel, TemplateType};
use crate::engine::{ApprovalStateMachine, RoutingCalculator, TemplateCloner, TemplateValidator};
use crate::repository::{
    ConsumerRepository, RoutingTemplateRepository, TemplateActionLogRepository, WorkCenterLookup,
};

mod approval;
mod calculation;
mod operations;
mod template_management;
mod usage;
mod versioning;

pub use usage::TemplateUsageRank;

// ==========================================
// TemplateFilter - 组合筛选条件
// ==========================================
// 字段为 None 表示不限制
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateFilter {
    pub template_type: Option<TemplateType>,
    pub product_category: Option<String>,
    pub complexity_level: Option<ComplexityLevel>,
    pub includes_welding: Option<bool>,
    pub is_active: Option<bool>,
}

impl TemplateFilter {
    pub fn matches(&self, t: &RoutingTemplate) -> bool {
        self.template_type.map_or(true, |v| t.template_type == v)
            && self
                .product_category
                .as_deref()
                .map_or(true, |v| t.product_category.as_deref() == Some(v))
            && self.complexity_level.map_or(true, |v| t.complexity_level == v)
            && self.includes_welding.map_or(true, |v| t.includes_welding == v)
            && self.is_active.map_or(true, |v| t.is_active == v)
    }
}

// ==========================================
// RoutingTemplateApi - 模板服务
// ==========================================
pub struct RoutingTemplateApi {
    template_repo: Arc<dyn RoutingTemplateRepository>,
    work_centers: Arc<dyn WorkCenterLookup>,
    consumers: Arc<dyn ConsumerRepository>,
    action_log_repo: Arc<TemplateActionLogRepository>,
    config: RoutingEngineConfig,
    validator: TemplateValidator,
    calculator: RoutingCalculator,
    state_machine: ApprovalStateMachine,
    cloner: TemplateCloner,
}

impl RoutingTemplateApi {
    /// 创建模板服务实例
    pub fn new(
        template_repo: Arc<dyn RoutingTemplateRepository>,
        work_centers: Arc<dyn WorkCenterLookup>,
        consumers: Arc<dyn ConsumerRepository>,
        action_log_repo: Arc<TemplateActionLogRepository>,
        config: RoutingEngineConfig,
    ) -> Self {
        Self {
            template_repo,
            work_centers,
            consumers,
            action_log_repo,
            calculator: RoutingCalculator::new(config.clone()),
            config,
            validator: TemplateValidator::new(),
            state_machine: ApprovalStateMachine::new(),
            cloner: TemplateCloner::new(),
        }
    }

    pub fn config(&self) -> &RoutingEngineConfig {
        &self.config
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 当前时间 (秒精度,与库内格式一致)
    fn now() -> NaiveDateTime {
        let ts = chrono::Local::now().naive_local();
        ts.with_nanosecond(0).unwrap_or(ts)
    }

    fn require_template(&self, template_id: &str) -> ApiResult<RoutingTemplate> {
        self.template_repo
            .find_by_id(template_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模板(id={})不存在", template_id)))
    }

    fn require_snapshot(&self, template_id: &str) -> ApiResult<TemplateSnapshot> {
        let template = self.require_template(template_id)?;
        let operations = self.template_repo.find_operations(template_id)?;
        Ok(TemplateSnapshot::new(template, operations))
    }

    fn require_operation(&self, operation_id: &str) -> ApiResult<RoutingOperation> {
        self.template_repo
            .find_operation(operation_id)?
            .ok_or_else(|| ApiError::NotFound(format!("工序(id={})不存在", operation_id)))
    }

    /// 快照引用的工作中心中,存在且启用的集合
    fn available_work_centers(&self, snapshot: &TemplateSnapshot) -> ApiResult<HashSet<String>> {
        let mut available = HashSet::new();
        let referenced: HashSet<&str> = snapshot
            .operations
            .iter()
            .map(|op| op.work_center_id.as_str())
            .collect();

        for wc_id in referenced {
            if self.work_centers.is_active(wc_id)? {
                available.insert(wc_id.to_string());
            }
        }
        Ok(available)
    }

    /// 有效工序所用工作中心的缺省费率表
    fn work_center_rates(&self, snapshot: &TemplateSnapshot) -> ApiResult<HashMap<String, f64>> {
        let mut rates = HashMap::new();
        for op in snapshot.active_operations() {
            if rates.contains_key(&op.work_center_id) {
                continue;
            }
            if let Some(rate) = self.work_centers.default_hourly_rate(&op.work_center_id)? {
                rates.insert(op.work_center_id.clone(), rate);
            }
        }
        Ok(rates)
    }

    /// 重算并持久化 estimated_total_hours (数量 1,无重量)
    fn refresh_estimated_hours(&self, template_id: &str, actor: Option<&str>) -> ApiResult<f64> {
        let mut snapshot = self.require_snapshot(template_id)?;
        let hours = self.calculator.total_hours(&snapshot, 1, None);

        snapshot.template.estimated_total_hours = hours;
        snapshot.template.touch(actor, Self::now());
        self.template_repo.save(&snapshot.template)?;

        debug!(template_id = %template_id, estimated_total_hours = hours, "预估工时已重算");
        Ok(hours)
    }

    /// 写操作日志; 日志失败不回滚业务写入,只告警
    fn record_action(
        &self,
        template_id: &str,
        action: TemplateActionType,
        actor: &str,
        payload: Option<serde_json::Value>,
        detail: Option<String>,
    ) {
        let log = TemplateActionLog::now(template_id, action, actor, payload, detail);
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(
                template_id = %template_id,
                action = %action,
                error = %e,
                "操作日志写入失败"
            );
        } else {
            info!(template_id = %template_id, action = %action, actor = %actor, "操作已记录");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_all_fields() {
        let mut t = RoutingTemplate::new_draft("ORG1", "WELD", "焊接");
        t.template_type = TemplateType::Complex;
        t.product_category = Some("板材".to_string());
        t.includes_welding = true;

        assert!(TemplateFilter::default().matches(&t));

        let filter = TemplateFilter {
            template_type: Some(TemplateType::Complex),
            product_category: Some("板材".to_string()),
            includes_welding: Some(true),
            is_active: Some(false),
            ..TemplateFilter::default()
        };
        assert!(filter.matches(&t));

        let wrong_category = TemplateFilter {
            product_category: Some("管材".to_string()),
            ..TemplateFilter::default()
        };
        assert!(!wrong_category.matches(&t));

        let wrong_complexity = TemplateFilter {
            complexity_level: Some(ComplexityLevel::Simple),
            ..TemplateFilter::default()
        };
        assert!(!wrong_complexity.matches(&t));
    }
}
