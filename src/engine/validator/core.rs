// ==========================================
// 工艺路线模板引擎 - 结构校验器
// ==========================================
// 检查顺序:
// 1. 编码、名称非空
// 2. 至少一道工序 (且至少一道有效工序)
// 3. 每道工序的工作中心存在且启用
// 4. 前序工序必须属于同一模板
// 5. 沿前序链遍历无环 (每个起点独立的已访问集合)
// ==========================================

use crate::domain::routing::{RoutingOperation, TemplateSnapshot};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::report::{ValidationError, ValidationErrorKind};

// ==========================================
// TemplateValidator - 结构校验器
// ==========================================
// 无状态,可并发调用
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateValidator;

impl TemplateValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验模板快照
    ///
    /// # 参数
    /// - `snapshot`: 模板快照 (含全部工序)
    /// - `available_work_centers`: 存在且启用的工作中心ID集合
    ///
    /// # 返回
    /// - 空列表: 结构有效
    /// - 非空: 按检查顺序排列的问题列表
    pub fn validate(
        &self,
        snapshot: &TemplateSnapshot,
        available_work_centers: &HashSet<String>,
    ) -> Vec<ValidationError> {
        let template = &snapshot.template;
        let operations = &snapshot.operations;
        let mut errors = Vec::new();

        // 1. 必填字段
        if template.code.trim().is_empty() {
            errors.push(ValidationError::template(
                ValidationErrorKind::MissingCode,
                "模板编码不能为空",
            ));
        }
        if template.name.trim().is_empty() {
            errors.push(ValidationError::template(
                ValidationErrorKind::MissingName,
                "模板名称不能为空",
            ));
        }

        // 2. 工序数量
        if operations.is_empty() {
            errors.push(ValidationError::template(
                ValidationErrorKind::NoOperations,
                "模板至少需要一道工序",
            ));
        } else if !operations.iter().any(|op| op.is_active) {
            errors.push(ValidationError::template(
                ValidationErrorKind::NoActiveOperation,
                "模板至少需要一道有效工序",
            ));
        }

        // 3. 工作中心可用性
        for op in operations {
            if !available_work_centers.contains(&op.work_center_id) {
                errors.push(ValidationError::operation(
                    ValidationErrorKind::WorkCenterUnavailable,
                    &op.operation_code,
                    format!("工序 {} 的工作中心不可用", op.operation_code),
                ));
            }
        }

        let index: HashMap<&str, &RoutingOperation> = operations
            .iter()
            .map(|op| (op.operation_id.as_str(), op))
            .collect();

        // 4. 前序工序归属
        for op in operations {
            if let Some(prev_id) = op.previous_operation_id.as_deref() {
                if !index.contains_key(prev_id) {
                    errors.push(ValidationError::operation(
                        ValidationErrorKind::DanglingPredecessor,
                        &op.operation_code,
                        format!("工序 {} 的前序工序不属于本模板", op.operation_code),
                    ));
                }
            }
        }

        // 5. 依赖环
        for op in operations {
            if Self::has_circular_dependency(op, &index) {
                errors.push(ValidationError::operation(
                    ValidationErrorKind::CircularDependency,
                    &op.operation_code,
                    format!("工序 {} 存在循环依赖", op.operation_code),
                ));
            }
        }

        if errors.is_empty() {
            debug!(template_id = %template.template_id, "模板结构校验通过");
        } else {
            warn!(
                template_id = %template.template_id,
                code = %template.code,
                error_count = errors.len(),
                "模板结构校验未通过"
            );
        }

        errors
    }

    /// 从 `start` 沿前序链遍历,重复访问即为环
    ///
    /// 已访问集合只在本次遍历内有效; 多个工序共享同一祖先不构成环。
    /// 前序ID不在本模板时遍历终止 (由归属检查单独报告)。
    pub fn has_circular_dependency<'a>(
        start: &'a RoutingOperation,
        index: &HashMap<&'a str, &'a RoutingOperation>,
    ) -> bool {
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut current = start;

        loop {
            if !seen.insert(current.operation_id.as_str()) {
                return true;
            }

            match current
                .previous_operation_id
                .as_deref()
                .and_then(|prev_id| index.get(prev_id))
            {
                Some(prev) => current = *prev,
                None => return false,
            }
        }
    }
}
