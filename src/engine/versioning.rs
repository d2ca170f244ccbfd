// ==========================================
// 工艺路线模板引擎 - 复制与版本
// ==========================================
// 复制: 深拷贝模板及全部工序,生成新ID,保留前序工序的相对关系
// 新版本: 复制 + 编码 "{code}_v{tag}" + 名称标注版本号
// 版本列表: 编码等于基础编码或以 "{base}_v" 开头的未删除模板
// ==========================================
// 红线: 复制结果一律为未启用草稿,需独立走审批
// ==========================================

use crate::config::engine_config::VersionOrdering;
use crate::domain::routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot, INITIAL_VERSION};
use crate::domain::types::ApprovalStatus;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{info, warn};

// ==========================================
// TemplateCloner - 模板复制器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateCloner;

impl TemplateCloner {
    pub fn new() -> Self {
        Self
    }

    /// 深拷贝模板快照
    ///
    /// # 说明
    /// - 模板与工序均分配新ID
    /// - previous_operation_id 按旧ID -> 新ID 重映射
    /// - 审批状态重置为草稿,未启用,版本号 "1.0"
    pub fn copy(
        &self,
        source: &TemplateSnapshot,
        new_code: &str,
        new_name: &str,
        actor: Option<&str>,
        at: NaiveDateTime,
    ) -> TemplateSnapshot {
        let mut template = source.template.clone();
        template.template_id = uuid::Uuid::new_v4().to_string();
        template.code = new_code.to_string();
        template.name = new_name.to_string();
        template.version = INITIAL_VERSION.to_string();
        template.approval_status = ApprovalStatus::Draft;
        template.is_active = false;
        template.is_default = false;
        template.is_deleted = false;
        template.submitted_by = None;
        template.submitted_at = None;
        template.approved_by = None;
        template.approval_date = None;
        template.rejected_by = None;
        template.rejected_at = None;
        template.created_by = actor.map(str::to_string);
        template.created_at = at;
        template.last_modified_by = actor.map(str::to_string);
        template.last_modified_at = at;

        let id_map: HashMap<&str, String> = source
            .operations
            .iter()
            .map(|op| (op.operation_id.as_str(), uuid::Uuid::new_v4().to_string()))
            .collect();

        let operations: Vec<RoutingOperation> = source
            .operations
            .iter()
            .map(|op| {
                let mut copy = op.clone();
                copy.template_id = template.template_id.clone();
                copy.operation_id = id_map
                    .get(op.operation_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                copy.previous_operation_id = op.previous_operation_id.as_deref().and_then(|prev| {
                    let mapped = id_map.get(prev).cloned();
                    if mapped.is_none() {
                        warn!(
                            operation_code = %op.operation_code,
                            previous_operation_id = %prev,
                            "前序工序不在源模板内,复制时丢弃该依赖"
                        );
                    }
                    mapped
                });
                copy.created_by = actor.map(str::to_string);
                copy.created_at = at;
                copy.last_modified_by = actor.map(str::to_string);
                copy.last_modified_at = at;
                copy
            })
            .collect();

        info!(
            source_id = %source.template.template_id,
            new_id = %template.template_id,
            new_code = %template.code,
            operation_count = operations.len(),
            "模板已复制"
        );

        TemplateSnapshot::new(template, operations)
    }

    /// 基于源模板创建新版本
    ///
    /// 新模板版本号为 `version_tag` (复制本身会重置为 "1.0")
    pub fn new_version(
        &self,
        source: &TemplateSnapshot,
        version_tag: &str,
        actor: Option<&str>,
        at: NaiveDateTime,
    ) -> TemplateSnapshot {
        let code = Self::version_code(&source.template.code, version_tag);
        let name = format!("{} (版本 {})", source.template.name, version_tag);

        let mut snapshot = self.copy(source, &code, &name, actor, at);
        snapshot.template.version = version_tag.to_string();
        snapshot
    }

    /// 版本编码: "{base}_v{tag}"
    pub fn version_code(base_code: &str, version_tag: &str) -> String {
        format!("{}_v{}", base_code, version_tag)
    }

    /// 编码是否属于 `base_code` 的版本族
    pub fn is_version_of(base_code: &str, code: &str) -> bool {
        code == base_code || code.starts_with(&format!("{}_v", base_code))
    }

    /// 筛选并排序版本族 (排除已删除)
    pub fn list_versions(
        templates: Vec<RoutingTemplate>,
        base_code: &str,
        ordering: VersionOrdering,
    ) -> Vec<RoutingTemplate> {
        let mut versions: Vec<RoutingTemplate> = templates
            .into_iter()
            .filter(|t| !t.is_deleted && Self::is_version_of(base_code, &t.code))
            .collect();

        versions.sort_by(|a, b| {
            ordering
                .compare(&a.version, &b.version)
                .then_with(|| a.code.cmp(&b.code))
        });
        versions
    }
}
