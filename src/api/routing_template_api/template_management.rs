use super::*;
use crate::domain::routing::INITIAL_VERSION;
use crate::domain::types::ApprovalStatus;

impl RoutingTemplateApi {
    // ==========================================
    // 模板管理接口
    // ==========================================

    /// 创建模板
    ///
    /// # 说明
    /// - 编码、名称必填; 同组织内编码唯一
    /// - 总是分配新ID,调用方传入的 template_id 被忽略
    /// - 审批字段一律重置: 草稿、未启用、无工序、预估工时 0
    ///
    /// # 返回
    /// - Ok(RoutingTemplate): 已持久化的模板
    /// - Err(ApiError::DuplicateCode): 编码已存在
    pub fn create_template(
        &self,
        mut template: RoutingTemplate,
        actor: &str,
    ) -> ApiResult<RoutingTemplate> {
        if template.code.trim().is_empty() {
            return Err(ApiError::InvalidInput("模板编码不能为空".to_string()));
        }
        if template.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("模板名称不能为空".to_string()));
        }
        self.ensure_code_available(&template.org_id, &template.code, None)?;

        let now = Self::now();
        template.template_id = uuid::Uuid::new_v4().to_string();
        if template.version.trim().is_empty() {
            template.version = INITIAL_VERSION.to_string();
        }
        template.approval_status = ApprovalStatus::Draft;
        template.is_active = false;
        template.is_deleted = false;
        template.estimated_total_hours = 0.0;
        template.submitted_by = None;
        template.submitted_at = None;
        template.approved_by = None;
        template.approval_date = None;
        template.rejected_by = None;
        template.rejected_at = None;
        template.created_by = Some(actor.to_string());
        template.created_at = now;
        template.last_modified_by = Some(actor.to_string());
        template.last_modified_at = now;

        self.template_repo.save(&template)?;

        self.record_action(
            &template.template_id,
            TemplateActionType::Create,
            actor,
            Some(serde_json::json!({
                "org_id": template.org_id,
                "code": template.code,
                "version": template.version,
            })),
            Some(format!("创建模板: {}", template.code)),
        );

        Ok(template)
    }

    /// 更新模板元数据
    ///
    /// 审批状态、启用标志、预估工时沿用库内值,只能通过对应接口修改
    pub fn update_template(
        &self,
        template: RoutingTemplate,
        actor: &str,
    ) -> ApiResult<RoutingTemplate> {
        let existing = self.require_template(&template.template_id)?;

        if template.code.trim().is_empty() || template.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("模板编码与名称不能为空".to_string()));
        }
        if template.code != existing.code {
            self.ensure_code_available(&existing.org_id, &template.code, Some(&existing.template_id))?;
        }

        let mut updated = existing.clone();
        updated.code = template.code;
        updated.name = template.name;
        updated.description = template.description;
        updated.template_type = template.template_type;
        updated.product_category = template.product_category;
        updated.material_type = template.material_type;
        updated.complexity_level = template.complexity_level;
        updated.default_efficiency_pct = template.default_efficiency_pct;
        updated.includes_welding = template.includes_welding;
        updated.includes_quality_control = template.includes_quality_control;
        updated.is_default = template.is_default;
        updated.notes = template.notes;
        if !template.version.trim().is_empty() {
            updated.version = template.version;
        }
        updated.touch(Some(actor), Self::now());

        self.template_repo.save(&updated)?;
        Ok(updated)
    }

    /// 查询模板 (未删除)
    pub fn get_template(&self, template_id: &str) -> ApiResult<RoutingTemplate> {
        self.require_template(template_id)
    }

    /// 按组织内编码查询
    pub fn get_template_by_code(&self, code: &str, org_id: &str) -> ApiResult<RoutingTemplate> {
        self.template_repo
            .find_by_code(code, org_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模板(code={}, org={})不存在", code, org_id)))
    }

    /// 模板快照 (元数据 + 全部工序,按工序号排序)
    pub fn get_snapshot(&self, template_id: &str) -> ApiResult<TemplateSnapshot> {
        self.require_snapshot(template_id)
    }

    /// 组织内模板列表,按编码排序
    pub fn list_templates(
        &self,
        org_id: &str,
        include_inactive: bool,
    ) -> ApiResult<Vec<RoutingTemplate>> {
        let templates = self.template_repo.list_by_org(org_id)?;
        Ok(templates
            .into_iter()
            .filter(|t| include_inactive || t.is_active)
            .collect())
    }

    /// 启用中的模板,按名称排序
    pub fn list_active(&self, org_id: &str) -> ApiResult<Vec<RoutingTemplate>> {
        self.list_sorted_by_name(org_id, |t| t.is_active)
    }

    pub fn list_by_type(
        &self,
        org_id: &str,
        template_type: TemplateType,
    ) -> ApiResult<Vec<RoutingTemplate>> {
        self.list_sorted_by_name(org_id, |t| t.template_type == template_type)
    }

    pub fn list_by_category(&self, org_id: &str, category: &str) -> ApiResult<Vec<RoutingTemplate>> {
        self.list_sorted_by_name(org_id, |t| t.product_category.as_deref() == Some(category))
    }

    /// 软删除模板
    ///
    /// # 返回
    /// - Err(NotFound): 模板不存在或已删除
    /// - Err(BusinessRuleViolation): 仍被生产包引用
    pub fn delete_template(&self, template_id: &str, actor: &str) -> ApiResult<()> {
        let template = self.require_template(template_id)?;
        if !self.can_delete(template_id)? {
            return Err(ApiError::BusinessRuleViolation(format!(
                "模板 {} 仍被生产包引用,不能删除",
                template.code
            )));
        }

        if !self.template_repo.soft_delete(template_id)? {
            return Err(ApiError::NotFound(format!("模板(id={})不存在", template_id)));
        }

        self.record_action(
            template_id,
            TemplateActionType::SoftDelete,
            actor,
            None,
            Some(format!("删除模板: {}", template.code)),
        );
        Ok(())
    }

    /// 批量软删除; 跳过不存在或仍被引用的模板,返回实际删除数
    pub fn bulk_delete(&self, template_ids: &[String], actor: &str) -> ApiResult<usize> {
        let mut deleted = 0;
        for id in template_ids {
            match self.delete_template(id, actor) {
                Ok(()) => deleted += 1,
                Err(ApiError::NotFound(_)) | Err(ApiError::BusinessRuleViolation(_)) => {
                    debug!(template_id = %id, "批量删除跳过");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(deleted)
    }

    /// 启用模板 (仅已批准模板)
    pub fn activate(&self, template_id: &str, actor: &str) -> ApiResult<RoutingTemplate> {
        let mut template = self.require_template(template_id)?;
        if !template.is_approved() {
            return Err(ApiError::InvalidStateTransition {
                from: template.approval_status.to_string(),
                to: "ACTIVE".to_string(),
            });
        }
        if template.is_active {
            return Ok(template);
        }

        template.is_active = true;
        template.touch(Some(actor), Self::now());
        self.template_repo.save(&template)?;

        self.record_action(template_id, TemplateActionType::Activate, actor, None, None);
        Ok(template)
    }

    /// 停用模板
    pub fn deactivate(&self, template_id: &str, actor: &str) -> ApiResult<RoutingTemplate> {
        let mut template = self.require_template(template_id)?;
        if !template.is_active {
            return Ok(template);
        }

        template.is_active = false;
        template.touch(Some(actor), Self::now());
        self.template_repo.save(&template)?;

        self.record_action(template_id, TemplateActionType::Deactivate, actor, None, None);
        Ok(template)
    }

    /// 批量启用; 跳过不存在、未批准或已启用的模板,返回实际变更数
    pub fn bulk_activate(&self, template_ids: &[String], actor: &str) -> ApiResult<usize> {
        let mut changed = 0;
        for id in template_ids {
            let Some(template) = self.template_repo.find_by_id(id)? else {
                continue;
            };
            if template.is_active || !template.is_approved() {
                continue;
            }
            self.activate(id, actor)?;
            changed += 1;
        }
        Ok(changed)
    }

    /// 批量停用; 返回实际变更数
    pub fn bulk_deactivate(&self, template_ids: &[String], actor: &str) -> ApiResult<usize> {
        let mut changed = 0;
        for id in template_ids {
            let Some(template) = self.template_repo.find_by_id(id)? else {
                continue;
            };
            if !template.is_active {
                continue;
            }
            self.deactivate(id, actor)?;
            changed += 1;
        }
        Ok(changed)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    pub(super) fn ensure_code_available(
        &self,
        org_id: &str,
        code: &str,
        except_template_id: Option<&str>,
    ) -> ApiResult<()> {
        // 软删除的模板仍占用编码 (UNIQUE(org_id, code))
        match self.template_repo.find_code_owner(code, org_id)? {
            Some(owner_id) if Some(owner_id.as_str()) != except_template_id => {
                Err(ApiError::DuplicateCode {
                    org_id: org_id.to_string(),
                    code: code.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub(super) fn list_sorted_by_name(
        &self,
        org_id: &str,
        predicate: impl Fn(&RoutingTemplate) -> bool,
    ) -> ApiResult<Vec<RoutingTemplate>> {
        let mut templates: Vec<RoutingTemplate> = self
            .template_repo
            .list_by_org(org_id)?
            .into_iter()
            .filter(|t| predicate(t))
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        Ok(templates)
    }
}
