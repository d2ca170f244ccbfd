use super::*;
use crate::domain::types::ApprovalAction;
use crate::engine::ValidationError;

impl RoutingTemplateApi {
    // ==========================================
    // 校验与审批接口
    // ==========================================

    /// 结构校验; 问题以列表返回,不作为错误
    ///
    /// # 返回
    /// - Ok(空列表): 结构有效
    /// - Err(NotFound): 模板不存在或已删除
    pub fn validate_template(&self, template_id: &str) -> ApiResult<Vec<ValidationError>> {
        let snapshot = self.require_snapshot(template_id)?;
        let available = self.available_work_centers(&snapshot)?;
        Ok(self.validator.validate(&snapshot, &available))
    }

    pub fn is_valid(&self, template_id: &str) -> ApiResult<bool> {
        Ok(self.validate_template(template_id)?.is_empty())
    }

    /// 提交审批 (Draft / Rejected -> Pending),不做结构校验
    pub fn submit_for_approval(&self, template_id: &str, actor: &str) -> ApiResult<RoutingTemplate> {
        let mut template = self.require_template(template_id)?;
        let from = template.approval_status;

        self.state_machine.submit(&mut template, actor, Self::now())?;
        self.template_repo.save(&template)?;

        self.record_action(
            template_id,
            TemplateActionType::SubmitForApproval,
            actor,
            Some(serde_json::json!({
                "from": from.to_string(),
                "to": template.approval_status.to_string(),
            })),
            None,
        );
        Ok(template)
    }

    /// 批准 (Pending -> Approved),同时启用模板
    ///
    /// # 返回
    /// - Err(InvalidStateTransition): 当前不是待审批
    /// - Err(ValidationFailed): 结构校验未通过,不落库
    pub fn approve(&self, template_id: &str, approver: &str) -> ApiResult<RoutingTemplate> {
        let snapshot = self.require_snapshot(template_id)?;
        let mut template = snapshot.template.clone();

        ApprovalStateMachine::next_status(template.approval_status, ApprovalAction::Approve)?;

        let available = self.available_work_centers(&snapshot)?;
        let errors = self.validator.validate(&snapshot, &available);
        if !errors.is_empty() {
            return Err(ApiError::ValidationFailed(errors));
        }

        self.state_machine.approve(&mut template, approver, Self::now())?;
        self.template_repo.save(&template)?;

        self.record_action(
            template_id,
            TemplateActionType::Approve,
            approver,
            Some(serde_json::json!({
                "from": "PENDING",
                "to": template.approval_status.to_string(),
                "is_active": template.is_active,
            })),
            None,
        );
        Ok(template)
    }

    /// 驳回 (Pending -> Rejected),原因追加到备注
    pub fn reject(
        &self,
        template_id: &str,
        rejector: &str,
        reason: &str,
    ) -> ApiResult<RoutingTemplate> {
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput("驳回原因不能为空".to_string()));
        }

        let mut template = self.require_template(template_id)?;
        self.state_machine
            .reject(&mut template, rejector, reason, Self::now())?;
        self.template_repo.save(&template)?;

        self.record_action(
            template_id,
            TemplateActionType::Reject,
            rejector,
            Some(serde_json::json!({
                "from": "PENDING",
                "to": template.approval_status.to_string(),
            })),
            Some(reason.to_string()),
        );
        Ok(template)
    }

    /// 模板操作日志,最新在前
    pub fn action_history(&self, template_id: &str) -> ApiResult<Vec<TemplateActionLog>> {
        Ok(self.action_log_repo.find_by_template_id(template_id)?)
    }
}
