// ==========================================
// 工艺路线模板引擎 - 审批状态机
// ==========================================
// 状态: DRAFT / PENDING / APPROVED / REJECTED
// 流转:
// - 提交: DRAFT | REJECTED -> PENDING
// - 批准: PENDING -> APPROVED (同时启用模板)
// - 驳回: PENDING -> REJECTED (原因追加到备注,启用状态不变)
// ==========================================
// 红线: 非法流转返回错误且不修改模板
// ==========================================

use crate::domain::routing::RoutingTemplate;
use crate::domain::types::{ApprovalAction, ApprovalStatus};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

/// 驳回原因在备注中的前缀
pub const REJECTION_NOTE_PREFIX: &str = "驳回原因: ";

// ==========================================
// TransitionError - 非法流转
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("状态 {from} 不允许执行 {action}")]
pub struct TransitionError {
    pub from: ApprovalStatus,
    pub action: ApprovalAction,
}

// ==========================================
// ApprovalStateMachine - 审批状态机
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// 流转表: 返回目标状态,非法时返回 TransitionError
    pub fn next_status(
        from: ApprovalStatus,
        action: ApprovalAction,
    ) -> Result<ApprovalStatus, TransitionError> {
        match (from, action) {
            (ApprovalStatus::Draft | ApprovalStatus::Rejected, ApprovalAction::Submit) => {
                Ok(ApprovalStatus::Pending)
            }
            (ApprovalStatus::Pending, ApprovalAction::Approve) => Ok(ApprovalStatus::Approved),
            (ApprovalStatus::Pending, ApprovalAction::Reject) => Ok(ApprovalStatus::Rejected),
            _ => Err(TransitionError { from, action }),
        }
    }

    /// 提交审批
    pub fn submit(
        &self,
        template: &mut RoutingTemplate,
        actor: &str,
        at: NaiveDateTime,
    ) -> Result<(), TransitionError> {
        let to = self.guard(template, ApprovalAction::Submit)?;

        template.approval_status = to;
        template.submitted_by = Some(actor.to_string());
        template.submitted_at = Some(at);
        template.touch(Some(actor), at);

        info!(template_id = %template.template_id, actor = %actor, "模板已提交审批");
        Ok(())
    }

    /// 批准: 启用模板并记录审批人与日期
    pub fn approve(
        &self,
        template: &mut RoutingTemplate,
        approver: &str,
        at: NaiveDateTime,
    ) -> Result<(), TransitionError> {
        let to = self.guard(template, ApprovalAction::Approve)?;

        template.approval_status = to;
        template.is_active = true;
        template.approved_by = Some(approver.to_string());
        template.approval_date = Some(at);
        template.touch(Some(approver), at);

        info!(template_id = %template.template_id, approver = %approver, "模板已批准");
        Ok(())
    }

    /// 驳回: 原因追加到备注
    pub fn reject(
        &self,
        template: &mut RoutingTemplate,
        rejector: &str,
        reason: &str,
        at: NaiveDateTime,
    ) -> Result<(), TransitionError> {
        let to = self.guard(template, ApprovalAction::Reject)?;

        template.approval_status = to;
        template.rejected_by = Some(rejector.to_string());
        template.rejected_at = Some(at);
        template.notes = Some(append_note(template.notes.as_deref(), reason));
        template.touch(Some(rejector), at);

        info!(
            template_id = %template.template_id,
            rejector = %rejector,
            reason = %reason,
            "模板已驳回"
        );
        Ok(())
    }

    fn guard(
        &self,
        template: &RoutingTemplate,
        action: ApprovalAction,
    ) -> Result<ApprovalStatus, TransitionError> {
        Self::next_status(template.approval_status, action).map_err(|e| {
            warn!(
                template_id = %template.template_id,
                from = %e.from,
                action = %e.action,
                "拒绝非法审批流转"
            );
            e
        })
    }
}

fn append_note(existing: Option<&str>, reason: &str) -> String {
    let line = format!("{}{}", REJECTION_NOTE_PREFIX, reason);
    match existing {
        Some(notes) if !notes.trim().is_empty() => format!("{}\n\n{}", notes, line),
        _ => line,
    }
}
