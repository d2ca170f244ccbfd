// ==========================================
// 工艺路线模板引擎 - 操作日志领域模型
// ==========================================
// 红线: 审批流转、复制、删除必须留痕
// 对齐: routing_action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// TemplateActionLog - 模板操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateActionLog {
    pub action_id: String,
    pub template_id: String,
    pub action_type: String,      // TemplateActionType 的字符串形式
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl TemplateActionLog {
    /// 以当前时间创建日志
    pub fn now(
        template_id: &str,
        action_type: TemplateActionType,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            template_id: template_id.to_string(),
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}

// ==========================================
// TemplateActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateActionType {
    Create,
    SubmitForApproval,
    Approve,
    Reject,
    Activate,
    Deactivate,
    Copy,
    CreateVersion,
    SoftDelete,
    ApplyToPackage,
}

impl fmt::Display for TemplateActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateActionType::Create => "CREATE",
            TemplateActionType::SubmitForApproval => "SUBMIT_FOR_APPROVAL",
            TemplateActionType::Approve => "APPROVE",
            TemplateActionType::Reject => "REJECT",
            TemplateActionType::Activate => "ACTIVATE",
            TemplateActionType::Deactivate => "DEACTIVATE",
            TemplateActionType::Copy => "COPY",
            TemplateActionType::CreateVersion => "CREATE_VERSION",
            TemplateActionType::SoftDelete => "SOFT_DELETE",
            TemplateActionType::ApplyToPackage => "APPLY_TO_PACKAGE",
        };
        f.write_str(s)
    }
}
