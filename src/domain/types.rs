// ==========================================
// 工艺路线模板引擎 - 领域类型定义
// ==========================================
// 职责: 审批状态、计算方式等封闭枚举
// 红线: 状态与计算方式一律用枚举,不做字符串比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 审批状态 (Approval Status)
// ==========================================
// 流转: Draft -> Pending -> Approved / Rejected
//       Rejected -> Pending (重新提交)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Draft,    // 草稿
    Pending,  // 待审批
    Approved, // 已批准
    Rejected, // 已驳回
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl ApprovalStatus {
    /// 从数据库字符串解析（未知值按草稿处理）
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => ApprovalStatus::Pending,
            "APPROVED" => ApprovalStatus::Approved,
            "REJECTED" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Draft,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "DRAFT",
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

// ==========================================
// 审批动作 (Template Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    Submit,  // 提交审批
    Approve, // 批准
    Reject,  // 驳回
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalAction::Submit => write!(f, "SUBMIT"),
            ApprovalAction::Approve => write!(f, "APPROVE"),
            ApprovalAction::Reject => write!(f, "REJECT"),
        }
    }
}

// ==========================================
// 工时计算方式 (Calculation Method)
// ==========================================
// PerUnit: 按件计时; PerWeight: 按重量计时; Fixed: 固定工时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationMethod {
    PerUnit,
    PerWeight,
    Fixed,
}

impl Default for CalculationMethod {
    fn default() -> Self {
        CalculationMethod::PerUnit
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl CalculationMethod {
    /// 从数据库字符串解析
    ///
    /// 未知值返回 None,由仓储层转换为字段错误,避免静默落入某个分支
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('_', "").as_str() {
            "PERUNIT" => Some(CalculationMethod::PerUnit),
            "PERWEIGHT" => Some(CalculationMethod::PerWeight),
            "FIXED" => Some(CalculationMethod::Fixed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            CalculationMethod::PerUnit => "PER_UNIT",
            CalculationMethod::PerWeight => "PER_WEIGHT",
            CalculationMethod::Fixed => "FIXED",
        }
    }
}

// ==========================================
// 模板类型 (Template Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Standard, // 标准
    Custom,   // 定制
    Express,  // 加急
    Complex,  // 复杂
}

impl Default for TemplateType {
    fn default() -> Self {
        TemplateType::Standard
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl TemplateType {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "CUSTOM" => TemplateType::Custom,
            "EXPRESS" => TemplateType::Express,
            "COMPLEX" => TemplateType::Complex,
            _ => TemplateType::Standard,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TemplateType::Standard => "STANDARD",
            TemplateType::Custom => "CUSTOM",
            TemplateType::Express => "EXPRESS",
            TemplateType::Complex => "COMPLEX",
        }
    }
}

// ==========================================
// 复杂度等级 (Complexity Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
}

impl Default for ComplexityLevel {
    fn default() -> Self {
        ComplexityLevel::Medium
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl ComplexityLevel {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "SIMPLE" => ComplexityLevel::Simple,
            "COMPLEX" => ComplexityLevel::Complex,
            _ => ComplexityLevel::Medium,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "SIMPLE",
            ComplexityLevel::Medium => "MEDIUM",
            ComplexityLevel::Complex => "COMPLEX",
        }
    }
}

// ==========================================
// 工序类型 (Operation Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Processing,     // 加工
    Setup,          // 准备
    QualityControl, // 质检
    Movement,       // 转运
    Waiting,        // 等待
}

impl Default for OperationType {
    fn default() -> Self {
        OperationType::Processing
    }
}

impl OperationType {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "SETUP" => OperationType::Setup,
            "QUALITY_CONTROL" => OperationType::QualityControl,
            "MOVEMENT" => OperationType::Movement,
            "WAITING" => OperationType::Waiting,
            _ => OperationType::Processing,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            OperationType::Processing => "PROCESSING",
            OperationType::Setup => "SETUP",
            OperationType::QualityControl => "QUALITY_CONTROL",
            OperationType::Movement => "MOVEMENT",
            OperationType::Waiting => "WAITING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_status_db_roundtrip_and_default() {
        assert_eq!(ApprovalStatus::from_db_str("pending"), ApprovalStatus::Pending);
        assert_eq!(ApprovalStatus::from_db_str(" APPROVED "), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from_db_str("garbage"), ApprovalStatus::Draft);
        assert_eq!(ApprovalStatus::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn test_calculation_method_rejects_typos() {
        assert_eq!(CalculationMethod::from_db_str("PerUnit"), Some(CalculationMethod::PerUnit));
        assert_eq!(CalculationMethod::from_db_str("PER_WEIGHT"), Some(CalculationMethod::PerWeight));
        assert_eq!(CalculationMethod::from_db_str("fixed"), Some(CalculationMethod::Fixed));
        assert_eq!(CalculationMethod::from_db_str("PerUnitt"), None);
    }
}
