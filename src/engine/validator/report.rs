use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ValidationErrorKind - 校验问题类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    MissingCode,
    MissingName,
    NoOperations,
    NoActiveOperation,
    WorkCenterUnavailable,
    DanglingPredecessor,
    CircularDependency,
}

// ==========================================
// ValidationError - 校验问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 问题类别
    pub kind: ValidationErrorKind,

    /// 涉及的工序编码 (模板级问题为 None)
    pub operation_code: Option<String>,

    /// 可读描述
    pub message: String,
}

impl ValidationError {
    pub(super) fn template(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation_code: None,
            message: message.into(),
        }
    }

    pub(super) fn operation(
        kind: ValidationErrorKind,
        operation_code: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            operation_code: Some(operation_code.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
