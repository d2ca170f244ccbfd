// ==========================================
// 工艺路线模板引擎 - 模板消费方模型
// ==========================================
// 消费方: 生产包 (Package) 及其明细行 (LineItem)
// 引擎只写入模板/工序引用,不管理其生命周期
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Package - 生产包
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub package_id: String,
    pub org_id: String,
    pub package_number: String,
    pub routing_template_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub last_modified_at: NaiveDateTime,
}

// ==========================================
// LineItem - 生产包明细行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub line_item_id: String,
    pub package_id: String,
    pub description: String,
    pub quantity: i32,
    pub routing_operation_id: Option<String>,
    pub is_deleted: bool,
    pub last_modified_at: NaiveDateTime,
}

// ==========================================
// LineItemDraft - 由模板生成的明细草稿
// ==========================================
// 未持久化,由调用方决定写入哪个生产包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDraft {
    pub routing_operation_id: String,
    pub description: String, // 工序名称
    pub quantity: i32,
    pub minutes: i64, // ProcessingTimePerUnit × 60, 截断取整
}

// ==========================================
// TemplateUsage - 模板使用统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateUsage {
    pub template_id: String,
    pub usage_count: i64,
}
