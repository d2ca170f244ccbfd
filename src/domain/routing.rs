// ==========================================
// 工艺路线模板引擎 - 路线模板领域模型
// ==========================================
// 依据: routing_template / routing_operation 表
// ==========================================
// 模板拥有工序: 工序通过 template_id 反向引用模板,
// 前序工序通过 previous_operation_id 引用,不嵌套对象图
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ApprovalStatus, CalculationMethod, ComplexityLevel, OperationType, TemplateType,
};

/// 新模板/复制模板的初始版本号
pub const INITIAL_VERSION: &str = "1.0";

/// 效率系数缺省值 (100 = 标准效率)
pub const DEFAULT_EFFICIENCY_PCT: f64 = 100.0;

// ==========================================
// RoutingTemplate - 工艺路线模板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingTemplate {
    // ===== 标识 =====
    pub template_id: String,
    pub org_id: String, // 所属组织 (code 在组织内唯一)
    pub code: String,
    pub name: String,
    pub description: Option<String>,

    // ===== 分类 =====
    pub template_type: TemplateType,
    pub product_category: Option<String>, // 产品类别 (型钢/板材/管材...)
    pub material_type: Option<String>,    // 材质 (碳钢/不锈钢...)
    pub complexity_level: ComplexityLevel,

    // ===== 工艺属性 =====
    pub default_efficiency_pct: f64,
    pub includes_welding: bool,
    pub includes_quality_control: bool,

    // ===== 版本与状态 =====
    pub version: String, // 自由格式版本号
    pub approval_status: ApprovalStatus,
    pub is_active: bool,
    pub is_default: bool,
    pub is_deleted: bool,

    // ===== 派生缓存 =====
    pub estimated_total_hours: f64, // 工序变更时重算

    // ===== 审批留痕 =====
    pub submitted_by: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub approval_date: Option<NaiveDateTime>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<NaiveDateTime>,
    pub notes: Option<String>,

    // ===== 审计 =====
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_modified_by: Option<String>,
    pub last_modified_at: NaiveDateTime,
}

impl RoutingTemplate {
    /// 创建草稿模板 (未激活、无工序)
    pub fn new_draft(org_id: &str, code: &str, name: &str) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            template_id: uuid::Uuid::new_v4().to_string(),
            org_id: org_id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            template_type: TemplateType::default(),
            product_category: None,
            material_type: None,
            complexity_level: ComplexityLevel::default(),
            default_efficiency_pct: DEFAULT_EFFICIENCY_PCT,
            includes_welding: false,
            includes_quality_control: true,
            version: INITIAL_VERSION.to_string(),
            approval_status: ApprovalStatus::Draft,
            is_active: false,
            is_default: false,
            is_deleted: false,
            estimated_total_hours: 0.0,
            submitted_by: None,
            submitted_at: None,
            approved_by: None,
            approval_date: None,
            rejected_by: None,
            rejected_at: None,
            notes: None,
            created_by: None,
            created_at: now,
            last_modified_by: None,
            last_modified_at: now,
        }
    }

    /// 是否可用于生产 (仅已批准模板)
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    /// 记录修改人与修改时间
    pub fn touch(&mut self, actor: Option<&str>, at: NaiveDateTime) {
        if let Some(actor) = actor {
            self.last_modified_by = Some(actor.to_string());
        }
        self.last_modified_at = at;
    }
}

// ==========================================
// RoutingOperation - 工序
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingOperation {
    // ===== 标识 =====
    pub operation_id: String,
    pub template_id: String,
    pub sequence_number: i32, // 默认执行顺序
    pub operation_code: String,
    pub operation_name: String,
    pub description: Option<String>,
    pub operation_type: OperationType,

    // ===== 资源引用 (不拥有) =====
    pub work_center_id: String,
    pub machine_center_id: Option<String>,

    // ===== 工时 (分钟) =====
    pub calculation_method: CalculationMethod,
    pub setup_time_minutes: f64,
    pub processing_time_per_unit: f64,
    pub processing_time_per_kg: f64,
    pub movement_time_minutes: f64,
    pub waiting_time_minutes: f64,
    pub efficiency_factor: f64, // 百分比,<=0 视为 100

    // ===== 人员与质检 =====
    pub required_operators: i32,
    pub required_skill_level: Option<String>,
    pub requires_inspection: bool,
    pub inspection_percentage: f64,

    // ===== 依赖 =====
    pub can_run_in_parallel: bool,
    pub previous_operation_id: Option<String>, // 同一模板内的前序工序

    // ===== 成本 =====
    pub hourly_rate: f64,
    pub override_hourly_rate: Option<f64>,
    pub material_cost_per_unit: f64,
    pub tooling_cost: f64, // 一次性费用,不随数量放大
    pub scrap_percentage: f64,

    // ===== 作业说明 =====
    pub work_instructions: Option<String>,
    pub safety_notes: Option<String>,
    pub quality_notes: Option<String>,

    // ===== 标志 =====
    pub is_active: bool,
    pub is_optional: bool,
    pub is_critical_path: bool,

    // ===== 审计 =====
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_modified_by: Option<String>,
    pub last_modified_at: NaiveDateTime,
}

impl RoutingOperation {
    /// 创建工序 (按件计时、标准效率)
    pub fn new(template_id: &str, sequence_number: i32, code: &str, work_center_id: &str) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            operation_id: uuid::Uuid::new_v4().to_string(),
            template_id: template_id.to_string(),
            sequence_number,
            operation_code: code.to_string(),
            operation_name: code.to_string(),
            description: None,
            operation_type: OperationType::default(),
            work_center_id: work_center_id.to_string(),
            machine_center_id: None,
            calculation_method: CalculationMethod::PerUnit,
            setup_time_minutes: 0.0,
            processing_time_per_unit: 0.0,
            processing_time_per_kg: 0.0,
            movement_time_minutes: 0.0,
            waiting_time_minutes: 0.0,
            efficiency_factor: DEFAULT_EFFICIENCY_PCT,
            required_operators: 1,
            required_skill_level: None,
            requires_inspection: false,
            inspection_percentage: 0.0,
            can_run_in_parallel: false,
            previous_operation_id: None,
            hourly_rate: 0.0,
            override_hourly_rate: None,
            material_cost_per_unit: 0.0,
            tooling_cost: 0.0,
            scrap_percentage: 0.0,
            work_instructions: None,
            safety_notes: None,
            quality_notes: None,
            is_active: true,
            is_optional: false,
            is_critical_path: false,
            created_by: None,
            created_at: now,
            last_modified_by: None,
            last_modified_at: now,
        }
    }
}

// ==========================================
// TemplateSnapshot - 模板快照
// ==========================================
// 纯计算/校验的输入: 模板元数据 + 全部工序 (按工序号排序)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub template: RoutingTemplate,
    pub operations: Vec<RoutingOperation>,
}

impl TemplateSnapshot {
    /// 构造快照并按工序号排序
    pub fn new(template: RoutingTemplate, mut operations: Vec<RoutingOperation>) -> Self {
        operations.sort_by(|a, b| {
            a.sequence_number
                .cmp(&b.sequence_number)
                .then_with(|| a.operation_code.cmp(&b.operation_code))
        });
        Self {
            template,
            operations,
        }
    }

    /// 有效工序 (按工序号顺序)
    pub fn active_operations(&self) -> impl Iterator<Item = &RoutingOperation> {
        self.operations.iter().filter(|op| op.is_active)
    }

    /// 按ID查找工序
    pub fn operation(&self, operation_id: &str) -> Option<&RoutingOperation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }

    /// 下一个可用工序号 (当前最大值 + 10)
    pub fn next_sequence_number(&self) -> i32 {
        self.operations
            .iter()
            .map(|op| op.sequence_number)
            .max()
            .unwrap_or(0)
            + 10
    }
}
