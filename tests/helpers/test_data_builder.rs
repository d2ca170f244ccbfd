// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use routing_template_engine::domain::consumer::{LineItem, Package};
use routing_template_engine::domain::routing::{RoutingOperation, RoutingTemplate};
use routing_template_engine::domain::types::{CalculationMethod, ComplexityLevel, TemplateType};
use routing_template_engine::domain::work_center::WorkCenter;

pub const ORG: &str = "ORG1";

pub fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

// ==========================================
// RoutingTemplate 构建器
// ==========================================

pub struct TemplateBuilder {
    template: RoutingTemplate,
}

impl TemplateBuilder {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            template: RoutingTemplate::new_draft(ORG, code, name),
        }
    }

    pub fn org(mut self, org_id: &str) -> Self {
        self.template.org_id = org_id.to_string();
        self
    }

    pub fn template_type(mut self, t: TemplateType) -> Self {
        self.template.template_type = t;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.template.product_category = Some(category.to_string());
        self
    }

    pub fn material(mut self, material: &str) -> Self {
        self.template.material_type = Some(material.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.template.description = Some(description.to_string());
        self
    }

    pub fn complexity(mut self, level: ComplexityLevel) -> Self {
        self.template.complexity_level = level;
        self
    }

    pub fn welding(mut self, welding: bool) -> Self {
        self.template.includes_welding = welding;
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.template.version = version.to_string();
        self
    }

    pub fn build(self) -> RoutingTemplate {
        self.template
    }
}

// ==========================================
// RoutingOperation 构建器
// ==========================================
// template_id 由 add_operation 绑定,这里留空

pub struct OperationBuilder {
    op: RoutingOperation,
}

impl OperationBuilder {
    pub fn new(code: &str, work_center_id: &str) -> Self {
        let mut op = RoutingOperation::new("", 0, code, work_center_id);
        op.operation_name = format!("{}工序", code);
        Self { op }
    }

    pub fn sequence(mut self, seq: i32) -> Self {
        self.op.sequence_number = seq;
        self
    }

    pub fn method(mut self, method: CalculationMethod) -> Self {
        self.op.calculation_method = method;
        self
    }

    pub fn setup(mut self, minutes: f64) -> Self {
        self.op.setup_time_minutes = minutes;
        self
    }

    pub fn per_unit(mut self, minutes: f64) -> Self {
        self.op.processing_time_per_unit = minutes;
        self
    }

    pub fn per_kg(mut self, minutes: f64) -> Self {
        self.op.processing_time_per_kg = minutes;
        self
    }

    pub fn movement(mut self, minutes: f64) -> Self {
        self.op.movement_time_minutes = minutes;
        self
    }

    pub fn waiting(mut self, minutes: f64) -> Self {
        self.op.waiting_time_minutes = minutes;
        self
    }

    pub fn efficiency(mut self, pct: f64) -> Self {
        self.op.efficiency_factor = pct;
        self
    }

    pub fn rate(mut self, rate: f64) -> Self {
        self.op.hourly_rate = rate;
        self
    }

    pub fn override_rate(mut self, rate: f64) -> Self {
        self.op.override_hourly_rate = Some(rate);
        self
    }

    pub fn material_cost(mut self, cost: f64) -> Self {
        self.op.material_cost_per_unit = cost;
        self
    }

    pub fn tooling(mut self, cost: f64) -> Self {
        self.op.tooling_cost = cost;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.op.can_run_in_parallel = true;
        self
    }

    pub fn after(mut self, previous_operation_id: &str) -> Self {
        self.op.previous_operation_id = Some(previous_operation_id.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.op.is_active = false;
        self
    }

    pub fn build(self) -> RoutingOperation {
        self.op
    }
}

// ==========================================
// WorkCenter 构建器
// ==========================================

pub struct WorkCenterBuilder {
    wc: WorkCenter,
}

impl WorkCenterBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            wc: WorkCenter {
                work_center_id: id.to_string(),
                org_id: ORG.to_string(),
                code: id.to_string(),
                name: format!("工作中心{}", id),
                work_center_type: "Production".to_string(),
                daily_capacity_hours: 8.0,
                hourly_rate: 0.0,
                efficiency_pct: 100.0,
                is_active: true,
                is_deleted: false,
                last_maintenance_date: None,
                next_maintenance_date: None,
            },
        }
    }

    pub fn rate(mut self, rate: f64) -> Self {
        self.wc.hourly_rate = rate;
        self
    }

    pub fn capacity(mut self, hours: f64) -> Self {
        self.wc.daily_capacity_hours = hours;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.wc.is_active = false;
        self
    }

    pub fn maintenance_on(mut self, date: NaiveDate) -> Self {
        self.wc.next_maintenance_date = Some(date);
        self
    }

    pub fn build(self) -> WorkCenter {
        self.wc
    }
}

// ==========================================
// Package / LineItem
// ==========================================

pub fn package(id: &str, template_id: Option<&str>, created_at: NaiveDateTime) -> Package {
    Package {
        package_id: id.to_string(),
        org_id: ORG.to_string(),
        package_number: format!("PKG-{}", id),
        routing_template_id: template_id.map(str::to_string),
        is_deleted: false,
        created_at,
        last_modified_at: created_at,
    }
}

pub fn line_item(id: &str, package_id: &str) -> LineItem {
    LineItem {
        line_item_id: id.to_string(),
        package_id: package_id.to_string(),
        description: format!("明细{}", id),
        quantity: 1,
        routing_operation_id: None,
        is_deleted: false,
        last_modified_at: ts(2024, 1, 1),
    }
}
