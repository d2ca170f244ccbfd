use crate::db::{format_datetime, parse_datetime};
use crate::domain::routing::{RoutingOperation, RoutingTemplate};
use crate::domain::types::{
    ApprovalStatus, CalculationMethod, ComplexityLevel, OperationType, TemplateType,
};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Row, Statement};

// ==========================================
// 列清单 (SELECT 与 map_* 的下标一一对应)
// ==========================================

pub(super) const TEMPLATE_COLUMNS: &str = r#"
    template_id, org_id, code, name, description,
    template_type, product_category, material_type, complexity_level,
    default_efficiency_pct, includes_welding, includes_quality_control,
    version, approval_status, is_active, is_default, is_deleted,
    estimated_total_hours,
    submitted_by, submitted_at, approved_by, approval_date, rejected_by, rejected_at,
    notes, created_by, created_at, last_modified_by, last_modified_at
"#;

pub(super) const OPERATION_COLUMNS: &str = r#"
    operation_id, template_id, sequence_number, operation_code, operation_name,
    description, operation_type, work_center_id, machine_center_id,
    calculation_method, setup_time_minutes, processing_time_per_unit, processing_time_per_kg,
    movement_time_minutes, waiting_time_minutes, efficiency_factor,
    required_operators, required_skill_level, requires_inspection, inspection_percentage,
    can_run_in_parallel, previous_operation_id,
    hourly_rate, override_hourly_rate, material_cost_per_unit, tooling_cost, scrap_percentage,
    work_instructions, safety_notes, quality_notes,
    is_active, is_optional, is_critical_path,
    created_by, created_at, last_modified_by, last_modified_at
"#;

pub(super) const UPSERT_TEMPLATE_SQL: &str = r#"
    INSERT INTO routing_template (
        template_id, org_id, code, name, description,
        template_type, product_category, material_type, complexity_level,
        default_efficiency_pct, includes_welding, includes_quality_control,
        version, approval_status, is_active, is_default, is_deleted,
        estimated_total_hours,
        submitted_by, submitted_at, approved_by, approval_date, rejected_by, rejected_at,
        notes, created_by, created_at, last_modified_by, last_modified_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
        ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29
    )
    ON CONFLICT(template_id) DO UPDATE SET
        org_id = excluded.org_id,
        code = excluded.code,
        name = excluded.name,
        description = excluded.description,
        template_type = excluded.template_type,
        product_category = excluded.product_category,
        material_type = excluded.material_type,
        complexity_level = excluded.complexity_level,
        default_efficiency_pct = excluded.default_efficiency_pct,
        includes_welding = excluded.includes_welding,
        includes_quality_control = excluded.includes_quality_control,
        version = excluded.version,
        approval_status = excluded.approval_status,
        is_active = excluded.is_active,
        is_default = excluded.is_default,
        is_deleted = excluded.is_deleted,
        estimated_total_hours = excluded.estimated_total_hours,
        submitted_by = excluded.submitted_by,
        submitted_at = excluded.submitted_at,
        approved_by = excluded.approved_by,
        approval_date = excluded.approval_date,
        rejected_by = excluded.rejected_by,
        rejected_at = excluded.rejected_at,
        notes = excluded.notes,
        last_modified_by = excluded.last_modified_by,
        last_modified_at = excluded.last_modified_at
"#;

// 工序无子表,整行替换即可
pub(super) const UPSERT_OPERATION_SQL: &str = r#"
    INSERT OR REPLACE INTO routing_operation (
        operation_id, template_id, sequence_number, operation_code, operation_name,
        description, operation_type, work_center_id, machine_center_id,
        calculation_method, setup_time_minutes, processing_time_per_unit, processing_time_per_kg,
        movement_time_minutes, waiting_time_minutes, efficiency_factor,
        required_operators, required_skill_level, requires_inspection, inspection_percentage,
        can_run_in_parallel, previous_operation_id,
        hourly_rate, override_hourly_rate, material_cost_per_unit, tooling_cost, scrap_percentage,
        work_instructions, safety_notes, quality_notes,
        is_active, is_optional, is_critical_path,
        created_by, created_at, last_modified_by, last_modified_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19,
        ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35, ?36, ?37
    )
"#;

// ==========================================
// 时间列
// ==========================================

fn required_datetime(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法解析时间: {}", raw).into(),
        )
    })
}

fn optional_datetime(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .and_then(|raw| parse_datetime(&raw)))
}

fn fmt_opt(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.as_ref().map(format_datetime)
}

// ==========================================
// 行映射
// ==========================================

pub(super) fn map_template_row(row: &Row) -> rusqlite::Result<RoutingTemplate> {
    Ok(RoutingTemplate {
        template_id: row.get(0)?,
        org_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        template_type: TemplateType::from_db_str(&row.get::<_, String>(5)?),
        product_category: row.get(6)?,
        material_type: row.get(7)?,
        complexity_level: ComplexityLevel::from_db_str(&row.get::<_, String>(8)?),
        default_efficiency_pct: row.get(9)?,
        includes_welding: row.get(10)?,
        includes_quality_control: row.get(11)?,
        version: row.get(12)?,
        approval_status: ApprovalStatus::from_db_str(&row.get::<_, String>(13)?),
        is_active: row.get(14)?,
        is_default: row.get(15)?,
        is_deleted: row.get(16)?,
        estimated_total_hours: row.get(17)?,
        submitted_by: row.get(18)?,
        submitted_at: optional_datetime(row, 19)?,
        approved_by: row.get(20)?,
        approval_date: optional_datetime(row, 21)?,
        rejected_by: row.get(22)?,
        rejected_at: optional_datetime(row, 23)?,
        notes: row.get(24)?,
        created_by: row.get(25)?,
        created_at: required_datetime(row, 26)?,
        last_modified_by: row.get(27)?,
        last_modified_at: required_datetime(row, 28)?,
    })
}

pub(super) fn map_operation_row(row: &Row) -> rusqlite::Result<RoutingOperation> {
    let method_raw: String = row.get(9)?;
    let calculation_method = CalculationMethod::from_db_str(&method_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            Type::Text,
            format!("未知计算方式: {}", method_raw).into(),
        )
    })?;

    Ok(RoutingOperation {
        operation_id: row.get(0)?,
        template_id: row.get(1)?,
        sequence_number: row.get(2)?,
        operation_code: row.get(3)?,
        operation_name: row.get(4)?,
        description: row.get(5)?,
        operation_type: OperationType::from_db_str(&row.get::<_, String>(6)?),
        work_center_id: row.get(7)?,
        machine_center_id: row.get(8)?,
        calculation_method,
        setup_time_minutes: row.get(10)?,
        processing_time_per_unit: row.get(11)?,
        processing_time_per_kg: row.get(12)?,
        movement_time_minutes: row.get(13)?,
        waiting_time_minutes: row.get(14)?,
        efficiency_factor: row.get(15)?,
        required_operators: row.get(16)?,
        required_skill_level: row.get(17)?,
        requires_inspection: row.get(18)?,
        inspection_percentage: row.get(19)?,
        can_run_in_parallel: row.get(20)?,
        previous_operation_id: row.get(21)?,
        hourly_rate: row.get(22)?,
        override_hourly_rate: row.get(23)?,
        material_cost_per_unit: row.get(24)?,
        tooling_cost: row.get(25)?,
        scrap_percentage: row.get(26)?,
        work_instructions: row.get(27)?,
        safety_notes: row.get(28)?,
        quality_notes: row.get(29)?,
        is_active: row.get(30)?,
        is_optional: row.get(31)?,
        is_critical_path: row.get(32)?,
        created_by: row.get(33)?,
        created_at: required_datetime(row, 34)?,
        last_modified_by: row.get(35)?,
        last_modified_at: required_datetime(row, 36)?,
    })
}

// ==========================================
// 写入绑定
// ==========================================

pub(super) fn execute_upsert_template(
    stmt: &mut Statement,
    t: &RoutingTemplate,
) -> rusqlite::Result<usize> {
    stmt.execute(params![
        t.template_id,
        t.org_id,
        t.code,
        t.name,
        t.description,
        t.template_type.to_db_str(),
        t.product_category,
        t.material_type,
        t.complexity_level.to_db_str(),
        t.default_efficiency_pct,
        t.includes_welding,
        t.includes_quality_control,
        t.version,
        t.approval_status.to_db_str(),
        t.is_active,
        t.is_default,
        t.is_deleted,
        t.estimated_total_hours,
        t.submitted_by,
        fmt_opt(&t.submitted_at),
        t.approved_by,
        fmt_opt(&t.approval_date),
        t.rejected_by,
        fmt_opt(&t.rejected_at),
        t.notes,
        t.created_by,
        format_datetime(&t.created_at),
        t.last_modified_by,
        format_datetime(&t.last_modified_at),
    ])
}

pub(super) fn execute_upsert_operation(
    stmt: &mut Statement,
    op: &RoutingOperation,
) -> rusqlite::Result<usize> {
    stmt.execute(params![
        op.operation_id,
        op.template_id,
        op.sequence_number,
        op.operation_code,
        op.operation_name,
        op.description,
        op.operation_type.to_db_str(),
        op.work_center_id,
        op.machine_center_id,
        op.calculation_method.to_db_str(),
        op.setup_time_minutes,
        op.processing_time_per_unit,
        op.processing_time_per_kg,
        op.movement_time_minutes,
        op.waiting_time_minutes,
        op.efficiency_factor,
        op.required_operators,
        op.required_skill_level,
        op.requires_inspection,
        op.inspection_percentage,
        op.can_run_in_parallel,
        op.previous_operation_id,
        op.hourly_rate,
        op.override_hourly_rate,
        op.material_cost_per_unit,
        op.tooling_cost,
        op.scrap_percentage,
        op.work_instructions,
        op.safety_notes,
        op.quality_notes,
        op.is_active,
        op.is_optional,
        op.is_critical_path,
        op.created_by,
        format_datetime(&op.created_at),
        op.last_modified_by,
        format_datetime(&op.last_modified_at),
    ])
}
