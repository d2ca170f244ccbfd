use super::*;
use crate::domain::routing::{RoutingOperation, RoutingTemplate, TemplateSnapshot};
use std::collections::HashSet;

// ==========================================
// 测试辅助函数
// ==========================================

fn work_centers(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn op(template: &RoutingTemplate, seq: i32, code: &str, wc: &str) -> RoutingOperation {
    RoutingOperation::new(&template.template_id, seq, code, wc)
}

fn kinds(errors: &[ValidationError]) -> Vec<ValidationErrorKind> {
    errors.iter().map(|e| e.kind).collect()
}

// ==========================================
// 必填字段 / 工序数量
// ==========================================

#[test]
fn test_valid_template_has_no_errors() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let a = op(&t, 10, "A", "WC1");
    let mut b = op(&t, 20, "B", "WC2");
    b.previous_operation_id = Some(a.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a, b]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1", "WC2"]));
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_missing_code_and_name() {
    let t = RoutingTemplate::new_draft("ORG1", "  ", "");
    let a = op(&t, 10, "A", "WC1");
    let snapshot = TemplateSnapshot::new(t, vec![a]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert_eq!(
        kinds(&errors),
        vec![ValidationErrorKind::MissingCode, ValidationErrorKind::MissingName]
    );
    assert!(errors.iter().all(|e| e.operation_code.is_none()));
}

#[test]
fn test_template_without_operations() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let snapshot = TemplateSnapshot::new(t, vec![]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&[]));
    assert_eq!(kinds(&errors), vec![ValidationErrorKind::NoOperations]);
}

#[test]
fn test_template_with_only_inactive_operations() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut a = op(&t, 10, "A", "WC1");
    a.is_active = false;
    let snapshot = TemplateSnapshot::new(t, vec![a]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert_eq!(kinds(&errors), vec![ValidationErrorKind::NoActiveOperation]);
}

// ==========================================
// 工作中心
// ==========================================

#[test]
fn test_unavailable_work_center_names_operation() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let a = op(&t, 10, "A", "WC1");
    let b = op(&t, 20, "DRILL", "WC_OFF");
    let snapshot = TemplateSnapshot::new(t, vec![a, b]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::WorkCenterUnavailable);
    assert_eq!(errors[0].operation_code.as_deref(), Some("DRILL"));
    assert!(errors[0].message.contains("DRILL"));
}

// ==========================================
// 依赖链
// ==========================================

#[test]
fn test_self_reference_is_cycle() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut a = op(&t, 10, "A", "WC1");
    a.previous_operation_id = Some(a.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert_eq!(kinds(&errors), vec![ValidationErrorKind::CircularDependency]);
    assert_eq!(errors[0].operation_code.as_deref(), Some("A"));
}

#[test]
fn test_two_step_cycle_reports_both_operations() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut a = op(&t, 10, "A", "WC1");
    let mut b = op(&t, 20, "B", "WC1");
    a.previous_operation_id = Some(b.operation_id.clone());
    b.previous_operation_id = Some(a.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a, b]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    let cyclic: Vec<&str> = errors
        .iter()
        .filter(|e| e.kind == ValidationErrorKind::CircularDependency)
        .filter_map(|e| e.operation_code.as_deref())
        .collect();
    assert_eq!(cyclic, vec!["A", "B"]);
}

#[test]
fn test_operation_leading_into_cycle_is_reported() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut a = op(&t, 10, "A", "WC1");
    let mut b = op(&t, 20, "B", "WC1");
    let mut c = op(&t, 30, "C", "WC1");
    a.previous_operation_id = Some(b.operation_id.clone());
    b.previous_operation_id = Some(a.operation_id.clone());
    c.previous_operation_id = Some(b.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a, b, c]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert!(errors
        .iter()
        .any(|e| e.kind == ValidationErrorKind::CircularDependency
            && e.operation_code.as_deref() == Some("C")));
}

#[test]
fn test_shared_ancestor_is_not_a_cycle() {
    // B 与 C 共用前序 A: 每个起点独立遍历,不应误报
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let a = op(&t, 10, "A", "WC1");
    let mut b = op(&t, 20, "B", "WC1");
    let mut c = op(&t, 30, "C", "WC1");
    b.previous_operation_id = Some(a.operation_id.clone());
    c.previous_operation_id = Some(a.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a, b, c]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_long_chain_is_acyclic() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut ops: Vec<RoutingOperation> = Vec::new();
    for i in 0..20 {
        let mut o = op(&t, (i + 1) * 10, &format!("OP{:02}", i), "WC1");
        if let Some(prev) = ops.last() {
            o.previous_operation_id = Some(prev.operation_id.clone());
        }
        ops.push(o);
    }
    let snapshot = TemplateSnapshot::new(t, ops);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert!(errors.is_empty());
}

#[test]
fn test_dangling_predecessor() {
    let t = RoutingTemplate::new_draft("ORG1", "CUT", "切割");
    let mut a = op(&t, 10, "A", "WC1");
    a.previous_operation_id = Some("OP_FROM_OTHER_TEMPLATE".to_string());
    let snapshot = TemplateSnapshot::new(t, vec![a]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&["WC1"]));
    assert_eq!(kinds(&errors), vec![ValidationErrorKind::DanglingPredecessor]);
}

#[test]
fn test_errors_follow_check_order() {
    let t = RoutingTemplate::new_draft("ORG1", "", "切割");
    let mut a = op(&t, 10, "A", "WC_OFF");
    a.previous_operation_id = Some(a.operation_id.clone());
    let snapshot = TemplateSnapshot::new(t, vec![a]);

    let errors = TemplateValidator::new().validate(&snapshot, &work_centers(&[]));
    assert_eq!(
        kinds(&errors),
        vec![
            ValidationErrorKind::MissingCode,
            ValidationErrorKind::WorkCenterUnavailable,
            ValidationErrorKind::CircularDependency,
        ]
    );
}
