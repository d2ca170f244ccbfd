// ==========================================
// 模板服务集成测试 - 消费方应用与统计查询
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::*;
use routing_template_engine::api::{ApiError, TemplateFilter};
use routing_template_engine::domain::types::{ComplexityLevel, TemplateType};
use routing_template_engine::repository::ConsumerRepository;

// ==========================================
// 应用到生产包
// ==========================================

#[test]
fn test_apply_to_consumer_stamps_first_operation() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let t = env.create_template("CUT");
    env.add_operation(&t.template_id, OperationBuilder::new("LATE", "WC1").sequence(30));
    let first = env.add_operation(&t.template_id, OperationBuilder::new("EARLY", "WC1").sequence(10));
    env.add_operation(&t.template_id, OperationBuilder::new("OFF", "WC1").sequence(5).inactive());
    env.approve_template(&t.template_id);

    env.package_repo
        .insert_package(&package("P1", None, ts(2024, 3, 1)))
        .unwrap();
    env.package_repo.insert_line_item(&line_item("L1", "P1")).unwrap();
    env.package_repo.insert_line_item(&line_item("L2", "P1")).unwrap();

    let stamped = env
        .api
        .apply_to_consumer(&t.template_id, "P1", true, ACTOR)
        .unwrap();
    assert_eq!(stamped, 2);

    let pkg = env.package_repo.find_package("P1").unwrap().unwrap();
    assert_eq!(pkg.routing_template_id.as_deref(), Some(t.template_id.as_str()));
    for item in env.package_repo.list_line_items("P1").unwrap() {
        assert_eq!(item.routing_operation_id.as_deref(), Some(first.operation_id.as_str()));
    }

    let history = env.api.action_history(&t.template_id).unwrap();
    assert_eq!(history[0].action_type, "APPLY_TO_PACKAGE");
}

#[test]
fn test_apply_without_stamping_and_unapproved_template() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let draft = env.create_valid_template("DRAFT");
    env.package_repo
        .insert_package(&package("P1", None, ts(2024, 3, 1)))
        .unwrap();
    env.package_repo.insert_line_item(&line_item("L1", "P1")).unwrap();

    // 未批准模板允许应用
    let stamped = env
        .api
        .apply_to_consumer(&draft.template_id, "P1", false, ACTOR)
        .unwrap();
    assert_eq!(stamped, 0);
    let items = env.package_repo.list_line_items("P1").unwrap();
    assert!(items[0].routing_operation_id.is_none());
    assert_eq!(env.api.usage_count(&draft.template_id).unwrap(), 1);
}

#[test]
fn test_apply_to_missing_targets() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let t = env.create_valid_template("CUT");

    assert!(matches!(
        env.api.apply_to_consumer(&t.template_id, "NO_PKG", true, ACTOR),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        env.api.apply_to_line_items("NO_PKG", &t.template_id),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        env.api.apply_to_consumer("NO_TEMPLATE", "NO_PKG", true, ACTOR),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_generate_line_items_truncates_minutes() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let t = env.create_template("GEN");
    let a = env.add_operation(&t.template_id, OperationBuilder::new("A", "WC1").per_unit(1.5));
    env.add_operation(&t.template_id, OperationBuilder::new("B", "WC1").per_unit(0.2555));
    env.add_operation(&t.template_id, OperationBuilder::new("C", "WC1").per_unit(9.0).inactive());

    let drafts = env.api.generate_line_items(&t.template_id, 4).unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].routing_operation_id, a.operation_id);
    assert_eq!(drafts[0].description, "A工序");
    assert_eq!(drafts[0].quantity, 4);
    assert_eq!(drafts[0].minutes, 90);
    // 0.2555 × 60 = 15.33 -> 15
    assert_eq!(drafts[1].minutes, 15);
}

// ==========================================
// 使用统计
// ==========================================

#[test]
fn test_usage_statistics() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let a = env.create_valid_template("A");
    let b = env.create_valid_template("B");
    let c = env.create_valid_template("C");
    env.create_valid_template("UNUSED");

    let packages = [
        ("P1", &a, ts(2024, 1, 1)),
        ("P2", &a, ts(2024, 2, 1)),
        ("P3", &b, ts(2024, 1, 15)),
        ("P4", &b, ts(2024, 1, 20)),
        ("P5", &c, ts(2024, 1, 5)),
    ];
    for (id, t, at) in packages {
        env.package_repo
            .insert_package(&package(id, Some(&t.template_id), at))
            .unwrap();
    }

    assert!(!env.api.can_delete(&a.template_id).unwrap());
    assert_eq!(env.api.usage_count(&a.template_id).unwrap(), 2);
    assert_eq!(
        env.api.last_used_date(&a.template_id).unwrap(),
        Some(ts(2024, 2, 1))
    );

    // 次数降序,同数按编码
    let ranks = env.api.most_used(ORG, None).unwrap();
    let ranked: Vec<(String, i64)> = ranks
        .into_iter()
        .map(|r| (r.template.code, r.usage_count))
        .collect();
    assert_eq!(
        ranked,
        vec![("A".to_string(), 2), ("B".to_string(), 2), ("C".to_string(), 1)]
    );

    let top1 = env.api.most_used(ORG, Some(1)).unwrap();
    assert_eq!(top1.len(), 1);
    assert_eq!(top1[0].template.code, "A");
}

#[test]
fn test_deleted_package_releases_template() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_work_centers();
    let t = env.create_valid_template("CUT");

    let mut gone = package("P1", Some(&t.template_id), ts(2024, 1, 1));
    gone.is_deleted = true;
    env.package_repo.insert_package(&gone).unwrap();

    assert!(env.api.can_delete(&t.template_id).unwrap());
    assert_eq!(env.api.last_used_date(&t.template_id).unwrap(), None);
    assert!(env.api.most_used(ORG, None).unwrap().is_empty());
}

#[test]
fn test_usage_by_type() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    for (code, t) in [
        ("S1", TemplateType::Standard),
        ("S2", TemplateType::Standard),
        ("X1", TemplateType::Express),
    ] {
        env.api
            .create_template(TemplateBuilder::new(code, code).template_type(t).build(), ACTOR)
            .unwrap();
    }

    let by_type = env.api.usage_by_type(ORG).unwrap();
    assert_eq!(by_type.get(&TemplateType::Standard), Some(&2));
    assert_eq!(by_type.get(&TemplateType::Express), Some(&1));
    assert_eq!(by_type.get(&TemplateType::Complex), None);
}

// ==========================================
// 检索与筛选
// ==========================================

fn seed_catalog(env: &ApiTestEnv) {
    let templates = [
        TemplateBuilder::new("BEAM-01", "工字钢切割")
            .category("型钢")
            .material("碳钢")
            .complexity(ComplexityLevel::Simple),
        TemplateBuilder::new("PLATE-01", "板材焊接")
            .category("板材")
            .material("Stainless")
            .description("含 Welding 工序")
            .welding(true)
            .template_type(TemplateType::Complex)
            .complexity(ComplexityLevel::Complex),
        TemplateBuilder::new("PIPE-01", "管材打孔")
            .category("管材")
            .material("碳钢"),
    ];
    for t in templates {
        env.api.create_template(t.build(), ACTOR).unwrap();
    }
}

#[test]
fn test_search_is_case_insensitive_across_fields() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_catalog(&env);

    let codes = |term: &str| -> Vec<String> {
        env.api
            .search(ORG, term)
            .unwrap()
            .into_iter()
            .map(|t| t.code)
            .collect()
    };

    assert_eq!(codes("plate"), vec!["PLATE-01"]);
    assert_eq!(codes("welding"), vec!["PLATE-01"]);
    assert_eq!(codes("STAINLESS"), vec!["PLATE-01"]);
    assert_eq!(codes("管材"), vec!["PIPE-01"]);
    assert_eq!(codes("碳钢").len(), 2);
    assert!(codes("nothing-like-this").is_empty());
    assert_eq!(codes("  ").len(), 3);
}

#[test]
fn test_filter_combines_conditions() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_catalog(&env);

    let welding = env
        .api
        .filter(
            ORG,
            &TemplateFilter {
                includes_welding: Some(true),
                ..TemplateFilter::default()
            },
        )
        .unwrap();
    assert_eq!(welding.len(), 1);
    assert_eq!(welding[0].code, "PLATE-01");

    let simple_beams = env
        .api
        .filter(
            ORG,
            &TemplateFilter {
                product_category: Some("型钢".to_string()),
                complexity_level: Some(ComplexityLevel::Simple),
                ..TemplateFilter::default()
            },
        )
        .unwrap();
    assert_eq!(simple_beams.len(), 1);

    let active_only = env
        .api
        .filter(
            ORG,
            &TemplateFilter {
                is_active: Some(true),
                ..TemplateFilter::default()
            },
        )
        .unwrap();
    assert!(active_only.is_empty());

    assert_eq!(env.api.filter(ORG, &TemplateFilter::default()).unwrap().len(), 3);
}
