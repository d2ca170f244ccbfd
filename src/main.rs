// ==========================================
// 工艺路线模板引擎 - 命令行入口
// ==========================================
// 用法: routing-template-engine <org_id> [quantity]
// 对组织内每个模板做结构校验并输出工时/成本摘要
// ==========================================

use routing_template_engine::app::{get_default_db_path, AppState};
use routing_template_engine::logging;

#[tokio::main]
async fn main() {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", routing_template_engine::APP_NAME, routing_template_engine::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(org_id) = args.first() else {
        eprintln!("用法: routing-template-engine <org_id> [quantity]");
        std::process::exit(2);
    };
    let quantity = match args.get(1).map(|s| s.parse::<i32>()) {
        None => 1,
        Some(Ok(q)) => q,
        Some(Err(e)) => {
            eprintln!("数量参数无效: {}", e);
            std::process::exit(2);
        }
    };

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "使用数据库");

    let state = match AppState::new(db_path).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "AppState初始化失败");
            std::process::exit(1);
        }
    };

    if let Err(e) = summarize_org(&state, org_id, quantity) {
        tracing::error!(error = %e, "模板汇总失败");
        std::process::exit(1);
    }
}

fn summarize_org(
    state: &AppState,
    org_id: &str,
    quantity: i32,
) -> routing_template_engine::ApiResult<()> {
    let api = &state.routing_template_api;
    let templates = api.list_templates(org_id, true)?;

    println!("组织 {} 共 {} 个模板 (数量 = {})", org_id, templates.len(), quantity);
    println!();

    let mut invalid = 0;
    for template in &templates {
        let issues = api.validate_template(&template.template_id)?;
        let calc = api.calculate(&template.template_id, quantity, None)?;

        println!(
            "{:<20} v{:<8} {:<9} 工时 {:>8.2} h  成本 {:>10.2}  周期 {:>6} min",
            template.code,
            template.version,
            template.approval_status,
            calc.total_hours,
            calc.total_cost,
            calc.lead_time().num_minutes(),
        );

        if !issues.is_empty() {
            invalid += 1;
            for issue in &issues {
                println!("    ! {}", issue);
            }
        }
    }

    println!();
    println!("校验未通过: {} / {}", invalid, templates.len());
    Ok(())
}
