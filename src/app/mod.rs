// ==========================================
// 工艺路线模板引擎 - 应用层
// ==========================================
// 职责: 组件装配与运行环境
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
