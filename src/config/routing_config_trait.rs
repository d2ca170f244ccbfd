// ==========================================
// 工艺路线模板引擎 - 路线配置读取 Trait
// ==========================================
// 职责: 定义路线引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::engine_config::{FixedSetupPolicy, VersionOrdering};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// RoutingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait RoutingConfigReader: Send + Sync {
    /// 效率系数缺省值 (效率系数 <= 0 时替代)
    ///
    /// # 默认值
    /// - 100
    async fn get_default_efficiency_pct(&self) -> Result<f64, Box<dyn Error>>;

    /// 固定工时的准备时间口径
    ///
    /// # 默认值
    /// - LEGACY_DOUBLE_COUNT
    async fn get_fixed_setup_policy(&self) -> Result<FixedSetupPolicy, Box<dyn Error>>;

    /// 版本号排序口径
    ///
    /// # 默认值
    /// - LEXICOGRAPHIC
    async fn get_version_ordering(&self) -> Result<VersionOrdering, Box<dyn Error>>;

    /// 维护前瞻天数
    ///
    /// # 默认值
    /// - 7
    async fn get_maintenance_lookahead_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 常用模板默认条数
    ///
    /// # 默认值
    /// - 10
    async fn get_most_used_top_n(&self) -> Result<usize, Box<dyn Error>>;
}
