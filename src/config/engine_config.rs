// ==========================================
// 工艺路线模板引擎 - 引擎配置快照
// ==========================================
// 职责: 将 config_kv 中的路线相关配置收敛为不可变快照
// 说明: 引擎层只接收快照,不直接读库
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;

use crate::config::routing_config_trait::RoutingConfigReader;

// ==========================================
// FixedSetupPolicy - 固定工时的准备时间口径
// ==========================================
// LegacyDoubleCount: 固定工时分支再次累加准备时间 (与历史计算结果一致)
// SingleCount: 准备时间只计一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixedSetupPolicy {
    LegacyDoubleCount,
    SingleCount,
}

impl FixedSetupPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LEGACY_DOUBLE_COUNT" => Some(FixedSetupPolicy::LegacyDoubleCount),
            "SINGLE_COUNT" => Some(FixedSetupPolicy::SingleCount),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FixedSetupPolicy::LegacyDoubleCount => "LEGACY_DOUBLE_COUNT",
            FixedSetupPolicy::SingleCount => "SINGLE_COUNT",
        }
    }
}

// ==========================================
// VersionOrdering - 版本号排序口径
// ==========================================
// Lexicographic: 纯文本比较 ("10.0" < "2.0")
// Semantic: 按 '.' 拆分后逐段数值比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionOrdering {
    Lexicographic,
    Semantic,
}

impl VersionOrdering {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LEXICOGRAPHIC" => Some(VersionOrdering::Lexicographic),
            "SEMANTIC" => Some(VersionOrdering::Semantic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOrdering::Lexicographic => "LEXICOGRAPHIC",
            VersionOrdering::Semantic => "SEMANTIC",
        }
    }

    /// 比较两个版本号
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            VersionOrdering::Lexicographic => a.cmp(b),
            VersionOrdering::Semantic => compare_semantic(a, b),
        }
    }
}

/// 逐段比较; 数字段按数值,非数字段按文本,数字段排在非数字段之前
fn compare_semantic(a: &str, b: &str) -> Ordering {
    let mut left = a.trim().split('.');
    let mut right = b.trim().split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

// ==========================================
// RoutingEngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingEngineConfig {
    /// 效率系数 <= 0 时的替代值
    pub default_efficiency_pct: f64,
    pub fixed_setup_policy: FixedSetupPolicy,
    pub version_ordering: VersionOrdering,
    /// 工作中心可用性检查的维护前瞻天数
    pub maintenance_lookahead_days: i64,
    /// 常用模板默认返回条数
    pub most_used_top_n: usize,
}

impl Default for RoutingEngineConfig {
    fn default() -> Self {
        Self {
            default_efficiency_pct: 100.0,
            fixed_setup_policy: FixedSetupPolicy::LegacyDoubleCount,
            version_ordering: VersionOrdering::Lexicographic,
            maintenance_lookahead_days: 7,
            most_used_top_n: 10,
        }
    }
}

impl RoutingEngineConfig {
    /// 从配置读取器加载快照
    pub async fn load(reader: &dyn RoutingConfigReader) -> Result<Self, Box<dyn Error>> {
        let mut default_efficiency_pct = reader.get_default_efficiency_pct().await?;
        if default_efficiency_pct.is_nan() || default_efficiency_pct <= 0.0 {
            tracing::warn!(
                value = default_efficiency_pct,
                "缺省效率系数必须大于0, 回退为100"
            );
            default_efficiency_pct = 100.0;
        }

        let config = Self {
            default_efficiency_pct,
            fixed_setup_policy: reader.get_fixed_setup_policy().await?,
            version_ordering: reader.get_version_ordering().await?,
            maintenance_lookahead_days: reader.get_maintenance_lookahead_days().await?.max(0),
            most_used_top_n: reader.get_most_used_top_n().await?,
        };

        tracing::debug!(?config, "路线引擎配置已加载");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_keeps_text_order() {
        let ordering = VersionOrdering::Lexicographic;
        assert_eq!(ordering.compare("10.0", "2.0"), Ordering::Less);
        assert_eq!(ordering.compare("1.1", "1.1"), Ordering::Equal);
    }

    #[test]
    fn test_semantic_compares_numeric_segments() {
        let ordering = VersionOrdering::Semantic;
        assert_eq!(ordering.compare("2.0", "10.0"), Ordering::Less);
        assert_eq!(ordering.compare("1.10", "1.9"), Ordering::Greater);
        assert_eq!(ordering.compare("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(ordering.compare("1.beta", "1.2"), Ordering::Greater);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            FixedSetupPolicy::parse("single_count"),
            Some(FixedSetupPolicy::SingleCount)
        );
        assert_eq!(FixedSetupPolicy::parse("x"), None);
        assert_eq!(VersionOrdering::parse("semantic"), Some(VersionOrdering::Semantic));
    }
}
