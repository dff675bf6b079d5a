//! 动作配置载荷
//!
//! 各动作类型的 `configuration_json` 结构，字段名为 camelCase。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 邮件动作配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailActionConfig {
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub template: Option<String>,
    /// 是否在邮件中附带实体字段
    pub include_entity_details: bool,
}

/// 聚合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

/// 聚合结果输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputDestination {
    Db,
    File,
    Api,
}

/// 聚合动作配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregationActionConfig {
    pub aggregation_field: Option<String>,
    pub aggregation_type: Option<AggregationType>,
    pub group_by_field: Option<String>,
    pub filter_fields: Vec<String>,
    pub output_destination: Option<OutputDestination>,
}

/// 属性更新动作配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyUpdateActionConfig {
    pub properties_to_update: Map<String, Value>,
}
