//! 聚合动作处理器

use async_trait::async_trait;
use tracing::info;

use crate::action::dto::AggregationActionConfig;
use crate::action::handler::{ActionHandler, parse_payload};
use crate::error::Result;
use crate::models::{ActionConfiguration, ActionOutcome, ActionType, RuleEvaluationOutcome};
use crate::value::EntityData;

/// 聚合处理器
///
/// 记录聚合请求（字段、方式、分组、过滤字段、输出目标）及实体上相关字段的当前值。
#[derive(Debug, Clone, Default)]
pub struct AggregationHandler;

impl AggregationHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActionHandler for AggregationHandler {
    fn can_handle(&self, config: &ActionConfiguration) -> bool {
        config.action_type == ActionType::Aggregation
    }

    async fn execute(
        &self,
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        data: &EntityData,
    ) -> Result<ActionOutcome> {
        if !outcome.result {
            info!(rule_id = outcome.rule_id, "规则结果为 false，跳过聚合动作");
            return Ok(ActionOutcome::skipped(outcome, config));
        }

        let payload: AggregationActionConfig =
            match parse_payload(outcome, config, "aggregation") {
                Ok(payload) => payload,
                Err(failed) => return Ok(failed),
            };

        let field_value = payload
            .aggregation_field
            .as_deref()
            .and_then(|field| data.get(field))
            .map(ToString::to_string);
        let group_value = payload
            .group_by_field
            .as_deref()
            .and_then(|field| data.get(field))
            .map(ToString::to_string);

        info!(
            aggregation_field = ?payload.aggregation_field,
            aggregation_type = ?payload.aggregation_type,
            group_by_field = ?payload.group_by_field,
            filter_fields = ?payload.filter_fields,
            output_destination = ?payload.output_destination,
            field_value = ?field_value,
            group_value = ?group_value,
            "执行聚合"
        );

        Ok(ActionOutcome::success(
            outcome,
            config,
            "Aggregation performed successfully",
        ))
    }

    fn description(&self) -> &'static str {
        "Aggregation Handler"
    }
}
