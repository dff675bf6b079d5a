//! 属性更新动作处理器

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::action::dto::PropertyUpdateActionConfig;
use crate::action::handler::{ActionHandler, parse_payload};
use crate::entity::EntityUpdater;
use crate::error::Result;
use crate::models::{ActionConfiguration, ActionOutcome, ActionType, RuleEvaluationOutcome};
use crate::value::EntityData;

/// 属性更新处理器
///
/// 通过 `EntityUpdater` 把配置中的属性写回实体。属性值类型错误时返回 `Err`，
/// 由 `ActionEngine` 转换为失败结果。
pub struct PropertyUpdateHandler {
    updater: Arc<dyn EntityUpdater>,
}

impl PropertyUpdateHandler {
    pub fn new(updater: Arc<dyn EntityUpdater>) -> Self {
        Self { updater }
    }
}

#[async_trait]
impl ActionHandler for PropertyUpdateHandler {
    fn can_handle(&self, config: &ActionConfiguration) -> bool {
        config.action_type == ActionType::PropertyUpdate
    }

    async fn execute(
        &self,
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        _data: &EntityData,
    ) -> Result<ActionOutcome> {
        if !outcome.result {
            info!(rule_id = outcome.rule_id, "规则结果为 false，跳过属性更新动作");
            return Ok(ActionOutcome::skipped(outcome, config));
        }

        let payload: PropertyUpdateActionConfig =
            match parse_payload(outcome, config, "property update") {
                Ok(payload) => payload,
                Err(failed) => return Ok(failed),
            };

        let Some(entity_id) = outcome.entity_id else {
            warn!(rule_id = outcome.rule_id, "评估结果缺少实体 ID，无法更新属性");
            return Ok(ActionOutcome::failure(
                outcome,
                config,
                "Failed to update entity properties",
            ));
        };

        info!(
            entity_type = %outcome.entity_type,
            entity_id,
            properties = ?payload.properties_to_update,
            "更新实体属性"
        );

        let updated = self
            .updater
            .update_properties(outcome.entity_type, entity_id, &payload.properties_to_update)
            .await?;

        if updated {
            Ok(ActionOutcome::success(
                outcome,
                config,
                "Properties updated successfully",
            ))
        } else {
            Ok(ActionOutcome::failure(
                outcome,
                config,
                "Failed to update entity properties",
            ))
        }
    }

    fn description(&self) -> &'static str {
        "Entity Property Update Handler"
    }
}
