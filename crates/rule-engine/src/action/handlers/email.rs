//! 邮件动作处理器
//!
//! 不直接投递邮件，只记录收件人、主题、模板以及（可选的）实体详情，
//! 实际投递由下游通知服务订阅日志或替换此处理器完成。

use async_trait::async_trait;
use tracing::info;

use crate::action::dto::EmailActionConfig;
use crate::action::handler::{ActionHandler, parse_payload};
use crate::error::Result;
use crate::models::{ActionConfiguration, ActionOutcome, ActionType, RuleEvaluationOutcome};
use crate::value::EntityData;

/// 邮件处理器
#[derive(Debug, Clone, Default)]
pub struct EmailHandler;

impl EmailHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActionHandler for EmailHandler {
    fn can_handle(&self, config: &ActionConfiguration) -> bool {
        config.action_type == ActionType::Email
    }

    async fn execute(
        &self,
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        data: &EntityData,
    ) -> Result<ActionOutcome> {
        if !outcome.result {
            info!(rule_id = outcome.rule_id, "规则结果为 false，跳过邮件动作");
            return Ok(ActionOutcome::skipped(outcome, config));
        }

        let payload: EmailActionConfig = match parse_payload(outcome, config, "email") {
            Ok(payload) => payload,
            Err(failed) => return Ok(failed),
        };

        info!(
            recipients = ?payload.recipients,
            subject = ?payload.subject,
            template = ?payload.template,
            rule_id = outcome.rule_id,
            entity_id = ?outcome.entity_id,
            "发送邮件"
        );

        if payload.include_entity_details {
            info!(entity = %data.to_json(), "邮件附带实体详情");
        }

        Ok(ActionOutcome::success(
            outcome,
            config,
            "Email sent successfully",
        ))
    }

    fn description(&self) -> &'static str {
        "Email Notification Handler"
    }
}
