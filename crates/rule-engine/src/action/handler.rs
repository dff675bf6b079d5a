//! 动作处理器 Trait 定义
//!
//! 提供动作执行的统一抽象接口，支持不同动作类型的多态实现

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{ActionConfiguration, ActionOutcome, RuleEvaluationOutcome};
use crate::value::EntityData;

/// 动作处理器 Trait
///
/// 每种动作类型（邮件、聚合、属性更新）实现此 trait，由 `ActionEngine`
/// 按注册顺序挑选第一个 `can_handle` 返回 true 的处理器执行。
///
/// # 约定
///
/// - 规则结果为 false 时应返回跳过结果（`ActionOutcome::skipped`），不执行任何副作用
/// - 配置载荷解析失败应返回 `success = false` 的结果，而不是错误
/// - 返回 `Err` 表示执行过程中的意外错误，由 `ActionEngine` 转换为失败结果
///
/// # 示例
///
/// ```ignore
/// struct WebhookHandler;
///
/// #[async_trait]
/// impl ActionHandler for WebhookHandler {
///     fn can_handle(&self, config: &ActionConfiguration) -> bool {
///         config.name.starts_with("webhook:")
///     }
///
///     async fn execute(
///         &self,
///         outcome: &RuleEvaluationOutcome,
///         config: &ActionConfiguration,
///         _data: &EntityData,
///     ) -> Result<ActionOutcome> {
///         if !outcome.result {
///             return Ok(ActionOutcome::skipped(outcome, config));
///         }
///         Ok(ActionOutcome::success(outcome, config, "Webhook delivered"))
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// 是否能处理该动作配置
    fn can_handle(&self, config: &ActionConfiguration) -> bool;

    /// 执行动作
    ///
    /// # 参数
    /// - `outcome`: 触发动作的规则评估结果
    /// - `config`: 动作配置
    /// - `data`: 实体当前的字段映射
    async fn execute(
        &self,
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        data: &EntityData,
    ) -> Result<ActionOutcome>;

    /// 获取 Handler 的描述信息（用于日志）
    fn description(&self) -> &'static str {
        "Generic Action Handler"
    }
}

/// 解析动作配置载荷
///
/// 失败时返回的结果消息形如 `Failed to parse <kind> action configuration: <error>`。
pub(crate) fn parse_payload<T: DeserializeOwned>(
    outcome: &RuleEvaluationOutcome,
    config: &ActionConfiguration,
    kind: &str,
) -> std::result::Result<T, ActionOutcome> {
    serde_json::from_str(&config.configuration_json).map_err(|e| {
        tracing::error!(
            action_configuration_id = config.id,
            configuration = %config.configuration_json,
            error = %e,
            "动作配置解析失败"
        );
        ActionOutcome::failure(
            outcome,
            config,
            format!("Failed to parse {} action configuration: {}", kind, e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::dto::EmailActionConfig;
    use crate::models::{ActionType, EntityType, Rule};

    #[test]
    fn test_parse_payload_failure_message() {
        let rule = Rule::new(1, "r", EntityType::Ticket, "{}");
        let outcome = RuleEvaluationOutcome::new(&rule, Some(1), true);
        let config = ActionConfiguration::new(2, 1, ActionType::Email, "mail", "{not json");

        let failed = parse_payload::<EmailActionConfig>(&outcome, &config, "email").unwrap_err();
        assert!(!failed.success);
        assert!(
            failed
                .message
                .starts_with("Failed to parse email action configuration: ")
        );
    }

    #[test]
    fn test_default_description() {
        struct Noop;

        #[async_trait]
        impl ActionHandler for Noop {
            fn can_handle(&self, _config: &ActionConfiguration) -> bool {
                false
            }

            async fn execute(
                &self,
                outcome: &RuleEvaluationOutcome,
                config: &ActionConfiguration,
                _data: &EntityData,
            ) -> Result<ActionOutcome> {
                Ok(ActionOutcome::skipped(outcome, config))
            }
        }

        assert_eq!(Noop.description(), "Generic Action Handler");
    }
}
