//! 规则引擎领域模型

use crate::codec::ExpressionCodec;
use crate::error::Result;
use crate::expression::Expression;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Ticket,
    Roster,
    Leave,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ticket => "TICKET",
            Self::Roster => "ROSTER",
            Self::Leave => "LEAVE",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Email,
    PropertyUpdate,
    Aggregation,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::PropertyUpdate => "PROPERTY_UPDATE",
            Self::Aggregation => "AGGREGATION",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 规则定义
///
/// 表达式以序列化后的 JSON 文本保存，在求值时才解码。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub entity_type: EntityType,
    #[serde(deserialize_with = "json_text")]
    pub expression_json: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// 嵌入的 JSON 文本既可以写成字符串，也可以直接写成 JSON 值
fn json_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

impl Rule {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        entity_type: EntityType,
        expression_json: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            entity_type,
            expression_json: expression_json.into(),
            active: true,
        }
    }

    /// 由表达式树构建规则
    pub fn from_expression(
        id: i64,
        name: impl Into<String>,
        entity_type: EntityType,
        expression: &Expression,
    ) -> Result<Self> {
        Ok(Self::new(
            id,
            name,
            entity_type,
            ExpressionCodec::encode(expression)?,
        ))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// 动作配置
///
/// 绑定在规则上，`configuration_json` 的结构由动作类型决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfiguration {
    pub id: i64,
    pub rule_id: i64,
    pub action_type: ActionType,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "json_text")]
    pub configuration_json: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ActionConfiguration {
    pub fn new(
        id: i64,
        rule_id: i64,
        action_type: ActionType,
        name: impl Into<String>,
        configuration_json: impl Into<String>,
    ) -> Self {
        Self {
            id,
            rule_id,
            action_type,
            name: name.into(),
            description: None,
            configuration_json: configuration_json.into(),
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// 规则评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluationOutcome {
    pub rule_id: i64,
    pub rule_name: String,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub result: bool,
    pub evaluated_at: DateTime<Utc>,
    /// 求值出错时的错误信息，此时 `result` 固定为 false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleEvaluationOutcome {
    pub fn new(rule: &Rule, entity_id: Option<i64>, result: bool) -> Self {
        Self {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            entity_type: rule.entity_type,
            entity_id,
            result,
            evaluated_at: Utc::now(),
            error: None,
        }
    }

    /// 求值出错，按 false 处理并记录错误
    pub fn failed(rule: &Rule, entity_id: Option<i64>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(rule, entity_id, false)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// 规则结果为 false 时动作被跳过的说明
pub const ACTION_SKIPPED_MESSAGE: &str = "Action skipped as rule result is false";

/// 动作执行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action_configuration_id: i64,
    pub action_name: String,
    pub action_type: ActionType,
    pub rule_id: i64,
    pub rule_name: String,
    pub entity_id: Option<i64>,
    pub entity_type: EntityType,
    pub success: bool,
    pub message: String,
    pub executed_at: DateTime<Utc>,
}

impl ActionOutcome {
    pub fn new(
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        success: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action_configuration_id: config.id,
            action_name: config.name.clone(),
            action_type: config.action_type,
            rule_id: outcome.rule_id,
            rule_name: outcome.rule_name.clone(),
            entity_id: outcome.entity_id,
            entity_type: outcome.entity_type,
            success,
            message: message.into(),
            executed_at: Utc::now(),
        }
    }

    pub fn success(
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        message: impl Into<String>,
    ) -> Self {
        Self::new(outcome, config, true, message)
    }

    pub fn failure(
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        message: impl Into<String>,
    ) -> Self {
        Self::new(outcome, config, false, message)
    }

    /// 规则结果为 false，动作跳过（视为成功）
    pub fn skipped(outcome: &RuleEvaluationOutcome, config: &ActionConfiguration) -> Self {
        Self::new(outcome, config, true, ACTION_SKIPPED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use serde_json::json;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(ActionType::PropertyUpdate).unwrap(),
            json!("PROPERTY_UPDATE")
        );
        assert_eq!(
            serde_json::from_value::<EntityType>(json!("ROSTER")).unwrap(),
            EntityType::Roster
        );
        assert_eq!(EntityType::Leave.to_string(), "LEAVE");
    }

    #[test]
    fn test_rule_from_expression() {
        let expression = Expression::condition("status", Operator::Equals, "OPEN");
        let rule = Rule::from_expression(1, "Open tickets", EntityType::Ticket, &expression)
            .unwrap()
            .with_description("all open tickets");

        assert!(rule.active);
        assert_eq!(
            ExpressionCodec::decode(&rule.expression_json).unwrap(),
            expression
        );
        assert_eq!(rule.description.as_deref(), Some("all open tickets"));
    }

    #[test]
    fn test_rule_deserialize_defaults() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 3,
            "name": "r",
            "entityType": "LEAVE",
            "expressionJson": "{}"
        }))
        .unwrap();
        assert!(rule.active);
        assert!(rule.description.is_none());
    }

    #[test]
    fn test_inline_json_payloads() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 4,
            "name": "inline",
            "entityType": "TICKET",
            "expressionJson": {"type": "AND", "expressions": []}
        }))
        .unwrap();
        assert_eq!(
            ExpressionCodec::decode(&rule.expression_json).unwrap(),
            Expression::and(vec![])
        );

        let config: ActionConfiguration = serde_json::from_value(json!({
            "id": 1,
            "ruleId": 4,
            "actionType": "EMAIL",
            "name": "mail",
            "configurationJson": {"recipients": ["a@example.com"]},
            "active": false
        }))
        .unwrap();
        assert_eq!(config.configuration_json, r#"{"recipients":["a@example.com"]}"#);
        assert!(!config.active);
    }

    #[test]
    fn test_outcome_constructors() {
        let rule = Rule::new(9, "r", EntityType::Ticket, "{}");
        let ok = RuleEvaluationOutcome::new(&rule, Some(1), true);
        assert!(!ok.is_failed());

        let failed = RuleEvaluationOutcome::failed(&rule, Some(1), "boom");
        assert!(!failed.result);
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let config = ActionConfiguration::new(4, 9, ActionType::Email, "notify", "{}");
        let skipped = ActionOutcome::skipped(&failed, &config);
        assert!(skipped.success);
        assert_eq!(skipped.message, ACTION_SKIPPED_MESSAGE);
        assert_eq!(skipped.action_configuration_id, 4);
        assert_eq!(skipped.rule_name, "r");
        assert_eq!(skipped.entity_type, EntityType::Ticket);
    }
}
