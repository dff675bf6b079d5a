//! 规则编排
//!
//! 按规则 ID 或实体类型加载规则，获取实体数据，解码并求值表达式。
//! 所有失败都在边界内消化：找不到规则或实体返回空结果，表达式无法解码的规则被跳过，
//! 求值出错的规则按 false 返回并附带错误信息。

use std::sync::Arc;
use std::time::Instant;

use rules_shared::observability::metrics::{record_decode_failure, record_rule_evaluation};
use tracing::{debug, error, info, instrument, warn};

use crate::codec::ExpressionCodec;
use crate::entity::EntityDataProvider;
use crate::models::{EntityType, Rule, RuleEvaluationOutcome};
use crate::store::RuleRepository;
use crate::value::EntityData;

/// 默认的实体 ID 字段名
pub const DEFAULT_ENTITY_ID_FIELD: &str = "id";

/// 规则引擎
#[derive(Clone)]
pub struct RuleEngine {
    rules: Arc<dyn RuleRepository>,
    entities: Arc<dyn EntityDataProvider>,
    entity_id_field: String,
}

impl RuleEngine {
    pub fn new(rules: Arc<dyn RuleRepository>, entities: Arc<dyn EntityDataProvider>) -> Self {
        Self {
            rules,
            entities,
            entity_id_field: DEFAULT_ENTITY_ID_FIELD.to_string(),
        }
    }

    /// 设置调用方直接传入实体数据时，读取实体 ID 的字段名
    pub fn with_entity_id_field(mut self, field: impl Into<String>) -> Self {
        self.entity_id_field = field.into();
        self
    }

    /// 对单个实体评估指定规则
    ///
    /// 规则不存在、实体不存在或表达式无法解码时返回 None。
    #[instrument(skip(self))]
    pub async fn evaluate_rule(
        &self,
        rule_id: i64,
        entity_id: i64,
    ) -> Option<RuleEvaluationOutcome> {
        let rule = self.find_rule(rule_id).await?;

        let data = self.fetch_entity(rule.entity_type, entity_id).await;
        if data.is_empty() {
            error!(
                entity_id,
                entity_type = %rule.entity_type,
                "实体不存在"
            );
            return None;
        }

        self.evaluate(&rule, Some(entity_id), &data)
    }

    /// 对单个实体评估该实体类型的全部启用规则
    ///
    /// 结果按规则存储顺序排列，表达式无法解码的规则不出现在结果中。
    #[instrument(skip(self))]
    pub async fn evaluate_rules(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Vec<RuleEvaluationOutcome> {
        let rules = self.active_rules(entity_type).await;
        if rules.is_empty() {
            info!(entity_type = %entity_type, "没有启用的规则");
            return Vec::new();
        }

        let data = self.fetch_entity(entity_type, entity_id).await;
        if data.is_empty() {
            error!(entity_id, entity_type = %entity_type, "实体不存在");
            return Vec::new();
        }

        self.evaluate_all(&rules, Some(entity_id), &data)
    }

    /// 使用调用方提供的实体数据评估指定规则
    ///
    /// 不经过实体数据提供者，空数据同样参与求值。
    /// 实体 ID 从数据的 ID 字段读取，缺失或不是整数时为 None。
    #[instrument(skip(self, data), fields(fields = data.len()))]
    pub async fn evaluate_rule_with_data(
        &self,
        rule_id: i64,
        data: &EntityData,
    ) -> Option<RuleEvaluationOutcome> {
        let rule = self.find_rule(rule_id).await?;
        self.evaluate(&rule, data.entity_id(&self.entity_id_field), data)
    }

    /// 使用调用方提供的实体数据评估该实体类型的全部启用规则
    ///
    /// 与 `evaluate_rule_with_data` 相同，空数据不视为实体不存在。
    #[instrument(skip(self, data), fields(fields = data.len()))]
    pub async fn evaluate_rules_with_data(
        &self,
        entity_type: EntityType,
        data: &EntityData,
    ) -> Vec<RuleEvaluationOutcome> {
        let rules = self.active_rules(entity_type).await;
        if rules.is_empty() {
            info!(entity_type = %entity_type, "没有启用的规则");
            return Vec::new();
        }

        self.evaluate_all(&rules, data.entity_id(&self.entity_id_field), data)
    }

    fn evaluate_all(
        &self,
        rules: &[Rule],
        entity_id: Option<i64>,
        data: &EntityData,
    ) -> Vec<RuleEvaluationOutcome> {
        rules
            .iter()
            .filter_map(|rule| self.evaluate(rule, entity_id, data))
            .collect()
    }

    /// 解码并求值单条规则
    fn evaluate(
        &self,
        rule: &Rule,
        entity_id: Option<i64>,
        data: &EntityData,
    ) -> Option<RuleEvaluationOutcome> {
        let expression = match ExpressionCodec::decode(&rule.expression_json) {
            Ok(expression) => expression,
            Err(e) => {
                error!(rule_id = rule.id, error = %e, "规则表达式解码失败");
                record_decode_failure(rule.entity_type.as_str());
                return None;
            }
        };

        let start = Instant::now();
        let outcome = match expression.try_evaluate(data) {
            Ok(result) => {
                debug!(rule_id = rule.id, ?entity_id, result, "规则评估完成");
                RuleEvaluationOutcome::new(rule, entity_id, result)
            }
            Err(e) => {
                warn!(
                    rule_id = rule.id,
                    ?entity_id,
                    error_code = e.error_code(),
                    error = %e,
                    "规则求值出错，按 false 处理"
                );
                RuleEvaluationOutcome::failed(rule, entity_id, e.to_string())
            }
        };

        let label = match (&outcome.error, outcome.result) {
            (Some(_), _) => "failed",
            (None, true) => "matched",
            (None, false) => "unmatched",
        };
        record_rule_evaluation(
            rule.entity_type.as_str(),
            label,
            start.elapsed().as_secs_f64(),
        );

        Some(outcome)
    }

    async fn find_rule(&self, rule_id: i64) -> Option<Rule> {
        match self.rules.find_by_id(rule_id).await {
            Ok(Some(rule)) => Some(rule),
            Ok(None) => {
                error!(rule_id, "规则不存在");
                None
            }
            Err(e) => {
                error!(rule_id, error = %e, "查询规则失败");
                None
            }
        }
    }

    async fn active_rules(&self, entity_type: EntityType) -> Vec<Rule> {
        self.rules
            .find_active_by_entity_type(entity_type)
            .await
            .unwrap_or_else(|e| {
                error!(entity_type = %entity_type, error = %e, "查询启用规则失败");
                Vec::new()
            })
    }

    async fn fetch_entity(&self, entity_type: EntityType, entity_id: i64) -> EntityData {
        self.entities
            .fetch(entity_type, entity_id)
            .await
            .unwrap_or_else(|e| {
                error!(entity_type = %entity_type, entity_id, error = %e, "获取实体数据失败");
                EntityData::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{MockEntityDataProvider, TicketStatus};
    use crate::error::RuleError;
    use crate::expression::Expression;
    use crate::operators::Operator;
    use crate::store::MockRuleRepository;
    use crate::value::SymbolicEnum;
    use mockall::predicate::eq;
    use serde_json::Value;

    fn open_ticket_rule(id: i64) -> Rule {
        Rule::from_expression(
            id,
            "open tickets",
            EntityType::Ticket,
            &Expression::condition("status", Operator::Equals, "OPEN"),
        )
        .unwrap()
    }

    fn ticket_data() -> EntityData {
        EntityData::new()
            .with("id", 5_i64)
            .with("status", TicketStatus::Open.symbol())
            .with("title", "Printer")
    }

    #[tokio::test]
    async fn test_evaluate_rule_fetches_entity_by_rule_type() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(open_ticket_rule(id))));

        let mut entities = MockEntityDataProvider::new();
        entities
            .expect_fetch()
            .with(eq(EntityType::Ticket), eq(5))
            .times(1)
            .returning(|_, _| Ok(ticket_data()));

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(entities));
        let outcome = engine.evaluate_rule(1, 5).await.unwrap();

        assert!(outcome.result);
        assert_eq!(outcome.entity_id, Some(5));
        assert_eq!(outcome.rule_name, "open tickets");
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_store_error_is_treated_as_missing_rule() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_by_id()
            .returning(|_| Err(RuleError::Store("connection refused".into())));

        let mut entities = MockEntityDataProvider::new();
        entities.expect_fetch().never();

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(entities));
        assert!(engine.evaluate_rule(1, 5).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_is_treated_as_missing_entity() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_active_by_entity_type()
            .returning(|_| Ok(vec![open_ticket_rule(1)]));

        let mut entities = MockEntityDataProvider::new();
        entities
            .expect_fetch()
            .returning(|_, _| Err(RuleError::Store("timeout".into())));

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(entities));
        assert!(engine.evaluate_rules(EntityType::Ticket, 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_no_active_rules_skips_entity_fetch() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_active_by_entity_type()
            .returning(|_| Ok(vec![]));

        let mut entities = MockEntityDataProvider::new();
        entities.expect_fetch().never();

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(entities));
        assert!(engine.evaluate_rules(EntityType::Leave, 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_entity_id_field() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_by_id()
            .returning(|id| Ok(Some(open_ticket_rule(id))));

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(MockEntityDataProvider::new()))
            .with_entity_id_field("ticketId");

        let data = ticket_data().with("ticketId", 77_i64);
        let outcome = engine.evaluate_rule_with_data(1, &data).await.unwrap();
        assert_eq!(outcome.entity_id, Some(77));
    }

    #[tokio::test]
    async fn test_empty_caller_data_is_still_evaluated() {
        let missing_is_null = |id| {
            Rule::from_expression(
                id,
                "missing field",
                EntityType::Ticket,
                &Expression::condition("missing", Operator::IsNull, Value::Null),
            )
            .unwrap()
        };

        let mut rules = MockRuleRepository::new();
        rules
            .expect_find_by_id()
            .returning(move |id| Ok(Some(missing_is_null(id))));
        rules
            .expect_find_active_by_entity_type()
            .returning(move |_| Ok(vec![missing_is_null(1)]));

        let mut entities = MockEntityDataProvider::new();
        entities.expect_fetch().never();

        let engine = RuleEngine::new(Arc::new(rules), Arc::new(entities));

        let outcome = engine
            .evaluate_rule_with_data(1, &EntityData::new())
            .await
            .unwrap();
        assert!(outcome.result);
        assert_eq!(outcome.entity_id, None);

        let outcomes = engine
            .evaluate_rules_with_data(EntityType::Ticket, &EntityData::new())
            .await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result);
        assert_eq!(outcomes[0].entity_id, None);
    }
}
