//! 规则表达式模型
//!
//! 表达式是由条件节点和逻辑组合节点（AND / OR）构成的树，构建后不可变。
//! JSON 形式通过 `type` 字段区分节点类型：
//!
//! ```json
//! {"type": "AND", "expressions": [
//!     {"type": "CONDITION", "field": "status", "operator": "EQUALS", "value": "OPEN"},
//!     {"type": "CONDITION", "field": "priority", "operator": "GREATER_THAN", "value": 3}
//! ]}
//! ```

use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::operators::Operator;
use crate::value::EntityData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// 表达式类型标签，与 JSON 中 `type` 字段的取值一一对应
pub const EXPRESSION_TYPES: [&str; 3] = ["CONDITION", "AND", "OR"];

/// 规则表达式（条件或逻辑组）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Expression {
    Condition(Condition),
    And(LogicalGroup),
    Or(LogicalGroup),
}

/// 条件节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// 比较值，仅允许标量或 null；空值检查操作符忽略此值
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// 对实体数据求值
    pub fn evaluate(&self, data: &EntityData) -> Result<bool> {
        let result = ConditionEvaluator::evaluate(
            &self.field,
            data.get(&self.field),
            self.operator,
            &self.value,
        )?;

        trace!(
            field = %self.field,
            operator = %self.operator,
            value = %self.value,
            result,
            "条件求值"
        );

        Ok(result)
    }
}

/// 逻辑组节点，子表达式保持定义顺序
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalGroup {
    pub expressions: Vec<Expression>,
}

impl LogicalGroup {
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }
}

impl Expression {
    pub fn condition(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, operator, value))
    }

    pub fn and(expressions: Vec<Expression>) -> Self {
        Self::And(LogicalGroup::new(expressions))
    }

    pub fn or(expressions: Vec<Expression>) -> Self {
        Self::Or(LogicalGroup::new(expressions))
    }

    /// 对实体数据求值，任何求值错误都按 false 处理
    pub fn evaluate(&self, data: &EntityData) -> bool {
        self.try_evaluate(data).unwrap_or_else(|e| {
            trace!(error = %e, "表达式求值失败，按 false 处理");
            false
        })
    }

    /// 对实体数据求值并保留求值错误
    ///
    /// AND 遇到第一个 false 即返回，OR 遇到第一个 true 即返回，均按定义顺序从左到右；
    /// 被短路跳过的子表达式不会产生错误。空 AND 为 true，空 OR 为 false。
    pub fn try_evaluate(&self, data: &EntityData) -> Result<bool> {
        match self {
            Self::Condition(condition) => condition.evaluate(data),
            Self::And(group) => {
                for expression in &group.expressions {
                    if !expression.try_evaluate(data)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(group) => {
                for expression in &group.expressions {
                    if expression.try_evaluate(data)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use serde_json::json;

    fn ticket_data(priority: i32) -> EntityData {
        EntityData::new()
            .with("id", 1_i64)
            .with("title", "Printer broken")
            .with("priority", priority)
    }

    #[test]
    fn test_empty_groups() {
        let data = ticket_data(1);
        assert!(Expression::and(vec![]).evaluate(&data));
        assert!(!Expression::or(vec![]).evaluate(&data));
    }

    #[test]
    fn test_and_or_logic() {
        let data = ticket_data(5);
        let high = Expression::condition("priority", Operator::GreaterThan, 3);
        let low = Expression::condition("priority", Operator::LessThan, 3);

        assert!(Expression::and(vec![high.clone()]).evaluate(&data));
        assert!(!Expression::and(vec![high.clone(), low.clone()]).evaluate(&data));
        assert!(Expression::or(vec![low.clone(), high.clone()]).evaluate(&data));
        assert!(!Expression::or(vec![low.clone(), low]).evaluate(&data));
    }

    #[test]
    fn test_and_short_circuits_before_error() {
        let data = ticket_data(1);
        let failing = Expression::condition("title", Operator::GreaterThan, 3);
        let false_first = Expression::and(vec![
            Expression::condition("priority", Operator::Equals, 2),
            failing.clone(),
        ]);
        assert!(!false_first.try_evaluate(&data).unwrap());

        let error_first = Expression::and(vec![
            failing,
            Expression::condition("priority", Operator::Equals, 2),
        ]);
        assert!(matches!(
            error_first.try_evaluate(&data),
            Err(RuleError::IncomparableTypes { .. })
        ));
        assert!(!error_first.evaluate(&data));
    }

    #[test]
    fn test_or_short_circuits_before_error() {
        let data = ticket_data(1);
        let expression = Expression::or(vec![
            Expression::condition("priority", Operator::Equals, 1),
            Expression::condition("title", Operator::Contains, Value::Null),
        ]);
        assert!(expression.try_evaluate(&data).unwrap());
    }

    #[test]
    fn test_nested_error_propagates_to_root() {
        let data = ticket_data(1);
        let expression = Expression::or(vec![Expression::and(vec![Expression::condition(
            "title",
            Operator::Contains,
            Value::Null,
        )])]);
        assert!(expression.try_evaluate(&data).is_err());
        assert!(!expression.evaluate(&data));
    }

    #[test]
    fn test_serialize_wire_format() {
        let expression = Expression::and(vec![Expression::condition(
            "status",
            Operator::Equals,
            "OPEN",
        )]);
        assert_eq!(
            serde_json::to_value(&expression).unwrap(),
            json!({
                "type": "AND",
                "expressions": [
                    {"type": "CONDITION", "field": "status", "operator": "EQUALS", "value": "OPEN"}
                ]
            })
        );
    }
}
