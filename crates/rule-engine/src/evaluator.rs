//! 条件评估器
//!
//! 实现单个条件的求值：空值检查、比较值类型转换、相等 / 有序 / 字符串比较。

use crate::error::{Result, RuleError};
use crate::operators::Operator;
use crate::value::FieldValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::trace;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `field` - 字段名（用于错误信息）
    /// * `field_value` - 从实体数据中获取的字段值，缺失与 `Null` 等价
    /// * `operator` - 操作符
    /// * `literal` - 规则中定义的比较值
    ///
    /// 类型转换失败返回 `Ok(false)`；不可比较的类型和字符串操作的空比较值返回错误。
    pub fn evaluate(
        field: &str,
        field_value: Option<&FieldValue>,
        operator: Operator,
        literal: &Value,
    ) -> Result<bool> {
        let field_value = field_value.filter(|v| !v.is_null());

        // 空值检查先于其它判断，字段缺失时同样生效
        if operator.is_null_check() {
            return Ok(field_value.is_none() == (operator == Operator::IsNull));
        }

        let Some(field_value) = field_value else {
            return Ok(false);
        };

        let Some(expected) = Self::coerce(field, field_value, literal)? else {
            trace!(field, %literal, target = field_value.type_name(), "比较值类型转换失败");
            return Ok(false);
        };

        match operator {
            Operator::Equals => Ok(Self::equals(field_value, &expected)),
            Operator::NotEquals => Ok(!Self::equals(field_value, &expected)),
            Operator::GreaterThan => {
                Self::compare(field, field_value, &expected).map(Ordering::is_gt)
            }
            Operator::GreaterThanOrEquals => {
                Self::compare(field, field_value, &expected).map(Ordering::is_ge)
            }
            Operator::LessThan => Self::compare(field, field_value, &expected).map(Ordering::is_lt),
            Operator::LessThanOrEquals => {
                Self::compare(field, field_value, &expected).map(Ordering::is_le)
            }
            Operator::Contains => {
                Self::string_op(field, operator, field_value, &expected, |s, t| s.contains(t))
            }
            Operator::StartsWith => {
                Self::string_op(field, operator, field_value, &expected, |s, t| s.starts_with(t))
            }
            Operator::EndsWith => {
                Self::string_op(field, operator, field_value, &expected, |s, t| s.ends_with(t))
            }
            // 此处字段值必然非空
            Operator::IsNull => Ok(false),
            Operator::IsNotNull => Ok(true),
        }
    }

    /// 比较值类型转换
    ///
    /// 仅当比较值是字符串而字段不是字符串时，按字段的运行时类型解析比较值。
    /// 解析失败返回 `Ok(None)`；比较值不是标量时返回错误。
    fn coerce(field: &str, field_value: &FieldValue, literal: &Value) -> Result<Option<FieldValue>> {
        let Value::String(text) = literal else {
            return FieldValue::from_literal(literal)
                .map(Some)
                .ok_or_else(|| RuleError::Coercion {
                    literal: literal.to_string(),
                    target: format!("{} ({})", field_value.type_name(), field),
                });
        };

        let coerced = match field_value {
            FieldValue::String(_) | FieldValue::Null => Some(FieldValue::String(text.clone())),
            FieldValue::Enum(symbol) => symbol.parse_member(text).map(FieldValue::Enum),
            FieldValue::Int(_) => text.parse::<i32>().ok().map(FieldValue::Int),
            FieldValue::Long(_) => text.parse::<i64>().ok().map(FieldValue::Long),
            FieldValue::Double(_) => text.parse::<f64>().ok().map(FieldValue::Double),
            FieldValue::Bool(_) => Self::parse_bool(text).map(FieldValue::Bool),
            FieldValue::Date(_) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
            FieldValue::DateTime(_) => Self::parse_datetime(text).map(FieldValue::DateTime),
        };

        Ok(coerced)
    }

    fn parse_bool(text: &str) -> Option<bool> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// 解析日期时间，支持 RFC 3339 和纯日期（按 UTC 零点）
    fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// 相等比较
    ///
    /// 不同宽度的数值按数值比较（如 Int(5) == Long(5) == Double(5.0)），其余类型须同类才可能相等。
    fn equals(field_value: &FieldValue, expected: &FieldValue) -> bool {
        if field_value.is_numeric() && expected.is_numeric() {
            return Self::numeric_cmp(field_value, expected) == Some(Ordering::Equal);
        }

        field_value == expected
    }

    /// 有序比较
    ///
    /// 空比较值或 NaN 不可排序，视为相等；两侧均可排序但类型互不兼容时返回错误。
    fn compare(field: &str, field_value: &FieldValue, expected: &FieldValue) -> Result<Ordering> {
        if expected.is_null() {
            return Ok(Ordering::Equal);
        }

        if field_value.is_numeric() && expected.is_numeric() {
            return Ok(Self::numeric_cmp(field_value, expected).unwrap_or(Ordering::Equal));
        }

        let ordering = match (field_value, expected) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            (FieldValue::Enum(a), FieldValue::Enum(b)) if a.same_enum(b) => {
                Some(a.ordinal().cmp(&b.ordinal()))
            }
            _ => None,
        };

        ordering.ok_or_else(|| RuleError::IncomparableTypes {
            field: field.to_string(),
            field_type: field_value.type_name().to_string(),
            literal_type: expected.type_name().to_string(),
        })
    }

    /// 数值比较，整数之间精确比较，涉及浮点数时按 f64 比较
    fn numeric_cmp(a: &FieldValue, b: &FieldValue) -> Option<Ordering> {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            return Some(x.cmp(&y));
        }

        let (x, y) = (a.as_f64()?, b.as_f64()?);
        x.partial_cmp(&y)
    }

    /// 字符串操作，两侧均按字符串形式比较
    fn string_op<F>(
        field: &str,
        operator: Operator,
        field_value: &FieldValue,
        expected: &FieldValue,
        op: F,
    ) -> Result<bool>
    where
        F: Fn(&str, &str) -> bool,
    {
        if expected.is_null() {
            return Err(RuleError::NullOperand {
                field: field.to_string(),
                operator: operator.to_string(),
            });
        }

        Ok(op(&field_value.to_string(), &expected.to_string()))
    }
}
