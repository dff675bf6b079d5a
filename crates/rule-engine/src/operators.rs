//! 条件操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    // 通用比较
    Equals,
    NotEquals,

    // 有序比较
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,

    // 字符串操作
    Contains,
    StartsWith,
    EndsWith,

    // 空值检查
    IsNull,
    IsNotNull,
}

impl Operator {
    /// 空值检查操作符不需要比较值，且在字段缺失时也参与求值
    pub fn is_null_check(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEquals => "GREATER_THAN_OR_EQUALS",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEquals => "LESS_THAN_OR_EQUALS",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_display() {
        let all = [
            Operator::Equals,
            Operator::NotEquals,
            Operator::GreaterThan,
            Operator::GreaterThanOrEquals,
            Operator::LessThan,
            Operator::LessThanOrEquals,
            Operator::Contains,
            Operator::StartsWith,
            Operator::EndsWith,
            Operator::IsNull,
            Operator::IsNotNull,
        ];

        for op in all {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, serde_json::Value::String(op.to_string()));
        }
    }

    #[test]
    fn test_deserialize_operator() {
        let op: Operator = serde_json::from_str("\"GREATER_THAN_OR_EQUALS\"").unwrap();
        assert_eq!(op, Operator::GreaterThanOrEquals);
        assert!(serde_json::from_str::<Operator>("\"gte\"").is_err());
    }

    #[test]
    fn test_operator_classification() {
        assert!(Operator::IsNull.is_null_check());
        assert!(Operator::IsNotNull.is_null_check());
        assert!(!Operator::Equals.is_null_check());
    }
}
