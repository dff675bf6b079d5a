//! 表达式编解码
//!
//! JSON 与表达式树之间的互相转换。解码失败时不产生部分构建的树。

use crate::error::{Result, RuleError};
use crate::expression::{EXPRESSION_TYPES, Expression};
use serde_json::Value;

/// 表达式编解码器
pub struct ExpressionCodec;

impl ExpressionCodec {
    /// 从 JSON 字符串解码
    pub fn decode(json: &str) -> Result<Expression> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| RuleError::Decode(format!("无效的 JSON: {}", e)))?;
        Self::decode_value(value)
    }

    /// 从 JSON 值解码
    pub fn decode_value(value: Value) -> Result<Expression> {
        Self::check_node(&value, "$")?;

        serde_json::from_value(value).map_err(|e| RuleError::Decode(e.to_string()))
    }

    /// 编码为 JSON 字符串
    pub fn encode(expression: &Expression) -> Result<String> {
        Ok(serde_json::to_string(expression)?)
    }

    /// 编码为 JSON 值
    pub fn encode_value(expression: &Expression) -> Result<Value> {
        Ok(serde_json::to_value(expression)?)
    }

    /// 结构预检：节点类型标签必须已知，条件的比较值必须是标量或 null
    fn check_node(node: &Value, path: &str) -> Result<()> {
        let object = node
            .as_object()
            .ok_or_else(|| RuleError::Decode(format!("{}: 表达式节点必须是 JSON 对象", path)))?;

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::Decode(format!("{}: 缺少 type 字段", path)))?;

        if !EXPRESSION_TYPES.contains(&kind) {
            return Err(RuleError::Decode(format!(
                "{}: 未知的表达式类型 '{}'，支持 {:?}",
                path, kind, EXPRESSION_TYPES
            )));
        }

        if kind == EXPRESSION_TYPES[0] {
            if let Some(value) = object.get("value") {
                if value.is_array() || value.is_object() {
                    return Err(RuleError::Decode(format!(
                        "{}.value: 比较值必须是标量或 null",
                        path
                    )));
                }
            }
            return Ok(());
        }

        // 缺失 expressions 交由反序列化报告
        if let Some(children) = object.get("expressions").and_then(Value::as_array) {
            for (i, child) in children.iter().enumerate() {
                Self::check_node(child, &format!("{}.expressions[{}]", path, i))?;
            }
        }

        Ok(())
    }
}
