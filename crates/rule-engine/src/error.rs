//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则表达式解析失败: {0}")]
    Decode(String),

    #[error("类型转换失败: 无法将 '{literal}' 转换为 {target}")]
    Coercion { literal: String, target: String },

    #[error("类型不可比较: 字段 {field} ({field_type}) 与 {literal_type}")]
    IncomparableTypes {
        field: String,
        field_type: String,
        literal_type: String,
    },

    #[error("操作符 {operator} 需要非空比较值: 字段 {field}")]
    NullOperand { field: String, operator: String },

    #[error("动作执行失败: {0}")]
    HandlerExecution(String),

    #[error("无效的属性: {entity}.{property} - {message}")]
    InvalidProperty {
        entity: String,
        property: String,
        message: String,
    },

    #[error("存储访问失败: {0}")]
    Store(String),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 获取错误码（用于日志和指标标签）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DECODE_FAILED",
            Self::Coercion { .. } => "COERCION_FAILED",
            Self::IncomparableTypes { .. } => "INCOMPARABLE_TYPES",
            Self::NullOperand { .. } => "NULL_OPERAND",
            Self::HandlerExecution(_) => "HANDLER_EXECUTION_FAILED",
            Self::InvalidProperty { .. } => "INVALID_PROPERTY",
            Self::Store(_) => "STORE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
