//! 实体字段值模型
//!
//! 实体以扁平的 `字段名 -> FieldValue` 映射参与规则求值。`FieldValue` 保留了
//! 字段的运行时类型（整数宽度、枚举归属、日期），求值器据此决定比较值的类型转换方式。

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;

/// 枚举成员
///
/// 携带所属枚举的类型名和完整成员表，使字符串比较值可以按"同一枚举的成员"解析，
/// 并且按成员声明顺序进行有序比较。
#[derive(Debug, Clone, Copy)]
pub struct EnumSymbol {
    type_name: &'static str,
    ordinal: usize,
    members: &'static [&'static str],
}

impl EnumSymbol {
    /// 按成员序号构造，序号越界返回 None
    pub fn new(
        type_name: &'static str,
        members: &'static [&'static str],
        ordinal: usize,
    ) -> Option<Self> {
        (ordinal < members.len()).then_some(Self {
            type_name,
            ordinal,
            members,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &'static str {
        self.members[self.ordinal]
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// 将字符串解析为同一枚举的成员（区分大小写）
    pub fn parse_member(&self, literal: &str) -> Option<Self> {
        self.members
            .iter()
            .position(|member| *member == literal)
            .map(|ordinal| Self { ordinal, ..*self })
    }

    /// 是否属于同一枚举
    pub fn same_enum(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl PartialEq for EnumSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.same_enum(other) && self.ordinal == other.ordinal
    }
}

impl Eq for EnumSymbol {}

/// 可作为规则字段值参与比较的枚举
///
/// 实现方需保证 `VARIANTS[i]` 与 `MEMBERS[i]` 一一对应，且 `ordinal()` 返回其下标。
pub trait SymbolicEnum: Copy + Sized + 'static {
    const TYPE_NAME: &'static str;
    const VARIANTS: &'static [Self];
    const MEMBERS: &'static [&'static str];

    fn ordinal(self) -> usize;

    fn name(self) -> &'static str {
        Self::MEMBERS[self.ordinal()]
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .position(|member| *member == name)
            .map(|i| Self::VARIANTS[i])
    }

    fn symbol(self) -> EnumSymbol {
        EnumSymbol {
            type_name: Self::TYPE_NAME,
            ordinal: self.ordinal(),
            members: Self::MEMBERS,
        }
    }
}

/// 实体字段的运行时值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Enum(EnumSymbol),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// 将 JSON 标量转换为字段值
    ///
    /// 整数优先落在 `Int`，超出 i32 范围时为 `Long`；数组和对象不是标量，返回 None。
    pub fn from_literal(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::from_number(n)),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            match i32::try_from(i) {
                Ok(small) => Self::Int(small),
                Err(_) => Self::Long(i),
            }
        } else {
            // u64 超出 i64 范围或浮点数
            Self::Double(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Long(_) | Self::Double(_))
    }

    /// 整数类型的值（Int / Long）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i64::from(*i)),
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(f64::from(*i)),
            Self::Long(l) => Some(*l as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// 类型名称（用于错误信息）
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Enum(symbol) => symbol.type_name(),
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
        }
    }

    /// 转换为 JSON 值，枚举输出成员名，日期输出 ISO-8601 文本
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Long(l) => Value::from(*l),
            Self::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
            Self::Enum(symbol) => Value::String(symbol.name().to_string()),
            Self::Date(_) | Self::DateTime(_) => Value::String(self.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Long(l) => write!(f, "{}", l),
            Self::Double(d) => write!(f, "{:?}", d),
            Self::String(s) => write!(f, "{}", s),
            Self::Enum(symbol) => write!(f, "{}", symbol.name()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<EnumSymbol> for FieldValue {
    fn from(value: EnumSymbol) -> Self {
        Self::Enum(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// 实体数据 - 提供给规则引擎的扁平字段映射
///
/// 约定 `"id"` 字段承载实体 ID。空映射表示实体不存在。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityData {
    fields: HashMap<String, FieldValue>,
}

impl EntityData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加字段
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// 获取字段值，字段缺失返回 None
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// 读取实体 ID，字段缺失或不是整数时返回 None
    pub fn entity_id(&self, id_field: &str) -> Option<i64> {
        self.get(id_field).and_then(FieldValue::as_i64)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FieldValue)> for EntityData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
