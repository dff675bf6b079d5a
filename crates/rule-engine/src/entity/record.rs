//! 实体与字段映射之间的适配
//!
//! 每种实体显式声明自己暴露给规则的字段，以及属性更新时可写入的字段。

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use super::models::{Leave, Roster, Ticket};
use crate::error::{Result, RuleError};
use crate::models::EntityType;
use crate::value::{EntityData, SymbolicEnum};

/// 可参与规则求值的实体
pub trait EntityRecord: Clone + Send + Sync + 'static {
    const ENTITY_TYPE: EntityType;
    const ENTITY_NAME: &'static str;

    fn id(&self) -> i64;

    /// 转换为扁平字段映射，未设置的可选字段以 `Null` 出现
    fn to_field_map(&self) -> EntityData;

    /// 写入单个属性
    ///
    /// 返回 `Ok(false)` 表示实体没有该属性；值类型不匹配或属性只读时返回错误。
    fn apply_property(&mut self, property: &str, value: &Value) -> Result<bool>;

    /// 批量写入属性，未知属性记录警告后忽略
    fn apply_properties(&mut self, properties: &Map<String, Value>) -> Result<()> {
        for (property, value) in properties {
            if !self.apply_property(property, value)? {
                warn!(
                    entity = Self::ENTITY_NAME,
                    id = self.id(),
                    property = %property,
                    "忽略未知属性"
                );
            }
        }
        Ok(())
    }
}

impl EntityRecord for Ticket {
    const ENTITY_TYPE: EntityType = EntityType::Ticket;
    const ENTITY_NAME: &'static str = "Ticket";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_field_map(&self) -> EntityData {
        EntityData::new()
            .with("id", self.id)
            .with("title", self.title.as_str())
            .with("description", self.description.clone())
            .with("assignee", self.assignee.clone())
            .with("status", self.status.symbol())
            .with("priority", self.priority)
    }

    fn apply_property(&mut self, property: &str, value: &Value) -> Result<bool> {
        let p = PropertyValue::new(Self::ENTITY_NAME, property, value);
        match property {
            "id" => return Err(p.read_only()),
            "title" => self.title = p.string()?,
            "description" => self.description = p.optional_string()?,
            "assignee" => self.assignee = p.optional_string()?,
            "status" => self.status = p.symbol()?,
            "priority" => self.priority = p.optional_i32()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl EntityRecord for Roster {
    const ENTITY_TYPE: EntityType = EntityType::Roster;
    const ENTITY_NAME: &'static str = "Roster";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_field_map(&self) -> EntityData {
        EntityData::new()
            .with("id", self.id)
            .with("employeeId", self.employee_id.as_str())
            .with("employeeName", self.employee_name.as_str())
            .with("department", self.department.clone())
            .with("shift", self.shift.clone())
            .with("date", self.date)
            .with("hoursAllocated", self.hours_allocated)
    }

    fn apply_property(&mut self, property: &str, value: &Value) -> Result<bool> {
        let p = PropertyValue::new(Self::ENTITY_NAME, property, value);
        match property {
            "id" => return Err(p.read_only()),
            "employeeId" => self.employee_id = p.string()?,
            "employeeName" => self.employee_name = p.string()?,
            "department" => self.department = p.optional_string()?,
            "shift" => self.shift = p.optional_string()?,
            "date" => self.date = p.date()?,
            "hoursAllocated" => self.hours_allocated = p.optional_i32()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl EntityRecord for Leave {
    const ENTITY_TYPE: EntityType = EntityType::Leave;
    const ENTITY_NAME: &'static str = "Leave";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_field_map(&self) -> EntityData {
        EntityData::new()
            .with("id", self.id)
            .with("employeeId", self.employee_id.as_str())
            .with("employeeName", self.employee_name.as_str())
            .with("startDate", self.start_date)
            .with("endDate", self.end_date)
            .with("type", self.leave_type.symbol())
            .with("status", self.status.symbol())
            .with("reason", self.reason.clone())
    }

    fn apply_property(&mut self, property: &str, value: &Value) -> Result<bool> {
        let p = PropertyValue::new(Self::ENTITY_NAME, property, value);
        match property {
            "id" => return Err(p.read_only()),
            "employeeId" => self.employee_id = p.string()?,
            "employeeName" => self.employee_name = p.string()?,
            "startDate" => self.start_date = p.date()?,
            "endDate" => self.end_date = p.date()?,
            "type" => self.leave_type = p.symbol()?,
            "status" => self.status = p.symbol()?,
            "reason" => self.reason = p.optional_string()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// 待写入的属性值，负责按目标字段类型解析
struct PropertyValue<'a> {
    entity: &'static str,
    property: &'a str,
    value: &'a Value,
}

impl<'a> PropertyValue<'a> {
    fn new(entity: &'static str, property: &'a str, value: &'a Value) -> Self {
        Self {
            entity,
            property,
            value,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> RuleError {
        RuleError::InvalidProperty {
            entity: self.entity.to_string(),
            property: self.property.to_string(),
            message: message.into(),
        }
    }

    fn read_only(&self) -> RuleError {
        self.invalid("属性只读")
    }

    fn string(&self) -> Result<String> {
        self.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(format!("期望字符串, 实际 {}", self.value)))
    }

    fn optional_string(&self) -> Result<Option<String>> {
        if self.value.is_null() {
            return Ok(None);
        }
        self.string().map(Some)
    }

    fn optional_i32(&self) -> Result<Option<i32>> {
        if self.value.is_null() {
            return Ok(None);
        }
        self.value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| self.invalid(format!("期望 32 位整数, 实际 {}", self.value)))
    }

    fn date(&self) -> Result<NaiveDate> {
        self.value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .ok_or_else(|| self.invalid(format!("期望 YYYY-MM-DD 日期, 实际 {}", self.value)))
    }

    fn symbol<E: SymbolicEnum>(&self) -> Result<E> {
        self.value
            .as_str()
            .and_then(E::from_name)
            .ok_or_else(|| {
                self.invalid(format!(
                    "期望 {} 成员 {:?}, 实际 {}",
                    E::TYPE_NAME,
                    E::MEMBERS,
                    self.value
                ))
            })
    }
}
