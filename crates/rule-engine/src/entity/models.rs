//! 业务实体模型
//!
//! 规则引用的字段名即这里的 camelCase 序列化名。

use crate::value::SymbolicEnum;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 定义可参与规则比较的枚举，成员声明顺序即有序比较的顺序
macro_rules! symbolic_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $member:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $member)]
                $variant,
            )+
        }

        impl SymbolicEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];
            const MEMBERS: &'static [&'static str] = &[$($member),+];

            fn ordinal(self) -> usize {
                self as usize
            }
        }
    };
}

symbolic_enum! {
    /// 工单状态
    TicketStatus {
        Open => "OPEN",
        InProgress => "IN_PROGRESS",
        Resolved => "RESOLVED",
        Closed => "CLOSED",
    }
}

symbolic_enum! {
    /// 请假类型
    LeaveType {
        Annual => "ANNUAL",
        Sick => "SICK",
        Maternity => "MATERNITY",
        Paternity => "PATERNITY",
        Unpaid => "UNPAID",
    }
}

symbolic_enum! {
    /// 请假审批状态
    LeaveStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
}

/// 工单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl Ticket {
    pub fn new(id: i64, title: impl Into<String>, status: TicketStatus) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            assignee: None,
            status,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// 排班
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub hours_allocated: Option<i32>,
}

/// 请假申请
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub status: LeaveStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symbolic_enum_members() {
        assert_eq!(TicketStatus::InProgress.name(), "IN_PROGRESS");
        assert_eq!(TicketStatus::from_name("CLOSED"), Some(TicketStatus::Closed));
        assert_eq!(LeaveType::TYPE_NAME, "LeaveType");
        assert_eq!(LeaveStatus::Cancelled.ordinal(), 3);
    }

    #[test]
    fn test_enum_serde_matches_members() {
        assert_eq!(
            serde_json::to_value(TicketStatus::InProgress).unwrap(),
            json!("IN_PROGRESS")
        );
        assert_eq!(
            serde_json::from_value::<LeaveType>(json!("SICK")).unwrap(),
            LeaveType::Sick
        );
    }

    #[test]
    fn test_leave_deserialize_type_field() {
        let leave: Leave = serde_json::from_value(json!({
            "id": 1,
            "employeeId": "E1",
            "employeeName": "Alex",
            "startDate": "2024-07-01",
            "endDate": "2024-07-05",
            "type": "ANNUAL",
            "status": "PENDING"
        }))
        .unwrap();
        assert_eq!(leave.leave_type, LeaveType::Annual);
        assert!(leave.reason.is_none());
    }
}
