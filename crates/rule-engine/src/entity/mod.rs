//! 业务实体
//!
//! - `models`: 工单、排班、请假实体及其枚举
//! - `record`: 实体到规则字段映射的适配，以及属性写入
//! - `provider`: 实体读取 / 更新接口与内存实现

pub mod models;
pub mod provider;
pub mod record;

pub use models::{Leave, LeaveStatus, LeaveType, Roster, Ticket, TicketStatus};
pub use provider::{EntityDataProvider, EntityUpdater, InMemoryEntityStore};
pub use record::EntityRecord;

#[cfg(test)]
pub use provider::{MockEntityDataProvider, MockEntityUpdater};
