//! 实体数据访问接口
//!
//! 规则引擎只通过这两个接口读取和修改实体，不关心实体的存储方式。

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::models::{Leave, Roster, Ticket};
use super::record::EntityRecord;
use crate::error::Result;
use crate::models::EntityType;
use crate::value::EntityData;

/// 实体数据提供者
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityDataProvider: Send + Sync {
    /// 获取实体的字段映射，实体不存在时返回空映射
    async fn fetch(&self, entity_type: EntityType, entity_id: i64) -> Result<EntityData>;
}

/// 实体属性更新接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityUpdater: Send + Sync {
    /// 更新实体属性
    ///
    /// 实体不存在返回 `Ok(false)`；任一属性写入失败时整体不生效并返回错误。
    async fn update_properties(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        properties: &Map<String, Value>,
    ) -> Result<bool>;
}

/// 内存实体存储
///
/// 使用 DashMap 提供线程安全的实体读写，克隆后共享同一份数据。
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    tickets: Arc<DashMap<i64, Ticket>>,
    rosters: Arc<DashMap<i64, Roster>>,
    leaves: Arc<DashMap<i64, Leave>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        self.tickets.insert(ticket.id, ticket);
    }

    pub fn insert_roster(&self, roster: Roster) {
        self.rosters.insert(roster.id, roster);
    }

    pub fn insert_leave(&self, leave: Leave) {
        self.leaves.insert(leave.id, leave);
    }

    pub fn ticket(&self, id: i64) -> Option<Ticket> {
        self.tickets.get(&id).map(|t| t.value().clone())
    }

    pub fn roster(&self, id: i64) -> Option<Roster> {
        self.rosters.get(&id).map(|r| r.value().clone())
    }

    pub fn leave(&self, id: i64) -> Option<Leave> {
        self.leaves.get(&id).map(|l| l.value().clone())
    }

    /// 指定类型的全部实体 ID（升序）
    pub fn ids(&self, entity_type: EntityType) -> Vec<i64> {
        let mut ids: Vec<i64> = match entity_type {
            EntityType::Ticket => self.tickets.iter().map(|e| *e.key()).collect(),
            EntityType::Roster => self.rosters.iter().map(|e| *e.key()).collect(),
            EntityType::Leave => self.leaves.iter().map(|e| *e.key()).collect(),
        };
        ids.sort_unstable();
        ids
    }

    /// 实体总数
    pub fn len(&self) -> usize {
        self.tickets.len() + self.rosters.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn field_map<T: EntityRecord>(entities: &DashMap<i64, T>, id: i64) -> EntityData {
        entities
            .get(&id)
            .map(|entity| entity.value().to_field_map())
            .unwrap_or_default()
    }

    /// 在副本上写入属性，全部成功后再替换原实体
    fn update<T: EntityRecord>(
        entities: &DashMap<i64, T>,
        id: i64,
        properties: &Map<String, Value>,
    ) -> Result<bool> {
        let Some(mut entry) = entities.get_mut(&id) else {
            debug!(entity = T::ENTITY_NAME, id, "待更新的实体不存在");
            return Ok(false);
        };

        let mut updated = entry.value().clone();
        updated.apply_properties(properties)?;
        *entry = updated;

        info!(
            entity = T::ENTITY_NAME,
            id,
            properties = properties.len(),
            "实体属性已更新"
        );
        Ok(true)
    }
}

#[async_trait]
impl EntityDataProvider for InMemoryEntityStore {
    async fn fetch(&self, entity_type: EntityType, entity_id: i64) -> Result<EntityData> {
        let data = match entity_type {
            EntityType::Ticket => Self::field_map(&self.tickets, entity_id),
            EntityType::Roster => Self::field_map(&self.rosters, entity_id),
            EntityType::Leave => Self::field_map(&self.leaves, entity_id),
        };
        Ok(data)
    }
}

#[async_trait]
impl EntityUpdater for InMemoryEntityStore {
    async fn update_properties(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        properties: &Map<String, Value>,
    ) -> Result<bool> {
        match entity_type {
            EntityType::Ticket => Self::update(&self.tickets, entity_id, properties),
            EntityType::Roster => Self::update(&self.rosters, entity_id, properties),
            EntityType::Leave => Self::update(&self.leaves, entity_id, properties),
        }
    }
}
