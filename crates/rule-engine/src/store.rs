//! 规则与动作配置存储
//!
//! 规则引擎通过仓储接口读取规则和动作配置；内存实现按 ID 升序返回结果。

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::models::{ActionConfiguration, EntityType, Rule};

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 按 ID 查找规则（不区分启用状态）
    async fn find_by_id(&self, rule_id: i64) -> Result<Option<Rule>>;

    /// 查找指定实体类型的启用规则，按存储顺序返回
    async fn find_active_by_entity_type(&self, entity_type: EntityType) -> Result<Vec<Rule>>;
}

/// 动作配置仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionConfigurationRepository: Send + Sync {
    /// 查找规则下的启用动作配置，按存储顺序返回
    async fn find_active_by_rule_id(&self, rule_id: i64) -> Result<Vec<ActionConfiguration>>;
}

/// 内存规则存储
#[derive(Clone, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<RwLock<BTreeMap<i64, Rule>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存规则，已存在的同 ID 规则会被替换
    pub fn save(&self, rule: Rule) {
        self.rules.write().insert(rule.id, rule);
    }

    /// 批量保存
    pub fn save_all(&self, rules: impl IntoIterator<Item = Rule>) -> usize {
        let mut guard = self.rules.write();
        let mut count = 0;
        for rule in rules {
            guard.insert(rule.id, rule);
            count += 1;
        }
        info!("规则已加载: {} 条", count);
        count
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleStore {
    async fn find_by_id(&self, rule_id: i64) -> Result<Option<Rule>> {
        Ok(self.rules.read().get(&rule_id).cloned())
    }

    async fn find_active_by_entity_type(&self, entity_type: EntityType) -> Result<Vec<Rule>> {
        Ok(self
            .rules
            .read()
            .values()
            .filter(|rule| rule.active && rule.entity_type == entity_type)
            .cloned()
            .collect())
    }
}

/// 内存动作配置存储
#[derive(Clone, Default)]
pub struct InMemoryActionConfigurationStore {
    configurations: Arc<RwLock<BTreeMap<i64, ActionConfiguration>>>,
}

impl InMemoryActionConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, configuration: ActionConfiguration) {
        self.configurations
            .write()
            .insert(configuration.id, configuration);
    }

    pub fn save_all(&self, configurations: impl IntoIterator<Item = ActionConfiguration>) -> usize {
        let mut guard = self.configurations.write();
        let mut count = 0;
        for configuration in configurations {
            guard.insert(configuration.id, configuration);
            count += 1;
        }
        info!("动作配置已加载: {} 条", count);
        count
    }

    pub fn len(&self) -> usize {
        self.configurations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.read().is_empty()
    }
}

#[async_trait]
impl ActionConfigurationRepository for InMemoryActionConfigurationStore {
    async fn find_active_by_rule_id(&self, rule_id: i64) -> Result<Vec<ActionConfiguration>> {
        Ok(self
            .configurations
            .read()
            .values()
            .filter(|config| config.active && config.rule_id == rule_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionType;

    #[tokio::test]
    async fn test_rule_store_filters_active_by_type_in_id_order() {
        let store = InMemoryRuleStore::new();
        store.save_all(vec![
            Rule::new(3, "c", EntityType::Ticket, "{}"),
            Rule::new(1, "a", EntityType::Ticket, "{}"),
            Rule::new(2, "b", EntityType::Leave, "{}"),
            Rule::new(4, "d", EntityType::Ticket, "{}").with_active(false),
        ]);

        let rules = store
            .find_active_by_entity_type(EntityType::Ticket)
            .await
            .unwrap();
        let ids: Vec<i64> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        // 按 ID 查找不过滤启用状态
        assert!(store.find_by_id(4).await.unwrap().is_some());
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_action_store_filters_by_rule() {
        let store = InMemoryActionConfigurationStore::new();
        store.save(ActionConfiguration::new(2, 10, ActionType::Email, "e", "{}"));
        store.save(ActionConfiguration::new(1, 10, ActionType::Aggregation, "a", "{}"));
        store.save(ActionConfiguration::new(3, 11, ActionType::Email, "x", "{}"));
        store.save(
            ActionConfiguration::new(4, 10, ActionType::PropertyUpdate, "p", "{}")
                .with_active(false),
        );

        let configs = store.find_active_by_rule_id(10).await.unwrap();
        let ids: Vec<i64> = configs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.find_active_by_rule_id(12).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let store = InMemoryRuleStore::new();
        assert!(store.is_empty());
        store.save(Rule::new(1, "old", EntityType::Ticket, "{}"));
        store.save(Rule::new(1, "new", EntityType::Ticket, "{}"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(1).await.unwrap().unwrap().name, "new");
    }
}
