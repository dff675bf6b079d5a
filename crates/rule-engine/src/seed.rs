//! 种子数据加载
//!
//! 从 JSON 文件加载规则、动作配置和实体到内存存储：
//!
//! ```json
//! {
//!   "rules": [{"id": 1, "name": "...", "entityType": "TICKET", "expressionJson": {...}}],
//!   "actions": [{"id": 1, "ruleId": 1, "actionType": "EMAIL", "name": "...", "configurationJson": {...}}],
//!   "tickets": [...], "rosters": [...], "leaves": [...]
//! }
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::entity::{InMemoryEntityStore, Leave, Roster, Ticket};
use crate::error::Result;
use crate::models::{ActionConfiguration, Rule};
use crate::store::{InMemoryActionConfigurationStore, InMemoryRuleStore};

/// 种子数据
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub rules: Vec<Rule>,
    pub actions: Vec<ActionConfiguration>,
    pub tickets: Vec<Ticket>,
    pub rosters: Vec<Roster>,
    pub leaves: Vec<Leave>,
}

/// 加载统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub rules: usize,
    pub actions: usize,
    pub entities: usize,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let seed = Self::from_json(&content)?;
        info!(path = %path.display(), "种子数据已读取");
        Ok(seed)
    }

    /// 写入内存存储
    pub fn apply(
        self,
        rules: &InMemoryRuleStore,
        actions: &InMemoryActionConfigurationStore,
        entities: &InMemoryEntityStore,
    ) -> SeedSummary {
        let entity_count = self.tickets.len() + self.rosters.len() + self.leaves.len();

        let summary = SeedSummary {
            rules: rules.save_all(self.rules),
            actions: actions.save_all(self.actions),
            entities: entity_count,
        };

        self.tickets
            .into_iter()
            .for_each(|ticket| entities.insert_ticket(ticket));
        self.rosters
            .into_iter()
            .for_each(|roster| entities.insert_roster(roster));
        self.leaves
            .into_iter()
            .for_each(|leave| entities.insert_leave(leave));

        info!(
            rules = summary.rules,
            actions = summary.actions,
            entities = summary.entities,
            "种子数据已加载"
        );

        summary
    }
}
