//! 实体规则引擎
//!
//! 对工单、排班、请假等实体评估 JSON 定义的布尔规则，并为命中的规则执行动作：
//! - JSON 表达式树的解码与编码
//! - 短路求值与比较值类型转换
//! - 按实体类型批量评估规则
//! - 邮件 / 聚合 / 属性更新动作的调度

pub mod action;
pub mod codec;
pub mod engine;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod models;
pub mod operators;
pub mod seed;
pub mod store;
pub mod value;

pub use action::{ActionEngine, ActionHandler};
pub use codec::ExpressionCodec;
pub use engine::RuleEngine;
pub use entity::{EntityDataProvider, EntityUpdater, InMemoryEntityStore};
pub use error::{Result, RuleError};
pub use expression::{Condition, Expression, LogicalGroup};
pub use models::{
    ActionConfiguration, ActionOutcome, ActionType, EntityType, Rule, RuleEvaluationOutcome,
};
pub use operators::Operator;
pub use seed::SeedData;
pub use store::{
    ActionConfigurationRepository, InMemoryActionConfigurationStore, InMemoryRuleStore,
    RuleRepository,
};
pub use value::{EntityData, FieldValue};
