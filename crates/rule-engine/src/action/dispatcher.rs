//! 动作调度
//!
//! 为规则评估结果加载启用的动作配置，按注册顺序为每条配置挑选第一个可处理的 Handler 执行。
//!
//! ## 设计说明
//!
//! Handler 以有序列表保存（而非按类型索引），同一动作类型可以注册多个 Handler，
//! 先注册者优先。没有 Handler 能处理的配置记录警告后跳过，不产生结果。
//!
//! ## 使用示例
//!
//! ```ignore
//! let store = InMemoryEntityStore::new();
//! let engine = ActionEngine::with_defaults(
//!     Arc::new(action_store),
//!     Arc::new(store.clone()),
//!     Arc::new(store),
//! );
//! let outcomes = engine.execute_actions(&rule_outcome).await;
//! ```

use std::sync::Arc;
use std::time::Instant;

use rules_shared::observability::metrics::record_action_execution;
use tracing::{debug, error, info, instrument, warn};

use crate::action::handler::ActionHandler;
use crate::action::handlers::{AggregationHandler, EmailHandler, PropertyUpdateHandler};
use crate::entity::{EntityDataProvider, EntityUpdater};
use crate::models::{ActionConfiguration, ActionOutcome, RuleEvaluationOutcome};
use crate::store::ActionConfigurationRepository;
use crate::value::EntityData;

/// 动作引擎
pub struct ActionEngine {
    configurations: Arc<dyn ActionConfigurationRepository>,
    entities: Arc<dyn EntityDataProvider>,
    handlers: Vec<Arc<dyn ActionHandler>>,
}

impl ActionEngine {
    /// 创建不含 Handler 的动作引擎
    pub fn new(
        configurations: Arc<dyn ActionConfigurationRepository>,
        entities: Arc<dyn EntityDataProvider>,
    ) -> Self {
        Self {
            configurations,
            entities,
            handlers: Vec::new(),
        }
    }

    /// 创建包含所有默认 Handler 的动作引擎
    ///
    /// 注册顺序：
    /// - EmailHandler: 邮件通知
    /// - PropertyUpdateHandler: 实体属性更新
    /// - AggregationHandler: 聚合
    pub fn with_defaults(
        configurations: Arc<dyn ActionConfigurationRepository>,
        entities: Arc<dyn EntityDataProvider>,
        updater: Arc<dyn EntityUpdater>,
    ) -> Self {
        let mut engine = Self::new(configurations, entities);

        info!("初始化默认动作处理器");

        engine
            .register(Arc::new(EmailHandler::new()))
            .register(Arc::new(PropertyUpdateHandler::new(updater)))
            .register(Arc::new(AggregationHandler::new()));

        info!(handler_count = engine.len(), "默认动作处理器初始化完成");

        engine
    }

    /// 追加一个 Handler，排在已注册的 Handler 之后
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) -> &mut Self {
        debug!(description = handler.description(), "注册动作处理器");
        self.handlers.push(handler);
        self
    }

    /// 已注册的 Handler 数量
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 执行规则评估结果对应的全部动作
    ///
    /// 没有启用的动作配置或实体不存在时返回空列表；结果顺序与配置的存储顺序一致。
    #[instrument(skip(self, outcome), fields(rule_id = outcome.rule_id, entity_id = ?outcome.entity_id, result = outcome.result))]
    pub async fn execute_actions(&self, outcome: &RuleEvaluationOutcome) -> Vec<ActionOutcome> {
        let configurations = match self
            .configurations
            .find_active_by_rule_id(outcome.rule_id)
            .await
        {
            Ok(configurations) => configurations,
            Err(e) => {
                error!(error = %e, "查询动作配置失败");
                Vec::new()
            }
        };

        if configurations.is_empty() {
            info!("规则没有启用的动作配置");
            return Vec::new();
        }

        let data = self.fetch_entity(outcome).await;
        if data.is_empty() {
            error!(entity_type = %outcome.entity_type, "实体不存在，跳过动作执行");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(configurations.len());
        for config in &configurations {
            let Some(handler) = self.find_handler(config) else {
                warn!(
                    action_configuration_id = config.id,
                    action_type = %config.action_type,
                    "没有可处理该动作配置的处理器"
                );
                continue;
            };

            results.push(self.run(handler.as_ref(), outcome, config, &data).await);
        }

        results
    }

    /// 依次执行多个规则评估结果的动作，结果按输入顺序拼接
    pub async fn execute_actions_batch(
        &self,
        outcomes: &[RuleEvaluationOutcome],
    ) -> Vec<ActionOutcome> {
        let mut results = Vec::new();
        for outcome in outcomes {
            results.extend(self.execute_actions(outcome).await);
        }
        results
    }

    fn find_handler(&self, config: &ActionConfiguration) -> Option<&Arc<dyn ActionHandler>> {
        self.handlers.iter().find(|handler| handler.can_handle(config))
    }

    async fn run(
        &self,
        handler: &dyn ActionHandler,
        outcome: &RuleEvaluationOutcome,
        config: &ActionConfiguration,
        data: &EntityData,
    ) -> ActionOutcome {
        let start = Instant::now();

        let result = match handler.execute(outcome, config, data).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    action_configuration_id = config.id,
                    handler = handler.description(),
                    error_code = e.error_code(),
                    error = %e,
                    "动作执行出错"
                );
                ActionOutcome::failure(outcome, config, format!("Error executing action: {}", e))
            }
        };

        record_action_execution(
            config.action_type.as_str(),
            result.success,
            start.elapsed().as_secs_f64(),
        );

        result
    }

    async fn fetch_entity(&self, outcome: &RuleEvaluationOutcome) -> EntityData {
        let Some(entity_id) = outcome.entity_id else {
            return EntityData::default();
        };

        self.entities
            .fetch(outcome.entity_type, entity_id)
            .await
            .unwrap_or_else(|e| {
                error!(entity_id, error = %e, "获取实体数据失败");
                EntityData::default()
            })
    }
}
