//! 实体规则引擎
//!
//! 从种子文件加载规则、动作配置和实体，对每个实体评估其类型下的全部启用规则并执行动作。

use anyhow::Result;
use rule_engine::{
    ActionEngine, EntityType, InMemoryActionConfigurationStore, InMemoryEntityStore,
    InMemoryRuleStore, RuleEngine, SeedData,
};
use rules_shared::config::AppConfig;
use rules_shared::observability;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

const SERVICE_NAME: &str = "rule-engine";

const ENTITY_TYPES: [EntityType; 3] = [EntityType::Ticket, EntityType::Roster, EntityType::Leave];

#[tokio::main]
async fn main() -> Result<()> {
    // 统一加载配置：config/default.toml、config/{env}.toml、config/rule-engine.toml 及环境变量
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..AppConfig::default()
        }
    });

    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!("Starting {}...", config.service_name);
    info!(environment = %config.environment, "Configuration loaded");

    let rules = InMemoryRuleStore::new();
    let actions = InMemoryActionConfigurationStore::new();
    let entities = InMemoryEntityStore::new();

    let Some(seed_file) = config.engine.seed_file.as_deref() else {
        warn!("No seed file configured, nothing to evaluate");
        return Ok(());
    };

    let summary = SeedData::load(seed_file)?.apply(&rules, &actions, &entities);
    info!(
        "Loaded {} rules, {} action configurations and {} entities from {}",
        summary.rules, summary.actions, summary.entities, seed_file
    );

    let entity_store = Arc::new(entities.clone());
    let rule_engine = RuleEngine::new(Arc::new(rules), entity_store.clone())
        .with_entity_id_field(config.engine.entity_id_field.clone());
    let action_engine =
        ActionEngine::with_defaults(Arc::new(actions), entity_store.clone(), entity_store);

    for entity_type in ENTITY_TYPES {
        for entity_id in entities.ids(entity_type) {
            let outcomes = rule_engine.evaluate_rules(entity_type, entity_id).await;

            for outcome in &outcomes {
                match &outcome.error {
                    Some(error) => warn!(
                        "Rule {} ({}) on {} {} failed: {}",
                        outcome.rule_id, outcome.rule_name, entity_type, entity_id, error
                    ),
                    None => info!(
                        "Rule {} ({}) on {} {} => {}",
                        outcome.rule_id, outcome.rule_name, entity_type, entity_id, outcome.result
                    ),
                }
            }

            if !config.engine.dispatch_actions {
                continue;
            }

            for action in action_engine.execute_actions_batch(&outcomes).await {
                info!(
                    "Action {} ({}) for rule {} on {} {}: success={} message={}",
                    action.action_configuration_id,
                    action.action_type,
                    action.rule_id,
                    entity_type,
                    entity_id,
                    action.success,
                    action.message
                );
            }
        }
    }

    // 指标端点开启时保持进程运行，等待抓取
    if config.observability.metrics_enabled {
        info!(
            "Metrics available on {}, press Ctrl+C to exit",
            config.metrics_addr()
        );
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    info!("Service shutdown complete");
    Ok(())
}
