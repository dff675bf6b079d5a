//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册指标描述，出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("rule_evaluations_total", "Total number of rule evaluations");
    metrics::describe_histogram!(
        "rule_evaluation_duration_seconds",
        "Rule evaluation duration in seconds"
    );
    metrics::describe_counter!(
        "rule_decode_failures_total",
        "Total number of rule expressions that failed to decode"
    );

    metrics::describe_counter!("action_executions_total", "Total number of action executions");
    metrics::describe_histogram!(
        "action_execution_duration_seconds",
        "Action execution duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录规则评估
///
/// `outcome` 取值 matched / unmatched / failed，failed 表示评估出错后按 false 处理。
#[inline]
pub fn record_rule_evaluation(entity_type: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "rule_evaluations_total",
        "entity_type" => entity_type.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "rule_evaluation_duration_seconds",
        "entity_type" => entity_type.to_string()
    )
    .record(duration_secs);
}

/// 记录规则表达式解析失败
#[inline]
pub fn record_decode_failure(entity_type: &str) {
    metrics::counter!(
        "rule_decode_failures_total",
        "entity_type" => entity_type.to_string()
    )
    .increment(1);
}

/// 记录动作执行
#[inline]
pub fn record_action_execution(action_type: &str, success: bool, duration_secs: f64) {
    metrics::counter!(
        "action_executions_total",
        "action_type" => action_type.to_string(),
        "success" => success.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "action_execution_duration_seconds",
        "action_type" => action_type.to_string()
    )
    .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_rule_evaluation("TICKET", "matched", 0.01);
        record_rule_evaluation("LEAVE", "failed", 0.02);
        record_decode_failure("TICKET");
        record_action_execution("EMAIL", true, 0.05);
    }

    #[test]
    fn test_decode_failure_labelled_by_entity_type() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_decode_failure("TICKET");
            record_decode_failure("TICKET");
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"rule_decode_failures_total{entity_type="TICKET"} 2"#));
        assert!(!rendered.contains("rule_id"));
    }

    #[test]
    fn test_handle_absent_before_init() {
        assert!(get_handle().is_none());
    }
}
