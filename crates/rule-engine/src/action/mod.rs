//! 动作执行模块
//!
//! 规则评估为 true 后触发的副作用：邮件通知、聚合、实体属性更新。
//!
//! ## 模块结构
//!
//! - `handler`: ActionHandler trait 定义
//! - `handlers`: 内置 Handler 实现
//! - `dispatcher`: ActionEngine，按规则加载动作配置并分派到 Handler
//! - `dto`: 各动作类型的配置载荷

pub mod dispatcher;
pub mod dto;
pub mod handler;
pub mod handlers;

pub use dispatcher::ActionEngine;
pub use dto::{
    AggregationActionConfig, AggregationType, EmailActionConfig, OutputDestination,
    PropertyUpdateActionConfig,
};
pub use handler::ActionHandler;
pub use handlers::{AggregationHandler, EmailHandler, PropertyUpdateHandler};
