//! 内置动作处理器实现

mod aggregation;
mod email;
mod property_update;

pub use aggregation::AggregationHandler;
pub use email::EmailHandler;
pub use property_update::PropertyUpdateHandler;
