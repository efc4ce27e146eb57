//! Vapor Params - The hierarchical parameter server
//!
//! Writes decompose mappings into one leaf document per value and clobber
//! whatever lived below the written path. Reads fold the leaves under a path
//! back into a nested value. Subscribers of the exact written path are
//! notified from a background worker, never from the write itself.

pub mod config;
pub mod notify;
pub mod service;
pub mod tree;

pub use config::{LogConfig, MasterConfig, NotifyConfig, StoreConfig};
pub use notify::{ChannelDelivery, NotificationDispatcher, ParamDelivery, TracingDelivery};
pub use service::ParamService;
pub use tree::fold;
