//! Vapor Store - Leaf-document persistence for parameters and subscriptions
//!
//! The backend is a flat key-value collection of leaf documents. `ParamStore`
//! and `SubscriptionRegistry` put the parameter master's rules on top of any
//! `ParamBackend`; `MemoryBackend` is the in-process implementation.

pub mod backend;
pub mod memory;
pub mod params;
pub mod subs;

pub use backend::{ParamBackend, ParamFilter, SortOrder, SubFilter};
pub use memory::MemoryBackend;
pub use params::ParamStore;
pub use subs::SubscriptionRegistry;
