//! Transaction observers: registry and fire-and-forget dispatch.
//!
//! Both halves are generic over the message type so the ledger crate decides
//! what gets published.

pub mod dispatch;
pub mod monitor;

pub use dispatch::{DispatchConfig, DispatchError, DispatchPool, DispatchStats};
pub use monitor::{Monitor, MonitorRegistry};
