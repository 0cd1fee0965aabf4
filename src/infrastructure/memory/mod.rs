//! Memory Layer - In-Memory State Management
//!
//! 实现 InventoryClaim，记录并发 worker 正在处理的 Inventory

mod inventory_claims;

pub use inventory_claims::InMemoryInventoryClaims;
