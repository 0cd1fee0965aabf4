//! Inventory Claim Port - 并发 worker 的 Inventory 归属登记
//!
//! 同一时刻每个 Inventory 只能由一个 worker 处理

use crate::domain::archive::InventoryId;

/// Inventory Claim Port
pub trait InventoryClaimPort: Send + Sync {
    /// 尝试占用 Inventory；已被占用时返回 false
    fn claim(&self, inventory_id: InventoryId) -> bool;

    /// 释放占用
    fn release(&self, inventory_id: InventoryId);

    /// 当前被占用的 Inventory 数
    fn active_count(&self) -> usize;
}
