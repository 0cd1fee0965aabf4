//! In-Memory Inventory Claim Registry

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::InventoryClaimPort;
use crate::domain::archive::InventoryId;

/// 内存 Inventory 占用表
///
/// inventory_id -> 占用时间
pub struct InMemoryInventoryClaims {
    claims: DashMap<InventoryId, DateTime<Utc>>,
}

impl InMemoryInventoryClaims {
    pub fn new() -> Self {
        Self {
            claims: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 占用开始时间
    pub fn claimed_at(&self, inventory_id: InventoryId) -> Option<DateTime<Utc>> {
        self.claims.get(&inventory_id).map(|entry| *entry.value())
    }
}

impl Default for InMemoryInventoryClaims {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryClaimPort for InMemoryInventoryClaims {
    fn claim(&self, inventory_id: InventoryId) -> bool {
        // entry API 保证检查与插入是原子的
        match self.claims.entry(inventory_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::warn!(inventory_id = %inventory_id, "Inventory already claimed");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                true
            }
        }
    }

    fn release(&self, inventory_id: InventoryId) {
        self.claims.remove(&inventory_id);
    }

    fn active_count(&self) -> usize {
        self.claims.len()
    }
}
