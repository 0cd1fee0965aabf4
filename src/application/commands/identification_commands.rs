//! Identification Commands

use serde::{Deserialize, Serialize};

use crate::domain::archive::{Inventory, InventoryId, MethodId, PageOrder};
use crate::domain::identification::MethodSpec;

/// 登记识别方法命令（find-or-create）
#[derive(Debug, Clone)]
pub struct EnsureMethod {
    pub spec: MethodSpec,
}

/// 识别范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunScope {
    /// 单个 Inventory
    Inventory(InventoryId),
    /// 全部 Inventory
    All,
}

/// 批量识别文档命令
///
/// 对同一方法重复运行不会删除已有结果，而是追加一组新的文档
#[derive(Debug, Clone)]
pub struct IdentifyDocuments {
    pub scope: RunScope,
    pub page_order: PageOrder,
    /// 并发处理的 Inventory 数，最小为 1
    pub max_concurrent: usize,
}

impl IdentifyDocuments {
    pub fn new(scope: RunScope) -> Self {
        Self {
            scope,
            page_order: PageOrder::default(),
            max_concurrent: 1,
        }
    }
}

/// 识别单个 Inventory 命令
#[derive(Debug, Clone)]
pub struct SegmentInventory {
    pub inventory: Inventory,
    pub method_id: MethodId,
    pub page_order: PageOrder,
}

/// 单个 Inventory 的识别结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub inventory_id: InventoryId,
    pub inventory_number: String,
    pub documents_created: usize,
    pub pages_assigned: usize,
}

/// 一次批量识别的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub method_id: MethodId,
    pub inventories_processed: usize,
    pub documents_created: usize,
    pub pages_assigned: usize,
    pub inventories: Vec<InventoryReport>,
}

impl RunSummary {
    pub fn new(method_id: MethodId, inventories: Vec<InventoryReport>) -> Self {
        Self {
            method_id,
            inventories_processed: inventories.len(),
            documents_created: inventories.iter().map(|r| r.documents_created).sum(),
            pages_assigned: inventories.iter().map(|r| r.pages_assigned).sum(),
            inventories,
        }
    }
}
