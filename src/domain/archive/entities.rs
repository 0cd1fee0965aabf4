//! Archive Context - Entities

use serde::{Deserialize, Serialize};

use super::{BlankState, InventoryId, PageId, RectoVerso, ScanId, ScanType};

/// 档案目录（一个实体卷宗/箱盒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: InventoryId,
    /// 馆藏编号，全局唯一
    pub inventory_number: String,
    pub handle: Option<String>,
}

impl Inventory {
    pub fn new(inventory_number: impl Into<String>) -> Self {
        Self {
            id: InventoryId::new(),
            inventory_number: inventory_number.into(),
            handle: None,
        }
    }
}

/// 扫描件 - 一张数字化图像，可能包含一页或对开的两页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub inventory_id: InventoryId,
    /// 扫描文件名，同时作为页序的第一排序键
    pub filename: String,
    pub scan_type: Option<ScanType>,
}

impl Scan {
    pub fn new(inventory_id: InventoryId, filename: impl Into<String>) -> Self {
        Self {
            id: ScanId::new(),
            inventory_id,
            filename: filename.into(),
            scan_type: None,
        }
    }
}

/// 页面 - 文档识别的只读输入
///
/// 识别算法只观察两个信号：是否空白、是否带有签名标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub inventory_id: InventoryId,
    pub scan_id: ScanId,
    /// 所属扫描件的文件名（排序键）
    pub scan_filename: String,
    pub recto_verso: Option<RectoVerso>,
    pub is_blank: Option<bool>,
    /// 签名标记原文；为空或缺失表示没有签名
    pub signatures: Option<String>,
}

impl Page {
    pub fn new(scan: &Scan) -> Self {
        Self {
            id: PageId::new(),
            inventory_id: scan.inventory_id,
            scan_id: scan.id,
            scan_filename: scan.filename.clone(),
            recto_verso: None,
            is_blank: None,
            signatures: None,
        }
    }

    pub fn with_blank(mut self, is_blank: Option<bool>) -> Self {
        self.is_blank = is_blank;
        self
    }

    pub fn with_signatures(mut self, signatures: impl Into<String>) -> Self {
        self.signatures = Some(signatures.into());
        self
    }

    pub fn with_recto_verso(mut self, recto_verso: RectoVerso) -> Self {
        self.recto_verso = Some(recto_verso);
        self
    }

    pub fn blank_state(&self) -> BlankState {
        BlankState::from(self.is_blank)
    }

    pub fn is_blank(&self) -> bool {
        self.blank_state().is_blank()
    }

    pub fn has_signature(&self) -> bool {
        self.signatures.as_deref().is_some_and(|s| !s.is_empty())
    }
}
