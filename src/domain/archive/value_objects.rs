//! Archive Context - Value Objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// 为档案实体生成基于 UUID 的强类型标识
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// 档案目录（Inventory）唯一标识
    InventoryId
);

uuid_id!(
    /// 扫描件唯一标识
    ScanId
);

uuid_id!(
    /// 页面唯一标识
    ///
    /// 注意：该标识是不透明的随机令牌，不携带任何页序信息
    PageId
);

uuid_id!(
    /// 逻辑文档唯一标识
    DocumentId
);

uuid_id!(
    /// 文档识别方法唯一标识
    MethodId
);

/// 页面在对开扫描中的位置（正面/背面）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RectoVerso {
    Recto,
    Verso,
}

impl RectoVerso {
    pub fn as_str(&self) -> &'static str {
        match self {
            RectoVerso::Recto => "Recto",
            RectoVerso::Verso => "Verso",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Recto" => Some(RectoVerso::Recto),
            "Verso" => Some(RectoVerso::Verso),
            _ => None,
        }
    }
}

/// 扫描件版式：单页 / 双页对开 / 其他
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanType {
    Single,
    Double,
    Other,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Single => "Single",
            ScanType::Double => "Double",
            ScanType::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Single" => Some(ScanType::Single),
            "Double" => Some(ScanType::Double),
            "Other" => Some(ScanType::Other),
            _ => None,
        }
    }
}

/// 空白页三态标记
///
/// 导入数据中 `is_blank` 可能缺失，`Unknown` 与 `NotBlank` 在识别时等价，
/// 但保留区分以便追溯数据质量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlankState {
    Blank,
    NotBlank,
    Unknown,
}

impl BlankState {
    /// 识别算法使用的判定：只有明确标记为空白的页面才算空白
    pub fn is_blank(&self) -> bool {
        matches!(self, BlankState::Blank)
    }

    pub fn as_option(&self) -> Option<bool> {
        match self {
            BlankState::Blank => Some(true),
            BlankState::NotBlank => Some(false),
            BlankState::Unknown => None,
        }
    }
}

impl From<Option<bool>> for BlankState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => BlankState::Blank,
            Some(false) => BlankState::NotBlank,
            None => BlankState::Unknown,
        }
    }
}

/// 页面排序策略（同一 Inventory 内的全序）
///
/// `ScanThenId` 按 (扫描文件名, 页面 ID) 排序。双页扫描的两页共享文件名，
/// 而页面 ID 是随机令牌，因此正反面的相对顺序不确定。
/// `ScanThenRectoVerso` 在文件名之后先按正面/背面排序，再按页面 ID 排序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrder {
    #[default]
    ScanThenId,
    ScanThenRectoVerso,
}

impl PageOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageOrder::ScanThenId => "scan_then_id",
            PageOrder::ScanThenRectoVerso => "scan_then_recto_verso",
        }
    }
}
