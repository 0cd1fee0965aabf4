//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Archive Context: Inventory / Scan / Page
//! - Identification Context: 文档识别方法
//!
//! 以及共享的文档边界识别引擎（纯同步计算，无 I/O）

pub mod archive;
pub mod identification;

mod segmentation;

pub use segmentation::{segment, PageLink, SegmentedDocument, Segmenter};
