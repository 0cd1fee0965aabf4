//! Identifier Adapter - 文档识别算法实现

mod baseline;

pub use baseline::BaselineIdentifier;
