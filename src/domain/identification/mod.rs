//! Identification Context - 文档识别方法限界上下文
//!
//! 职责:
//! - 识别方法元数据（名称为唯一业务键）
//! - 基线方法定义

mod errors;
mod method;

pub use errors::IdentificationError;
pub use method::{
    IdentificationMethod, MethodSpec, BASELINE_METHOD_DESCRIPTION, BASELINE_METHOD_NAME,
    MAX_METHOD_NAME_LEN,
};
