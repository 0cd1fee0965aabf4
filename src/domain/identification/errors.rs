//! Identification Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentificationError {
    #[error("无效的方法名称: {0}")]
    InvalidName(String),
}
