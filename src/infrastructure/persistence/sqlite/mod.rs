//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod document_repo;
mod inventory_repo;
mod method_repo;

pub use database::*;
pub use document_repo::*;
pub use inventory_repo::*;
pub use method_repo::*;

use std::str::FromStr;

use crate::application::ports::RepositoryError;

/// 解析以 TEXT 存储的 UUID 标识
fn parse_id<T>(value: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = uuid::Error>,
{
    value
        .parse()
        .map_err(|e: uuid::Error| RepositoryError::SerializationError(e.to_string()))
}
