//! Identification Method Command Handlers

use std::sync::Arc;

use crate::application::commands::EnsureMethod;
use crate::application::error::ApplicationError;
use crate::application::ports::MethodRepositoryPort;
use crate::domain::identification::IdentificationMethod;

/// EnsureMethod Handler - 按名称查找或创建识别方法
pub struct EnsureMethodHandler {
    method_repo: Arc<dyn MethodRepositoryPort>,
}

impl EnsureMethodHandler {
    pub fn new(method_repo: Arc<dyn MethodRepositoryPort>) -> Self {
        Self { method_repo }
    }

    pub async fn handle(&self, command: EnsureMethod) -> Result<IdentificationMethod, ApplicationError> {
        let method = self.method_repo.ensure(&command.spec).await?;

        tracing::info!(
            method_id = %method.id,
            name = %method.name,
            "Using identification method"
        );

        Ok(method)
    }
}
