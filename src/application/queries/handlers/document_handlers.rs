//! Document Query Handlers

use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{DocumentRecord, DocumentRepositoryPort, MethodRepositoryPort};
use crate::application::queries::{GetDocument, ListDocuments, ListMethods};
use crate::domain::archive::{DocumentId, InventoryId, MethodId, PageId};
use crate::domain::identification::IdentificationMethod;

// ============================================================================
// Response DTOs
// ============================================================================

/// 文档详情响应
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub inventory_id: InventoryId,
    pub method_id: MethodId,
    pub part_of: Option<DocumentId>,
    pub title: Option<String>,
    pub number_of_pages: usize,
    /// 按文档内顺序排列的页面
    pub page_ids: Vec<PageId>,
    pub created_at: String,
}

impl DocumentResponse {
    fn new(record: DocumentRecord, page_ids: Vec<PageId>) -> Self {
        Self {
            id: record.id,
            inventory_id: record.inventory_id,
            method_id: record.method_id,
            part_of: record.part_of,
            title: record.title,
            number_of_pages: page_ids.len(),
            page_ids,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// 识别方法响应
#[derive(Debug, Clone, Serialize)]
pub struct MethodResponse {
    pub id: MethodId,
    pub name: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub documents: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListDocuments Handler
pub struct ListDocumentsHandler {
    document_repo: Arc<dyn DocumentRepositoryPort>,
}

impl ListDocumentsHandler {
    pub fn new(document_repo: Arc<dyn DocumentRepositoryPort>) -> Self {
        Self { document_repo }
    }

    pub async fn handle(&self, query: ListDocuments) -> Result<Vec<DocumentResponse>, ApplicationError> {
        let documents = self
            .document_repo
            .find_by_inventory(query.inventory_id, query.method_id)
            .await?;

        let mut responses = Vec::with_capacity(documents.len());
        for document in documents {
            let links = self.document_repo.find_page_links(document.id).await?;
            let page_ids = links.into_iter().map(|link| link.page_id).collect();
            responses.push(DocumentResponse::new(document, page_ids));
        }

        Ok(responses)
    }
}

/// GetDocument Handler
pub struct GetDocumentHandler {
    document_repo: Arc<dyn DocumentRepositoryPort>,
}

impl GetDocumentHandler {
    pub fn new(document_repo: Arc<dyn DocumentRepositoryPort>) -> Self {
        Self { document_repo }
    }

    pub async fn handle(&self, query: GetDocument) -> Result<DocumentResponse, ApplicationError> {
        let document = self
            .document_repo
            .find_by_id(query.document_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Document", query.document_id))?;

        let links = self.document_repo.find_page_links(document.id).await?;
        let page_ids = links.into_iter().map(|link| link.page_id).collect();

        Ok(DocumentResponse::new(document, page_ids))
    }
}

/// ListMethods Handler
pub struct ListMethodsHandler {
    method_repo: Arc<dyn MethodRepositoryPort>,
    document_repo: Arc<dyn DocumentRepositoryPort>,
}

impl ListMethodsHandler {
    pub fn new(
        method_repo: Arc<dyn MethodRepositoryPort>,
        document_repo: Arc<dyn DocumentRepositoryPort>,
    ) -> Self {
        Self {
            method_repo,
            document_repo,
        }
    }

    pub async fn handle(&self, _query: ListMethods) -> Result<Vec<MethodResponse>, ApplicationError> {
        let methods = self.method_repo.find_all().await?;

        let mut responses = Vec::with_capacity(methods.len());
        for method in methods {
            let documents = self.document_repo.count_by_method(method.id).await?;
            responses.push(to_method_response(method, documents));
        }

        Ok(responses)
    }
}

fn to_method_response(method: IdentificationMethod, documents: usize) -> MethodResponse {
    MethodResponse {
        id: method.id,
        name: method.name,
        description: method.description,
        date: method.date.map(|d| d.to_string()),
        url: method.url,
        documents,
    }
}
