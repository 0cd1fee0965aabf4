//! Document Identification Command Handlers

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::application::commands::{
    IdentifyDocuments, InventoryReport, RunScope, RunSummary, SegmentInventory,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    DocumentIdentifierPort, DocumentRecord, DocumentRepositoryPort, DocumentWithPages,
    InventoryClaimPort, InventoryRepositoryPort, MethodRepositoryPort, PageLinkRecord,
    PageSequencePort,
};
use crate::domain::archive::{DocumentId, Inventory, InventoryId, MethodId};
use crate::domain::SegmentedDocument;

// ============================================================================
// SegmentInventory (one inventory, one transaction)
// ============================================================================

/// 占用期间持有，drop 时释放 Inventory
struct ClaimGuard {
    claims: Arc<dyn InventoryClaimPort>,
    inventory_id: InventoryId,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.claims.release(self.inventory_id);
    }
}

/// SegmentInventory Handler - 识别单个 Inventory 并提交结果
pub struct SegmentInventoryHandler {
    page_sequence: Arc<dyn PageSequencePort>,
    document_repo: Arc<dyn DocumentRepositoryPort>,
    identifier: Arc<dyn DocumentIdentifierPort>,
    claims: Arc<dyn InventoryClaimPort>,
}

impl SegmentInventoryHandler {
    pub fn new(
        page_sequence: Arc<dyn PageSequencePort>,
        document_repo: Arc<dyn DocumentRepositoryPort>,
        identifier: Arc<dyn DocumentIdentifierPort>,
        claims: Arc<dyn InventoryClaimPort>,
    ) -> Self {
        Self {
            page_sequence,
            document_repo,
            identifier,
            claims,
        }
    }

    pub async fn handle(&self, command: SegmentInventory) -> Result<InventoryReport, ApplicationError> {
        let inventory = command.inventory;

        if !self.claims.claim(inventory.id) {
            return Err(ApplicationError::invalid_state(format!(
                "inventory {} is already being processed",
                inventory.inventory_number
            )));
        }
        let _guard = ClaimGuard {
            claims: self.claims.clone(),
            inventory_id: inventory.id,
        };

        let pages = self
            .page_sequence
            .ordered_pages(inventory.id, command.page_order)
            .await?;

        let segmented = self.identifier.identify(&pages);
        let documents = build_records(&inventory, command.method_id, &segmented);
        let pages_assigned = documents.iter().map(|d| d.number_of_pages()).sum();

        // 空结果无需开启事务
        if !documents.is_empty() {
            self.document_repo.save_segmentation(&documents).await?;
        }

        tracing::info!(
            inventory_id = %inventory.id,
            inventory_number = %inventory.inventory_number,
            pages = pages.len(),
            documents_created = documents.len(),
            pages_assigned = pages_assigned,
            "Inventory segmented"
        );

        Ok(InventoryReport {
            inventory_id: inventory.id,
            inventory_number: inventory.inventory_number,
            documents_created: documents.len(),
            pages_assigned,
        })
    }
}

/// 将识别结果转换为待持久化的记录
fn build_records(
    inventory: &Inventory,
    method_id: MethodId,
    segmented: &[SegmentedDocument],
) -> Vec<DocumentWithPages> {
    let now = Utc::now();

    segmented
        .iter()
        .filter(|doc| !doc.is_empty())
        .map(|doc| {
            let document_id = DocumentId::new();
            let pages = doc
                .links()
                .iter()
                .map(|link| PageLinkRecord {
                    id: Uuid::new_v4(),
                    page_id: link.page_id,
                    document_id,
                    index: link.index,
                })
                .collect();

            DocumentWithPages {
                document: DocumentRecord {
                    id: document_id,
                    inventory_id: inventory.id,
                    method_id,
                    part_of: None,
                    title: None,
                    date_text: None,
                    created_at: now,
                },
                pages,
            }
        })
        .collect()
}

// ============================================================================
// IdentifyDocuments (batch driver)
// ============================================================================

/// IdentifyDocuments Handler - 批量识别
///
/// 流程：登记方法 → 解析范围 → 逐个 Inventory 识别并提交。
/// 任一 Inventory 失败后不再启动新的 Inventory，已提交的结果保留，返回第一个错误。
pub struct IdentifyDocumentsHandler {
    inventory_repo: Arc<dyn InventoryRepositoryPort>,
    method_repo: Arc<dyn MethodRepositoryPort>,
    identifier: Arc<dyn DocumentIdentifierPort>,
    segment_handler: Arc<SegmentInventoryHandler>,
}

impl IdentifyDocumentsHandler {
    pub fn new(
        inventory_repo: Arc<dyn InventoryRepositoryPort>,
        method_repo: Arc<dyn MethodRepositoryPort>,
        identifier: Arc<dyn DocumentIdentifierPort>,
        segment_handler: Arc<SegmentInventoryHandler>,
    ) -> Self {
        Self {
            inventory_repo,
            method_repo,
            identifier,
            segment_handler,
        }
    }

    pub async fn handle(&self, command: IdentifyDocuments) -> Result<RunSummary, ApplicationError> {
        let spec = self.identifier.method_spec(Utc::now().date_naive());
        let method = self.method_repo.ensure(&spec).await?;

        tracing::info!(
            method_id = %method.id,
            method = %method.name,
            page_order = command.page_order.as_str(),
            "Document identification started"
        );

        let inventories = self.resolve_scope(command.scope).await?;
        if inventories.is_empty() {
            tracing::warn!(scope = ?command.scope, "No inventories found to process");
            return Ok(RunSummary::new(method.id, Vec::new()));
        }

        let semaphore = Arc::new(Semaphore::new(command.max_concurrent.max(1)));
        let failed = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(inventories.len());

        for inventory in inventories {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ApplicationError::internal(e.to_string()))?;

            if failed.load(Ordering::SeqCst) {
                tracing::warn!(
                    inventory_number = %inventory.inventory_number,
                    "Skipping inventory after earlier failure"
                );
                break;
            }

            let segment_handler = self.segment_handler.clone();
            let failed = failed.clone();
            let segment = SegmentInventory {
                inventory,
                method_id: method.id,
                page_order: command.page_order,
            };

            handles.push(tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到该 Inventory 提交完成

                let number = segment.inventory.inventory_number.clone();
                let result = segment_handler.handle(segment).await;
                if let Err(e) = &result {
                    tracing::error!(inventory_number = %number, error = %e, "Inventory segmentation failed");
                    failed.store(true, Ordering::SeqCst);
                }
                result
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut first_error = None;

        for handle in handles {
            match handle.await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(ApplicationError::internal(e.to_string()));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let summary = RunSummary::new(method.id, reports);

        tracing::info!(
            method_id = %summary.method_id,
            inventories_processed = summary.inventories_processed,
            documents_created = summary.documents_created,
            pages_assigned = summary.pages_assigned,
            "Document identification finished"
        );

        Ok(summary)
    }

    async fn resolve_scope(&self, scope: RunScope) -> Result<Vec<Inventory>, ApplicationError> {
        match scope {
            RunScope::All => Ok(self.inventory_repo.find_all().await?),
            RunScope::Inventory(id) => Ok(self.inventory_repo.find_by_id(id).await?.into_iter().collect()),
        }
    }
}
