//! Document identification end-to-end tests
//!
//! Runs the batch driver against an in-memory SQLite database.

use async_trait::async_trait;
use std::sync::Arc;

use folio::application::ports::{
    DocumentRecord, DocumentRepositoryPort, DocumentWithPages, InventoryRepositoryPort,
    MethodRepositoryPort, PageLinkRecord, RepositoryError,
};
use folio::application::{
    ApplicationError, EnsureMethod, EnsureMethodHandler, GetDocument, GetDocumentHandler,
    IdentifyDocuments, IdentifyDocumentsHandler, ListDocuments, ListDocumentsHandler,
    ListMethods, ListMethodsHandler, RunScope, SegmentInventoryHandler,
};
use folio::domain::archive::{
    DocumentId, Inventory, InventoryId, MethodId, Page, PageId, PageOrder, RectoVerso, Scan,
};
use folio::domain::identification::{MethodSpec, BASELINE_METHOD_NAME};
use folio::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, DbPool,
};
use folio::infrastructure::{
    BaselineIdentifier, InMemoryInventoryClaims, SqliteDocumentRepository,
    SqliteInventoryRepository, SqliteMethodRepository,
};

// ============================================================================
// Fixtures
// ============================================================================

struct Archive {
    pool: DbPool,
    inventories: Arc<SqliteInventoryRepository>,
    methods: Arc<SqliteMethodRepository>,
    documents: Arc<SqliteDocumentRepository>,
}

impl Archive {
    async fn new() -> Self {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self::from_pool(pool)
    }

    fn from_pool(pool: DbPool) -> Self {
        Self {
            inventories: Arc::new(SqliteInventoryRepository::new(pool.clone())),
            methods: Arc::new(SqliteMethodRepository::new(pool.clone())),
            documents: Arc::new(SqliteDocumentRepository::new(pool.clone())),
            pool,
        }
    }

    /// 按模式创建 Inventory：`C` 内容页、`S` 签名页、`B` 空白页、`U` 未知
    /// 每页一个扫描件，文件名按位置递增
    async fn inventory(&self, number: &str, pattern: &str) -> (Inventory, Vec<PageId>) {
        let inventory = Inventory::new(number);
        self.inventories.save_inventory(&inventory).await.unwrap();

        let mut pages = Vec::new();
        for (i, kind) in pattern.chars().enumerate() {
            let scan = Scan::new(inventory.id, format!("NL-HaNA_1.04.02_{}_{:04}.jpg", number, i + 1));
            self.inventories.save_scan(&scan).await.unwrap();
            let page = Page::new(&scan);
            let page = match kind {
                'C' => page.with_blank(Some(false)),
                'S' => page.with_blank(Some(false)).with_signatures("Jacob Mossel"),
                'B' => page.with_blank(Some(true)),
                'U' => page,
                other => panic!("unknown page kind {}", other),
            };
            pages.push(page);
        }
        self.inventories.save_pages(&pages).await.unwrap();

        let ids = pages.iter().map(|p| p.id).collect();
        (inventory, ids)
    }

    fn handler(&self) -> IdentifyDocumentsHandler {
        self.handler_with(self.documents.clone())
    }

    fn handler_with(&self, documents: Arc<dyn DocumentRepositoryPort>) -> IdentifyDocumentsHandler {
        let identifier = Arc::new(BaselineIdentifier::new());
        let segment_handler = Arc::new(SegmentInventoryHandler::new(
            self.inventories.clone(),
            documents,
            identifier.clone(),
            Arc::new(InMemoryInventoryClaims::new()),
        ));
        IdentifyDocumentsHandler::new(
            self.inventories.clone(),
            self.methods.clone(),
            identifier,
            segment_handler,
        )
    }

    /// 读取 Inventory 的文档，转换为页面位置列表
    async fn shape(&self, inventory: &Inventory, pages: &[PageId]) -> Vec<Vec<usize>> {
        let handler = ListDocumentsHandler::new(self.documents.clone());
        let documents = handler
            .handle(ListDocuments {
                inventory_id: inventory.id,
                method_id: None,
            })
            .await
            .unwrap();

        documents
            .iter()
            .map(|doc| {
                doc.page_ids
                    .iter()
                    .map(|id| pages.iter().position(|p| p == id).unwrap())
                    .collect()
            })
            .collect()
    }
}

fn identify(scope: RunScope) -> IdentifyDocuments {
    IdentifyDocuments::new(scope)
}

// ============================================================================
// Batch driver
// ============================================================================

#[tokio::test]
async fn test_identify_single_inventory_scenarios() {
    let archive = Archive::new().await;
    let (inventory, pages) = archive.inventory("1053", "BBCSC").await;

    let summary = archive
        .handler()
        .handle(identify(RunScope::Inventory(inventory.id)))
        .await
        .unwrap();

    assert_eq!(summary.inventories_processed, 1);
    assert_eq!(summary.documents_created, 2);
    assert_eq!(summary.pages_assigned, 3);
    assert_eq!(archive.shape(&inventory, &pages).await, vec![vec![2, 3], vec![4]]);
}

#[tokio::test]
async fn test_identify_all_inventories() {
    let archive = Archive::new().await;
    let (signed, signed_pages) = archive.inventory("1053", "SBBC").await;
    let (gap, gap_pages) = archive.inventory("1054", "CBCC").await;
    let (blank, _) = archive.inventory("1055", "BBB").await;
    let (plain, plain_pages) = archive.inventory("1056", "CCC").await;

    let summary = archive.handler().handle(identify(RunScope::All)).await.unwrap();

    assert_eq!(summary.inventories_processed, 4);
    assert_eq!(summary.documents_created, 2 + 2 + 0 + 1);
    assert_eq!(summary.pages_assigned, 2 + 3 + 0 + 3);

    let numbers: Vec<&str> = summary
        .inventories
        .iter()
        .map(|r| r.inventory_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["1053", "1054", "1055", "1056"]);

    assert_eq!(archive.shape(&signed, &signed_pages).await, vec![vec![0], vec![3]]);
    assert_eq!(archive.shape(&gap, &gap_pages).await, vec![vec![0], vec![2, 3]]);
    assert!(archive.shape(&blank, &[]).await.is_empty());
    assert_eq!(archive.shape(&plain, &plain_pages).await, vec![vec![0, 1, 2]]);
}

#[tokio::test]
async fn test_empty_inventory_is_not_an_error() {
    let archive = Archive::new().await;
    let (inventory, _) = archive.inventory("1053", "").await;

    let summary = archive
        .handler()
        .handle(identify(RunScope::Inventory(inventory.id)))
        .await
        .unwrap();

    assert_eq!(summary.inventories_processed, 1);
    assert_eq!(summary.documents_created, 0);
    assert_eq!(summary.inventories[0].pages_assigned, 0);
}

#[tokio::test]
async fn test_unknown_inventory_processes_nothing() {
    let archive = Archive::new().await;
    archive.inventory("1053", "CC").await;

    let summary = archive
        .handler()
        .handle(identify(RunScope::Inventory(InventoryId::new())))
        .await
        .unwrap();

    assert_eq!(summary.inventories_processed, 0);
    assert_eq!(summary.documents_created, 0);
}

#[tokio::test]
async fn test_rerun_reuses_method_and_duplicates_documents() {
    let archive = Archive::new().await;
    let (inventory, _) = archive.inventory("1053", "CBC").await;
    let handler = archive.handler();

    let first = handler.handle(identify(RunScope::All)).await.unwrap();
    let second = handler.handle(identify(RunScope::All)).await.unwrap();

    assert_eq!(first.method_id, second.method_id);
    assert_eq!(archive.methods.find_all().await.unwrap().len(), 1);
    assert_eq!(archive.documents.count_by_method(first.method_id).await.unwrap(), 4);

    let documents = archive
        .documents
        .find_by_inventory(inventory.id, Some(first.method_id))
        .await
        .unwrap();
    assert_eq!(documents.len(), 4);
}

#[tokio::test]
async fn test_documents_attributed_to_baseline_method() {
    let archive = Archive::new().await;
    let (inventory, _) = archive.inventory("1053", "CSC").await;

    let summary = archive.handler().handle(identify(RunScope::All)).await.unwrap();
    let method = archive.methods.find_by_id(summary.method_id).await.unwrap().unwrap();
    assert_eq!(method.name, BASELINE_METHOD_NAME);

    let documents = archive
        .documents
        .find_by_inventory(inventory.id, None)
        .await
        .unwrap();
    for document in &documents {
        assert_eq!(document.method_id, summary.method_id);
        assert_eq!(document.part_of, None);
        assert_eq!(document.title, None);

        let links = archive.documents.find_page_links(document.id).await.unwrap();
        let indices: Vec<usize> = links.iter().map(|l| l.index).collect();
        let expected: Vec<usize> = (0..links.len()).collect();
        assert_eq!(indices, expected);
    }
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential() {
    let patterns = ["BCSBC", "CBBC", "SSS", "BBB", "CUBUC", "CCCC"];

    let sequential = Archive::new().await;
    let concurrent = Archive::new().await;
    let mut expected = Vec::new();
    let mut inventories = Vec::new();

    for (i, pattern) in patterns.iter().enumerate() {
        let number = format!("{}", 2000 + i);
        let (inv, pages) = sequential.inventory(&number, pattern).await;
        expected.push((inv, pages));
        inventories.push(concurrent.inventory(&number, pattern).await);
    }

    sequential.handler().handle(identify(RunScope::All)).await.unwrap();
    let mut command = identify(RunScope::All);
    command.max_concurrent = 4;
    let summary = concurrent.handler().handle(command).await.unwrap();
    assert_eq!(summary.inventories_processed, patterns.len());

    for ((seq_inv, seq_pages), (con_inv, con_pages)) in expected.iter().zip(inventories.iter()) {
        assert_eq!(
            sequential.shape(seq_inv, seq_pages).await,
            concurrent.shape(con_inv, con_pages).await
        );
    }
}

#[tokio::test]
async fn test_recto_verso_page_order() {
    let archive = Archive::new().await;
    let inventory = Inventory::new("1053");
    archive.inventories.save_inventory(&inventory).await.unwrap();
    let scan = Scan::new(inventory.id, "0001.jpg");
    archive.inventories.save_scan(&scan).await.unwrap();

    // 背面 ID 排在正面之前；背面带签名，正面为普通内容
    let mut verso = Page::new(&scan)
        .with_recto_verso(RectoVerso::Verso)
        .with_blank(Some(false))
        .with_signatures("sig.");
    verso.id = PageId::from_uuid(uuid::Uuid::from_u128(1));
    let mut recto = Page::new(&scan)
        .with_recto_verso(RectoVerso::Recto)
        .with_blank(Some(false));
    recto.id = PageId::from_uuid(uuid::Uuid::from_u128(2));
    archive
        .inventories
        .save_pages(&[verso.clone(), recto.clone()])
        .await
        .unwrap();

    let mut command = identify(RunScope::All);
    command.page_order = PageOrder::ScanThenRectoVerso;
    let summary = archive.handler().handle(command).await.unwrap();

    // 正面在前：[recto, verso(sig)] 为一个文档
    assert_eq!(summary.documents_created, 1);
    let pages = [recto.id, verso.id];
    assert_eq!(archive.shape(&inventory, &pages).await, vec![vec![0, 1]]);
}

// ============================================================================
// Failure handling
// ============================================================================

/// 对指定 Inventory 保存失败的 Document Repository
struct FailingDocuments {
    inner: Arc<SqliteDocumentRepository>,
    fail_for: InventoryId,
}

#[async_trait]
impl DocumentRepositoryPort for FailingDocuments {
    async fn save_segmentation(&self, documents: &[DocumentWithPages]) -> Result<(), RepositoryError> {
        if documents.iter().any(|d| d.document.inventory_id == self.fail_for) {
            return Err(RepositoryError::DatabaseError("disk I/O error".to_string()));
        }
        self.inner.save_segmentation(documents).await
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_inventory(
        &self,
        inventory_id: InventoryId,
        method_id: Option<MethodId>,
    ) -> Result<Vec<DocumentRecord>, RepositoryError> {
        self.inner.find_by_inventory(inventory_id, method_id).await
    }

    async fn find_page_links(&self, document_id: DocumentId) -> Result<Vec<PageLinkRecord>, RepositoryError> {
        self.inner.find_page_links(document_id).await
    }

    async fn count_by_method(&self, method_id: MethodId) -> Result<usize, RepositoryError> {
        self.inner.count_by_method(method_id).await
    }
}

#[tokio::test]
async fn test_storage_failure_stops_the_run() {
    let archive = Archive::new().await;
    let (first, _) = archive.inventory("1053", "CC").await;
    let (broken, _) = archive.inventory("1054", "CBC").await;
    let (last, _) = archive.inventory("1055", "CC").await;

    let failing = Arc::new(FailingDocuments {
        inner: archive.documents.clone(),
        fail_for: broken.id,
    });

    let result = archive.handler_with(failing).handle(identify(RunScope::All)).await;
    assert!(matches!(result, Err(ApplicationError::RepositoryError(_))));

    // 失败前已提交的保留，失败的与之后的均无文档
    let count = |inventory: InventoryId| {
        let documents = archive.documents.clone();
        async move { documents.find_by_inventory(inventory, None).await.unwrap().len() }
    };
    assert_eq!(count(first.id).await, 1);
    assert_eq!(count(broken.id).await, 0);
    assert_eq!(count(last.id).await, 0);
}

// ============================================================================
// Method registry & queries
// ============================================================================

#[tokio::test]
async fn test_ensure_method_handler_is_idempotent() {
    let archive = Archive::new().await;
    let handler = EnsureMethodHandler::new(archive.methods.clone());
    let spec = MethodSpec::new("Manual segmentation")
        .unwrap()
        .with_url("https://example.org/manual");

    let first = handler.handle(EnsureMethod { spec: spec.clone() }).await.unwrap();
    let second = handler.handle(EnsureMethod { spec }).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.url.as_deref(), Some("https://example.org/manual"));
}

#[tokio::test]
async fn test_concurrent_ensure_creates_single_method() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DatabaseConfig::new(dir.path().join("folio.db"));
    config.max_connections = 4;
    let pool = create_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let methods = Arc::new(SqliteMethodRepository::new(pool.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let methods = methods.clone();
        handles.push(tokio::spawn(async move {
            let spec = MethodSpec::new("Baseline").unwrap();
            methods.ensure(&spec).await.unwrap().id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(methods.find_all().await.unwrap().len(), 1);

    pool.close().await;
}

#[tokio::test]
async fn test_list_methods_and_get_document() {
    let archive = Archive::new().await;
    let (inventory, pages) = archive.inventory("1053", "CSC").await;
    let summary = archive.handler().handle(identify(RunScope::All)).await.unwrap();

    let methods = ListMethodsHandler::new(archive.methods.clone(), archive.documents.clone())
        .handle(ListMethods)
        .await
        .unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].id, summary.method_id);
    assert_eq!(methods[0].documents, 2);

    let first = archive
        .documents
        .find_by_inventory(inventory.id, None)
        .await
        .unwrap()
        .remove(0);
    let document = GetDocumentHandler::new(archive.documents.clone())
        .handle(GetDocument { document_id: first.id })
        .await
        .unwrap();
    assert_eq!(document.page_ids, vec![pages[0], pages[1]]);
    assert_eq!(document.number_of_pages, 2);

    let missing = GetDocumentHandler::new(archive.documents.clone())
        .handle(GetDocument {
            document_id: DocumentId::new(),
        })
        .await;
    assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));

    archive.pool.close().await;
}
