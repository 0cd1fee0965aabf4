//! Folio - 文档边界识别批处理入口
//!
//! - identify: 对单个或全部 Inventory 运行基线识别
//! - methods: 列出已登记的识别方法
//! - documents: 列出 Inventory 的文档
//! - document: 查看单个文档的页面

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use folio::application::{
    GetDocument, GetDocumentHandler, IdentifyDocuments, IdentifyDocumentsHandler, ListDocuments,
    ListDocumentsHandler, ListMethods, ListMethodsHandler, RunScope, SegmentInventoryHandler,
};
use folio::config::{load_config, load_config_from_path, print_config, AppConfig};
use folio::domain::archive::{DocumentId, InventoryId, MethodId, PageOrder};
use folio::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
use folio::infrastructure::{
    BaselineIdentifier, InMemoryInventoryClaims, SqliteDocumentRepository,
    SqliteInventoryRepository, SqliteMethodRepository,
};

/// Reconstruct logical documents from the page sequences of archival inventories.
#[derive(Parser, Debug)]
#[command(name = "folio", version, arg_required_else_help = true)]
struct Cli {
    /// Configuration file (default: config.toml / config.local.toml if present).
    #[arg(short, long, env = "FOLIO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify documents for one inventory, or for all inventories.
    Identify {
        /// Inventory to process; all inventories when omitted.
        #[arg(long)]
        inventory: Option<InventoryId>,

        /// Number of inventories processed concurrently.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Page order within an inventory.
        #[arg(long, value_enum)]
        page_order: Option<PageOrderArg>,
    },
    /// List registered identification methods.
    Methods,
    /// List the documents of an inventory.
    Documents {
        #[arg(long)]
        inventory: InventoryId,

        /// Only documents produced by this method.
        #[arg(long)]
        method: Option<MethodId>,
    },
    /// Show one document with its ordered pages.
    Document {
        #[arg(long)]
        id: DocumentId,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PageOrderArg {
    ScanThenId,
    ScanThenRectoVerso,
}

impl From<PageOrderArg> for PageOrder {
    fn from(arg: PageOrderArg) -> Self {
        match arg {
            PageOrderArg::ScanThenId => PageOrder::ScanThenId,
            PageOrderArg::ScanThenRectoVerso => PageOrder::ScanThenRectoVerso,
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},folio={},sqlx=warn", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path.as_path())),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let inventory_repo = Arc::new(SqliteInventoryRepository::new(pool.clone()));
    let method_repo = Arc::new(SqliteMethodRepository::new(pool.clone()));
    let document_repo = Arc::new(SqliteDocumentRepository::new(pool.clone()));

    match cli.command {
        Command::Identify {
            inventory,
            concurrency,
            page_order,
        } => {
            let identifier = Arc::new(BaselineIdentifier::new());
            let claims = Arc::new(InMemoryInventoryClaims::new());

            let segment_handler = Arc::new(SegmentInventoryHandler::new(
                inventory_repo.clone(),
                document_repo.clone(),
                identifier.clone(),
                claims,
            ));
            let handler = IdentifyDocumentsHandler::new(
                inventory_repo,
                method_repo,
                identifier,
                segment_handler,
            );

            let command = IdentifyDocuments {
                scope: inventory.map(RunScope::Inventory).unwrap_or(RunScope::All),
                page_order: page_order
                    .map(PageOrder::from)
                    .unwrap_or(config.identification.page_order),
                max_concurrent: concurrency.unwrap_or(config.identification.max_concurrent),
            };

            let summary = handler.handle(command).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for report in &summary.inventories {
                    println!(
                        "{}: {} documents, {} pages",
                        report.inventory_number, report.documents_created, report.pages_assigned
                    );
                }
                println!("Inventories processed: {}", summary.inventories_processed);
                println!("Total documents created: {}", summary.documents_created);
                println!("Total pages assigned: {}", summary.pages_assigned);
                println!("Method ID: {}", summary.method_id);
            }
        }
        Command::Methods => {
            let handler = ListMethodsHandler::new(method_repo, document_repo);
            let methods = handler.handle(ListMethods).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&methods)?);
            } else {
                for method in &methods {
                    println!(
                        "{}  {}  ({} documents)",
                        method.id,
                        method.name,
                        method.documents
                    );
                }
            }
        }
        Command::Documents { inventory, method } => {
            let handler = ListDocumentsHandler::new(document_repo);
            let documents = handler
                .handle(ListDocuments {
                    inventory_id: inventory,
                    method_id: method,
                })
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                for document in &documents {
                    println!("{}  {} pages", document.id, document.number_of_pages);
                }
            }
        }
        Command::Document { id } => {
            let handler = GetDocumentHandler::new(document_repo);
            let document = handler.handle(GetDocument { document_id: id }).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("Document {} ({} pages)", document.id, document.number_of_pages);
                for (index, page_id) in document.page_ids.iter().enumerate() {
                    println!("  {:>4}  {}", index, page_id);
                }
            }
        }
    }

    pool.close().await;

    Ok(())
}
