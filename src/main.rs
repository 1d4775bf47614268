// 技能库导入命令行入口

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use importer_lib::logging::init_logger;
use importer_lib::services::domain::{HeuristicTables, SkillNormalizer, TabInterpreter};
use importer_lib::services::infrastructure::{FileLocator, RestSkillStore, SqliteOrmSkillStore};
use importer_lib::services::{
    BaseService, BatchWriterService, DataImportService, ReportGenerationService, SkillStore, TabSelection,
};
use importer_lib::utils::{AppConfig, ConfigManager, StoreBackend};

#[derive(Parser)]
#[command(name = "import-skills")]
#[command(about = "Import the skills master workbook into the skills datastore", long_about = None)]
struct Cli {
    /// Workbook path (default from config: data/skills_master.xlsx, then fallbacks)
    #[arg(long, short, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Comma separated tab names to import
    #[arg(long, value_delimiter = ',', value_name = "TABS", conflicts_with_all = ["all_prek_k", "all_grades"])]
    tabs: Vec<String>,

    /// Import every Pre-K and K tab
    #[arg(long, conflicts_with = "all_grades")]
    all_prek_k: bool,

    /// Import every tab in the workbook (default)
    #[arg(long)]
    all_grades: bool,

    /// Run the full pipeline without writing to the datastore
    #[arg(long)]
    dry_run: bool,

    /// Debug logging and per-row errors in the summary
    #[arg(long, short)]
    verbose: bool,

    /// Records per insert request
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// JSON config file
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Datastore backend
    #[arg(long, value_enum)]
    store: Option<StoreArg>,

    /// SQLite file for the sqlite backend
    #[arg(long, value_name = "PATH")]
    sqlite_path: Option<PathBuf>,

    /// Write the final report as JSON
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreArg {
    Rest,
    Sqlite,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Rest => StoreBackend::Rest,
            StoreArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}

impl Cli {
    fn tab_selection(&self) -> TabSelection {
        if !self.tabs.is_empty() {
            TabSelection::Explicit(self.tabs.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect())
        } else if self.all_prek_k {
            TabSelection::PreKAndK
        } else {
            TabSelection::AllGrades
        }
    }

    /// 命令行参数优先于配置文件和环境变量
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(file) = &self.file {
            config.importer_config.input_file = file.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.importer_config.batch_size = batch_size;
        }
        if let Some(level) = &self.log_level {
            config.logging_config.log_level = level.to_lowercase();
        }
        if let Some(store) = self.store {
            config.datastore_config.backend = store.into();
        }
        if let Some(path) = &self.sqlite_path {
            config.datastore_config.sqlite_path = path.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("导入失败: {:#}", e);
            eprintln!("导入失败: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut manager = ConfigManager::new(cli.config.clone());
    manager.load_from_file().await.context("加载配置失败")?;
    manager.override_from_env();
    cli.apply_overrides(manager.get_config_mut());
    manager.validate_config()?;

    let config = manager.get_config().clone();
    init_logger(&config.logging_config, cli.verbose)?;

    // 先定位文件，文件缺失时不触碰数据存储
    let importer_config = &config.importer_config;
    let file = FileLocator::locate(&importer_config.input_file, &importer_config.fallback_files)?;

    // 缺少凭据在启动时即失败
    let store = if cli.dry_run {
        log::info!("[DRY RUN] 不会写入数据存储");
        None
    } else {
        manager.validate_credentials()?;
        Some(open_store(&config).await?)
    };

    let writer = match store {
        Some(store) => BatchWriterService::new(store, importer_config.batch_size)
            .with_batch_delay(Duration::from_millis(importer_config.batch_delay_ms)),
        None => BatchWriterService::dry_run(importer_config.batch_size),
    };
    let tables = HeuristicTables::standard().with_ordinal_source(importer_config.ordinal_source);
    let service = DataImportService::new(
        TabInterpreter::new(importer_config.consolidated_sheets.clone()),
        SkillNormalizer::new(Arc::new(tables)),
        writer,
    );

    let report = service.import_workbook(&file, &cli.tab_selection()).await?;

    ReportGenerationService::print_summary(&report, cli.verbose);
    if let Some(path) = &cli.report_json {
        ReportGenerationService::write_json(&report, path).await?;
    }

    Ok(report.exit_code())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SkillStore>> {
    let datastore = &config.datastore_config;
    let store: Arc<dyn SkillStore> = match datastore.backend {
        StoreBackend::Rest => {
            let mut store = RestSkillStore::new(datastore)?;
            store.initialize().await?;
            Arc::new(store)
        }
        StoreBackend::Sqlite => {
            let mut store = SqliteOrmSkillStore::new(Some(&datastore.sqlite_path))
                .await
                .context("打开SQLite数据库失败")?;
            store.initialize().await?;
            Arc::new(store)
        }
    };

    // 健康检查失败不终止导入，批次写入时的错误会进入报告
    if let Err(e) = store.health_check().await {
        log::warn!("{} 健康检查失败: {}", store.service_name(), e);
    }
    Ok(store)
}
