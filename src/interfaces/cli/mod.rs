/// CLI Interface Module
///
/// This module provides the command-line interface of the simulator.
/// It is the primary entry point when the crate is run as a binary.
///
/// ## Responsibilities
/// - Parse command-line arguments (and an optional JSON config file)
/// - `generate`: simulate, print a preview and write the CSV artifacts
/// - `serve`: start the HTTP simulator server

use crate::application::dto::SimulationSummary;
use crate::application::error::SimulationError;
use crate::application::services::SimulationService;
use crate::domain::config::{MethylationScale, SimulationConfig};
use crate::domain::omics::OmicsLayer;
use crate::domain::validation::{ConfigValidator, ValidationError};
use crate::infrastructure::observability::{ServerError, SimulatorServer};
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// 命令行错误
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 多组学模拟器命令行配置
#[derive(Parser, Debug, Clone)]
#[command(name = "omics-simulator")]
#[command(author = "Omics Simulator Team")]
#[command(version)]
#[command(about = "多组学数据模拟器：转录组、蛋白组、代谢组、甲基化", long_about = None)]
pub struct CliConfig {
    /// 日志级别
    #[arg(short = 'l', long, global = true, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 生成模拟数据并导出CSV
    Generate(GenerateArgs),
    /// 启动HTTP模拟服务
    Serve(ServeArgs),
}

/// `generate` 参数；未显式给出的参数取配置文件或默认值
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// JSON配置文件（命令行参数优先）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 对照组样本数 [默认: 100]
    #[arg(short = 'c', long)]
    pub control_samples: Option<usize>,

    /// 处理组样本数 [默认: 100]
    #[arg(short = 't', long)]
    pub treatment_samples: Option<usize>,

    /// 转录组特征数 [默认: 3234]
    #[arg(long)]
    pub transcriptomics: Option<usize>,

    /// 蛋白组特征数 [默认: 2187]
    #[arg(long)]
    pub proteomics: Option<usize>,

    /// 代谢组特征数 [默认: 129]
    #[arg(long)]
    pub metabolomics: Option<usize>,

    /// 甲基化特征数 [默认: 1110]
    #[arg(long)]
    pub methylation: Option<usize>,

    /// 选择组学层，逗号分隔 [默认: 全部]
    #[arg(long, value_delimiter = ',')]
    pub omics: Option<Vec<OmicsLayer>>,

    /// 随机种子 [默认: 42]
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// 甲基化数值尺度: m-value 或 beta [默认: m-value]
    #[arg(long)]
    pub methylation_scale: Option<MethylationScale>,

    /// 输出目录
    #[arg(short = 'o', long, default_value = "simulated")]
    pub output_dir: PathBuf,

    /// 显著性阈值（BH校正后），取值 (0, 1]
    #[arg(long, default_value_t = 0.05, value_parser = parse_alpha)]
    pub alpha: f64,

    /// 不计算质量指标
    #[arg(long, default_value_t = false)]
    pub skip_quality: bool,

    /// 预览行数（0表示不打印预览）
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// 仅显示配置不生成数据
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Merges the config file (if any) with explicit flags and validates the result
    pub fn resolve_config(&self) -> Result<SimulationConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
                    path: path.clone(),
                    source,
                })?
            }
            None => SimulationConfig::default(),
        };

        if let Some(n) = self.control_samples {
            config.control_samples = n;
        }
        if let Some(n) = self.treatment_samples {
            config.treatment_samples = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(scale) = self.methylation_scale {
            config.methylation_scale = scale;
        }

        let counts = [
            (OmicsLayer::Transcriptomics, self.transcriptomics),
            (OmicsLayer::Proteomics, self.proteomics),
            (OmicsLayer::Metabolomics, self.metabolomics),
            (OmicsLayer::Methylation, self.methylation),
        ];
        for (layer, count) in counts {
            if let Some(n) = count {
                config.features.insert(layer, n);
            }
        }

        let validator = ConfigValidator::new();
        if let Some(layers) = &self.omics {
            validator.validate_selection(layers)?;
            config.retain_layers(layers);
        }
        validator.validate(&config)?;

        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// 服务器监听地址
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// 服务器监听端口
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// 显著性阈值（BH校正后），取值 (0, 1]
    #[arg(long, default_value_t = 0.05, value_parser = parse_alpha)]
    pub alpha: f64,
}

/// 解析显著性阈值，必须落在 (0, 1]
fn parse_alpha(s: &str) -> Result<f64, String> {
    let alpha: f64 = s.parse().map_err(|e| format!("invalid number '{}': {}", s, e))?;
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(format!("alpha must be in (0, 1], got {}", s))
    }
}

/// Runs the CLI application
///
/// Parses command-line arguments, initialises logging and dispatches to
/// the selected subcommand.
pub async fn run() -> Result<(), CliError> {
    let config = CliConfig::parse();

    init_logging(&config.log_level);
    tracing::debug!("配置: {:?}", config);

    match config.command {
        Command::Generate(args) => generate(args).await,
        Command::Serve(args) => serve(args).await,
    }
}

async fn generate(args: GenerateArgs) -> Result<(), CliError> {
    let config = args.resolve_config()?;

    println!("========================================");
    println!("  多组学数据模拟器 v{}", env!("CARGO_PKG_VERSION"));
    println!("========================================");
    println!("样本数:       {} 对照 + {} 处理", config.control_samples, config.treatment_samples);
    for (layer, n) in config.layers() {
        println!("{:<14}{} 个特征", format!("{}:", layer.display_name()), n);
    }
    println!("随机种子:     {}", config.seed);
    println!("甲基化尺度:   {}", config.methylation_scale);
    println!("输出目录:     {}", args.output_dir.display());
    println!("========================================");

    if args.dry_run {
        println!("\nDry-run 模式 - 不生成数据");
        if let Ok(json) = serde_json::to_string_pretty(&config) {
            println!("{}", json);
        }
        return Ok(());
    }

    let service = SimulationService::new()
        .with_alpha(args.alpha)
        .with_preview(args.preview_rows, args.preview_rows);
    let skip_quality = args.skip_quality;
    let output_dir = args.output_dir.clone();

    // CPU密集的生成与写盘放到阻塞线程
    let (summary, written) = tokio::task::spawn_blocking(move || -> Result<_, SimulationError> {
        let run = if skip_quality {
            service.simulate_only(config)?
        } else {
            service.run(config)?
        };
        let written = service.export_to_dir(&run, &output_dir)?;
        Ok((service.summarize(&run), written))
    })
    .await??;

    if args.preview_rows > 0 {
        print_preview(&summary);
    }

    println!("\n已导出:");
    for path in &written {
        println!("  {}", path.display());
    }
    tracing::info!("完成");
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), CliError> {
    let addr = SocketAddr::new(args.host, args.port);
    let server = SimulatorServer::new(addr).with_service(SimulationService::new().with_alpha(args.alpha));
    server.run().await?;
    Ok(())
}

/// 打印元数据与各组学层的前几行几列
fn print_preview(summary: &SimulationSummary) {
    println!("\n元数据:");
    println!("  {:<12} {:<10} {:<8}", "sample_id", "group", "batch");
    for sample in &summary.metadata_preview {
        println!("  {:<12} {:<10} {:<8}", sample.sample_id, sample.group.as_str(), sample.batch);
    }

    for layer in &summary.layers {
        let preview = &layer.preview;
        println!(
            "\n{} ({} x {}):",
            layer.omic.display_name(),
            preview.total_features,
            preview.total_samples
        );

        let header: String = preview
            .sample_names
            .iter()
            .map(|s| format!("{:>11}", s))
            .collect();
        println!("  {:<16}{}", "", header);

        for (id, row) in preview.feature_ids.iter().zip(&preview.values) {
            let cells: String = row
                .iter()
                .map(|v| {
                    if layer.omic.is_count_data() {
                        format!("{:>11}", *v as i64)
                    } else {
                        format!("{:>11.4}", v)
                    }
                })
                .collect();
            println!("  {:<16}{}", id, cells);
        }

        if let Some(q) = &layer.quality {
            println!(
                "  显著特征: {}/{} (均值 {:.3}, 标准差 {:.3})",
                q.n_significant, q.n_features, q.mean, q.std_dev
            );
        }
    }
}

/// 初始化日志系统
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
