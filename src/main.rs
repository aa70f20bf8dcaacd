use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ltsmap::config::Config;
use ltsmap::resource::aom_mapping::AomMappingRule;
use ltsmap::resource::dashboard::Dashboard;
use ltsmap::resource::elb_log::ElbLog;
use ltsmap::resource::struct_template::StructTemplate;
use ltsmap::{mapper, Diagnostics, ProviderContext, ResourceKind, ResourceState};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Drive LTS resources through create/read/update/delete
#[derive(Parser, Debug)]
#[command(name = "ltsctl", version, about, long_about = None)]
struct Args {
    /// Config file (YAML or JSON); defaults to the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project to use
    #[arg(short, long)]
    project: Option<String>,

    /// Default region
    #[arg(short, long)]
    region: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the resource and write its identity into the state file
    Create(Target),
    /// Refresh the state file from the remote copy
    Read(Target),
    /// Push declared fields to the remote resource
    Update(Target),
    /// Delete the remote resource
    Delete(Target),
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Resource kind
    #[arg(short, long, value_enum)]
    kind: Kind,

    /// State file holding the declared fields (JSON)
    #[arg(short, long)]
    state: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    StructTemplate,
    AomMappingRule,
    Dashboard,
    ElbLog,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ltsctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ltsmap").join("ltsctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ltsmap").join("ltsctl.log");
    }
    PathBuf::from("ltsctl.log")
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(config.with_overrides(args.project.clone(), args.region.clone()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = load_config(&args)?
        .validate()
        .context("Invalid configuration")?;
    tracing::info!("Using project: {}, region: {}", config.project_id, config.region);

    let ctx = ProviderContext::new(config)?;

    let (op, target) = match &args.command {
        Command::Create(t) => (Op::Create, t),
        Command::Read(t) => (Op::Read, t),
        Command::Update(t) => (Op::Update, t),
        Command::Delete(t) => (Op::Delete, t),
    };

    let diags = match target.kind {
        Kind::StructTemplate => run::<StructTemplate>(&ctx, op, &target.state).await?,
        Kind::AomMappingRule => run::<AomMappingRule>(&ctx, op, &target.state).await?,
        Kind::Dashboard => run::<Dashboard>(&ctx, op, &target.state).await?,
        Kind::ElbLog => run::<ElbLog>(&ctx, op, &target.state).await?,
    };

    for diag in diags.iter() {
        eprintln!("{diag}");
    }

    Ok(if diags.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Create,
    Read,
    Update,
    Delete,
}

/// Load state, run one operation, write state back
async fn run<K: ResourceKind>(ctx: &ProviderContext, op: Op, path: &Path) -> Result<Diagnostics> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    let mut state: ResourceState<K::Fields> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid {} state in {}", K::TYPE_NAME, path.display()))?;

    tracing::info!("{:?} {} ({})", op, K::TYPE_NAME, state.id_str());

    let diags = match op {
        Op::Create => mapper::create::<K>(ctx, &mut state).await,
        Op::Read => mapper::read::<K>(ctx, &mut state).await,
        Op::Update => mapper::update::<K>(ctx, &mut state).await,
        Op::Delete => mapper::delete::<K>(ctx, &mut state).await,
    };

    let content = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write state file {}", path.display()))?;

    if !state.is_present() {
        println!("{}: absent", K::TYPE_NAME);
    } else {
        println!("{}: {}", K::TYPE_NAME, state.id_str());
    }

    Ok(diags)
}
