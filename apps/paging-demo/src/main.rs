use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::PathBuf;
use window_paging::{
    InMemoryBackend, ProviderBuilder, SlicedProvider, SortSpec, WindowSlice, WindowedProvider,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Clone, Debug)]
struct Record {
    id: u64,
    name: String,
    active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    All,
    Active,
}

type DemoBackend = InMemoryBackend<Record, Scope>;
type DemoProvider = WindowedProvider<DemoBackend>;

/// Paging demo - walks windowed requests over a page-indexed backend
#[derive(Parser)]
#[command(name = "paging-demo")]
#[command(about = "Paging demo - walks windowed requests over a page-indexed backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window size per request (overrides config)
    #[arg(long)]
    chunk: Option<u64>,

    /// Number of fixture records (overrides config)
    #[arg(long)]
    records: Option<u64>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through the fixture one chunk at a time
    Run {
        /// Only serve active records
        #[arg(long)]
        active_only: bool,
    },
    /// Scroll through chunk responses until the backend reports no more data
    Scroll,
    /// Fetch a single window
    Fetch {
        offset: u64,
        count: u64,
        /// Sort as signed tokens, e.g. "-name,+id"
        #[arg(long, default_value = "")]
        sort: String,
    },
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        chunk_size: cli.chunk,
        records: cli.records,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    config.validate()?;

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.base_dir());
    tracing::info!(records = config.demo.records, "paging demo starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run { active_only: false }) {
        Commands::Run { active_only } => run_walk(&config, active_only).await,
        Commands::Scroll => run_scroll(&config).await,
        Commands::Fetch {
            offset,
            count,
            sort,
        } => run_fetch(&config, offset, count, &sort).await,
        Commands::Check => check_config(&config),
    }
}

fn fixture_backend(config: &AppConfig) -> DemoBackend {
    let rows = (0..config.demo.records)
        .map(|id| Record {
            id,
            name: format!("record-{id:04}"),
            active: id % 3 != 0,
        })
        .collect();

    InMemoryBackend::new(rows, |r: &Record, scope: &Scope| match scope {
        Scope::All => true,
        Scope::Active => r.active,
    })
    .sortable("id", |a: &Record, b: &Record| a.id.cmp(&b.id))
    .sortable("name", |a: &Record, b: &Record| a.name.cmp(&b.name))
}

fn build_provider(config: &AppConfig) -> Result<DemoProvider> {
    Ok(ProviderBuilder::new(fixture_backend(config))
        .default_sort(config.paging.sort_spec()?)
        .default_filter(Scope::All)
        .build())
}

fn build_sliced_provider(config: &AppConfig) -> Result<SlicedProvider<DemoBackend>> {
    Ok(ProviderBuilder::sliced(fixture_backend(config))
        .default_sort(config.paging.sort_spec()?)
        .default_filter(Scope::All)
        .build_sliced())
}

fn describe(records: &WindowSlice<Record>) -> String {
    let window = records.window();
    let pageable = records.pageable();
    format!(
        "window {} -> page_size={} page_number={} rows={}",
        window,
        pageable.page_size,
        pageable.page_number,
        records.len()
    )
}

async fn run_walk(config: &AppConfig, active_only: bool) -> Result<()> {
    let mut provider = build_provider(config)?;
    provider.on_refresh(|event| {
        tracing::info!(generation = event.generation, reason = ?event.reason, "provider refreshed");
    });
    if active_only {
        provider.set_filter(Scope::Active);
    }

    let total = provider.size(None).await?;
    let chunk = config.paging.chunk_size;
    println!("total records: {total}");

    let mut offset = 0;
    let mut seen = 0;
    while offset < total {
        let records = provider
            .fetch(offset, chunk, &SortSpec::empty(), None)
            .await
            .with_context(|| format!("fetching window at offset {offset}"))?;
        let line = describe(&records);
        let rows: Vec<Record> = records.collect();
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => println!("{line} first={} last={}", first.id, last.id),
            _ => println!("{line}"),
        }
        if rows.iter().any(|r| active_only && !r.active) {
            anyhow::bail!("inactive record served under active-only filter");
        }
        seen += rows.len() as u64;
        offset += chunk;
    }

    if seen != total {
        anyhow::bail!("walked {seen} records but backend reports {total}");
    }
    println!("walk complete: {seen} records in {} windows", total.div_ceil(chunk));
    Ok(())
}

async fn run_scroll(config: &AppConfig) -> Result<()> {
    let provider = build_sliced_provider(config)?;
    let chunk = config.paging.chunk_size;

    let mut offset = 0;
    let mut windows = 0;
    loop {
        let records = provider
            .fetch(offset, chunk, &SortSpec::empty(), None)
            .await
            .with_context(|| format!("fetching window at offset {offset}"))?;
        println!("{} has_more={}", describe(&records), records.has_more());
        let more = records.has_more();
        windows += 1;
        offset += records.len() as u64;
        if !more {
            break;
        }
    }

    println!("scroll complete: {offset} records in {windows} windows");
    Ok(())
}

async fn run_fetch(config: &AppConfig, offset: u64, count: u64, sort: &str) -> Result<()> {
    let provider = build_provider(config)?;
    let sort = SortSpec::from_signed_tokens(sort).context("invalid --sort")?;

    let records = provider.fetch(offset, count, &sort, None).await?;
    println!("{}", describe(&records));
    for record in records {
        println!("{:>6}  {}  active={}", record.id, record.name, record.active);
    }
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
