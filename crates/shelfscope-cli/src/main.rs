use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shelfscope_core::{AppConfig, CatalogKind, load_catalog};
use shelfscope_fetch::{
    EnrichmentPipeline, EnrichmentReport, ItemProgress, ItemStatus, PipelineOptions, source_for,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "shelfscope",
    about = "Fill in cover images and links for local media catalogs",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.config/shelfscope/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the run summary as JSON.
    /// Also enabled by setting SHELFSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich the book catalog from Goodreads.
    Book(RunArgs),

    /// Enrich the game catalog from Backloggd.
    Game(RunArgs),

    /// Enrich the manga catalog from Jikan (MyAnimeList).
    Manga(RunArgs),

    /// Enrich the movie catalog from Letterboxd.
    Movie(RunArgs),

    /// Enrich every catalog, one after another.
    All {
        #[arg(long)]
        dry_run: bool,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Catalog file to update (defaults to the path in the config).
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Look everything up but leave the file untouched.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Print the config file location.
    Path,
    /// Write the default configuration to the config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("SHELFSCOPE_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    debug!("config: {}", config_path.display());

    match cli.command {
        Commands::Book(args) => {
            run_single(&config, CatalogKind::Book, args, json_output, start).await?
        }
        Commands::Game(args) => {
            run_single(&config, CatalogKind::Game, args, json_output, start).await?
        }
        Commands::Manga(args) => {
            run_single(&config, CatalogKind::Manga, args, json_output, start).await?
        }
        Commands::Movie(args) => {
            run_single(&config, CatalogKind::Movie, args, json_output, start).await?
        }

        Commands::All { dry_run } => {
            let outcome = run_all(&config, dry_run, json_output).await;
            if json_output {
                let dur = start.elapsed().as_millis();
                let reports: Vec<_> = outcome
                    .reports
                    .iter()
                    .map(|(kind, report)| serde_json::json!({"kind": kind, "report": report}))
                    .collect();
                let errors: Vec<_> = outcome
                    .errors
                    .iter()
                    .map(|(kind, error)| serde_json::json!({"kind": kind, "error": error}))
                    .collect();
                print_json(&serde_json::json!({
                    "status": if errors.is_empty() { "ok" } else { "partial" },
                    "data": reports,
                    "errors": errors,
                    "meta": {"duration_ms": dur}
                }))?;
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status": "ok", "data": config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({"status": "ok", "data": {"path": config_path}}))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    eprintln!(
                        "Config already exists at {}. Add --force to overwrite.",
                        config_path.display()
                    );
                    std::process::exit(1);
                }
                AppConfig::default().save_to(&config_path)?;
                if json_output {
                    print_json(&serde_json::json!({"status": "ok", "data": {"path": config_path}}))?;
                } else {
                    println!("Wrote default config to {}", config_path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Runs ────────────────────────────────────────────────────────────────────

async fn run_single(
    config: &AppConfig,
    kind: CatalogKind,
    args: RunArgs,
    json_output: bool,
    start: Instant,
) -> Result<()> {
    let path = args
        .file
        .unwrap_or_else(|| config.profile(kind).file.clone());
    let report = run_catalog(config, kind, &path, args.dry_run, json_output).await?;

    if json_output {
        let dur = start.elapsed().as_millis();
        print_json(&serde_json::json!({
            "status": "ok",
            "data": {"kind": kind, "file": path, "report": report},
            "meta": {"duration_ms": dur, "dry_run": args.dry_run}
        }))?;
    } else {
        print_summary(kind, &report);
    }
    Ok(())
}

/// Per-kind results of `shelfscope all`.
#[derive(Debug, Default)]
struct AllOutcome {
    reports: Vec<(CatalogKind, EnrichmentReport)>,
    errors: Vec<(CatalogKind, String)>,
}

/// Run every catalog in turn. A catalog that cannot be read or written is
/// reported and the next one still runs.
async fn run_all(config: &AppConfig, dry_run: bool, json_output: bool) -> AllOutcome {
    let mut outcome = AllOutcome::default();
    for kind in CatalogKind::ALL {
        let path = config.profile(kind).file.clone();
        match run_catalog(config, kind, &path, dry_run, json_output).await {
            Ok(report) => {
                if !json_output {
                    print_summary(kind, &report);
                    println!();
                }
                outcome.reports.push((kind, report));
            }
            Err(e) => {
                warn!("{kind} catalog failed: {e:#}");
                if !json_output {
                    eprintln!("❌ Skipping {kind} catalog: {e:#}");
                }
                outcome.errors.push((kind, format!("{e:#}")));
            }
        }
    }
    outcome
}

async fn run_catalog(
    config: &AppConfig,
    kind: CatalogKind,
    path: &Path,
    dry_run: bool,
    json_output: bool,
) -> Result<EnrichmentReport> {
    let mut catalog = load_catalog(path)
        .with_context(|| format!("failed to read {} catalog {}", kind, path.display()))?;
    let source = source_for(kind, config)?;
    debug!("{kind}: {} items from {}", catalog.len(), path.display());
    let options = PipelineOptions {
        dry_run,
        ..PipelineOptions::from_config(config, kind)
    };

    if !json_output {
        println!(
            "Processing {} {} via {}...\n",
            catalog.len(),
            kind.plural(),
            kind.source_name()
        );
    }

    let pipeline = EnrichmentPipeline::new(source, options);
    let report = pipeline
        .run(&mut catalog, Some(path), |progress| {
            if !json_output {
                print_progress(&progress);
            }
        })
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(report)
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn print_progress(p: &ItemProgress<'_>) {
    println!("{}", status_line(p));
}

fn status_line(p: &ItemProgress<'_>) -> String {
    let position = format!("[{}/{}]", p.index, p.total);
    match &p.status {
        ItemStatus::Skipped => {
            format!("{position} ⏭️  Skipping (already complete): {}", p.title)
        }
        ItemStatus::Fetching => match p.author {
            Some(author) => format!("{position} 🔍 Fetching: {} by {author}", p.title),
            None => format!("{position} 🔍 Fetching: {}", p.title),
        },
        ItemStatus::RateLimited { cooldown } => {
            format!("  ⚠️  Rate limited, waiting {} seconds...", cooldown.as_secs())
        }
        ItemStatus::Updated { fields } if fields.is_empty() => {
            format!("  ✅ Found (nothing new): {}", p.title)
        }
        ItemStatus::Updated { .. } => format!("  ✅ Updated: {}", p.title),
        ItemStatus::Failed { reason } => format!("  ❌ Failed: {} ({reason})", p.title),
    }
}

fn print_summary(kind: CatalogKind, report: &EnrichmentReport) {
    println!(
        "\n✅ Done! Updated {} {}, skipped {}, failed {}",
        report.updated,
        kind.plural(),
        report.skipped,
        report.failed
    );
    println!("Total processed: {}", report.total);
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "shelfscope_cli=debug,shelfscope_fetch=debug,shelfscope_core=debug"
    } else {
        "shelfscope_cli=info,shelfscope_fetch=info,shelfscope_core=info"
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
