//! Tastingboard - statistics and reports for a cheese-tasting panel
//!
//! A CLI tool that loads a tasting sheet, computes per-item and
//! per-reviewer statistics and renders them as Markdown, JSON or text.
//!
//! Exit codes:
//!   0 - Success (including an empty sheet: "waiting for data")
//!   1 - Runtime error (missing sheet, schema error, bad config, etc.)

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tastingboard::catalog::StaticCatalog;
use tastingboard::cli::Args;
use tastingboard::config::{Config, CONFIG_FILE};
use tastingboard::report::{self, RenderOptions};
use tastingboard::source::{self, TableLayout, TableSource};
use tastingboard::Aggregates;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first: `[general] verbose` decides the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Tastingboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tastingboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set columns, reviewers, colors and the [catalog] entries.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the sheet, aggregate it and write the report. Returns the exit code.
fn run(args: Args, config: Config) -> Result<i32> {
    let output_path = config.general.output.as_ref().map(PathBuf::from);
    // Progress lines would mix with a report written to stdout.
    let chatty = output_path.is_some() && !args.quiet;

    let sheet = table_source(&args)?;
    let layout = TableLayout::try_from(&config.data).context("Invalid [data] settings")?;

    if chatty {
        println!("📥 Loading tasting sheet: {}", sheet.name());
    }

    let table = match source::load(&sheet, &layout) {
        Ok(table) => table,
        Err(e) if e.is_soft() => {
            warn!("{}: {}", sheet.name(), e);
            println!("⏳ No tasting data in {} yet. Waiting for data.", sheet.name());
            return Ok(0);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", sheet.name()));
        }
    };

    let aggregates = Aggregates::compute(&table, config.report.top_n)?;

    let catalog = StaticCatalog::new(config.catalog.clone());
    debug!("Catalog holds {} entries", catalog.len());

    let tasting = report::build_report(&sheet.name(), &table, aggregates, &catalog);
    let renderer = report::renderer_for(args.format, RenderOptions::from(&config));
    let output = renderer.render(&tasting)?;

    match output_path {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
        None => print!("{}", output),
    }

    if chatty {
        println!("\n📊 Summary:");
        println!("   Items: {}", tasting.metadata.item_count);
        println!("   Categories: {}", tasting.metadata.category_count);
        println!("   Reviewers: {}", tasting.metadata.reviewers.join(", "));
        if let Some(ref best) = tasting.aggregates.headline.best_item {
            println!("   Best overall: {} ({:.2})", best.name, best.value);
        }
        if let Some(ref path) = output_path {
            println!("\n✅ Report saved to: {}", path.display());
        }
    }

    Ok(0)
}

/// Resolve the input argument into a table source.
fn table_source(args: &Args) -> Result<TableSource> {
    if args.reads_stdin() {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read tasting sheet from stdin")?;
        return Ok(TableSource::Bytes {
            name: "stdin".to_string(),
            bytes,
        });
    }

    let path = args
        .input
        .clone()
        .context("No input sheet given (use --input)")?;
    Ok(TableSource::Path(path))
}

/// Where the configuration came from. Logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    /// The default file exists but could not be loaded.
    Fallback(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigOrigin::Builtin => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(reason) => warn!("Failed to load config: {}", reason),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Builtin)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(format!("{:#}", e)))),
    }
}
