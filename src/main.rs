// Entry point and high-level CLI flow.
//
// Each subcommand names one dashboard view (or `all` of them):
// - the raw payload is read from `--input` or fetched from the data service,
// - the report is built and previewed as Markdown tables on stdout,
// - with `--export`, the primary table and a JSON summary are written out.
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jobmarket_report::client::DataServiceClient;
use jobmarket_report::config::{self, ReportConfig};
use jobmarket_report::loader::{self, PayloadSource};
use jobmarket_report::output;
use jobmarket_report::{build_report, ViewKind, ViewOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "jobmarket-report", version, about = "Job-market analytics reports")]
struct Cli {
    /// Configuration file (defaults to ./jobmarket.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    view: ViewCommand,
}

#[derive(Debug, Subcommand)]
enum ViewCommand {
    /// Job counts by role
    Counts(ViewArgs),
    /// Most requested skills, pooled or for one role
    Skills(ViewArgs),
    /// Remote vs on-site distribution
    WorkStyle(ViewArgs),
    /// Jobs by state or province
    Geo(ViewArgs),
    /// Salary statistics by role and city
    Salaries(ViewArgs),
    /// Yesterday's listings by role and company
    Listings(ViewArgs),
    /// Every view; `--input` is then a directory of `<view>.json` files
    All(ViewArgs),
}

#[derive(Debug, Args, Clone)]
struct ViewArgs {
    /// Read the payload from a JSON file instead of the data service
    #[arg(long)]
    input: Option<PathBuf>,

    /// Location filter: US, CA, or "" for all locations
    #[arg(long)]
    location: Option<String>,

    /// Restrict skills to one role
    #[arg(long)]
    role: Option<String>,

    /// Number of skills to rank
    #[arg(long)]
    top_k: Option<usize>,

    /// Write CSV and JSON summaries
    #[arg(long)]
    export: bool,

    /// Export directory (implies --export)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Rows shown per preview table
    #[arg(long)]
    preview: Option<usize>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jobmarket_report=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobmarket_report=info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn view_options(config: &ReportConfig, args: &ViewArgs) -> ViewOptions {
    ViewOptions {
        top_k: args.top_k.unwrap_or(config.report.top_k),
        role_filter: args.role.clone().filter(|r| !r.is_empty()),
        location_filter: Some(
            args.location
                .clone()
                .unwrap_or_else(|| config.report.location.clone()),
        ),
    }
}

fn payload_source(
    config: &ReportConfig,
    input: Option<&Path>,
    kind: ViewKind,
    from_dir: bool,
) -> PayloadSource {
    match input {
        Some(dir) if from_dir => PayloadSource::File(loader::payload_file(dir, kind)),
        Some(file) => PayloadSource::File(file.to_path_buf()),
        None => PayloadSource::Service(DataServiceClient::from_config(&config.service)),
    }
}

/// Load, build, preview and optionally export one view.
fn run_view(config: &ReportConfig, args: &ViewArgs, kind: ViewKind, from_dir: bool) -> Result<()> {
    let options = view_options(config, args);
    let source = payload_source(config, args.input.as_deref(), kind, from_dir);
    let (payload, load_report) = loader::load_payload(&source, kind, &options)
        .with_context(|| format!("Failed to load {} data", kind))?;
    info!(
        view = %kind,
        source = %load_report.source,
        shape = load_report.top_level,
        items = load_report.items,
        "building report"
    );

    let report = build_report(&payload, kind, &options);
    if report.is_empty() {
        warn!(view = %kind, "payload produced no data");
    }

    let preview_rows = args.preview.unwrap_or(config.report.preview_rows);
    output::preview_report(&report, config.report.label_width, preview_rows);

    if args.export || args.out.is_some() {
        let dir = args.out.clone().unwrap_or_else(|| config.report.output_dir.clone());
        let written = output::export_report(&report, &dir, config.report.label_width)
            .with_context(|| format!("Failed to export {} report", kind))?;
        for path in written {
            println!("(Exported to {})", path.display());
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let (kinds, args, from_dir): (Vec<ViewKind>, ViewArgs, bool) = match cli.view {
        ViewCommand::Counts(a) => (vec![ViewKind::JobCounts], a, false),
        ViewCommand::Skills(a) => (vec![ViewKind::Skills], a, false),
        ViewCommand::WorkStyle(a) => (vec![ViewKind::WorkStyle], a, false),
        ViewCommand::Geo(a) => (vec![ViewKind::Geography], a, false),
        ViewCommand::Salaries(a) => (vec![ViewKind::Salaries], a, false),
        ViewCommand::Listings(a) => (vec![ViewKind::Listings], a, false),
        ViewCommand::All(a) => (ViewKind::ALL.to_vec(), a, true),
    };

    if !from_dir {
        return run_view(&config, &args, kinds[0], false);
    }

    // One failing view does not stop the others.
    let mut failures = 0usize;
    for kind in kinds {
        println!("{}\n", kind.title());
        if let Err(e) = run_view(&config, &args, kind, true) {
            error!(view = %kind, "{:#}", e);
            failures += 1;
        }
    }
    if failures > 0 {
        anyhow::bail!("{} of {} views failed", failures, ViewKind::ALL.len());
    }
    Ok(())
}
