use std::path::PathBuf;

use aideon_tablediff::aideon::tablediff::config::{self, JobConfig};
use aideon_tablediff::aideon::tablediff::report::{ReportSettings, ResultMode};
use aideon_tablediff::aideon::tablediff::run::{self, JobOutcome};
use aideon_tablediff::{Result, ToolError};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
    if let Err(error) = execute(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|err| ToolError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn execute(cli: Cli) -> Result<()> {
    let outcomes = match cli.command {
        Command::Run(args) => {
            let jobs = config::load_jobs(&args.config)?;
            run::run_jobs(&jobs, &args.job)?
        }
        Command::Diff(args) => vec![run::run_job(&args.into_job())?],
    };

    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &JobOutcome) {
    let summary = &outcome.summary;
    println!(
        "{}: {} unchanged, {} added, {} removed, {} modified -> {}",
        outcome.name,
        summary.unmodified,
        summary.added,
        summary.removed,
        summary.modified,
        outcome.output.display()
    );
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile two snapshots of a tabular dataset."
)]
struct Cli {
    /// Emit debug logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the comparison jobs declared in a configuration file.
    Run(RunArgs),
    /// Compare two files directly.
    Diff(DiffArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Configuration file; the extension is forced to `.json`.
    #[arg(long)]
    config: PathBuf,

    /// Only run the named jobs. May be repeated.
    #[arg(long)]
    job: Vec<String>,
}

#[derive(clap::Args)]
struct DiffArgs {
    /// Earlier snapshot (CSV or XLSX).
    #[arg(long)]
    before: PathBuf,

    /// Later snapshot (CSV or XLSX).
    #[arg(long)]
    after: PathBuf,

    /// Report path; `.json` writes JSON, otherwise an `.xlsx` workbook.
    #[arg(long)]
    output: PathBuf,

    /// Key field identifying a record. May be repeated.
    #[arg(long)]
    key: Vec<String>,

    /// Restrict the comparison to this column. May be repeated.
    #[arg(long)]
    compare_column: Vec<String>,

    /// Column excluded from change detection. May be repeated.
    #[arg(long)]
    ignore_field: Vec<String>,

    /// Label of the earlier environment.
    #[arg(long)]
    before_env: Option<String>,

    /// Label of the later environment.
    #[arg(long)]
    after_env: Option<String>,

    /// Report layout.
    #[arg(long, value_enum, default_value_t = LayoutMode::Inline)]
    mode: LayoutMode,

    /// Group report rows by operation.
    #[arg(long)]
    group: bool,

    /// Include unchanged records in the report.
    #[arg(long)]
    include_unmodified: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutMode {
    Inline,
    Side,
}

impl From<LayoutMode> for ResultMode {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Inline => ResultMode::Inline,
            LayoutMode::Side => ResultMode::Side,
        }
    }
}

impl DiffArgs {
    fn into_job(self) -> JobConfig {
        let compare_columns = if self.compare_column.is_empty() {
            None
        } else {
            Some(self.compare_column)
        };
        JobConfig {
            name: "diff".to_string(),
            before_file: self.before,
            after_file: self.after,
            output_file: self.output,
            keys: self.key,
            remap_before: Vec::new(),
            remap_after: Vec::new(),
            compare_columns,
            ignore_fields: self.ignore_field,
            before_environment: self.before_env,
            after_environment: self.after_env,
            disabled: false,
            report: ReportSettings {
                result_mode: self.mode.into(),
                result_group: self.group,
                include_unmodified: self.include_unmodified,
                ..ReportSettings::default()
            },
        }
    }
}
