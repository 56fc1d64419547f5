use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pair_merge::merge::{self, MergeRequest};
use pair_merge::{ColumnOverrides, Result, SourceKind, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => execute_merge(args),
        Command::Headers(args) => execute_headers(args),
    }
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let mut overrides = match &args.overrides {
        Some(path) => {
            if !path.exists() {
                return Err(ToolError::MissingInput(path.clone()));
            }
            ColumnOverrides::from_json(&std::fs::read_to_string(path)?)?
        }
        None => ColumnOverrides::new(),
    };
    for assignment in &args.columns {
        overrides.apply_assignment(assignment)?;
    }

    let request = MergeRequest {
        primary: args.primary,
        stock: args.stock,
        sales: args.sales,
        day_count: args.days,
        output: args.output,
    };
    let report = merge::merge_workbooks(&request, &overrides)?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn execute_headers(args: HeadersArgs) -> Result<()> {
    let choices = merge::inspect_headers(&args.input, args.source.into())?;
    println!("{}", serde_json::to_string_pretty(&choices)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge stock, sales and day-count exports onto a primary item list."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the source workbooks into one consolidated workbook.
    Merge(MergeArgs),
    /// Show the headers of a workbook and the column picked for each field.
    Headers(HeadersArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Primary workbook with identity fields and the minimum quantity.
    #[arg(long)]
    primary: Option<PathBuf>,

    /// Stock workbook (inventory on hand).
    #[arg(long)]
    stock: Option<PathBuf>,

    /// Sales workbook (total column).
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Daily movement workbook used for the inventory day count.
    #[arg(long)]
    days: Option<PathBuf>,

    /// Output workbook path.
    #[arg(long, default_value = "cikti_birlesik.xlsx")]
    output: PathBuf,

    /// JSON document with manual column selections.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Manual column selection, e.g. `primary:location_code=Depo`. Repeatable.
    #[arg(long = "column", value_name = "SOURCE:FIELD=HEADER")]
    columns: Vec<String>,

    /// Print the merge summary as JSON.
    #[arg(long)]
    report: bool,
}

#[derive(clap::Args)]
struct HeadersArgs {
    /// Role the workbook plays in the merge.
    #[arg(long, value_enum)]
    source: SourceArg,

    /// Workbook path.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SourceArg {
    Primary,
    Stock,
    Sales,
    Days,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Primary => SourceKind::Primary,
            SourceArg::Stock => SourceKind::Stock,
            SourceArg::Sales => SourceKind::Sales,
            SourceArg::Days => SourceKind::DayCount,
        }
    }
}
