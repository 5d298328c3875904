use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gymbot_metrics::app::{App, TiersResult};
use gymbot_metrics::clock::{Clock, FixedClock, SystemClock, parse_iso_date};
use gymbot_metrics::config::ConfigLoader;
use gymbot_metrics::domain::UserId;
use gymbot_metrics::error::GymError;
use gymbot_metrics::output::{JsonOutput, OutputFormat, TextOutput};
use gymbot_metrics::sheets::SheetHttpClient;
use gymbot_metrics::store::{DirStore, WorkoutStore};

#[derive(Parser)]
#[command(name = "gymbot")]
#[command(about = "Workout metrics from a spreadsheet-backed training log")]
#[command(version, author)]
struct Cli {
    /// Config file (defaults to ./gymbot.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Worksheet export directory
    #[arg(long, global = true, conflicts_with = "sheet_url")]
    store: Option<Utf8PathBuf>,

    /// Base URL of an HTTP worksheet export
    #[arg(long, global = true)]
    sheet_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Evaluate the full dashboard for a user")]
    Dashboard(DashboardArgs),
    #[command(about = "Show one exercise's last, record and history")]
    Exercise(ExerciseArgs),
    #[command(about = "Print the level/rank table")]
    Tiers,
}

#[derive(Args)]
struct DashboardArgs {
    user: String,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the system date
    #[arg(long)]
    today: Option<String>,
}

#[derive(Args)]
struct ExerciseArgs {
    user: String,
    name: String,

    #[arg(long)]
    today: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(gym) = report.downcast_ref::<GymError>() {
            return ExitCode::from(map_exit_code(gym));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GymError) -> u8 {
    match error {
        GymError::ProfileNotFound(_) | GymError::ExerciseNotFound(_) => 2,
        GymError::InvalidUserId(_) | GymError::InvalidDate(_) => 2,
        GymError::SourceUnavailable(_)
        | GymError::SheetHttp(_)
        | GymError::SheetStatus { .. }
        | GymError::StoreRead(_)
        | GymError::StoreParse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Dashboard(args) => {
            let store = open_store(cli.store, cli.sheet_url.as_deref())?;
            let clock = resolve_clock(args.today.as_deref())?;
            let app = App::new(store, clock, config);
            let dashboard = app.open(args.user.parse()?)?;
            match cli.format {
                OutputFormat::Json => JsonOutput::print_dashboard(&dashboard).into_diagnostic()?,
                OutputFormat::Text => println!("{}", TextOutput::render_dashboard(&dashboard)),
            }
        }
        Commands::Exercise(args) => {
            let store = open_store(cli.store, cli.sheet_url.as_deref())?;
            let clock = resolve_clock(args.today.as_deref())?;
            let app = App::new(store, clock, config);
            let user: UserId = args.user.parse()?;
            let result = app.exercise(user, &args.name)?;
            match cli.format {
                OutputFormat::Json => JsonOutput::print_exercise(&result).into_diagnostic()?,
                OutputFormat::Text => println!("{}", TextOutput::render_exercise(&result)),
            }
        }
        Commands::Tiers => {
            let result = TiersResult::from_table(&config.tiers);
            match cli.format {
                OutputFormat::Json => JsonOutput::print_tiers(&result).into_diagnostic()?,
                OutputFormat::Text => println!("{}", TextOutput::render_tiers(&result)),
            }
        }
    }
    Ok(())
}

fn open_store(
    root: Option<Utf8PathBuf>,
    sheet_url: Option<&str>,
) -> Result<Box<dyn WorkoutStore>, GymError> {
    if let Some(url) = sheet_url {
        return Ok(Box::new(SheetHttpClient::new(url)?));
    }
    let store = match root {
        Some(root) => DirStore::new_with_root(root),
        None => DirStore::new()?,
    };
    Ok(Box::new(store))
}

fn resolve_clock(today: Option<&str>) -> Result<Box<dyn Clock>, GymError> {
    match today {
        Some(value) => Ok(Box::new(FixedClock(parse_iso_date(value)?))),
        None => Ok(Box::new(SystemClock)),
    }
}
