use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand};

use _core::audit::{audit_frame, AuditRules};
use _core::config::GeneratorConfig;
use _core::features::Scenario;
use _core::generator::{read_dataset, FootfallGenerator};
use _core::impacts::impact_breakdown;
use _core::predictor::{weekday_label, ScenarioPredictor, TrafficLevel};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Synthetic gym footfall data and scenario predictions",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the synthetic daily footfall dataset
    Generate(GenerateArgs),
    /// Check a dataset against the generator's invariants
    Audit(AuditArgs),
    /// Predict footfall for a scenario with a trained model artifact
    Predict(PredictArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// First date (YYYY-MM-DD)
    #[arg(long, default_value = "2021-01-01")]
    start: NaiveDate,

    /// Last date, inclusive (YYYY-MM-DD)
    #[arg(long, default_value = "2026-01-01")]
    end: NaiveDate,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Daily capacity with all equipment available
    #[arg(long, default_value_t = 180)]
    base_capacity: u32,

    /// Comma-separated vacation months
    #[arg(long, value_delimiter = ',', default_values_t = [5, 6])]
    vacation_months: Vec<u32>,

    /// Weekday the gym is closed (Mon..Sun)
    #[arg(long, default_value = "Sun")]
    closed_weekday: Weekday,

    /// Output path; `.parquet` writes Parquet, anything else CSV
    #[arg(short, long, default_value = "gym_footfall_dataset.csv")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct AuditArgs {
    /// Dataset to check (CSV or Parquet)
    data: PathBuf,

    /// Vacation months the dataset was generated with
    #[arg(long, value_delimiter = ',', default_values_t = [5, 6])]
    vacation_months: Vec<u32>,

    /// Weekday the dataset's gym is closed (Mon..Sun)
    #[arg(long, default_value = "Sun")]
    closed_weekday: Weekday,
}

#[derive(Parser, Debug)]
struct PredictArgs {
    /// Model artifact (.json, or .pkl with the `python` feature)
    #[arg(short, long, default_value = "final_gym_footfall_model.pkl")]
    model: PathBuf,

    /// Day of week, 0 = Monday .. 6 = Sunday
    #[arg(long, default_value_t = 2)]
    day: u32,

    /// Month, 1-12
    #[arg(long, default_value_t = 5)]
    month: u32,

    /// Active student population
    #[arg(long, default_value_t = 500)]
    population: i64,

    /// Academic stress, 1-5
    #[arg(long, default_value_t = 2)]
    stress: i64,

    /// Gym interest, 1-5
    #[arg(long, default_value_t = 3)]
    adoption: i64,

    /// Exam phase [choices: None, Midterm, Endterm]
    #[arg(long, default_value = "None")]
    exam: String,

    /// Weather [choices: Normal, Heavy Rain, Extreme Heat]
    #[arg(long, default_value = "Normal")]
    weather: String,

    /// Maintenance [choices: None, Low, Medium]
    #[arg(long, default_value = "None")]
    maintenance: String,

    /// Mark the day as vacation
    #[arg(long)]
    vacation: bool,

    /// Treat the gym as closed
    #[arg(long)]
    closed: bool,

    /// Also print the Mon..Sun forecast and factor breakdown
    #[arg(long)]
    week: bool,
}

fn run_generate(args: GenerateArgs) -> Result<ExitCode, Box<dyn Error>> {
    let config = GeneratorConfig::default()
        .with_date_range(args.start, args.end)
        .with_seed(args.seed)
        .with_base_capacity(args.base_capacity)
        .with_vacation_months(args.vacation_months)
        .with_closed_weekday(args.closed_weekday)
        .with_output_path(&args.output);
    let df = FootfallGenerator::new(config)?.generate_to_file()?;
    println!("Dataset saved to {} ({} rows)", args.output.display(), df.height());
    Ok(ExitCode::SUCCESS)
}

fn run_audit(args: AuditArgs) -> Result<ExitCode, Box<dyn Error>> {
    let df = read_dataset(&args.data)?;
    let rules = AuditRules {
        vacation_months: args.vacation_months,
        closed_weekday: args.closed_weekday,
        ..AuditRules::default()
    };
    let report = audit_frame(&df, &rules)?;
    println!("{} rows", report.rows);
    for check in &report.checks {
        let status = if check.violations == 0 { "ok" } else { "FAIL" };
        println!("{status:>4}  {:<40} {}", check.name, check.violations);
    }
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_predict(args: PredictArgs) -> Result<ExitCode, Box<dyn Error>> {
    let scenario = Scenario::from_inputs(
        args.day,
        args.month,
        args.population,
        args.stress,
        args.adoption,
        &args.exam,
        &args.weather,
        &args.maintenance,
        args.vacation,
        !args.closed,
    )?;
    let predictor = ScenarioPredictor::from_artifact(&args.model)?;
    let footfall = predictor.predict(&scenario)?;
    println!("Expected students: {footfall} ({})", TrafficLevel::classify(footfall));

    if args.week {
        println!();
        for (day, value) in predictor.weekly_forecast(&scenario)?.days {
            let marker = if day == scenario.weekday { "  <- selected" } else { "" };
            println!("{:<4}{value:>5}{marker}", weekday_label(day));
        }
        println!();
        for impact in impact_breakdown(&scenario) {
            println!("{:<12}{:>5}", impact.factor, impact.value);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Audit(args) => run_audit(args),
        Commands::Predict(args) => run_predict(args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
