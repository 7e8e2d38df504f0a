use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod analysis;
mod categories;
mod error;
mod input;
mod models;
mod narrative;
mod normalize;
mod report;
mod sentiment;
mod suggestions;

use categories::Registry;
use models::AnalysisResult;
use narrative::CommandNarrator;
use normalize::Envelope;
use sentiment::Lexicon;

#[derive(Parser)]
#[command(name = "evaluation-insights")]
#[command(about = "Course evaluation statistics, period deltas and improvement suggestions", long_about = None)]
struct Cli {
    /// Log level written to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "EVAL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// JSON envelope with `current` and optional `previous` records (stdin when omitted)
    #[arg(long, conflicts_with_all = ["current_csv", "previous_csv"])]
    input: Option<PathBuf>,
    /// CSV file with the current period's records
    #[arg(long)]
    current_csv: Option<PathBuf>,
    /// CSV file with the previous period's records
    #[arg(long, requires = "current_csv")]
    previous_csv: Option<PathBuf>,
    /// Keep only the latest evaluation of each respondent
    #[arg(long)]
    latest_per_user: bool,
    /// Program that turns the statistics into a narrative (JSON on stdin, text on stdout)
    #[arg(long, env = "EVAL_NARRATOR_CMD")]
    narrator_cmd: Option<String>,
    /// Argument for the narrator program, repeatable
    #[arg(long = "narrator-arg", requires = "narrator_cmd", allow_hyphen_values = true)]
    narrator_args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze evaluations and write the JSON result
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        pretty: bool,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        /// Label for the evaluated institution or course
        #[arg(long)]
        scope: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List the evaluation categories
    Categories,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("course_evaluation_insights={level},evaluation_insights={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_envelope(args: &InputArgs) -> anyhow::Result<Envelope> {
    let envelope = match &args.current_csv {
        Some(current) => input::csv_envelope(current, args.previous_csv.as_deref())
            .with_context(|| format!("failed to read CSV input from {}", current.display()))?,
        None => input::read_envelope(args.input.as_deref()).context("failed to read input envelope")?,
    };

    if !args.latest_per_user {
        return Ok(envelope);
    }
    Ok(Envelope {
        current: normalize::latest_per_respondent(envelope.current),
        previous: envelope.previous.map(normalize::latest_per_respondent),
    })
}

fn run_analysis(envelope: &Envelope, args: &InputArgs) -> anyhow::Result<AnalysisResult> {
    info!(
        current = envelope.current.len(),
        previous = envelope.previous.as_ref().map(Vec::len).unwrap_or(0),
        "loaded evaluations"
    );

    let result = analysis::analyze(envelope, &Registry::default(), &Lexicon::default());

    let narrator = args
        .narrator_cmd
        .as_ref()
        .and_then(|program| CommandNarrator::new(program.as_str(), args.narrator_args.clone()));
    match narrator {
        Some(narrator) => Ok(narrative::with_narrative(result, &narrator)),
        None => Ok(result),
    }
}

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Analyze { input, pretty, out } => {
            let envelope = load_envelope(&input)?;
            let result = run_analysis(&envelope, &input)?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            write_output(out.as_deref(), &json)?;
        }
        Commands::Report { input, scope, out } => {
            let envelope = load_envelope(&input)?;
            let result = run_analysis(&envelope, &input)?;
            let scope = scope.or_else(|| {
                normalize::scope_label(&normalize::normalize(&envelope.current, &Registry::default()))
            });
            let generated_on = chrono::Local::now().date_naive();
            let report = report::build_report(scope.as_deref(), generated_on, &result);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Categories => {
            let registry = Registry::default();
            for category in registry.categories() {
                let group = registry
                    .group_of(category.key)
                    .map(|group| group.name)
                    .unwrap_or("-");
                println!("- {} ({}) in {}", category.name, category.key, group);
            }
        }
    }

    Ok(())
}
