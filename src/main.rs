use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use surveyowl::config::{Settings, OUTPUT_FILE};
use surveyowl::models::Clock;
use surveyowl::pipeline::{self, STAGE_COUNT};
use surveyowl::source::CsvFiles;
use surveyowl::stats::CompileStats;
use surveyowl::writer::OwlXmlSink;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "surveyowl")]
#[command(about = "Compile harmonised survey metadata exports into an OWL ontology")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the ontology and write it as OWL/XML
    Compile(CompileArgs),
    /// Run every stage and print statistics without writing anything
    Inspect(InspectArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding the four exports under their default names
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Component metadata export (overrides --input-dir)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Classifications export (overrides --input-dir)
    #[arg(long)]
    classifications: Option<PathBuf>,

    /// Questions export (overrides --input-dir)
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Matrix items export (overrides --input-dir)
    #[arg(long)]
    items: Option<PathBuf>,

    /// JSON settings file; missing fields keep their defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Fixed RFC 3339 creation timestamp for reproducible output
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct CompileArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Destination of the OWL/XML document
    #[arg(short, long, default_value = OUTPUT_FILE)]
    output: PathBuf,

    /// Dry run - build the document but don't write it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc))
}

impl SourceArgs {
    fn files(&self) -> CsvFiles {
        let mut files = CsvFiles::in_dir(&self.input_dir);
        if let Some(path) = &self.metadata {
            files.metadata = path.clone();
        }
        if let Some(path) = &self.classifications {
            files.classifications = path.clone();
        }
        if let Some(path) = &self.questions {
            files.questions = path.clone();
        }
        if let Some(path) = &self.items {
            files.items = path.clone();
        }
        files
    }

    fn settings(&self) -> Result<Settings> {
        match &self.settings {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("Failed to load settings: {}", path.display())),
            None => Ok(Settings::default()),
        }
    }

    fn clock(&self) -> Clock {
        self.timestamp.map(Clock::Fixed).unwrap_or_default()
    }
}

fn make_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(STAGE_COUNT);
    let style = ProgressStyle::default_bar()
        .template("    {spinner:.cyan} {msg:<24} [{bar:30.cyan/blue}] {pos}/{len} stages")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_summary(stats: &CompileStats, started: Instant) {
    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", started.elapsed().as_secs_f64());
    println!();
    print!("{}", stats.summary());
}

fn run_compile(args: CompileArgs) -> Result<()> {
    let settings = args.source.settings()?;
    let files = args.source.files();
    let clock = args.source.clock();
    let started = Instant::now();
    let progress = make_progress_bar();

    let stats = if args.dry_run {
        let compiled = pipeline::run(&files, &settings, clock, &progress)
            .context("Failed to compile ontology")?;
        info!(axioms = compiled.document.len(), "Dry run, document not written");
        compiled.stats
    } else {
        let mut sink = OwlXmlSink::new(&args.output);
        pipeline::compile(&files, &mut sink, &settings, clock, &progress)
            .with_context(|| format!("Failed to compile ontology into {}", args.output.display()))?
    };

    print_summary(&stats, started);
    if !args.dry_run {
        println!("Output:             {}", args.output.display());
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let settings = args.source.settings()?;
    let files = args.source.files();
    let started = Instant::now();
    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        make_progress_bar()
    };

    let compiled = pipeline::run(&files, &settings, args.source.clock(), &progress)
        .context("Failed to compile ontology")?;

    if args.json {
        let json = serde_json::to_string_pretty(&compiled.stats)
            .context("Failed to serialize statistics")?;
        println!("{json}");
    } else {
        print_summary(&compiled.stats, started);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    let result = match cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Inspect(args) => run_inspect(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
