mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use geoquiz_game::{ContinentFilter, QuizConfig, QuizEngine, QuizWorld, SourceConfig};

use common::{parse_seeds, report_timestamp};
use logic::reports::{generate_console_report, generate_json_report, generate_markdown_report};
use logic::{FileFetcher, ModePlan, PolicyKind, RunReport, simulate_seeds};

#[derive(Debug, Parser)]
#[command(name = "geoquiz-tester", version = "0.1.0")]
#[command(about = "Automated QA for the GeoQuiz rules engine using simulated players")]
struct Args {
    /// Directory holding countries-110m.json, countries.json and cities.json
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))]
    data_dir: PathBuf,

    /// Continent slug to play, or "world"
    #[arg(long, default_value = "world")]
    continent: String,

    /// Simulated player strategy
    #[arg(long, value_enum, default_value_t = PolicyKind::Random)]
    policy: PolicyKind,

    /// City mode schedule across rounds
    #[arg(long, value_enum, default_value_t = ModePlan::Alternate)]
    quiz_mode: ModePlan,

    /// Seeds to run (comma-separated, ranges like 3..6 allowed)
    #[arg(long, default_value = "1")]
    seeds: String,

    /// Rounds per seed
    #[arg(long, default_value_t = 20)]
    rounds: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    announce_banner();

    let start_time = Instant::now();
    let seeds = parse_seeds(&args.seeds)?;
    let world = load_world(&args).await?;
    log::info!(
        "loaded {} playable countries for {}",
        world.countries().len(),
        world.filter().label()
    );

    let runs = simulate_seeds(
        &world,
        &QuizConfig::load_from_static(),
        args.policy,
        args.quiz_mode,
        args.rounds,
        &seeds,
    );
    let failed = runs.iter().any(|r| !r.passed());

    let report = RunReport {
        generated_at: report_timestamp(chrono::Utc::now()),
        continent: world.filter().as_slug().to_string(),
        countries: world.countries().len(),
        policy: args.policy,
        modes: args.quiz_mode,
        rounds: args.rounds,
        runs,
        total_duration_ms: u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    write_report(&args, &report)?;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🌍 GeoQuiz Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

async fn load_world(args: &Args) -> Result<QuizWorld> {
    let filter = ContinentFilter::parse(Some(&args.continent));
    let fetcher = FileFetcher::new(&args.data_dir);
    log::debug!("reading resources from {}", fetcher.root().display());
    let engine = QuizEngine::new(fetcher, SourceConfig::load_from_static());
    engine
        .load_world(&filter)
        .await
        .with_context(|| format!("failed to load map data from {}", args.data_dir.display()))
}

fn write_report(args: &Args, report: &RunReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => generate_json_report(&mut output_target, report)?,
        "markdown" => generate_markdown_report(&mut output_target, report)?,
        _ => generate_console_report(&mut output_target, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["geoquiz-tester"]).unwrap();
        assert_eq!(args.continent, "world");
        assert_eq!(args.policy, PolicyKind::Random);
        assert_eq!(args.quiz_mode, ModePlan::Alternate);
        assert_eq!(args.report, "console");
        assert!(args.data_dir.ends_with("fixtures"));
    }

    #[test]
    fn unknown_report_format_is_rejected() {
        assert!(Args::try_parse_from(["geoquiz-tester", "--report", "csv"]).is_err());
    }

    #[tokio::test]
    async fn loads_fixture_world_for_continent() {
        let args = Args::try_parse_from(["geoquiz-tester", "--continent", "oceania"]).unwrap();
        let world = load_world(&args).await.unwrap();
        assert_eq!(world.countries().len(), 4);
    }
}
