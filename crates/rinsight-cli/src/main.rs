mod jobs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rinsight-cli")]
#[command(about = "rinsight offline jobs: scraping, analysis and crash prediction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch recent posts from the configured subreddit into the raw posts CSV
    Scrape {
        /// Number of posts to fetch (defaults to RINSIGHT_FETCH_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
        /// Output CSV (defaults to <data dir>/posts.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Tag raw posts with issues and lexicon sentiment
    Analyze {
        /// Raw posts CSV (defaults to <data dir>/posts.csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Analyzed posts CSV (defaults to <data dir>/analyzed_posts.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Flag crash weeks in analyzed posts against the academic calendar
    PredictCrash {
        /// Analyzed posts CSV (defaults to <data dir>/analyzed_posts.csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Predictions CSV (defaults to <data dir>/crash_predictions.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print stress scores for a week or date range as JSON
    Score {
        /// ISO week number or "all"
        #[arg(long, conflicts_with_all = ["start", "end"])]
        week: Option<String>,
        /// Range start, YYYY-MM-DD
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Range end, YYYY-MM-DD
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rinsight_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scrape { limit, output }) => {
            let output = output.unwrap_or_else(|| config.raw_posts_path());
            jobs::run_scrape(&config, limit.unwrap_or(config.fetch_limit), &output).await?;
        }
        Some(Commands::Analyze { input, output }) => {
            let input = input.unwrap_or_else(|| config.raw_posts_path());
            let output = output.unwrap_or_else(|| config.analyzed_posts_path());
            jobs::run_analyze(&input, &output)?;
        }
        Some(Commands::PredictCrash { input, output }) => {
            let input = input.unwrap_or_else(|| config.analyzed_posts_path());
            let output = output.unwrap_or_else(|| config.crash_predictions_path());
            for prediction in jobs::run_predict_crash(&input, &output)?
                .iter()
                .filter(|p| p.crash_period)
            {
                println!(
                    "{}-W{:02}: sentiment {:.2}, {} mental health posts. {}",
                    prediction.year,
                    prediction.week,
                    prediction.sentiment,
                    prediction.mental_health_count,
                    prediction.recommendation
                );
            }
        }
        Some(Commands::Score { week, start, end }) => {
            let window = jobs::parse_window(week.as_deref(), start.as_deref(), end.as_deref())?;
            let report = jobs::run_score(&config, &window).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => println!("rinsight-cli: run with --help to list commands"),
    }

    Ok(())
}
