use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use debalign::{
    collect_quality_scores, execute_stage1, execute_stage2, execute_stage3, format_correlations,
    AlignmentConfig, CorrelationReport, DialignCommand, ExtractorConfig, Histogram,
    HistogramConfig,
};

#[derive(Parser)]
#[command(name = "debalign")]
#[command(author, version, about = "Lexical-alignment metrics for quality-scored debates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract alignment metrics for every debate and correlate them with quality
    Extract {
        /// Directory of debate record files (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of records processed in parallel (defaults to available CPUs)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Alignment program (defaults to $DIALIGN_PROGRAM, then `dialign`)
        #[arg(long)]
        dialign_program: Option<String>,

        /// Extra argument passed to the alignment program before the table path
        #[arg(long = "dialign-arg", allow_hyphen_values = true)]
        dialign_args: Vec<String>,

        /// Directory for temporary turn tables
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// Output file for the aligned metric series (JSON)
        #[arg(long)]
        series_out: Option<PathBuf>,

        /// Output file for the correlation report (JSON)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the distribution of quality scores
    Distribution {
        /// Directory of debate record files (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of histogram bins
        #[arg(long, default_value = "20")]
        bins: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            workers,
            dialign_program,
            dialign_args,
            temp_dir,
            series_out,
            report,
            verbose,
        } => {
            setup_logging(verbose);

            let mut alignment = AlignmentConfig::from_env();
            if let Some(program) = dialign_program {
                alignment.program = program;
            }
            alignment.args = dialign_args;

            let mut extractor = ExtractorConfig {
                temp_dir,
                ..Default::default()
            };
            if let Some(workers) = workers {
                if workers == 0 {
                    bail!("--workers must be at least 1");
                }
                extractor.workers = workers;
            }

            extract(input, alignment, extractor, series_out, report).await
        }
        Commands::Distribution {
            input,
            bins,
            verbose,
        } => {
            setup_logging(verbose);
            let config = HistogramConfig {
                bins,
                ..Default::default()
            };
            distribution(input, &config)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn extract(
    input: PathBuf,
    alignment: AlignmentConfig,
    extractor: ExtractorConfig,
    series_out: Option<PathBuf>,
    report_out: Option<PathBuf>,
) -> Result<()> {
    info!("Extracting alignment metrics from {:?}", input);
    info!(
        "Alignment program: {} {}",
        alignment.program,
        alignment.args.join(" ")
    );

    // Stage 1: per-record extraction
    let routine = Arc::new(DialignCommand::new(alignment));
    let outcome = execute_stage1(&input, routine, &extractor)
        .await
        .context("Failed to run batch extraction")?;

    // Stage 2: aggregation and correlation
    let stage2 = execute_stage2(&outcome);

    // Stage 3: outputs
    let failures = outcome.failures().cloned().collect();
    let report = CorrelationReport::new(&input, &stage2.series, failures, stage2.correlations);
    execute_stage3(
        &stage2.series,
        &report,
        series_out.as_deref(),
        report_out.as_deref(),
    )?;

    println!("Alignment / Quality Correlations");
    println!("================================");
    println!(
        "Records: {} succeeded, {} failed",
        report.records_succeeded, report.records_failed
    );
    println!();
    print!("{}", format_correlations(&report.correlations));

    if report.records_succeeded == 0 && report.records_failed > 0 {
        warn!("No record was processed successfully");
    }

    Ok(())
}

fn distribution(input: PathBuf, config: &HistogramConfig) -> Result<()> {
    info!("Reading quality scores from {:?}", input);
    let collected = collect_quality_scores(&input)?;

    let histogram = Histogram::new(&collected.scores, config.bins);

    println!("Quality Score Distribution");
    println!("==========================");
    println!(
        "Records: {} read, {} failed",
        collected.scores.len(),
        collected.failures.len()
    );
    println!();
    print!("{}", histogram.render(config.bar_width));

    Ok(())
}
