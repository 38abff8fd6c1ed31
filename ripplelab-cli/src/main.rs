//! RippleLab CLI — aggregate, rank, and download commands.
//!
//! Commands:
//! - `aggregate` — convert raw intraday files into daily instrument files
//! - `ripples` — print the ripple table for a single instrument
//! - `rank` — rank every instrument in a data directory by mean top-N ripple
//! - `recent` — signed recent-window ripple scan across the universe
//! - `download` — fetch or incrementally update remote price history

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ripplelab_core::aggregate::minutes_to_days_batch;
use ripplelab_core::data::{self, listing, series, QuoteProvider};
use ripplelab_core::ripple::{ripple_slice, stock_ripples, ExclusionSet, DEFAULT_PERIOD};
use ripplelab_runner::{export, rank_universe, recent_ripples, RankerConfig};

#[derive(Parser)]
#[command(name = "ripplelab", about = "RippleLab — equity ripple analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw intraday files into daily instrument files.
    Aggregate {
        /// Directory of raw intraday data, one subdirectory per year.
        #[arg(long, default_value = "raw")]
        basedir: PathBuf,

        /// Output directory for daily instrument files.
        #[arg(long, default_value = "data")]
        outdir: PathBuf,

        /// Year subdirectories to convert, in order.
        #[arg(required = true)]
        subdirs: Vec<String>,
    },
    /// Print the ripple table for one instrument file.
    Ripples {
        /// Instrument file, e.g. data/SH600690.csv.
        file: PathBuf,

        /// Window length in rows.
        #[arg(long, default_value_t = DEFAULT_PERIOD)]
        period: usize,

        /// How many top ripples to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Also print the daily rows behind the ripple at this table index.
        #[arg(long)]
        slice: Option<usize>,

        /// Calendar days of raw data to print with --slice.
        #[arg(long, default_value_t = 30)]
        slice_days: i64,
    },
    /// Rank every instrument in a data directory by mean top-N ripple ratio.
    Rank {
        /// Directory of daily instrument files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Window length in rows.
        #[arg(long)]
        period: Option<usize>,

        /// Top-N count for the per-instrument mean.
        #[arg(long)]
        mean_num: Option<usize>,

        /// TOML config (period, mean_num, exclusions). Flags override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the leaderboard CSV here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Signed recent-window ripple scan across the universe.
    Recent {
        /// Directory of daily instrument files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Trailing range length in calendar days.
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// Write the scan CSV here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch or incrementally update remote price history.
    Download {
        /// Provider symbols (e.g. 600690.ss), or none with --lists.
        symbols: Vec<String>,

        /// Exchange listing files (headerless name,code CSV).
        #[arg(long)]
        lists: Vec<PathBuf>,

        /// Provider suffix per listing file (e.g. .ss .sz).
        #[arg(long)]
        suffixes: Vec<String>,

        /// Target directory for downloaded daily files.
        #[arg(long, default_value = "yahoo-data")]
        folder: PathBuf,

        /// Force full re-download instead of incremental update.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Aggregate {
            basedir,
            outdir,
            subdirs,
        } => cmd_aggregate(&basedir, &outdir, &subdirs),
        Commands::Ripples {
            file,
            period,
            top,
            slice,
            slice_days,
        } => cmd_ripples(&file, period, top, slice, slice_days),
        Commands::Rank {
            data_dir,
            period,
            mean_num,
            config,
            output,
        } => cmd_rank(&data_dir, period, mean_num, config.as_deref(), output.as_deref()),
        Commands::Recent {
            data_dir,
            end,
            days,
            output,
        } => cmd_recent(&data_dir, end.as_deref(), days, output.as_deref()),
        Commands::Download {
            symbols,
            lists,
            suffixes,
            folder,
            full,
        } => cmd_download(symbols, &lists, &suffixes, &folder, full),
    }
}

fn cmd_aggregate(basedir: &Path, outdir: &Path, subdirs: &[String]) -> Result<()> {
    std::fs::create_dir_all(outdir)?;
    let summary = minutes_to_days_batch(basedir, outdir, subdirs)
        .context("intraday batch conversion failed")?;
    println!(
        "Converted {} files ({} skipped, {} failed)",
        summary.converted, summary.skipped, summary.failed
    );
    Ok(())
}

fn cmd_ripples(
    file: &Path,
    period: usize,
    top: usize,
    slice: Option<usize>,
    slice_days: i64,
) -> Result<()> {
    let period = parse_period(period)?;
    let table = stock_ripples(file, period, &ExclusionSet::known_bad())?;
    let Some(table) = table else {
        bail!("no ripple table for {} (excluded or unreadable)", file.display());
    };

    println!("{:<8} {:<12} {:>10} {:>10} {:>8}", "window", "start", "floor", "ceiling", "ratio");
    for agg in table.top(top) {
        println!(
            "{:<8} {:<12} {:>10.3} {:>10.3} {:>8.4}",
            agg.group_index, agg.start_date, agg.floor_price, agg.ceiling_price, agg.ripple_ratio
        );
    }
    if let Some(mean) = table.mean_top(top) {
        println!("\nmean ripple ratio over top {top}: {mean:.4}");
    }

    if let Some(idx) = slice {
        let rows = ripple_slice(file, &table, idx, slice_days)?;
        let changes = series::rise_ratios(&rows);
        println!("\ndaily rows for ripple {idx}:");
        println!("{:<12} {:>10} {:>10} {:>8} {:>8}", "date", "close", "ceiling", "rise", "ratio");
        for (bar, change) in rows.iter().skip(1).zip(&changes) {
            println!(
                "{:<12} {:>10.3} {:>10.3} {:>8.3} {:>8.4}",
                bar.date, bar.closing_price, bar.ceiling_price, change.rise, change.rise_ratio
            );
        }
    }
    Ok(())
}

fn cmd_rank(
    data_dir: &Path,
    period: Option<usize>,
    mean_num: Option<usize>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let mut ranker_config = match config {
        Some(path) => RankerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RankerConfig::default(),
    };
    if let Some(period) = period {
        ranker_config.period = parse_period(period)?;
    }
    if let Some(mean_num) = mean_num {
        ranker_config.mean_num = mean_num;
    }

    let scores = rank_universe(data_dir, &ranker_config)?;
    match output {
        Some(path) => {
            export::write_leaderboard_csv(path, &scores)?;
            println!("Wrote {} scores to {}", scores.len(), path.display());
        }
        None => print!("{}", export::leaderboard_to_csv(&scores)?),
    }
    Ok(())
}

fn cmd_recent(
    data_dir: &Path,
    end: Option<&str>,
    days: i64,
    output: Option<&Path>,
) -> Result<()> {
    let end_date = match end {
        Some(raw) => raw
            .parse::<NaiveDate>()
            .with_context(|| format!("invalid end date: {raw}"))?,
        None => chrono::Local::now().date_naive(),
    };

    let ripples = recent_ripples(data_dir, end_date, days)?;
    match output {
        Some(path) => {
            export::write_recent_csv(path, &ripples)?;
            println!("Wrote {} rows to {}", ripples.len(), path.display());
        }
        None => print!("{}", export::recent_to_csv(&ripples)?),
    }
    Ok(())
}

fn cmd_download(
    mut symbols: Vec<String>,
    lists: &[PathBuf],
    suffixes: &[String],
    folder: &Path,
    full: bool,
) -> Result<()> {
    if !lists.is_empty() {
        let paths: Vec<&Path> = lists.iter().map(|p| p.as_path()).collect();
        let suffix_refs: Vec<&str> = suffixes.iter().map(|s| s.as_str()).collect();
        symbols.extend(listing::stock_list(&paths, &suffix_refs)?);
    }
    if symbols.is_empty() {
        bail!("no symbols given (pass symbols or --lists/--suffixes)");
    }

    let provider = QuoteProvider::new();
    if full {
        std::fs::create_dir_all(folder)?;
        let mut failed = 0usize;
        for symbol in &symbols {
            if let Err(e) = data::retrieve_history(&provider, symbol, folder) {
                tracing::warn!(symbol, error = %e, "download failed");
                failed += 1;
            }
        }
        println!("Downloaded {}/{} symbols", symbols.len() - failed, symbols.len());
    } else {
        let today = chrono::Local::now().date_naive();
        let summary = data::update_batch(&provider, &symbols, folder, today);
        println!(
            "Update complete: {} downloaded, {} updated, {} fresh, {} failed (of {})",
            summary.downloaded, summary.updated, summary.fresh, summary.failed, summary.total
        );
    }
    Ok(())
}

fn parse_period(period: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(period).context("period must be >= 1")
}
