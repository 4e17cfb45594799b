use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use attrmatch::{
    config::AttrMatchConfig,
    ingest::{self, InputFormat},
    matcher::{ExactMatchGrouper, ParallelMatcher, ThresholdMatcher},
    Entity, Group, Result, SimilarityPair,
};
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, LevelFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Exact,
    Threshold,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Find devices with identical or overlapping attribute sets
#[derive(Debug, Parser)]
#[command(name = "find_similar", version)]
struct Args {
    /// Device file (.json or .csv)
    input: PathBuf,

    /// Which pass(es) to run
    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Minimum shared attributes for the threshold pass (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// INI configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input format when it cannot be inferred from the extension
    #[arg(long, value_parser = parse_input_format)]
    input_format: Option<InputFormat>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Run the passes on a rayon pool
    #[arg(long)]
    parallel: bool,

    /// Show a progress bar for the pairwise pass
    #[arg(long)]
    progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_input_format(s: &str) -> std::result::Result<InputFormat, String> {
    InputFormat::from_str(s).ok_or_else(|| format!("unknown input format '{}' (json or csv)", s))
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    Builder::new()
        .filter(None, log_level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn load_config(args: &Args) -> Result<AttrMatchConfig> {
    let mut config = match &args.config {
        Some(path) => AttrMatchConfig::from_ini(path)?,
        None => AttrMatchConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.matcher.threshold = threshold;
    }
    if let Some(format) = args.input_format {
        config.input.format = Some(format);
    }
    if args.parallel {
        config.processor.parallel = true;
    }
    Ok(config)
}

fn print_groups(groups: &[Group], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for group in groups {
                println!("{}", serde_json::to_string(group)?);
            }
        }
        OutputFormat::Text if groups.is_empty() => {
            println!("No devices with identical attributes found.");
        }
        OutputFormat::Text => {
            println!("Devices with identical attributes:");
            for group in groups {
                let members: Vec<&str> = group.members.iter().map(|id| id.as_str()).collect();
                println!("[{}] {}", members.join(", "), group.attributes);
            }
        }
    }
    Ok(())
}

fn print_pairs(pairs: &[SimilarityPair], threshold: i64, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for pair in pairs {
                println!("{}", serde_json::to_string(pair)?);
            }
        }
        OutputFormat::Text if pairs.is_empty() => {
            println!("No devices with sufficient similarity found.");
        }
        OutputFormat::Text => {
            println!("Devices sharing at least {} attributes:", threshold);
            for pair in pairs {
                println!("{}, {} (Shared Attributes: {})", pair.first, pair.second, pair.shared);
            }
        }
    }
    Ok(())
}

fn pair_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} Rows: [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta}")
    {
        pb.set_style(style);
    }
    pb
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    let entities: Vec<Entity> = ingest::load_entities(&args.input, &config.input)?;
    let start_time = Instant::now();

    let parallel = if config.processor.parallel {
        info!(
            "Parallel mode with up to {} threads",
            config.processor.effective_thread_count()
        );
        let mut matcher = ParallelMatcher::new(config.processor.clone())?;
        if args.progress {
            matcher = matcher.with_progress(pair_progress_bar());
        }
        Some(matcher)
    } else {
        None
    };

    if matches!(args.mode, Mode::Exact | Mode::Both) {
        let min_group_size = config.grouper.min_group_size;
        let groups: Vec<Group> = match &parallel {
            Some(matcher) => matcher.groups(&entities, min_group_size)?,
            None => ExactMatchGrouper::with_min_group_size(min_group_size)?
                .group(&entities)?
                .collect(),
        };
        info!("Exact pass found {} groups", groups.len());
        print_groups(&groups, args.format)?;
    }

    if matches!(args.mode, Mode::Threshold | Mode::Both) {
        let threshold = config.matcher.threshold;
        let pairs: Vec<SimilarityPair> = match &parallel {
            Some(matcher) => matcher.pairs(&entities, threshold)?,
            None => ThresholdMatcher::new(threshold)?.pairs(&entities)?.collect(),
        };
        info!("Threshold pass found {} pairs", pairs.len());
        print_pairs(&pairs, threshold, args.format)?;
    }

    info!("Finished in {:?}", start_time.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
