use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;
use std::path::PathBuf;

use cn0track::config::{LoopRate, TrackingConfig};
use cn0track::output::{OutputFormat, create_formatter};
use cn0track::{Cn0Monitor, load_iq_wav};

#[derive(Parser, Debug)]
#[command(name = "cn0track")]
#[command(about = "Estimate and smooth C/N0 from recorded prompt correlator I/Q", long_about = None)]
struct Args {
    /// Stereo WAV file: left = I, right = Q, one frame per epoch
    input: PathBuf,

    /// TOML tracking configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Epoch rate (e.g., "1000", "1ms", "20ms"); defaults to the WAV sample rate
    #[arg(long)]
    loop_rate: Option<LoopRate>,

    /// Print every Nth epoch
    #[arg(short = 'n', long, default_value_t = 1)]
    every: usize,

    /// Print only the summary
    #[arg(long)]
    summary_only: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => TrackingConfig::load(path).context("Failed to load config file")?,
        None => TrackingConfig::default(),
    };

    let (iq, sample_rate) = load_iq_wav(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    if iq.is_empty() {
        anyhow::bail!("{} contains no epochs", args.input.display());
    }

    let rate = args
        .loop_rate
        .unwrap_or_else(|| LoopRate::from_hz(sample_rate as f32));
    config.set_loop_rate(rate);
    log::info!(
        "{}: {} epochs at {} ({:.1} ms integration)",
        args.input.display(),
        iq.len(),
        rate,
        rate.as_period_ms()
    );

    let mut monitor = Cn0Monitor::new(&config).context("Invalid tracking configuration")?;
    let formatter = create_formatter(args.format, args.verbose);

    if !args.summary_only
        && let Some(header) = formatter.header()
    {
        println!("{}", header);
    }

    let every = args.every.max(1);
    let mut smoothed_stats: Stats<f32> = Stats::new();
    let mut locked_epochs = 0usize;

    for (n, &(i, q)) in iq.iter().enumerate() {
        let sample = monitor.process_epoch(i, q);
        smoothed_stats.update(sample.smoothed_cn0);
        if sample.locked {
            locked_epochs += 1;
        }

        if !args.summary_only && n % every == 0 {
            println!("{}", formatter.format(&sample));
        }
    }

    eprintln!(
        "Epochs: {}  C/N0 mean {:.2} dB-Hz, std {:.2}, min {:.2}, max {:.2}  locked {:.1}%",
        smoothed_stats.count,
        smoothed_stats.mean,
        smoothed_stats.std_dev,
        smoothed_stats.min,
        smoothed_stats.max,
        100.0 * locked_epochs as f32 / iq.len() as f32
    );

    Ok(())
}
