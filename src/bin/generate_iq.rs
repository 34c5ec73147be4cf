use anyhow::{Context, Result};
use clap::Parser;
use cn0track::config::LoopRate;
use cn0track::save_iq_wav;
use cn0track::simulation::{CorrelatorConfig, CorrelatorSimulator};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_iq")]
#[command(about = "Generate synthetic prompt correlator I/Q WAV files at given C/N0 values")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// C/N0 values in dB-Hz: comma-separated (e.g., "30,40,50") or range (e.g., "20-50:5")
    #[arg(short, long, default_value = "20-50:5")]
    cn0: String,

    /// Number of trials per C/N0 value
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,

    /// Epoch rate (e.g., "1000", "1ms", "20ms")
    #[arg(long, default_value = "1ms")]
    loop_rate: LoopRate,

    /// Navigation data bit length in milliseconds (0 disables data bits)
    #[arg(long, default_value_t = 20.0)]
    bit_ms: f32,

    /// Residual carrier phase error in degrees
    #[arg(long, default_value_t = 0.0)]
    phase_error_deg: f32,

    /// Output filename prefix
    #[arg(long, default_value = "iq")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    cn0_dbhz: f32,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    epoch_rate_hz: f32,
    duration: f32,
    files: Vec<ManifestEntry>,
}

fn parse_cn0_values(s: &str) -> Result<Vec<f32>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f32 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f32 = range_parts[0].parse().context("Invalid start value")?;
        let end: f32 = range_parts[1].parse().context("Invalid end value")?;

        let mut values = Vec::new();
        let mut v = start;
        while v <= end {
            values.push(v);
            v += step;
        }
        Ok(values)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f32>().context("Invalid C/N0 value"))
            .collect()
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let cn0_values = parse_cn0_values(&args.cn0)?;
    let base_seed = args.seed.unwrap_or(0);
    let epoch_rate = args.loop_rate.as_hz();
    let epochs = (args.duration * epoch_rate).round() as usize;
    let bit_epochs = (args.bit_ms / args.loop_rate.as_period_ms()).round() as usize;

    let mut manifest_entries = Vec::new();
    let total_files = cn0_values.len() * args.trials as usize;
    let mut file_count = 0;

    for &cn0 in &cn0_values {
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + (cn0 * 10.0) as u64;

            let mut config = CorrelatorConfig::new(cn0, 1.0 / epoch_rate)
                .with_seed(seed)
                .with_phase_error(args.phase_error_deg.to_radians());
            if bit_epochs > 0 {
                config = config.with_data_bits(bit_epochs);
            }

            let iq = CorrelatorSimulator::new(&config)
                .context("Invalid simulation parameters")?
                .generate(epochs);

            let filename = format!("{}_cn0{:04.1}_t{:02}.wav", args.prefix, cn0, trial);
            let filepath = args.output_dir.join(&filename);

            save_iq_wav(&filepath, &iq, epoch_rate.round() as u32)
                .context("Failed to write WAV file")?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                cn0_dbhz: cn0,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            epoch_rate_hz: epoch_rate,
            duration: args.duration,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
