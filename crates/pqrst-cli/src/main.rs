use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use pqrst_lib::{
    config::{BaselineFilter, DelineationConfig},
    io::{csv as csv_io, text as text_io},
    pipeline::{find_r_peaks, prepare_direct, prepare_samples, process_samples},
    signal::{Sample, TimeSeries},
};
use serde::Serialize;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "pqrst",
    version,
    about = "ECG beat segmentation and P/Q/R/S/T wave delineation"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delineate every beat and print the recording summary as JSON
    Delineate {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        tuning: TuningArgs,
        /// Keep per-beat working buffers in the output
        #[arg(long)]
        debug: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print R-peak times (ms) for every segment
    FindRpeaks {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Nominal sampling frequency (Hz)
    #[arg(long, default_value_t = 100.0)]
    fs: f64,
    /// Newline-delimited voltages, or `time,voltage` CSV with --direct; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Input holds `time,voltage` pairs timed in sample periods; skip aggregation
    #[arg(long)]
    direct: bool,
    /// TOML file with delineation options
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct TuningArgs {
    /// Downsampling group size (default: fs / 100)
    #[arg(long)]
    aggregation: Option<usize>,
    /// Baseline filter: LOWPASS, MEAN or MEDIAN
    #[arg(long)]
    baseline_filter: Option<String>,
    #[arg(long)]
    smooth_window_size: Option<usize>,
    #[arg(long)]
    r_peak_slope_threshold: Option<f64>,
    #[arg(long)]
    r_peak_min_distance: Option<usize>,
    #[arg(long)]
    through_min_distance: Option<usize>,
    #[arg(long)]
    min_p_wave_height: Option<f64>,
    #[arg(long)]
    min_t_wave_height: Option<f64>,
}

#[derive(Serialize)]
struct SegmentPeaks {
    start_time: f64,
    end_time: f64,
    r_peaks: Vec<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();
    match cli.command {
        Commands::Delineate {
            input,
            tuning,
            debug,
            pretty,
        } => cmd_delineate(&input, &tuning, debug, pretty)?,
        Commands::FindRpeaks { input, tuning } => cmd_find_rpeaks(&input, &tuning)?,
    }
    Ok(())
}

fn load_config(input: &InputArgs, tuning: &TuningArgs) -> Result<DelineationConfig> {
    let mut cfg = match &input.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DelineationConfig::default(),
    };
    if let Some(name) = &tuning.baseline_filter {
        cfg.baseline_filter = name.parse::<BaselineFilter>()?;
    }
    if tuning.aggregation.is_some() {
        cfg.aggregation = tuning.aggregation;
    }
    if let Some(v) = tuning.smooth_window_size {
        cfg.smooth_window_size = v;
    }
    if let Some(v) = tuning.r_peak_slope_threshold {
        cfg.r_peak_slope_threshold = v;
    }
    if let Some(v) = tuning.r_peak_min_distance {
        cfg.r_peak_min_distance = v;
    }
    if let Some(v) = tuning.through_min_distance {
        cfg.through_min_distance = v;
    }
    if let Some(v) = tuning.min_p_wave_height {
        cfg.min_p_wave_height = v;
    }
    if let Some(v) = tuning.min_t_wave_height {
        cfg.min_t_wave_height = v;
    }
    cfg.use_direct_data |= input.direct;
    cfg.validate()?;
    Ok(cfg)
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_voltages(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => text_io::parse_f64_series(&read_stdin()?),
    }
}

fn read_direct_pairs(input: Option<&Path>) -> Result<Vec<Sample>> {
    match input {
        Some(path) => csv_io::read_pairs_file(path),
        None => csv_io::read_pairs(io::stdin().lock()),
    }
}

/// Millisecond-timed samples and their effective sampling frequency.
fn load_samples(input: &InputArgs, cfg: &DelineationConfig) -> Result<(Vec<Sample>, f64)> {
    if cfg.use_direct_data {
        let pairs = read_direct_pairs(input.input.as_deref())?;
        info!("loaded {} direct samples at {} Hz", pairs.len(), input.fs);
        Ok((prepare_direct(&pairs, input.fs)?, input.fs))
    } else {
        let data = read_voltages(input.input.as_deref())?;
        info!("loaded {} samples at {} Hz", data.len(), input.fs);
        Ok(prepare_samples(&TimeSeries { fs: input.fs, data }, cfg)?)
    }
}

fn cmd_delineate(input: &InputArgs, tuning: &TuningArgs, debug: bool, pretty: bool) -> Result<()> {
    let mut cfg = load_config(input, tuning)?;
    cfg.debug |= debug;
    let (samples, fs) = load_samples(input, &cfg)?;
    let recording = process_samples(&samples, fs, &cfg)?;
    let js = if pretty {
        serde_json::to_string_pretty(&recording)?
    } else {
        serde_json::to_string(&recording)?
    };
    println!("{}", js);
    Ok(())
}

fn cmd_find_rpeaks(input: &InputArgs, tuning: &TuningArgs) -> Result<()> {
    let cfg = load_config(input, tuning)?;
    let (samples, _) = load_samples(input, &cfg)?;
    let segments: Vec<SegmentPeaks> = find_r_peaks(&samples, &cfg)?
        .into_iter()
        .map(|(segment, events)| SegmentPeaks {
            start_time: segment.start_time(),
            end_time: segment.end_time(),
            r_peaks: events
                .indices
                .iter()
                .map(|&i| segment.samples()[i].time)
                .collect(),
        })
        .collect();
    println!("{}", serde_json::to_string(&segments)?);
    Ok(())
}
