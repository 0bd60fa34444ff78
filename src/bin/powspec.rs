use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use speech_features::{FeatureParams, PowerSpectrum};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(
    name = "powspec",
    about = "Compute power spectrum features for a WAV file"
)]
struct Cli {
    /// Input WAV file (mono or multi-channel; channels are averaged)
    #[arg(long)]
    input: PathBuf,
    /// Feature parameters as JSON (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Split the waveform into this many equal-length utterances
    #[arg(long, default_value_t = 1)]
    batch: usize,
    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Include the flattened feature matrix in the report
    #[arg(long)]
    include_features: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let params = cli
        .config
        .as_ref()
        .map(FeatureParams::load_from_file)
        .unwrap_or_default();
    let (samples, sample_rate) = read_wav_mono(&cli.input)?;
    if sample_rate != params.sampling_freq {
        warn!(
            "{} is sampled at {} Hz but params expect {} Hz; resample before extraction",
            cli.input.display(),
            sample_rate,
            params.sampling_freq
        );
    }

    if cli.batch == 0 {
        bail!("--batch must be positive");
    }
    // Drop the tail so the waveform splits evenly into utterances
    let usable = samples.len() - samples.len() % cli.batch;
    let utterance_len = usable / cli.batch;

    let pipeline = PowerSpectrum::new(params.clone()).context("building pipeline")?;
    let features = pipeline
        .batch_apply(&samples[..usable], cli.batch)
        .context("extracting features")?;
    info!(
        "{} utterances x {} frames x {} bins",
        cli.batch,
        params.num_frames(utterance_len),
        params.num_bins()
    );

    let report = Report {
        input: cli.input.display().to_string(),
        params: &params,
        batch: cli.batch,
        utterance_samples: utterance_len,
        num_frames: params.num_frames(utterance_len),
        num_bins: params.num_bins(),
        output_len: features.len(),
        mean_power: mean_power_per_bin(&features, params.num_bins()),
        features: cli.include_features.then_some(features.as_slice()),
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = cli.output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(ExitCode::from(0))
}

fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .context("decoding float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
                .context("decoding integer samples")?
        }
    };

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

fn mean_power_per_bin(features: &[f32], num_bins: usize) -> Vec<f32> {
    let frames = features.len() / num_bins.max(1);
    if frames == 0 {
        return Vec::new();
    }
    let mut mean = vec![0.0_f32; num_bins];
    for frame in features.chunks_exact(num_bins) {
        for (acc, &v) in mean.iter_mut().zip(frame) {
            *acc += v;
        }
    }
    for acc in mean.iter_mut() {
        *acc /= frames as f32;
    }
    mean
}

#[derive(Serialize)]
struct Report<'a> {
    input: String,
    params: &'a FeatureParams,
    batch: usize,
    utterance_samples: usize,
    num_frames: usize,
    num_bins: usize,
    output_len: usize,
    mean_power: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<&'a [f32]>,
}
