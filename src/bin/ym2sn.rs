//! Command-line front end: `ym2sn <input.ym> <output.vgm> [flags]`.
//!
//! Argument handling is done by hand against `std::env::args()` rather than
//! pulling in a parsing crate, matching the rest of this codebase's style.

use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use ym2sn::config::{ConversionConfig, LfsrTap};
use ym2sn::{reader, run_conversion, VgmWriter};

struct Args {
    input: String,
    output: String,
    config_path: Option<String>,
    clock: Option<u32>,
    lfsr_tap: Option<LfsrTap>,
    software_bass: bool,
    tuned_white_noise: bool,
    no_envelopes: bool,
    force_attenuation: bool,
    verbosity: u8,
}

fn parse_args() -> Result<Args> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let mut software_bass = false;
    let mut tuned_white_noise = false;
    let mut no_envelopes = false;
    let mut force_attenuation = false;
    let mut clock = None;
    let mut lfsr_tap = None;
    let mut config_path = None;
    let mut verbosity = 0u8;

    let mut positional = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "--software-bass" => software_bass = true,
            "--tuned-white-noise" => tuned_white_noise = true,
            "--no-envelopes" => no_envelopes = true,
            "--force-attenuation" => force_attenuation = true,
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = verbosity.max(2),
            "--clock" => {
                i += 1;
                let value = raw.get(i).context("--clock requires a value")?;
                clock = Some(value.parse().context("--clock must be an integer")?);
            }
            "--lfsr-tap" => {
                i += 1;
                let value = raw.get(i).context("--lfsr-tap requires a value")?;
                lfsr_tap = Some(match value.as_str() {
                    "15" => LfsrTap::Bit15,
                    "16" => LfsrTap::Bit16,
                    other => bail!("unsupported --lfsr-tap value: {other}"),
                });
            }
            "--config" => {
                i += 1;
                config_path = Some(raw.get(i).context("--config requires a path")?.clone());
            }
            other if !other.starts_with('-') => positional.push(raw[i].clone()),
            other => bail!("unrecognised flag: {other}"),
        }
        i += 1;
    }

    if positional.len() != 2 {
        bail!("usage: ym2sn <input.ym> <output.vgm> [--software-bass] [--tuned-white-noise] [--no-envelopes] [--force-attenuation] [--clock HZ] [--lfsr-tap 15|16] [--config path.json] [-v|-vv]");
    }

    Ok(Args {
        input: positional[0].clone(),
        output: positional[1].clone(),
        config_path,
        clock,
        lfsr_tap,
        software_bass,
        tuned_white_noise,
        no_envelopes,
        force_attenuation,
        verbosity,
    })
}

fn build_config(args: &Args, metadata: &ym2sn::SongMetadata) -> Result<ConversionConfig> {
    let mut config = if let Some(path) = &args.config_path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse config file {path}"))?
    } else {
        ConversionConfig::default()
    };

    config.apply_metadata_defaults(metadata);
    if let Some(clock) = args.clock {
        config.target_clock_hz = clock;
    }
    if let Some(tap) = args.lfsr_tap {
        config.lfsr_tap = tap;
    }
    config.software_bass |= args.software_bass;
    config.tuned_white_noise |= args.tuned_white_noise;
    config.disable_envelopes |= args.no_envelopes;
    config.force_attenuation_mapping |= args.force_attenuation;
    Ok(config)
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let level = match args.verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let data = fs::read(&args.input).with_context(|| format!("failed to read {}", args.input))?;
    let song = reader::parse(&data).with_context(|| format!("failed to parse {}", args.input))?;
    log::info!(
        "loaded '{}' by '{}': {} frames at {} Hz",
        song.metadata.title,
        song.metadata.author,
        song.frames.len(),
        song.metadata.frame_rate_hz
    );

    let config = build_config(&args, &song.metadata)?;
    let (commands, report) = run_conversion(&song.frames, &config, song.metadata.loop_frame)
        .context("conversion failed")?;

    let mut writer = VgmWriter::new(config.target_clock_hz);
    for command in commands {
        writer.push(command).context("VGM encode error")?;
    }
    let bytes = writer.finish().context("failed to finalize VGM stream")?;
    fs::write(&args.output, bytes).with_context(|| format!("failed to write {}", args.output))?;

    log::info!(
        "wrote '{}': {} frames, {} octave folds, {} unreachable, {} bass/noise contentions",
        args.output,
        report.frames_processed,
        report.octave_fold_count,
        report.unreachable_silenced_count,
        report.bass_noise_contention_count,
    );
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("ym2sn: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
