use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use clipcue::cli::{Cli, Commands, CueFormat};
use clipcue::collab::toolkit::VideoRef;
use clipcue::config::Config;
use clipcue::engine::phrases::PhraseSegmenter;
use clipcue::engine::silence::SilenceDetector;
use clipcue::engine::timing::TimingMapBuilder;
use clipcue::engine::words::WordTimeEstimator;
use clipcue::pipeline::events::ProgressEvent;
use clipcue::pipeline::sidecar;
use clipcue::{Assembler, CommandSynthesizer, FfmpegToolkit, ProgressReporter, audio, subtitle};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            source,
            ideas,
            out,
            pool,
        } => {
            run_batch(config, &source, &ideas, &out, pool, cli.quiet, cli.verbose).await?;
        }
        Commands::Cues {
            audio,
            script,
            format,
        } => {
            print_cues(&config, &audio, &script, format)?;
        }
        Commands::Silence {
            audio,
            threshold,
            min_silence,
        } => {
            print_silence(&config, &audio, threshold, min_silence)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

async fn run_batch(
    mut config: Config,
    source: &Path,
    ideas_path: &Path,
    out: &Path,
    pool: Option<usize>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    if let Some(pool_size) = pool
        && pool_size > 0
    {
        config.batch.pool_size = pool_size;
    }

    let Some(command) = config.synth.command.clone() else {
        bail!(
            "no speech synthesizer configured; set [synth] command in the \
             config file or CLIPCUE_TTS_COMMAND"
        );
    };

    let ideas = clipcue::load_manifest(ideas_path)
        .with_context(|| format!("failed to load ideas from {}", ideas_path.display()))?;
    if !quiet {
        eprintln!("clipcue: processing {} idea(s)", ideas.len());
    }

    let synthesizer = Arc::new(CommandSynthesizer::new(command, config.synth.args.clone()));
    let toolkit = Arc::new(FfmpegToolkit::new(config.toolkit.ffmpeg_path.clone()));

    // Ctrl-C flips the cancellation flag; pipelines observe it between stages.
    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("clipcue: cancellation requested, finishing in-flight stages");
            ctrl_c_cancel.store(true, Ordering::SeqCst);
        }
    });

    // Progress events print from a plain thread so a slow terminal never
    // stalls the pipelines.
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let printer = std::thread::spawn(move || {
        for event in event_rx {
            print_event(&event, quiet, verbose);
        }
    });

    let assembler = Assembler::new(config, synthesizer, toolkit)
        .with_reporter(ProgressReporter::new(event_tx))
        .with_cancel_flag(cancel);

    let result = assembler.assemble(&VideoRef::new(source), &ideas, out).await;

    // Drop the assembler (and its event sender) so the printer drains and exits
    drop(assembler);
    if printer.join().is_err() {
        eprintln!("clipcue: progress printer thread panicked");
    }
    let output = result?;

    deliver_metadata(&output, out)?;

    if !quiet {
        eprintln!(
            "clipcue: {} clip(s) delivered to {}, {} failed",
            output.clips.len(),
            out.display(),
            output.failures.len()
        );
    }
    for failure in &output.failures {
        eprintln!(
            "clipcue: idea {} ({}) failed: {}",
            failure.index + 1,
            failure.title,
            failure.reason
        );
    }

    Ok(())
}

/// Writes the cue lists and sidecar metadata next to the rendered clips.
fn deliver_metadata(output: &clipcue::BatchOutput, out: &Path) -> Result<()> {
    for (i, clip) in output.clips.iter().enumerate() {
        let base = format!(
            "{:02}_{}",
            i + 1,
            sidecar::sanitize_filename(&clip.title)
        );
        let json = subtitle::cue::to_json(&clip.timing)?;
        std::fs::write(out.join(format!("{base}.cues.json")), json)?;
        std::fs::write(
            out.join(format!("{base}.srt")),
            subtitle::srt::render(&clip.timing),
        )?;
    }

    sidecar::write_sidecar(&out.join("descriptions.txt"), &output.sidecar)?;
    Ok(())
}

fn print_event(event: &ProgressEvent, quiet: bool, verbose: u8) {
    match event {
        ProgressEvent::StageChanged {
            idea_index,
            stage,
            percent,
        } => {
            if !quiet && verbose >= 1 {
                eprintln!("clipcue: idea {} {stage} ({percent}%)", idea_index + 1);
            }
        }
        ProgressEvent::IdeaFailed { idea_index, reason } => {
            if !quiet {
                eprintln!("clipcue: idea {} failed: {reason}", idea_index + 1);
            }
        }
        ProgressEvent::Diagnostic {
            idea_index,
            message,
        } => {
            if !quiet && verbose >= 2 {
                eprintln!("clipcue: idea {}: {message}", idea_index + 1);
            }
        }
        ProgressEvent::BatchFinished { succeeded, failed } => {
            if !quiet && verbose >= 1 {
                eprintln!("clipcue: batch finished ({succeeded} succeeded, {failed} failed)");
            }
        }
    }
}

fn print_cues(config: &Config, audio_path: &Path, script_path: &Path, format: CueFormat) -> Result<()> {
    let track = audio::wav::read_track_file(audio_path)
        .with_context(|| format!("failed to read {}", audio_path.display()))?;
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;

    let silences = SilenceDetector::new(config.silence_detector()).detect(&track);
    let tokens = WordTimeEstimator::new().estimate(&script, track.duration_secs())?;
    let phrases = PhraseSegmenter::new(config.phrase_segmenter()).segment(&tokens, &silences);
    let timing = TimingMapBuilder::new(config.reconciler().tolerance_secs)
        .build(phrases, track.duration_secs())?;

    let rendered = match format {
        CueFormat::Json => subtitle::cue::to_json(&timing)?,
        CueFormat::Srt => subtitle::srt::render(&timing),
        CueFormat::Ass => subtitle::ass::render(&timing),
    };
    println!("{rendered}");
    Ok(())
}

fn print_silence(
    config: &Config,
    audio_path: &Path,
    threshold: Option<f32>,
    min_silence_ms: Option<u32>,
) -> Result<()> {
    let track = audio::wav::read_track_file(audio_path)
        .with_context(|| format!("failed to read {}", audio_path.display()))?;

    let mut detector_config = config.silence_detector();
    if let Some(threshold) = threshold {
        detector_config.threshold = threshold;
    }
    if let Some(min_ms) = min_silence_ms {
        detector_config.min_silence_ms = min_ms;
    }

    let intervals = SilenceDetector::new(detector_config).detect(&track);
    if intervals.is_empty() {
        println!(
            "no silence found in {:.3}s of audio",
            track.duration_secs()
        );
        return Ok(());
    }

    for interval in &intervals {
        println!(
            "{:8.3}s - {:8.3}s  ({:.0} ms)",
            interval.start_secs,
            interval.end_secs,
            interval.duration_secs() * 1000.0
        );
    }
    Ok(())
}
