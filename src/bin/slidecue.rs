use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use slidecue::{
    AlignmentSet, ClockOptions, PlaybackClock, PlaybackMode, Presentation, ResolvedTiming,
    VirtualDriver, format_mmss, parse_markers,
};

#[derive(Parser, Debug)]
#[command(name = "slidecue", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the duration report of a presentation.
    Report(ReportArgs),
    /// Check a presentation for authoring mistakes.
    Validate(ValidateArgs),
    /// Show the markers found in a narration string.
    Markers(MarkersArgs),
    /// Play a presentation on a virtual clock and print its transitions.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Global timing defaults JSON (partial files merge over built-ins).
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Emit the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Safety factor applied to the total for recording tools.
    #[arg(long)]
    buffer: Option<f64>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct MarkersArgs {
    /// Narration text with `{#id}` / `{id#}` markers.
    text: String,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Alignment JSON produced by the aligner.
    #[arg(long)]
    alignment: Option<PathBuf>,

    /// Global timing defaults JSON.
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Step through segments manually instead of narrating.
    #[arg(long, default_value_t = false)]
    manual: bool,

    /// Audio files to treat as unplayable.
    #[arg(long = "fail-audio")]
    fail_audio: Vec<String>,

    /// Give up after this much virtual time (ms).
    #[arg(long, default_value_t = 3_600_000)]
    limit_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Report(args) => cmd_report(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Markers(args) => cmd_markers(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn load_defaults(path: Option<&Path>) -> anyhow::Result<ResolvedTiming> {
    match path {
        Some(p) => ResolvedTiming::from_path(p)
            .with_context(|| format!("load timing defaults '{}'", p.display())),
        None => Ok(ResolvedTiming::DEFAULT),
    }
}

fn load_presentation(path: &Path) -> anyhow::Result<Presentation> {
    Presentation::from_path(path)
        .with_context(|| format!("load presentation '{}'", path.display()))
}

fn cmd_report(args: ReportArgs) -> anyhow::Result<()> {
    let presentation = load_presentation(&args.in_path)?;
    let defaults = load_defaults(args.defaults.as_deref())?;
    let report = presentation.duration_report(&defaults);

    if args.json {
        let s = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{s}");
        return Ok(());
    }

    let name = presentation
        .title()
        .or(presentation.id())
        .unwrap_or("(untitled)");
    println!("{name}");
    for s in &report.slide_breakdowns {
        println!(
            "  c{}_s{:<4} {:>9.3}s  audio {:>8.3}s  delays {:>7.3}s  {}",
            s.chapter, s.slide, s.total_duration, s.audio_duration, s.delays_duration, s.title
        );
    }
    println!(
        "total {:.3}s ({})  audio {:.3}s  segment gaps {:.3}s  slide gaps {:.3}s  final {:.3}s",
        report.total_duration,
        format_mmss(report.total_duration),
        report.audio_only_duration,
        report.segment_delays_duration,
        report.slide_delays_duration,
        report.final_delay_duration,
    );
    if report.lead_in_duration > 0.0 {
        println!("lead-in {:.3}s", report.lead_in_duration);
    }
    if let Some(buffer) = args.buffer {
        let budget = report.recording_budget(buffer);
        println!("recording budget {budget:.3}s ({})", format_mmss(budget));
    }
    println!("fingerprint {}", report.fingerprint());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let presentation = load_presentation(&args.in_path)?;
    presentation.validate()?;
    println!(
        "ok: {} slides, {} segments",
        presentation.slides().len(),
        presentation
            .slides()
            .iter()
            .map(|s| s.audio_segments.len())
            .sum::<usize>()
    );
    Ok(())
}

fn cmd_markers(args: MarkersArgs) -> anyhow::Result<()> {
    let parsed = parse_markers(&args.text);
    println!("{}", parsed.clean_text);
    for m in &parsed.markers {
        let word = m
            .word_index
            .map_or_else(|| "-".to_owned(), |i| i.to_string());
        println!("{}\t{:?}\tword {word}", m.id, m.anchor);
    }
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let presentation = load_presentation(&args.in_path)?;
    let defaults = load_defaults(args.defaults.as_deref())?;
    let alignment = args
        .alignment
        .as_ref()
        .map(|p| {
            AlignmentSet::from_path(p)
                .with_context(|| format!("load alignment '{}'", p.display()))
        })
        .transpose()?;

    let mode = if args.manual {
        PlaybackMode::Manual
    } else {
        PlaybackMode::Narrated
    };
    let mut clock = PlaybackClock::for_presentation(
        &presentation,
        alignment.as_ref(),
        ClockOptions { mode, defaults },
    );
    clock.start()?;

    if args.manual {
        loop {
            let snap = clock.snapshot();
            let Some(pos) = snap.position else {
                break;
            };
            let reached: Vec<&str> = snap.reached_markers.iter().map(String::as_str).collect();
            println!(
                "slide {} segment {}  {}ms + {}ms  reached [{}]",
                pos.slide_index,
                pos.segment_index,
                snap.segment_duration_ms,
                snap.delay_after_ms,
                reached.join(", ")
            );
            if !clock.next()? {
                break;
            }
        }
        return Ok(());
    }

    let mut driver = VirtualDriver::new();
    for path in args.fail_audio {
        driver.fail_audio(path);
    }
    let elapsed = driver.run_to_completion(&mut clock, args.limit_ms)?;
    for t in driver.transitions() {
        let at = match t.segment {
            Some(s) => format!("slide {} segment {}", s.slide, s.segment),
            None => "-".to_owned(),
        };
        println!("{:>9}ms  {:<15} {at}", t.at_ms, format!("{:?}", t.state));
    }
    println!(
        "finished in {elapsed}ms ({})",
        format_mmss(elapsed as f64 / 1000.0)
    );
    Ok(())
}
