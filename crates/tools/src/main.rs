use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use formats::GpxTrack;
use foundation::math::Vec2;
use tools::export::{PacedExporter, SegmentSink};
use tracing::info;
use tracing_subscriber::EnvFilter;
use track::{CommitOutcome, Cursor, Editor, EditorConfig, Loopiness, NudgeMode, Operation};

#[derive(Parser, Debug)]
#[command(name = "trackedit", about = "Edit GPS tracks stored as GPX")]
struct Cli {
    /// JSON engine configuration; unset keys keep their defaults.
    #[arg(long, env = "TRACKEDIT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a track.
    Info { input: PathBuf },
    /// Delete the points between the markers.
    Delete(EditArgs),
    /// Even out the climb between the markers.
    SmoothGradient {
        #[command(flatten)]
        edit: EditArgs,
        /// 0 lays every point on the average slope, 1 changes nothing.
        #[arg(long, default_value_t = 0.0)]
        bumpiness: f64,
    },
    /// Replace the points between the markers with a circular bend.
    SmoothBend {
        #[command(flatten)]
        edit: EditArgs,
        #[arg(long)]
        spacing: Option<f64>,
    },
    /// Join the ends of a track that nearly forms a loop.
    CloseLoop(EditArgs),
    /// Start a closed loop at another point.
    ChangeStart {
        #[command(flatten)]
        edit: EditArgs,
        #[arg(long)]
        index: usize,
    },
    /// Ride the track the other way round.
    Reverse(EditArgs),
    /// Move the points between the markers, or stretch them about a pointer.
    Nudge {
        #[command(flatten)]
        edit: EditArgs,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        east: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        north: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        height: f64,
        /// Stretch about this point instead of translating.
        #[arg(long)]
        stretch_pointer: Option<usize>,
    },
    /// Decimate, smooth and resample the whole track.
    QuickFix(EditArgs),
    /// Cut the track into equal pieces no longer than the limit.
    Split {
        input: PathBuf,
        out_dir: PathBuf,
        #[arg(long)]
        limit_km: f64,
        #[arg(long)]
        pen_buffers: bool,
        /// Pause between writing segments.
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
}

#[derive(Args, Debug)]
struct EditArgs {
    input: PathBuf,
    output: PathBuf,
    /// Orange marker.
    #[arg(long, default_value_t = 0)]
    from: usize,
    /// Purple marker.
    #[arg(long)]
    to: Option<usize>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            EditorConfig::load(path).map_err(|e| format!("config {}: {e}", path.display()))?
        }
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Info { input } => cmd_info(&input, config),
        Command::Delete(edit) => run_edit(&edit, config, |_| Operation::Delete),
        Command::SmoothGradient { edit, bumpiness } => {
            run_edit(&edit, config, |_| Operation::smooth_gradient(bumpiness))
        }
        Command::SmoothBend { edit, spacing } => run_edit(&edit, config, |e| match spacing {
            Some(spacing_m) => Operation::SmoothBend { spacing_m },
            None => Operation::smooth_bend(e.config()),
        }),
        Command::CloseLoop(edit) => run_edit(&edit, config, |e| Operation::close_loop(e.config())),
        Command::ChangeStart { edit, index } => {
            run_edit(&edit, config, |e| Operation::change_start(index, e.config()))
        }
        Command::Reverse(edit) => run_edit(&edit, config, |_| Operation::Reverse),
        Command::Nudge {
            edit,
            east,
            north,
            height,
            stretch_pointer,
        } => run_edit(&edit, config, |e| {
            let mode = match stretch_pointer {
                Some(pointer) => NudgeMode::Stretch { pointer },
                None => NudgeMode::Translate,
            };
            Operation::nudge(Vec2::new(east, north), height, mode, e.config())
        }),
        Command::QuickFix(edit) => run_edit(&edit, config, |e| Operation::quick_fix(e.config())),
        Command::Split {
            input,
            out_dir,
            limit_km,
            pen_buffers,
            delay_ms,
        } => {
            cmd_split(
                &input,
                &out_dir,
                limit_km * 1000.0,
                pen_buffers,
                Duration::from_millis(delay_ms),
                config,
            )
            .await
        }
    }
}

fn open_editor(input: &Path, config: EditorConfig) -> Result<Editor, String> {
    let track =
        formats::load_track(input, &config).map_err(|e| format!("{}: {e}", input.display()))?;
    Ok(Editor::new(track, config))
}

fn cmd_info(input: &Path, config: EditorConfig) -> Result<(), String> {
    let editor = open_editor(input, config)?;
    let track = editor.track();
    let climb: f64 = track
        .points()
        .windows(2)
        .map(|w| (w[1].altitude() - w[0].altitude()).max(0.0))
        .sum();

    println!("name:     {}", track.name());
    println!("points:   {}", track.len());
    println!("length:   {:.3} km", track.length() / 1000.0);
    println!("climb:    {climb:.0} m");
    match editor.loopiness() {
        Loopiness::IsLoop => println!("loop:     closed"),
        Loopiness::AlmostLoop(gap) => println!("loop:     open by {gap:.1} m"),
        Loopiness::NotLoop(gap) => println!("loop:     no ({gap:.0} m between ends)"),
    }
    Ok(())
}

fn run_edit(
    args: &EditArgs,
    config: EditorConfig,
    build: impl FnOnce(&Editor) -> Operation,
) -> Result<(), String> {
    let mut editor = open_editor(&args.input, config)?;
    editor.set_cursor(Cursor::new(args.from, args.to));

    let operation = build(&editor);
    let label = operation.label();
    let descriptor = serde_json::to_string(&operation).map_err(|e| format!("json: {e}"))?;
    let before = editor.track().len();
    if editor.commit(operation) == CommitOutcome::Unchanged {
        return Err(format!("{label}: nothing to change, track left as it was"));
    }
    info!(%label, before, after = editor.track().len(), "edit applied");
    println!("{descriptor}");

    let doc = formats::track_to_gpx(editor.track());
    let digest = formats::save_gpx(&args.output, &doc).map_err(|e| e.to_string())?;
    eprintln!("wrote {} (blake3={digest})", args.output.display());
    Ok(())
}

struct DirectorySink {
    dir: PathBuf,
    stem: String,
}

impl SegmentSink for DirectorySink {
    fn deliver(&mut self, number: usize, segment: &GpxTrack) -> Result<(), String> {
        let path = self.dir.join(format!("{}_{number:02}.gpx", self.stem));
        let digest = formats::save_gpx(&path, segment).map_err(|e| e.to_string())?;
        eprintln!("wrote {} (blake3={digest})", path.display());
        Ok(())
    }
}

async fn cmd_split(
    input: &Path,
    out_dir: &Path,
    limit_m: f64,
    pen_buffers: bool,
    delay: Duration,
    config: EditorConfig,
) -> Result<(), String> {
    let editor = open_editor(input, config)?;
    let plan = editor
        .split(limit_m, pen_buffers)
        .ok_or_else(|| format!("cannot split with a {limit_m} m limit"))?;
    info!(
        count = plan.count,
        segment_m = plan.segment_length,
        "split planned"
    );

    let docs: Vec<GpxTrack> = plan
        .segments
        .iter()
        .map(|s| formats::segment_to_gpx(editor.track(), s))
        .collect();

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| format!("create {}: {e}", out_dir.display()))?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("segment")
        .to_string();
    let mut sink = DirectorySink {
        dir: out_dir.to_path_buf(),
        stem,
    };

    let (mut exporter, cancel) = PacedExporter::new(delay);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = exporter
        .run(&docs, &mut sink)
        .await
        .map_err(|e| e.to_string())?;
    eprintln!("split into {} segments", report.delivered);
    Ok(())
}
