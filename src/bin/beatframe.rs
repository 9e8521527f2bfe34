use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

const THREADS_ENV: &str = "BEATFRAME_THREADS";

#[derive(Parser, Debug)]
#[command(name = "beatframe", version, about = "Procedural music video generator")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a music video MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Generate(GenerateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// List registered genres.
    Genres,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Options JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Genre name (see `beatframe genres`).
    #[arg(long)]
    genre: Option<String>,

    /// Seed for every random choice.
    #[arg(long)]
    seed: Option<u64>,

    /// Main segment length in whole seconds; sampled from the genre range when omitted.
    #[arg(long)]
    duration: Option<u32>,

    /// Integer frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Frame rendering threads (also read from BEATFRAME_THREADS).
    #[arg(long)]
    threads: Option<usize>,

    /// Render frames on the calling thread only.
    #[arg(long)]
    sequential: bool,

    /// x264 constant rate factor.
    #[arg(long)]
    crf: Option<u8>,

    /// x264 preset.
    #[arg(long)]
    preset: Option<String>,

    /// Parent directory for the temporary work dir.
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Genre name.
    #[arg(long, default_value = beatframe::DEFAULT_GENRE)]
    genre: String,

    /// Segment to draw from.
    #[arg(long, value_enum, default_value_t = SegmentChoice::Main)]
    segment: SegmentChoice,

    /// Frame index (0-based) within the segment.
    #[arg(long)]
    frame: u64,

    /// Main segment length used for the progress strip.
    #[arg(long, default_value_t = 30)]
    duration: u32,

    /// Integer frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SegmentChoice {
    Intro,
    Main,
    Outro,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Genres => cmd_genres(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn read_opts_json(path: &Path) -> anyhow::Result<beatframe::GenerateOpts> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let opts = serde_json::from_reader(r).with_context(|| "parse config JSON")?;
    Ok(opts)
}

fn threads_from_env() -> anyhow::Result<Option<usize>> {
    match std::env::var(THREADS_ENV) {
        Ok(v) => {
            let n = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{THREADS_ENV} must be a positive integer, got '{v}'"))?;
            Ok(Some(n))
        }
        Err(_) => Ok(None),
    }
}

fn build_opts(args: &GenerateArgs) -> anyhow::Result<beatframe::GenerateOpts> {
    let mut opts = match &args.config {
        Some(path) => read_opts_json(path)?,
        None => beatframe::GenerateOpts::default(),
    };

    if let Some(n) = threads_from_env()? {
        opts.threading.threads = Some(n);
    }
    if let Some(genre) = &args.genre {
        opts.genre = genre.clone();
    }
    if let Some(seed) = args.seed {
        opts.seed = seed;
    }
    if let Some(d) = args.duration {
        opts.duration_secs = Some(d);
    }
    if let Some(fps) = args.fps {
        opts.fps = beatframe::Fps::new(fps, 1)?;
    }
    if let Some(w) = args.width {
        opts.canvas.width = w;
    }
    if let Some(h) = args.height {
        opts.canvas.height = h;
    }
    if let Some(n) = args.threads {
        opts.threading.threads = Some(n);
    }
    if args.sequential {
        opts.threading.parallel = false;
    }
    if let Some(crf) = args.crf {
        opts.encode.crf = crf;
    }
    if let Some(preset) = &args.preset {
        opts.encode.preset = preset.clone();
    }
    if let Some(dir) = &args.work_dir {
        opts.work_root = Some(dir.clone());
    }

    opts.validate()?;
    Ok(opts)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let opts = build_opts(&args)?;
    let cancel = beatframe::CancelToken::new();
    cancel.install_ctrlc_handler()?;

    let mut collab = beatframe::Collaborators::system(&opts)?;
    let report = beatframe::generate(&opts, &args.out, &mut collab, &cancel)?;

    eprintln!(
        "wrote {} ({} @ {} BPM, {}s main, {:.2}s total, {} events)",
        report.output.display(),
        report.genre,
        report.tempo,
        report.duration_secs,
        report.probed_duration_secs,
        report.events
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (template, style) = beatframe::resolve(&args.genre)?;
    let fps = beatframe::Fps::new(args.fps, 1)?;
    let canvas = beatframe::Canvas::FULL_HD;

    let source = match args.segment {
        SegmentChoice::Main => beatframe::FrameSource::Main {
            ctx: beatframe::FrameContext {
                fps,
                tempo: template.tempo,
                duration_secs: f64::from(args.duration),
                canvas,
            },
            style,
        },
        SegmentChoice::Intro | SegmentChoice::Outro => beatframe::FrameSource::Edge {
            mode: if matches!(args.segment, SegmentChoice::Intro) {
                beatframe::EdgeMode::Intro
            } else {
                beatframe::EdgeMode::Outro
            },
            total_frames: fps.secs_to_frames_floor(beatframe::EDGE_SECS),
            style,
            canvas,
        },
    };
    if args.frame >= source.frame_count() {
        anyhow::bail!(
            "frame {} is past the end of a {}-frame segment",
            args.frame,
            source.frame_count()
        );
    }

    let list = source.draw_list(beatframe::FrameIndex(args.frame));
    let mut backend = beatframe::create_backend(beatframe::BackendKind::Cpu)?;
    let frame = backend.render(&list)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let bg = [list.background.r, list.background.g, list.background.b];
    beatframe::render::pipeline::save_png(&frame, bg, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_genres() -> anyhow::Result<()> {
    beatframe::validate_registry()?;
    for name in beatframe::genre_names() {
        let t = beatframe::genre_template(name)?;
        let (min, max) = t.duration_range;
        println!("{name}\t{} BPM\t{min}-{max}s", t.tempo);
    }
    Ok(())
}
