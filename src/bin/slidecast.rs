use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{
    ArgAction, Parser, Subcommand,
    builder::{PossibleValuesParser, TypedValueParser},
};
use slidecast::{
    FfmpegTools, GenerateRequest, OpenAiSpeech, Pipeline, SlidecastError, SpeechConfig, Voice,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidecast", version, about = "Turn a narration script and images into a narrated video")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Narrate a text file over a sequence of images (requires `ffmpeg`, `ffprobe` and
    /// `OPENAI_API_KEY`).
    Generate(GenerateArgs),
    /// Losslessly concatenate existing videos that share codec parameters.
    Merge(MergeArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Narration text file (UTF-8).
    #[arg(long = "input-txt", visible_alias = "input_txt")]
    input_txt: PathBuf,

    /// Images in display order, comma-separated or repeated.
    #[arg(
        long = "input-image",
        visible_alias = "input_image",
        value_delimiter = ',',
        num_args = 1..,
        required = true
    )]
    input_image: Vec<PathBuf>,

    /// Output MP4 path.
    #[arg(long = "output-video", visible_alias = "output_video")]
    output_video: PathBuf,

    /// Narration voice.
    #[arg(long, default_value = "alloy", value_parser = voice_parser())]
    voice: Voice,

    /// Speech speed multiplier (0.25 to 4.0).
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Speech model.
    #[arg(long, default_value = slidecast::tts::DEFAULT_MODEL)]
    model: String,

    /// Directory for intermediates (default: `temp/` beside the output video).
    #[arg(long = "temp-dir", visible_alias = "temp_dir")]
    temp_dir: Option<PathBuf>,

    /// Narration audio to reuse if it exists, or to synthesize into (and keep) if it does not.
    #[arg(long = "audio-file", visible_alias = "audio_file")]
    audio_file: Option<PathBuf>,

    /// Keep the synthesized narration audio in the temp directory.
    #[arg(long = "keep-audio", visible_alias = "keep_audio")]
    keep_audio: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Input videos in order, comma-separated or repeated.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    /// Output video path.
    #[arg(long = "output-video", visible_alias = "output_video")]
    output_video: PathBuf,
}

fn voice_parser() -> impl TypedValueParser<Value = Voice> {
    PossibleValuesParser::new(Voice::ALL.map(Voice::as_str)).try_map(|name| name.parse::<Voice>())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_interrupt_handler();

    let result = match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Merge(args) => cmd_merge(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code_for(&err);
            if code == 130 {
                eprintln!("interrupted by user: {err:#}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "slidecast=info",
        1 => "slidecast=debug",
        _ => "slidecast=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// First Ctrl-C stops the run at the next checkpoint and kills any running tool, so scoped
/// temporary files are removed before exit. A second Ctrl-C exits immediately.
fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        if slidecast::interrupt_requested() {
            eprintln!("interrupted by user");
            std::process::exit(130);
        }
        eprintln!("interrupt received, stopping (press Ctrl-C again to exit immediately)");
        slidecast::request_interrupt();
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "failed to install the Ctrl-C handler");
    }
}

/// Exit status of the first [`SlidecastError`] in the chain, or 1.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<SlidecastError>())
        .map(SlidecastError::exit_code)
        .unwrap_or(1)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let request = GenerateRequest {
        input_txt: args.input_txt,
        images: args.input_image,
        output_video: args.output_video,
        speech: SpeechConfig {
            voice: args.voice,
            speed: args.speed,
            model: args.model,
        },
        temp_dir: args.temp_dir,
        audio_file: args.audio_file,
        keep_audio: args.keep_audio,
    };
    request.validate()?;

    tracing::info!(
        text = %request.input_txt.display(),
        images = request.images.len(),
        output = %request.output_video.display(),
        voice = %request.speech.voice,
        speed = request.speech.speed,
        model = %request.speech.model,
        "starting narrated video"
    );
    if let Some(audio) = &request.audio_file {
        let mode = if audio.is_file() { "reuse" } else { "synthesize into" };
        tracing::info!(path = %audio.display(), "narration audio: {mode}");
    }

    let speech = OpenAiSpeech::from_env()?;
    let media = FfmpegTools::from_env();
    let report = Pipeline::new(&speech, &media)
        .generate(&request)
        .with_context(|| format!("failed to generate '{}'", request.output_video.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if let Some(kept) = &report.kept_audio {
        eprintln!("kept narration audio at {}", kept.display());
    }
    eprintln!("wrote {}", report.output.display());
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let media = FfmpegTools::from_env();
    slidecast::merge_videos(&media, &args.input, &args.output_video)
        .with_context(|| format!("failed to merge into '{}'", args.output_video.display()))?;
    eprintln!("wrote {}", args.output_video.display());
    Ok(())
}
