//! slidereel binary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use slidereel_media::{check_tool, ProcessGateway, REQUIRED_TOOLS};
use slidereel_worker::{CancelToken, Pipeline, PipelineConfig, PipelineError, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "slidereel", version, about = "Turn a folder of photos and clips into one scored video")]
struct Cli {
    /// Log output format (defaults to LOG_FORMAT, then pretty)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the slideshow from MEDIA_DIR, scored with a track from AUDIO_DIR
    Run(RunArgs),
    /// Verify the external tools are on PATH
    Check,
}

#[derive(Debug, Args)]
struct RunArgs {
    media_dir: PathBuf,
    audio_dir: PathBuf,

    /// Number of segment jobs run concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Silent assembled video
    #[arg(long)]
    output: Option<PathBuf>,

    /// Assembled video with soundtrack
    #[arg(long)]
    audio_output: Option<PathBuf>,

    /// Seconds each photo stays on screen
    #[arg(long, value_name = "SECS")]
    time_gap: Option<f64>,

    /// Length of the trailing audio fade
    #[arg(long, value_name = "SECS")]
    fade_out: Option<f64>,

    /// Print the run result as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    /// CLI flags take precedence over environment and defaults.
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(audio_output) = &self.audio_output {
            config.audio_output_path = audio_output.clone();
        }
        if let Some(time_gap) = self.time_gap {
            config.time_gap_secs = time_gap;
        }
        if let Some(fade_out) = self.fade_out {
            config.fade_out_secs = fade_out;
        }
        config
    }
}

fn init_tracing(format: Option<LogFormat>) {
    let use_json = match format {
        Some(format) => format == LogFormat::Json,
        None => std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false),
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slidereel=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Report each required tool; false when any is missing.
fn preflight() -> bool {
    let mut ok = true;
    for tool in REQUIRED_TOOLS {
        match check_tool(tool) {
            Ok(path) => info!(tool, path = %path.display(), "Tool found"),
            Err(e) => {
                error!(tool, "{}", e);
                ok = false;
            }
        }
    }
    ok
}

async fn run(args: RunArgs) -> ExitCode {
    if !preflight() {
        return ExitCode::FAILURE;
    }

    let config = args.apply(PipelineConfig::from_env());
    info!("Pipeline config: {:?}", config);

    let cancel = CancelToken::new();
    let pipeline = Pipeline::new(config, Arc::new(ProcessGateway::new())).with_cancel(cancel.clone());

    // Ctrl-C stops new jobs; running ones finish
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, waiting for running jobs");
            cancel.cancel();
        }
    });

    let outcome = pipeline.run(&args.media_dir, &args.audio_dir).await;
    interrupt.abort();

    match outcome {
        Ok(RunOutcome::NothingToDo) => {
            info!("Nothing to do");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Completed(result)) => {
            info!(
                segments = result.segment_count,
                output = %result.assembled_path.display(),
                duration = ?result.final_duration,
                audio_attached = result.audio_attached,
                audio_output = ?result.audio_path,
                "Slideshow ready"
            );
            if args.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("Failed to serialize result: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &PipelineError) {
    match err.tool_output() {
        Some(output) => error!(tool_output = %output.trim(), "Run failed: {}", err),
        None => error!("Run failed: {}", err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Check => {
            if preflight() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Run(args) => run(args).await,
    }
}
