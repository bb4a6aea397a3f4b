use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use letloose_app::{RunOptions, load_config, report, run_scripted};
use letloose_core::ControllerConfig;
use letloose_storage::DocumentStore;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "letloose",
    version,
    about = "Drive tilt-based hair physics overrides against a scripted host"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted two-simulation scenario.
    Run {
        /// Number of frames to simulate.
        #[arg(long, default_value_t = 600)]
        frames: usize,
        /// Frame duration in milliseconds.
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Seed for baselines and tilt noise.
        #[arg(long, env = "LETLOOSE_SEED", default_value_t = 0x1E7_1005E)]
        seed: u64,
        /// Optional JSON controller config.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Controller document to restore from and save to.
        #[arg(long, env = "LETLOOSE_STATE")]
        state: Option<PathBuf>,
    },
    /// Print the records stored in a controller document.
    Inspect {
        #[arg(long, env = "LETLOOSE_STATE")]
        state: PathBuf,
    },
    /// Print the default controller config as JSON.
    Defaults,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            frames,
            frame_ms,
            seed,
            config,
            state,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => ControllerConfig::default(),
            };
            let options = RunOptions {
                frames,
                frame_ms,
                seed,
                config,
                state,
            };
            info!(frames, frame_ms, seed, "starting scripted run");
            let summary = run_scripted(&options)?;
            print!("{}", report::describe_run(&summary));
        }
        Command::Inspect { state } => {
            let store = DocumentStore::open(&state);
            let document = store
                .load()
                .with_context(|| format!("failed to read {}", state.display()))?;
            match document {
                Some(document) => print!("{}", report::describe_document(&document)),
                None => println!("no document at {}", state.display()),
            }
        }
        Command::Defaults => {
            let json = serde_json::to_string_pretty(&ControllerConfig::default())
                .context("failed to encode default config")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
