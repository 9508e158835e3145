use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use studio::config::loader::ConfigLoader;
use studio::config::schema::{OutputConfig, OutputFormat};
use studio::{Trace, replay};
use studio_core::{CommandEntry, Modifiers, encode_key};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studio", version, about = "Replay UI interaction traces into test commands")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a YAML/JSON trace and print the consolidated command log
    Replay {
        /// Trace file
        trace: PathBuf,
        /// Config file (else $STUDIO_CONFIG, ./studio.yaml, ~/.studio/config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Print every published snapshot as a JSON line
        #[arg(long)]
        snapshots: bool,
    },
    /// Print the key-notation token for a key press
    EncodeKey {
        /// DOM key value (e.g. "a", "Enter", "ArrowUp")
        key: String,
        #[arg(long)]
        alt: bool,
        #[arg(long)]
        ctrl: bool,
        #[arg(long)]
        meta: bool,
        #[arg(long)]
        shift: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the command log.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Replay {
            trace,
            config,
            format,
            snapshots,
        } => {
            let mut settings = ConfigLoader::load(config.as_deref()).await?;
            if let Some(format) = format {
                settings.output.format = format;
            }
            settings.output.snapshots |= snapshots;

            let trace = Trace::load(&trace)
                .await
                .with_context(|| format!("loading trace {}", trace.display()))?;

            let print_snapshots = settings.output.snapshots;
            let outcome = replay(&trace, &settings.recorder, |log: &[CommandEntry]| {
                if print_snapshots {
                    match serde_json::to_string(log) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::warn!("Failed to serialize snapshot: {}", e),
                    }
                }
            })?;

            println!("{}", render(&outcome.log, &settings.output)?);
        }
        Command::EncodeKey {
            key,
            alt,
            ctrl,
            meta,
            shift,
        } => {
            let token = encode_key(
                &key,
                Modifiers {
                    alt,
                    ctrl,
                    meta,
                    shift,
                },
            );
            println!("{}", token);
        }
    }

    Ok(())
}

fn render(log: &[CommandEntry], output: &OutputConfig) -> anyhow::Result<String> {
    let rendered = match output.format {
        OutputFormat::Json if output.pretty => serde_json::to_string_pretty(log)?,
        OutputFormat::Json => serde_json::to_string(log)?,
        OutputFormat::Yaml => serde_yaml::to_string(log)?,
    };
    Ok(rendered)
}
