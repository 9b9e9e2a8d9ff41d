//! Carnival CLI - terminal front end for the interpretability games.

use carnival::{AxisOrder, Target};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod gateway;

use gateway::DEFAULT_SERVER;

/// Carnival - play the model-interpretability games from a terminal
#[derive(Parser)]
#[command(name = "carnival")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess the hidden word on the latent map
    Hunt {
        /// Carnival server URL
        #[arg(short, long, default_value = DEFAULT_SERVER)]
        server: String,

        /// Hidden word
        #[arg(long)]
        target: Option<String>,

        /// Latent x of the hidden word
        #[arg(long, requires = "target")]
        target_x: Option<f64>,

        /// Latent y of the hidden word
        #[arg(long, requires = "target")]
        target_y: Option<f64>,
    },

    /// Knock out cells of a digit and ask the classifier
    Sketch {
        /// Canvas clicks as "px,py px,py ..."
        #[arg(short, long, default_value = "")]
        clicks: String,

        /// Base digit image (28x28 grayscale)
        #[arg(long)]
        base: Option<PathBuf>,

        /// Write the perturbed digit as a PNG here
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Pair order of the drawn coordinates: xy or yx
        #[arg(long, default_value = "xy")]
        order: AxisOrder,

        /// Send the sketch to the server for classification
        #[arg(long)]
        submit: bool,

        /// Carnival server URL
        #[arg(short, long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Inspect the activation map
    Neurons {
        /// Screen position to hit-test, "sx,sy"
        #[arg(long)]
        at: Option<String>,

        /// Zoom steps, negative to zoom out
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        zoom: i32,

        /// Hit radius in map units
        #[arg(short, long, default_value = "20")]
        radius: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Hunt {
            server,
            target,
            target_x,
            target_y,
        } => {
            let target = match target {
                Some(word) => {
                    let fallback = Target::default().coords;
                    Target::new(&word, [target_x.unwrap_or(fallback[0]), target_y.unwrap_or(fallback[1])])?
                }
                None => Target::default(),
            };
            commands::hunt::run(&server, target).await?;
        }

        Commands::Sketch {
            clicks,
            base,
            preview,
            order,
            submit,
            server,
        } => {
            commands::sketch::run(commands::sketch::SketchArgs {
                clicks: &clicks,
                base: base.as_deref(),
                preview: preview.as_deref(),
                order,
                submit,
                server: &server,
            })
            .await?;
        }

        Commands::Neurons { at, zoom, radius } => {
            commands::neurons::run(at.as_deref(), zoom, radius)?;
        }
    }

    Ok(())
}
