//! arcfit CLI: reconstruct full circles from arc images in a folder.

use clap::Parser;
use std::path::PathBuf;

use arcfit::{process_folder, ReconstructConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "arcfit")]
#[command(about = "Reconstruct the full circle behind a partial arc in each image of a folder")]
#[command(version)]
struct Cli {
    /// Folder containing PNG/JPEG arc images.
    #[arg(long, default_value = "test_images")]
    path: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ReconstructConfig::default();

    // Per-file failures are already logged by the batch driver; setup
    // failures end the run without a non-zero exit.
    match process_folder(&cli.path, &config) {
        Ok(summary) => {
            if summary.n_failed() > 0 {
                tracing::warn!("{} image(s) could not be reconstructed", summary.n_failed());
            }
        }
        Err(e) => tracing::error!("{}", e),
    }

    Ok(())
}
