use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use photowall_cli::api_client::ApiClient;
use photowall_cli::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "export_photos")]
#[command(about = "Download photos as a zip archive")]
struct Args {
    /// Export a single batch instead of every batch
    #[arg(long, value_name = "ID")]
    batch_id: Option<String>,

    /// Output file (default: the name suggested by the server)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the JSON metadata export instead of downloading the archive
    #[arg(long)]
    metadata_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let client = ApiClient::from_env()?;

    if args.metadata_only {
        let export = client.export_metadata(args.batch_id.as_deref()).await?;
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    let archive = client.download_archive(args.batch_id.as_deref()).await?;
    let output = args
        .output
        .or_else(|| archive.filename.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("photos.zip"));

    tokio::fs::write(&output, &archive.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        size_bytes = archive.data.len(),
        "Archive saved"
    );
    println!("Saved {} ({} bytes)", output.display(), archive.data.len());

    Ok(())
}
