use anyhow::Result;
use clap::Parser;
use photowall_cli::api_client::ApiClient;
use photowall_cli::{format_millis, init_tracing, truncate_string};
use photowall_core::models::ListPhotosResponse;

#[derive(Parser, Debug)]
#[command(name = "list_photos")]
#[command(about = "List the most recent photos on the wall")]
struct Args {
    /// Limit number of results (server default: 100)
    #[arg(long)]
    limit: Option<i64>,

    /// Include soft-deleted photos
    #[arg(long)]
    include_deleted: bool,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let client = ApiClient::from_env()?;

    tracing::debug!(base_url = client.base_url(), "Listing photos");
    let list = client.list_photos(args.limit, args.include_deleted).await?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        _ => print_photo_table(&list),
    }

    Ok(())
}

fn print_photo_table(list: &ListPhotosResponse) {
    println!("\n=== Photos ===\n");
    println!(
        "Showing {} of {} photos",
        list.photos.len(),
        list.total_count
    );

    if list.photos.is_empty() {
        println!("\nNo photos found.");
        return;
    }

    println!(
        "\n{:<36} {:<36} {:<20} {:<30} {:<8} {:>20}",
        "ID", "Batch", "Uploader", "Comment", "Deleted", "Uploaded At"
    );
    println!("{}", "-".repeat(155));

    for photo in &list.photos {
        println!(
            "{:<36} {:<36} {:<20} {:<30} {:<8} {:>20}",
            truncate_string(&photo.id, 36),
            truncate_string(&photo.batch_id, 36),
            truncate_string(&photo.uploader_name, 20),
            truncate_string(photo.effective_comment().unwrap_or(""), 30),
            if photo.is_deleted() { "yes" } else { "" },
            format_millis(photo.uploaded_at)
        );
    }

    println!();
}
