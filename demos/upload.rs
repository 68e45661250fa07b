//! Uploads a file for analysis, using an upload URL when it is too large
//! for the standard endpoint.
//!
//! Run with: VIRUSTOTAL_API_KEY=... cargo run --example upload -- <path> [password]

use tracing_subscriber::EnvFilter;
use vtbridge::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: upload <path> [password]")?;

    let mut upload = FileUpload::from_path(&path).await?;
    if let Some(password) = args.next() {
        upload = upload.with_password(password);
    }
    let sha256 = upload.sha256();

    let client = VirusTotalClient::from_env()?;

    let response = if upload.len() < client.config().max_file_size {
        client.upload_file(upload).await?
    } else {
        match client.upload_url().await? {
            ApiResponse::Success(url) => client.upload_large_file(&url, upload).await?,
            ApiResponse::Error(err) => ApiResponse::Error(err),
        }
    };

    match response {
        ApiResponse::Success(receipt) => {
            println!("analysis: {}", receipt.analysis_id());
            println!("link:     {}", receipt.data.links.self_link);
            println!("report will be available under sha256 {}", sha256);
        }
        ApiResponse::Error(err) => println!("VirusTotal error: {}", err),
    }

    Ok(())
}
